//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static response for every request and counts the requests it
//! receives, which is what the single-flight assertions key off. Status,
//! body, and an artificial response delay are configurable; the delay keeps
//! a fetch in flight long enough for concurrent callers to join it.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// HTTP status to answer with.
    pub status: u16,
    /// Response body (typically the snippets JSON object).
    pub body: String,
    /// Delay before the response is written.
    pub delay: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            body: "{}".to_string(),
            delay: Duration::ZERO,
        }
    }
}

pub struct SnippetServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl SnippetServer {
    /// Host URL to configure widgets with (no trailing separator).
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests the server has received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server answering 200 with `json`.
pub fn start_json(json: &str) -> SnippetServer {
    start_with_options(ServerOptions {
        body: json.to_string(),
        ..ServerOptions::default()
    })
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start_with_options(options: ServerOptions) -> SnippetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let port = listener.local_addr().expect("local addr").port();
    let hits = Arc::new(AtomicUsize::new(0));

    let handler_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let options = options.clone();
            let hits = Arc::clone(&handler_hits);
            thread::spawn(move || handle(stream, &options, &hits));
        }
    });

    SnippetServer {
        base_url: format!("http://127.0.0.1:{port}"),
        hits,
    }
}

fn handle(mut stream: TcpStream, options: &ServerOptions, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    // Requests are header-only GETs; one read is enough for tests.
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }
    hits.fetch_add(1, Ordering::SeqCst);

    if !options.delay.is_zero() {
        thread::sleep(options.delay);
    }

    let reason = match options.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        options.status,
        reason,
        options.body.len(),
        options.body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// A URL on which nothing listens; connecting to it is refused.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
