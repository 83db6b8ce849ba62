//! Snippet key parsing and language detection.
//!
//! A snippet key has the form `name@filename.ext`, or is a bare filename
//! when it contains no `@`. Splitting always takes the *first* `@`, so a
//! display name may itself contain `@`. The language tag comes from the
//! lowercased extension of the display name (the substring after its last
//! `.`), looked up in a static table; an unmapped or absent extension
//! yields [`DEFAULT_LANGUAGE`].
//!
//! Resolution is pure and infallible.

use crate::constants::DEFAULT_LANGUAGE;

/// Display name and language tag derived from a snippet key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    /// The filename segment of the key, shown as the snippet title.
    pub display_name: String,
    /// Language tag for the highlighting collaborator.
    pub language: &'static str,
}

/// Resolves a snippet key into its display name and language tag.
#[must_use]
pub fn resolve_key(key: &str) -> ResolvedKey {
    let display_name = match key.split_once('@') {
        Some((_, rest)) => rest,
        None => key,
    };
    let language = extension_of(display_name)
        .as_deref()
        .and_then(language_for_extension)
        .unwrap_or(DEFAULT_LANGUAGE);
    ResolvedKey {
        display_name: display_name.to_string(),
        language,
    }
}

/// Lowercased substring after the last `.`, or `None` when there is none.
fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Static file-extension → language-tag table.
///
/// Tags follow common highlighter naming. Lookup is case-insensitive via
/// [`extension_of`].
fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" => "python",
        "go" => "go",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "rb" => "ruby",
        "php" => "php",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" => "powershell",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" => "ini",
        "xml" => "xml",
        "md" | "markdown" => "markdown",
        "sql" => "sql",
        "hs" => "haskell",
        "ex" | "exs" => "elixir",
        "erl" => "erlang",
        "clj" => "clojure",
        "scala" => "scala",
        "lua" => "lua",
        "zig" => "zig",
        "dart" => "dart",
        "r" => "r",
        "pl" => "perl",
        "vue" => "vue",
        "diff" | "patch" => "diff",
        "txt" => "plaintext",
        _ => return None,
    };
    Some(language)
}
