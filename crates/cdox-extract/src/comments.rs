//! Comment stripping and signature cleaning.
//!
//! Two independent transforms: full comment removal producing the buffer
//! every structural pass matches against, and per-declaration signature
//! cleaning producing the single-line text shown to readers. Angle-bracket
//! escaping is a render-time concern and never happens here.

use std::sync::LazyLock;

use regex::Regex;

/// `/* ... */`, non-greedy, across lines.
static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("invalid block comment regex"));

/// `// ...` to end of line.
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)//.*$").expect("invalid line comment regex"));

/// Collapses whitespace runs when cleaning signatures.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

/// First identifier followed by `(`; the function name in a prototype.
static FN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*)\s*\(").expect("invalid fn name regex"));

/// Remove block comments.
#[must_use]
pub fn strip_block_comments(s: &str) -> String {
    BLOCK_COMMENT.replace_all(s, "").into_owned()
}

/// Remove line comments.
#[must_use]
pub fn strip_line_comments(s: &str) -> String {
    LINE_COMMENT.replace_all(s, "").into_owned()
}

/// Remove all comments; block comments first so `//` inside them is gone
/// before line stripping runs.
#[must_use]
pub fn strip_comments(s: &str) -> String {
    strip_line_comments(&strip_block_comments(s))
}

/// Clean a declaration for display: drop embedded comments, collapse
/// whitespace to single spaces, trim.
#[must_use]
pub fn clean_signature(sig: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&strip_comments(sig), " ")
        .trim()
        .to_owned()
}

/// Extract the function name from a cleaned prototype, if present.
#[must_use]
pub fn function_name(signature: &str) -> Option<&str> {
    FN_NAME
        .captures(signature)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_block_comments_across_lines() {
        assert_eq!(strip_comments("int a; /* x\n y */ int b;"), "int a;  int b;");
    }

    #[test]
    fn test_strip_line_comments() {
        assert_eq!(strip_comments("int a; // trailing\nint b;"), "int a; \nint b;");
    }

    #[test]
    fn test_line_comment_inside_block_comment() {
        assert_eq!(strip_comments("/* has // inside */int a;"), "int a;");
    }

    #[test]
    fn test_clean_signature_collapses_whitespace() {
        let sig = "int   connect(\n    const char *host, /* remote */\n    int port);";
        assert_eq!(
            clean_signature(sig),
            "int connect( const char *host, int port);"
        );
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("int connect(const char *host);"), Some("connect"));
        assert_eq!(function_name("int x;"), None);
    }
}
