//! Forward-slash relative path arithmetic.
//!
//! Page paths are plain `/`-separated strings relative to an output root;
//! link computation and link checking need relative paths and
//! normalization over those strings, independent of the host platform's
//! path type.

/// Relative path from the directory containing `from` to `to`.
///
/// Both arguments are `/`-separated paths relative to the same root.
#[must_use]
pub fn relative_to(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_parts: Vec<&str> = to.split('/').collect();

    let common = from_dir
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..from_dir.len() {
        parts.push("..");
    }
    parts.extend(&to_parts[common..]);
    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

/// Resolve `rel` against the directory containing `base`, collapsing `.`
/// and `..` segments.
#[must_use]
pub fn join_normalize(base: &str, rel: &str) -> String {
    let mut stack: Vec<&str> = match base.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_same_dir() {
        assert_eq!(relative_to("a/b.mdx", "a/c.mdx"), "c.mdx");
        assert_eq!(relative_to("b.mdx", "c.mdx"), "c.mdx");
    }

    #[test]
    fn test_relative_up_and_down() {
        assert_eq!(relative_to("net/http.mdx", "util/str.mdx"), "../util/str.mdx");
        assert_eq!(relative_to("a.mdx", "net/http.mdx"), "net/http.mdx");
        assert_eq!(relative_to("net/http.mdx", "index.mdx"), "../index.mdx");
    }

    #[test]
    fn test_join_normalize() {
        assert_eq!(join_normalize("net/http.mdx", "../util/str.mdx"), "util/str.mdx");
        assert_eq!(join_normalize("net/http.mdx", "ws.mdx"), "net/ws.mdx");
        assert_eq!(join_normalize("a.mdx", "b.mdx"), "b.mdx");
        assert_eq!(join_normalize("a.mdx", "./b.mdx"), "b.mdx");
    }
}
