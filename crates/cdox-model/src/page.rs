//! Generated output pages.

use std::collections::BTreeSet;

/// A rendered documentation page.
///
/// Carries the output-relative path, the final page body, and the set of
/// anchors the page defines. The anchor set is what the link checker
/// validates link targets against after generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    /// Output-relative page path (e.g. `net/http.mdx`).
    pub path: String,
    /// Full page body, frontmatter included.
    pub body: String,
    /// Anchors defined by this page.
    pub anchors: BTreeSet<String>,
}

impl GeneratedPage {
    /// Create a page from its path, body and defined anchors.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        body: impl Into<String>,
        anchors: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            anchors: anchors.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_collects_anchor_set() {
        let page = GeneratedPage::new(
            "a.mdx",
            "body",
            ["x".to_owned(), "y".to_owned(), "x".to_owned()],
        );
        assert_eq!(page.anchors.len(), 2);
        assert!(page.anchors.contains("x"));
    }
}
