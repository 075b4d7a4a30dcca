//! Cross-page link validation.
//!
//! Scans every generated page for markdown-style links and verifies that
//! internal `.mdx` targets exist and that any fragment names an anchor the
//! target page defines. External schemes (`http:`, `https:`, `mailto:`) and
//! non-`.mdx` targets are ignored.

use std::collections::HashMap;
use std::sync::LazyLock;

use cdox_model::GeneratedPage;
use regex::Regex;
use tracing::debug;

static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*?\]\(([^)]+)\)").expect("invalid markdown link regex"));

/// One unresolved link found during the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    /// Page the link appears on.
    pub page: String,
    /// Link target as written.
    pub target: String,
    /// Why it failed to resolve.
    pub reason: String,
}

fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("mailto:")
}

/// Check every internal link across the given pages.
///
/// Returns the broken links in page order; an empty vector means the output
/// is self-consistent.
#[must_use]
pub fn check_links(pages: &[GeneratedPage]) -> Vec<BrokenLink> {
    let by_path: HashMap<&str, &GeneratedPage> =
        pages.iter().map(|p| (p.path.as_str(), p)).collect();
    let mut broken = Vec::new();

    for page in pages {
        for caps in MD_LINK.captures_iter(&page.body) {
            let Some(target) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if is_external(target) {
                continue;
            }
            if let Some(fragment) = target.strip_prefix('#') {
                // Same-page fragment.
                if !page.anchors.contains(fragment) {
                    broken.push(BrokenLink {
                        page: page.path.clone(),
                        target: target.to_owned(),
                        reason: "anchor not found".to_owned(),
                    });
                }
                continue;
            }

            let (path_part, fragment) = match target.split_once('#') {
                Some((p, f)) => (p, Some(f)),
                None => (target, None),
            };
            if !path_part.ends_with(".mdx") {
                continue;
            }
            let resolved = crate::relpath::join_normalize(&page.path, path_part);
            let Some(dest) = by_path.get(resolved.as_str()) else {
                broken.push(BrokenLink {
                    page: page.path.clone(),
                    target: target.to_owned(),
                    reason: "page not generated".to_owned(),
                });
                continue;
            };
            if let Some(fragment) = fragment {
                if !dest.anchors.contains(fragment) {
                    broken.push(BrokenLink {
                        page: page.path.clone(),
                        target: target.to_owned(),
                        reason: "anchor not found".to_owned(),
                    });
                }
            }
        }
    }

    debug!(pages = pages.len(), broken = broken.len(), "link check complete");
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(path: &str, body: &str, anchors: &[&str]) -> GeneratedPage {
        GeneratedPage::new(
            path,
            body,
            anchors.iter().map(|a| (*a).to_owned()),
        )
    }

    #[test]
    fn test_valid_cross_page_link() {
        let pages = [
            page("a/one.mdx", "[two](../b/two.mdx#fn-x)", &[]),
            page("b/two.mdx", "", &["fn-x"]),
        ];
        assert_eq!(check_links(&pages), Vec::new());
    }

    #[test]
    fn test_missing_page_is_reported() {
        let pages = [page("a.mdx", "[gone](missing.mdx)", &[])];
        let broken = check_links(&pages);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].page, "a.mdx");
        assert_eq!(broken[0].target, "missing.mdx");
        assert_eq!(broken[0].reason, "page not generated");
    }

    #[test]
    fn test_missing_anchor_is_reported() {
        let pages = [
            page("a.mdx", "[x](b.mdx#nope)", &[]),
            page("b.mdx", "", &["yep"]),
        ];
        let broken = check_links(&pages);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].reason, "anchor not found");
    }

    #[test]
    fn test_same_page_fragment() {
        let ok = [page("a.mdx", "[here](#top)", &["top"])];
        assert!(check_links(&ok).is_empty());
        let bad = [page("a.mdx", "[here](#gone)", &["top"])];
        assert_eq!(check_links(&bad).len(), 1);
    }

    #[test]
    fn test_external_and_non_mdx_targets_ignored() {
        let pages = [page(
            "a.mdx",
            "[site](https://example.com) [mail](mailto:x@y.z) [img](pic.png)",
            &[],
        )];
        assert!(check_links(&pages).is_empty());
    }

    #[test]
    fn test_link_fixed_after_page_added() {
        let before = [page("a.mdx", "[b](b.mdx)", &[])];
        assert_eq!(check_links(&before).len(), 1);
        let after = [
            page("a.mdx", "[b](b.mdx)", &[]),
            page("b.mdx", "", &[]),
        ];
        assert!(check_links(&after).is_empty());
    }
}
