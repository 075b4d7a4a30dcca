//! Structured comment parsing.
//!
//! Turns the raw body of a `/** ... */` block into a [`Doc`]. Each line is
//! stripped of its `*` continuation marker and trimmed, then matched
//! against the tag vocabulary. Tag order is irrelevant except for
//! `@example`, which consumes following lines as a literal block until the
//! next `@`-tag or the end of the comment. Unrecognized `@tag value` lines
//! land in the generic tag map; everything else accumulates as prose and
//! becomes the description.

use std::sync::LazyLock;

use regex::Regex;

use cdox_model::{AssetKind, AssetRef, Doc, DocParam, GroupDef, GroupRef, PageDef};

/// Leading `*` continuation marker on a docblock line.
static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s?").expect("invalid continuation regex"));

/// `@param [dir] name desc`, with an optional `[in]`/`[out]`/`[in, out]`
/// direction annotation that is recognized and skipped.
static PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@param\s+(?:\[\s*(?:in|out|in,\s*out)\s*\]\s+)?(\w+)\s+(.*)$")
        .expect("invalid param regex")
});

/// `@image <format> <src> [caption]`.
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@image\s+\w+\s+(\S+)(?:\s+(.*))?$").expect("invalid image regex"));

/// `@snippet <src> [label]`.
static SNIPPET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@snippet\s+(\S+)(?:\s+(.*))?$").expect("invalid snippet regex"));

/// `@defgroup <id> <title>`.
static DEFGROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@defgroup\s+(\S+)\s+(.*)$").expect("invalid defgroup regex"));

/// `@addtogroup <id> [title]`.
static ADDTOGROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@addtogroup\s+(\S+)(?:\s+(.*))?$").expect("invalid addtogroup regex")
});

/// `@ingroup <id>`.
static INGROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@ingroup\s+(\S+)$").expect("invalid ingroup regex"));

/// `@page <id> <title>`.
static PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@page\s+(\S+)\s+(.*)$").expect("invalid page regex"));

/// Generic `@tag value` fallback.
static GENERIC_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s*(.*)$").expect("invalid generic tag regex"));

/// Strip the tag keyword from the front of a line and trim the rest.
fn tag_rest<'a>(line: &'a str, tag: &str) -> &'a str {
    line[tag.len()..].trim()
}

/// Parse a raw docblock body into a [`Doc`].
#[must_use]
pub fn parse_docblock(raw: &str) -> Doc {
    let lines: Vec<String> = raw
        .split('\n')
        .map(|l| CONTINUATION.replace(l, "").trim().to_owned())
        .collect();

    let mut doc = Doc::default();
    let mut prose: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].as_str();

        if line.starts_with("@brief") {
            doc.brief = Some(tag_rest(line, "@brief").to_owned());
        } else if line.starts_with("@param") {
            if let Some(caps) = PARAM.captures(line) {
                doc.params.push(DocParam {
                    name: caps[1].to_owned(),
                    desc: caps[2].to_owned(),
                });
            }
        } else if line.starts_with("@returns") {
            doc.returns = Some(tag_rest(line, "@returns").to_owned());
        } else if line.starts_with("@return") {
            doc.returns = Some(tag_rest(line, "@return").to_owned());
        } else if line.starts_with("@error") {
            doc.errors.push(tag_rest(line, "@error").to_owned());
        } else if line.starts_with("@since") {
            doc.since = Some(tag_rest(line, "@since").to_owned());
        } else if line.starts_with("@deprecated") {
            doc.deprecated = Some(tag_rest(line, "@deprecated").to_owned());
        } else if line.starts_with("@note") {
            doc.notes.push(tag_rest(line, "@note").to_owned());
        } else if line.starts_with("@warning") {
            doc.warnings.push(tag_rest(line, "@warning").to_owned());
        } else if line.starts_with("@todo") {
            doc.todos.push(tag_rest(line, "@todo").to_owned());
        } else if line.starts_with("@bug") {
            doc.bugs.push(tag_rest(line, "@bug").to_owned());
        } else if line.starts_with("@see") {
            let target = tag_rest(line, "@see");
            if !target.is_empty() {
                doc.see.push(target.to_owned());
            }
        } else if line.starts_with("@example") {
            let mut block: Vec<&str> = Vec::new();
            while i + 1 < lines.len() && !lines[i + 1].starts_with('@') {
                i += 1;
                block.push(lines[i].as_str());
            }
            let text = block.join("\n").trim().to_owned();
            if !text.is_empty() {
                doc.example = Some(text);
            }
        } else if line.starts_with("@image") {
            if let Some(caps) = IMAGE.captures(line) {
                doc.assets.push(AssetRef {
                    kind: AssetKind::Image,
                    src: caps[1].to_owned(),
                    caption: caps.get(2).map(|m| m.as_str().trim().to_owned()),
                });
            }
        } else if line.starts_with("@include") {
            let src = tag_rest(line, "@include");
            if !src.is_empty() {
                doc.assets.push(AssetRef {
                    kind: AssetKind::Include,
                    src: src.to_owned(),
                    caption: None,
                });
            }
        } else if line.starts_with("@snippet") {
            if let Some(caps) = SNIPPET.captures(line) {
                doc.assets.push(AssetRef {
                    kind: AssetKind::Snippet,
                    src: caps[1].to_owned(),
                    caption: caps.get(2).map(|m| m.as_str().trim().to_owned()),
                });
            }
        } else if line.starts_with("@internal") {
            doc.internal = true;
        } else if line.starts_with("@copydoc") {
            let target = tag_rest(line, "@copydoc");
            if !target.is_empty() {
                doc.copydoc.push(target.to_owned());
            }
        } else if line.starts_with("@defgroup") {
            if let Some(caps) = DEFGROUP.captures(line) {
                doc.group_defs.push(GroupDef {
                    id: caps[1].to_owned(),
                    title: caps[2].to_owned(),
                });
            }
        } else if line.starts_with("@addtogroup") {
            if let Some(caps) = ADDTOGROUP.captures(line) {
                doc.group_add.push(GroupRef {
                    id: caps[1].to_owned(),
                    title: caps.get(2).map(|m| m.as_str().to_owned()),
                });
            }
        } else if line.starts_with("@ingroup") {
            if let Some(caps) = INGROUP.captures(line) {
                doc.group_in.push(GroupRef {
                    id: caps[1].to_owned(),
                    title: None,
                });
            }
        } else if line.starts_with("@page") {
            if let Some(caps) = PAGE.captures(line) {
                doc.page = Some(PageDef {
                    id: caps[1].to_owned(),
                    title: caps[2].to_owned(),
                });
            }
        } else if line.starts_with('@') {
            if let Some(caps) = GENERIC_TAG.captures(line) {
                let value = caps.get(2).map_or("", |m| m.as_str()).trim().to_owned();
                doc.push_tag(&caps[1], value);
            }
        } else if !line.is_empty() {
            prose.push(line);
        }

        i += 1;
    }

    let text = prose.join("\n").trim().to_owned();
    if !text.is_empty() {
        doc.description = Some(text);
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_brief_params_and_return() {
        let doc = parse_docblock(
            " * @brief Fetches a user profile.\n\
             * @param user_id The unique identifier.\n\
             * @param [out] buffer Output buffer.\n\
             * @return 0 on success.",
        );
        assert_eq!(doc.brief.as_deref(), Some("Fetches a user profile."));
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.params[0].name, "user_id");
        assert_eq!(doc.params[1].name, "buffer");
        assert_eq!(doc.params[1].desc, "Output buffer.");
        assert_eq!(doc.returns.as_deref(), Some("0 on success."));
    }

    #[test]
    fn test_returns_variant() {
        let doc = parse_docblock(" * @returns A handle.");
        assert_eq!(doc.returns.as_deref(), Some("A handle."));
    }

    #[test]
    fn test_prose_becomes_description() {
        let doc = parse_docblock(" * @brief Short.\n *\n * Longer text\n * over two lines.");
        assert_eq!(
            doc.description.as_deref(),
            Some("Longer text\nover two lines.")
        );
    }

    #[test]
    fn test_example_consumes_until_next_tag() {
        let doc = parse_docblock(
            " * @example\n * int x = add(1, 2);\n * use(x);\n * @note After the example.",
        );
        assert_eq!(doc.example.as_deref(), Some("int x = add(1, 2);\nuse(x);"));
        assert_eq!(doc.notes, vec!["After the example."]);
    }

    #[test]
    fn test_asset_tags() {
        let doc = parse_docblock(
            " * @image html topology.png Network topology\n\
             * @include setup.c\n\
             * @snippet demo.c init",
        );
        assert_eq!(doc.assets.len(), 3);
        assert_eq!(doc.assets[0].kind, AssetKind::Image);
        assert_eq!(doc.assets[0].src, "topology.png");
        assert_eq!(doc.assets[0].caption.as_deref(), Some("Network topology"));
        assert_eq!(doc.assets[1].kind, AssetKind::Include);
        assert_eq!(doc.assets[2].kind, AssetKind::Snippet);
        assert_eq!(doc.assets[2].caption.as_deref(), Some("init"));
    }

    #[test]
    fn test_group_and_page_directives() {
        let doc = parse_docblock(
            " * @defgroup net Networking\n\
             * @addtogroup net\n\
             * @ingroup core\n\
             * @page intro Getting Started",
        );
        assert_eq!(doc.group_defs[0].id, "net");
        assert_eq!(doc.group_defs[0].title, "Networking");
        assert_eq!(doc.group_add[0].id, "net");
        assert_eq!(doc.group_in[0].id, "core");
        let page = doc.page.expect("page directive");
        assert_eq!(page.id, "intro");
        assert_eq!(page.title, "Getting Started");
    }

    #[test]
    fn test_copydoc_and_internal() {
        let doc = parse_docblock(" * @copydoc target_fn\n * @internal");
        assert_eq!(doc.copydoc, vec!["target_fn"]);
        assert!(doc.internal);
    }

    #[test]
    fn test_unknown_tag_goes_to_generic_map() {
        let doc = parse_docblock(" * @author Jane Doe\n * @author John Roe");
        assert_eq!(doc.tags["author"], vec!["Jane Doe", "John Roe"]);
    }

    #[test]
    fn test_errors_notes_warnings_accumulate() {
        let doc = parse_docblock(
            " * @error EINVAL on bad input\n * @error ENOMEM on allocation failure\n\
             * @note First.\n * @warning Careful.\n * @todo Later.\n * @bug Known issue.\n\
             * @see other_fn\n * @since 1.2\n * @deprecated Use other_fn instead.",
        );
        assert_eq!(doc.errors.len(), 2);
        assert_eq!(doc.notes, vec!["First."]);
        assert_eq!(doc.warnings, vec!["Careful."]);
        assert_eq!(doc.todos, vec!["Later."]);
        assert_eq!(doc.bugs, vec!["Known issue."]);
        assert_eq!(doc.see, vec!["other_fn"]);
        assert_eq!(doc.since.as_deref(), Some("1.2"));
        assert_eq!(doc.deprecated.as_deref(), Some("Use other_fn instead."));
    }
}
