//! Extracted declaration entries.

use serde::{Deserialize, Serialize};

use crate::{Category, Doc};

/// A parameter parsed out of a function or macro signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigParam {
    pub name: String,
    /// Declared type text; `"macro-param"` for macro arguments.
    pub ty: String,
}

/// One enumerator of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    /// Raw value text after `=`, if any. Never evaluated.
    pub value: Option<String>,
}

/// One member of a struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub ty: String,
}

/// Category-specific data carried by an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPayload {
    /// File blocks, groups: no extra data.
    None,
    Function {
        /// Cleaned, single-line prototype ending in `;`.
        signature: String,
        params: Vec<SigParam>,
    },
    MacroConst {
        value: Option<String>,
    },
    MacroFn {
        /// `NAME(args)` plus the macro body as a trailing comment.
        signature: String,
        params: Vec<SigParam>,
    },
    Typedef {
        /// Full `typedef ...` text without the trailing semicolon.
        definition: String,
    },
    Enum {
        enumerators: Vec<Enumerator>,
    },
    Aggregate {
        members: Vec<Member>,
    },
    Page {
        page_id: String,
        page_title: String,
    },
}

/// One recognized declaration (or group/page meta-construct) together with
/// its documentation and stable anchor.
///
/// Within one source file, `(name, category)` is unique: the extraction
/// context drops later duplicate discoveries instead of overwriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub category: Category,
    pub name: String,
    /// Stable anchor id; empty until the anchor manager assigns one.
    pub anchor: String,
    /// Path of the defining header, relative to its input root.
    pub file_rel: String,
    /// False for declarations emitted without an attached docblock.
    pub from_docblock: bool,
    pub doc: Doc,
    pub payload: EntryPayload,
    /// Warnings accumulated during extraction and resolution.
    pub warnings: Vec<String>,
}

impl Entry {
    /// Create an entry with an unassigned anchor and empty warning list.
    #[must_use]
    pub fn new(
        category: Category,
        name: impl Into<String>,
        file_rel: impl Into<String>,
        from_docblock: bool,
        doc: Doc,
        payload: EntryPayload,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            anchor: String::new(),
            file_rel: file_rel.into(),
            from_docblock,
            doc,
            payload,
            warnings: Vec::new(),
        }
    }

    /// Record a warning against this entry.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Output page path for the header this entry came from.
    ///
    /// `net/http.h` maps to `net/http.mdx`; paths without a `.h` suffix are
    /// returned with `.mdx` appended so the result is always a page path.
    #[must_use]
    pub fn page_rel(&self) -> String {
        page_path(&self.file_rel)
    }
}

/// Map a header-relative path to its generated page path.
#[must_use]
pub fn page_path(file_rel: &str) -> String {
    let stem = file_rel
        .strip_suffix(".h")
        .or_else(|| file_rel.strip_suffix(".H"))
        .unwrap_or(file_rel);
    format!("{stem}.mdx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path_replaces_extension() {
        assert_eq!(page_path("net/http.h"), "net/http.mdx");
        assert_eq!(page_path("users.H"), "users.mdx");
    }

    #[test]
    fn test_page_path_without_header_suffix() {
        assert_eq!(page_path("notes.page.intro"), "notes.page.intro.mdx");
    }

    #[test]
    fn test_new_entry_has_no_anchor() {
        let e = Entry::new(
            Category::Function,
            "connect",
            "net/http.h",
            true,
            Doc::default(),
            EntryPayload::Function {
                signature: "int connect(void);".to_owned(),
                params: Vec::new(),
            },
        );
        assert!(e.anchor.is_empty());
        assert!(e.warnings.is_empty());
        assert_eq!(e.page_rel(), "net/http.mdx");
    }
}
