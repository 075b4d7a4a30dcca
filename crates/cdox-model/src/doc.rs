//! Parsed documentation comments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A documented function or macro parameter (`@param name desc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocParam {
    pub name: String,
    pub desc: String,
}

/// Kind of an asset referenced from a docblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// `@image <format> <src> [caption]`
    Image,
    /// `@include <src>`
    Include,
    /// `@snippet <src> [label]`
    Snippet,
}

/// An asset referenced from a docblock.
///
/// `src` starts out as the path written in the comment; the asset copier
/// rewrites it to the materialized destination once the file is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub src: String,
    /// Image alt text or snippet label.
    pub caption: Option<String>,
}

/// A group definition (`@defgroup id title`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    pub id: String,
    pub title: String,
}

/// A group reference (`@addtogroup id [title]` / `@ingroup id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    pub title: Option<String>,
}

/// A standalone page declaration (`@page id title`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDef {
    pub id: String,
    pub title: String,
}

/// A parsed documentation comment.
///
/// Owned exclusively by the [`Entry`](crate::Entry) it documents. All list
/// fields preserve encounter order; the generic tag map is sorted by tag
/// name since tag order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doc {
    pub brief: Option<String>,
    pub description: Option<String>,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
    pub errors: Vec<String>,
    pub since: Option<String>,
    pub deprecated: Option<String>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub todos: Vec<String>,
    pub bugs: Vec<String>,
    /// `@see` targets, kept as written (symbol names or free text).
    pub see: Vec<String>,
    /// Literal example block from `@example`.
    pub example: Option<String>,
    pub assets: Vec<AssetRef>,
    /// Unrecognized `@tag value` occurrences, keyed by tag name.
    pub tags: BTreeMap<String, Vec<String>>,
    /// `@copydoc` targets awaiting resolution against the symbol index.
    pub copydoc: Vec<String>,
    pub group_defs: Vec<GroupDef>,
    pub group_add: Vec<GroupRef>,
    pub group_in: Vec<GroupRef>,
    pub page: Option<PageDef>,
    /// Set by `@internal`.
    pub internal: bool,
}

impl Doc {
    /// True when the docblock carries no content at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record a generic `@tag value` occurrence.
    pub fn push_tag(&mut self, tag: &str, value: String) {
        self.tags.entry(tag.to_owned()).or_default().push(value);
    }
}
