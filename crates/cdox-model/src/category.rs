//! Symbol categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a documented symbol.
///
/// The string form (see [`Category::as_str`]) is stable: it participates in
/// anchor keys persisted across runs and in symbol-index keys, so renaming a
/// variant's string form would invalidate existing anchor maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// File-level documentation block.
    File,
    /// Object-like macro (`#define MAX 100`).
    MacroConst,
    /// Function-like macro (`#define ADD(a, b) ...`).
    MacroFn,
    /// Plain typedef.
    Typedef,
    /// Typedef of a function-pointer type.
    CallbackTypedef,
    /// Enum with enumerator list.
    Enum,
    /// Struct with member list.
    Struct,
    /// Union with member list.
    Union,
    /// Function prototype or inline definition.
    Function,
    /// Documentation group declared via `@defgroup`.
    Group,
    /// Standalone page declared via `@page`.
    Page,
}

impl Category {
    /// Stable string form used in anchor keys and symbol keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::MacroConst => "macro-const",
            Self::MacroFn => "macro-fn",
            Self::Typedef => "typedef",
            Self::CallbackTypedef => "callback-typedef",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Function => "function",
            Self::Group => "group",
            Self::Page => "page",
        }
    }

    /// Parse the stable string form back into a category.
    #[must_use]
    pub fn from_str_form(s: &str) -> Option<Self> {
        Some(match s {
            "file" => Self::File,
            "macro-const" => Self::MacroConst,
            "macro-fn" => Self::MacroFn,
            "typedef" => Self::Typedef,
            "callback-typedef" => Self::CallbackTypedef,
            "enum" => Self::Enum,
            "struct" => Self::Struct,
            "union" => Self::Union,
            "function" => Self::Function,
            "group" => Self::Group,
            "page" => Self::Page,
            _ => return None,
        })
    }

    /// True for categories that appear in the per-header symbol listing.
    ///
    /// Groups and pages render on their own pages; the file block only
    /// carries file-level directives and never gets a section of its own.
    #[must_use]
    pub fn is_symbol(self) -> bool {
        !matches!(self, Self::File | Self::Group | Self::Page)
    }

    /// Human-readable heading used by the table of contents.
    #[must_use]
    pub fn toc_label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::MacroConst => "Macros (Constants)",
            Self::MacroFn => "Macros (Function-like)",
            Self::Typedef => "Typedefs",
            Self::CallbackTypedef => "Callback Typedefs",
            Self::Enum => "Enums",
            Self::Struct => "Structs",
            Self::Union => "Unions",
            Self::Function => "Functions",
            Self::Group => "Groups",
            Self::Page => "Pages",
        }
    }

    /// Display order of category groups in the table of contents.
    pub const TOC_ORDER: [Self; 9] = [
        Self::File,
        Self::MacroConst,
        Self::MacroFn,
        Self::Typedef,
        Self::CallbackTypedef,
        Self::Enum,
        Self::Struct,
        Self::Union,
        Self::Function,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_form_round_trips() {
        for cat in [
            Category::File,
            Category::MacroConst,
            Category::MacroFn,
            Category::Typedef,
            Category::CallbackTypedef,
            Category::Enum,
            Category::Struct,
            Category::Union,
            Category::Function,
            Category::Group,
            Category::Page,
        ] {
            assert_eq!(Category::from_str_form(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn test_from_str_form_rejects_unknown() {
        assert_eq!(Category::from_str_form("variable"), None);
    }

    #[test]
    fn test_symbol_categories() {
        assert!(Category::Function.is_symbol());
        assert!(Category::MacroConst.is_symbol());
        assert!(!Category::Group.is_symbol());
        assert!(!Category::Page.is_symbol());
        assert!(!Category::File.is_symbol());
    }
}
