//! Anchor lookup keys.

use std::fmt;

use cdox_model::Category;

/// Composite key identifying one symbol across runs.
///
/// The serialized form `<file>::<name>::<category>` is what the JSON store
/// persists, so it must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorKey {
    /// Header path relative to its input root.
    pub file_rel: String,
    /// Symbol name.
    pub name: String,
    pub category: Category,
}

impl AnchorKey {
    /// Build a key.
    #[must_use]
    pub fn new(file_rel: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            file_rel: file_rel.into(),
            name: name.into(),
            category,
        }
    }

    /// Parse the serialized `<file>::<name>::<category>` form.
    ///
    /// Splits on the last two `::` separators so file paths containing
    /// `::` (unlikely, but legal) still round-trip.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (rest, category) = s.rsplit_once("::")?;
        let (file_rel, name) = rest.rsplit_once("::")?;
        Some(Self {
            file_rel: file_rel.to_owned(),
            name: name.to_owned(),
            category: Category::from_str_form(category)?,
        })
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.file_rel, self.name, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse_round_trip() {
        let key = AnchorKey::new("net/http.h", "connect", Category::Function);
        assert_eq!(key.to_string(), "net/http.h::connect::function");
        assert_eq!(AnchorKey::parse(&key.to_string()), Some(key));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(AnchorKey::parse("no-separators"), None);
        assert_eq!(AnchorKey::parse("a::b::not-a-category"), None);
    }
}
