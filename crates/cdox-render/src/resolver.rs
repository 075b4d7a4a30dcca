//! Symbol index and cross-reference resolution.
//!
//! Two independent directive types are resolved against the global symbol
//! index once every file's extraction is complete:
//!
//! - `@copydoc target` fills missing brief/description/params/returns/
//!   example on the referencing entry from the target's doc and merges
//!   see-also lists; a missing target leaves a warning on the entry.
//! - `\ref SYMBOL` occurrences inside brief, description and returns text
//!   become relative markdown links to the target's section; unresolved
//!   references degrade to inline code rather than a broken link.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use cdox_model::{Category, Entry};

use crate::relpath::relative_to;

/// `\ref name` or `\ref category:name`.
static REF_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\ref\s+([A-Za-z_]\w*(?::[a-z-]+)?)\b").expect("invalid ref regex")
});

/// Categories probed, in order, for a bare `@copydoc` target.
const COPYDOC_PROBES: [Category; 4] = [
    Category::Function,
    Category::Typedef,
    Category::MacroFn,
    Category::MacroConst,
];

/// Categories probed, in order, for a bare `\ref` target.
const REF_PROBES: [Category; 7] = [
    Category::Function,
    Category::Typedef,
    Category::MacroFn,
    Category::MacroConst,
    Category::Enum,
    Category::Struct,
    Category::Union,
];

/// Lookup from `(category, name)` to the first-seen entry with that
/// identity. Used only for cross-reference resolution; extraction dedup is
/// the extraction context's job.
pub struct SymbolIndex {
    map: HashMap<(Category, String), usize>,
}

impl SymbolIndex {
    /// Build the index over `entries`; first seen wins.
    #[must_use]
    pub fn build(entries: &[Entry]) -> Self {
        let mut map = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            map.entry((entry.category, entry.name.clone())).or_insert(i);
        }
        Self { map }
    }

    /// Index of the entry for `(category, name)`.
    #[must_use]
    pub fn get(&self, category: Category, name: &str) -> Option<usize> {
        self.map.get(&(category, name.to_owned())).copied()
    }

    /// Resolve a directive target: an explicit `category:name` key, or a
    /// bare name probed through `probes` in order.
    fn probe(&self, target: &str, probes: &[Category]) -> Option<usize> {
        if let Some((cat, name)) = target.split_once(':') {
            let category = Category::from_str_form(cat)?;
            return self.get(category, name);
        }
        probes.iter().find_map(|&cat| self.get(cat, target))
    }
}

/// Fields inherited through `@copydoc`, cloned out of the target so the
/// borrow on the entry slice can end before mutation starts.
struct Inherited {
    brief: Option<String>,
    description: Option<String>,
    params: Vec<cdox_model::DocParam>,
    returns: Option<String>,
    example: Option<String>,
    see: Vec<String>,
}

/// Resolve `@copydoc` directives and `\ref` tags across all entries.
///
/// Must run after every file's extraction is complete, so the index covers
/// the whole input set.
pub fn resolve_references(entries: &mut [Entry], index: &SymbolIndex) {
    for i in 0..entries.len() {
        resolve_copydoc(entries, index, i);
        resolve_ref_tags(entries, index, i);
    }
}

fn resolve_copydoc(entries: &mut [Entry], index: &SymbolIndex, i: usize) {
    let targets = std::mem::take(&mut entries[i].doc.copydoc);
    for target in &targets {
        let found = index
            .probe(target, &COPYDOC_PROBES)
            .filter(|&j| j != i)
            .map(|j| {
                let doc = &entries[j].doc;
                Inherited {
                    brief: doc.brief.clone(),
                    description: doc.description.clone(),
                    params: doc.params.clone(),
                    returns: doc.returns.clone(),
                    example: doc.example.clone(),
                    see: doc.see.clone(),
                }
            });

        let entry = &mut entries[i];
        match found {
            Some(inherited) => {
                let doc = &mut entry.doc;
                if doc.brief.is_none() {
                    doc.brief = inherited.brief;
                }
                if doc.description.is_none() {
                    doc.description = inherited.description;
                }
                if doc.params.is_empty() {
                    doc.params = inherited.params;
                }
                if doc.returns.is_none() {
                    doc.returns = inherited.returns;
                }
                if doc.example.is_none() {
                    doc.example = inherited.example;
                }
                for see in inherited.see {
                    if !doc.see.contains(&see) {
                        doc.see.push(see);
                    }
                }
                debug!(entry = %entry.name, target = %target, "copydoc resolved");
            }
            None => entry.warn(format!("@copydoc target not found: {target}")),
        }
    }
    entries[i].doc.copydoc = targets;
}

fn resolve_ref_tags(entries: &mut [Entry], index: &SymbolIndex, i: usize) {
    let substitute = |text: &str| -> String {
        REF_TAG
            .replace_all(text, |caps: &Captures<'_>| {
                let target = &caps[1];
                match index.probe(target, &REF_PROBES) {
                    Some(j) => {
                        let to = &entries[j];
                        let rel = relative_to(&entries[i].page_rel(), &to.page_rel());
                        format!("[`{}`]({rel}#{})", to.name, to.anchor)
                    }
                    None => format!("`{target}`"),
                }
            })
            .into_owned()
    };

    let doc = &entries[i].doc;
    let brief = doc.brief.as_deref().map(&substitute);
    let description = doc.description.as_deref().map(&substitute);
    let returns = doc.returns.as_deref().map(&substitute);

    let doc = &mut entries[i].doc;
    doc.brief = brief;
    doc.description = description;
    doc.returns = returns;
}
