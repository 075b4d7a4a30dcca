//! Anchor assignment.
//!
//! A fresh anchor is `slug(category-name)` plus a short digest of the full
//! key, so anchors are unique without global coordination and re-derivable
//! from the key alone. Existing assignments always win: an anchor, once
//! stored, is returned unchanged forever.

use sha2::{Digest, Sha256};

use crate::{AnchorKey, AnchorStore};

/// Hex digits of the key digest appended to fresh anchors.
const DIGEST_LEN: usize = 8;

/// Result of one anchor assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorAssignment {
    pub anchor: String,
    /// Set when the caller's proposed slug differs from the anchor that is
    /// now stored for the key; reported as a note, never silently swapped.
    pub drifted_from: Option<String>,
}

/// Lowercase a string and collapse every non-alphanumeric run into `-`.
#[must_use]
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Short hex digest of the serialized key.
fn key_digest(key: &AnchorKey) -> String {
    let digest = hex::encode(Sha256::digest(key.to_string().as_bytes()));
    digest[..DIGEST_LEN].to_owned()
}

/// Return the stored anchor for `key`, or reserve a fresh one.
///
/// `proposed` is the slug the caller derived from the symbol's current
/// category and name; when it no longer matches the stored anchor (the
/// symbol was renamed but the key still resolves), the old proposal is
/// returned in `drifted_from` so the caller can surface a note.
pub fn assign_anchor(
    store: &mut dyn AnchorStore,
    key: &AnchorKey,
    proposed: &str,
) -> AnchorAssignment {
    if let Some(existing) = store.lookup(key) {
        let anchor = existing.to_owned();
        // Drift compares the stored anchor's slug portion (everything
        // before the trailing digest) for equality; a prefix match would
        // miss renames like `net_connect2` -> `net_connect`.
        let stored_slug = anchor
            .rsplit_once('-')
            .map_or(anchor.as_str(), |(slug, _)| slug);
        let drifted_from = (stored_slug != proposed).then(|| proposed.to_owned());
        return AnchorAssignment {
            anchor,
            drifted_from,
        };
    }

    let fresh = format!("{proposed}-{}", key_digest(key));
    store.reserve(key.clone(), fresh.clone());
    AnchorAssignment {
        anchor: fresh,
        drifted_from: None,
    }
}
