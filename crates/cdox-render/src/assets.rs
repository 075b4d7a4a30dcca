//! Asset materialization.
//!
//! Docblocks reference images, includes and snippets by path. The copier
//! searches the owning header's directory first, then every configured
//! input root, and copies the first match into the shared assets directory
//! under a name prefixed with a short hash of the source's absolute path.
//! Repeated references to the same file converge on one stable destination
//! name across runs, so re-running never duplicates assets. Missing assets
//! are warnings, never fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use cdox_model::Entry;

/// Hex digits of the path hash prefixed to copied asset names.
const HASH_PREFIX_LEN: usize = 10;

/// Copies referenced assets into the output assets directory.
pub struct AssetCopier {
    input_roots: Vec<PathBuf>,
    assets_dir: PathBuf,
}

impl AssetCopier {
    /// Create a copier over the given input roots and destination.
    #[must_use]
    pub fn new(input_roots: Vec<PathBuf>, assets_dir: PathBuf) -> Self {
        Self {
            input_roots,
            assets_dir,
        }
    }

    /// Locate `src` relative to `header_dir` or any input root.
    fn locate(&self, src: &str, header_dir: &Path) -> Option<PathBuf> {
        let direct = header_dir.join(src);
        if direct.is_file() {
            return Some(direct);
        }
        self.input_roots
            .iter()
            .map(|root| root.join(src))
            .find(|p| p.is_file())
    }

    /// Destination name for a located asset: `<hash>-<basename>`.
    fn destination(&self, located: &Path) -> PathBuf {
        let abs = located
            .canonicalize()
            .unwrap_or_else(|_| located.to_path_buf());
        let digest = hex::encode(Sha256::digest(abs.to_string_lossy().as_bytes()));
        let base = located
            .file_name()
            .map_or_else(|| "asset".to_owned(), |n| n.to_string_lossy().into_owned());
        self.assets_dir
            .join(format!("{}-{base}", &digest[..HASH_PREFIX_LEN]))
    }

    /// Copy one asset, returning its destination path.
    fn copy_one(&self, located: &Path) -> io::Result<PathBuf> {
        let dest = self.destination(located);
        fs::create_dir_all(&self.assets_dir)?;
        fs::copy(located, &dest)?;
        Ok(dest)
    }

    /// Materialize every asset referenced by `entry`'s doc.
    ///
    /// Rewrites each asset's `src` to the copied destination; records a
    /// warning on the entry for any asset that cannot be found or copied.
    /// `header_dir` is the directory of the header the entry came from.
    pub fn copy_for_entry(&self, entry: &mut Entry, header_dir: &Path) {
        let mut warnings = Vec::new();
        for asset in &mut entry.doc.assets {
            let Some(located) = self.locate(&asset.src, header_dir) else {
                warnings.push(format!("asset not found: {}", asset.src));
                continue;
            };
            match self.copy_one(&located) {
                Ok(dest) => {
                    debug!(src = %asset.src, dest = %dest.display(), "asset copied");
                    asset.src = dest.to_string_lossy().replace('\\', "/");
                }
                Err(e) => {
                    warnings.push(format!("failed to copy asset {}: {e}", asset.src));
                }
            }
        }
        for w in warnings {
            entry.warn(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdox_model::{AssetKind, AssetRef, Category, Doc, EntryPayload};

    fn entry_with_asset(src: &str) -> Entry {
        let mut doc = Doc::default();
        doc.assets.push(AssetRef {
            kind: AssetKind::Image,
            src: src.to_owned(),
            caption: None,
        });
        Entry::new(
            Category::Function,
            "f",
            "a.h",
            true,
            doc,
            EntryPayload::None,
        )
    }

    #[test]
    fn test_copy_from_header_dir() {
        let dir = tempfile::tempdir().unwrap();
        let headers = dir.path().join("headers");
        fs::create_dir_all(&headers).unwrap();
        fs::write(headers.join("diagram.png"), b"png").unwrap();

        let copier = AssetCopier::new(vec![], dir.path().join("out/_assets"));
        let mut entry = entry_with_asset("diagram.png");
        copier.copy_for_entry(&mut entry, &headers);

        assert!(entry.warnings.is_empty());
        let copied = Path::new(&entry.doc.assets[0].src);
        assert!(copied.exists());
        let name = copied.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-diagram.png"));
        assert_eq!(name.len(), HASH_PREFIX_LEN + "-diagram.png".len());
    }

    #[test]
    fn test_fallback_to_input_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("shared")).unwrap();
        fs::write(root.join("shared/snippet.c"), b"code").unwrap();

        let copier = AssetCopier::new(vec![root], dir.path().join("_assets"));
        let mut entry = entry_with_asset("shared/snippet.c");
        copier.copy_for_entry(&mut entry, dir.path());

        assert!(entry.warnings.is_empty());
        assert!(Path::new(&entry.doc.assets[0].src).exists());
    }

    #[test]
    fn test_missing_asset_warns_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let copier = AssetCopier::new(vec![], dir.path().join("_assets"));
        let mut entry = entry_with_asset("ghost.png");
        copier.copy_for_entry(&mut entry, dir.path());

        assert_eq!(entry.warnings, vec!["asset not found: ghost.png"]);
        assert_eq!(entry.doc.assets[0].src, "ghost.png");
    }

    #[test]
    fn test_repeated_copy_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        let copier = AssetCopier::new(vec![], dir.path().join("_assets"));

        let mut first = entry_with_asset("a.png");
        copier.copy_for_entry(&mut first, dir.path());
        let mut second = entry_with_asset("a.png");
        copier.copy_for_entry(&mut second, dir.path());

        assert_eq!(first.doc.assets[0].src, second.doc.assets[0].src);
        let assets: Vec<_> = fs::read_dir(dir.path().join("_assets")).unwrap().collect();
        assert_eq!(assets.len(), 1);
    }
}
