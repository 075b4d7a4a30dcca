//! Reference resolution, page rendering and link checking for cdox.
//!
//! Consumes the entries produced by `cdox-extract` after anchors have been
//! assigned, and turns them into output pages:
//!
//! - [`resolver`] - symbol index, `@copydoc` inheritance, `\ref` links
//! - [`assets`] - materializes referenced images/snippets into the shared
//!   assets directory
//! - [`page`] - per-header pages with TOC and sections, plus group and
//!   standalone pages
//! - [`linkcheck`] - validates every generated intra-doc link against the
//!   anchors actually produced
//!
//! Resolution and rendering are deliberately split: the resolver mutates
//! entry docs (text with links substituted), the renderer is a pure
//! function from entries to page text.

pub mod assets;
pub mod linkcheck;
pub mod page;
pub mod relpath;
pub mod resolver;

pub use assets::AssetCopier;
pub use linkcheck::{BrokenLink, check_links};
pub use page::{render_group_page, render_header_page, render_standalone_page};
pub use resolver::SymbolIndex;
