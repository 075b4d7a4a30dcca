//! Data model for the cdox header documentation extractor.
//!
//! This crate defines the types shared by extraction, anchor assignment,
//! reference resolution and rendering:
//!
//! - [`Category`] - the kind of a documented symbol
//! - [`Doc`] - a parsed documentation comment
//! - [`Entry`] - one recognized declaration (or group/page meta-construct)
//! - [`GeneratedPage`] - a rendered output page with its anchor set
//!
//! The model is deliberately free of I/O and parsing logic so that the
//! recognizer passes and the renderer can be tested against it in isolation.

mod category;
mod doc;
mod entry;
mod page;

pub use category::Category;
pub use doc::{AssetKind, AssetRef, Doc, DocParam, GroupDef, GroupRef, PageDef};
pub use entry::{Entry, EntryPayload, Enumerator, Member, SigParam, page_path};
pub use page::GeneratedPage;
