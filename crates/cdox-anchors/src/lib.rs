//! Stable anchor repository for cdox.
//!
//! Every extracted symbol gets a durable anchor id that survives re-runs
//! and reordering. The mapping from [`AnchorKey`] (source-relative path,
//! symbol name, category) to anchor string is the only state cdox persists
//! across runs. This crate provides:
//!
//! - [`AnchorStore`] - the repository interface (`lookup`/`reserve`), so
//!   the storage medium is swappable without touching the assignment
//!   algorithm
//! - [`MemoryStore`] - in-memory store for tests and dry runs
//! - [`JsonFileStore`] - flat JSON file store used by the CLI
//! - [`assign_anchor`] - the assignment algorithm itself

mod assign;
mod key;
mod store;

pub use assign::{AnchorAssignment, assign_anchor, slug};
pub use key::AnchorKey;
pub use store::{AnchorStore, JsonFileStore, MemoryStore, StoreError};
