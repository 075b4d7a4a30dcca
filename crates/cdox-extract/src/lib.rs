//! Header scanning and declaration recognition for cdox.
//!
//! This crate turns raw C header text into [`Entry`](cdox_model::Entry)
//! values. The work is split into:
//!
//! - [`preprocess`] - conditional-compilation filtering against a flag set
//! - [`comments`] - comment stripping and signature cleaning
//! - [`docblock`] - structured comment parsing into a [`Doc`](cdox_model::Doc)
//! - [`passes`] - ordered declaration recognizer passes behind the
//!   [`Pass`] trait, threading explicit dedup state
//!
//! Recognition is a best-effort structural scan built on regular
//! expressions, not a C front end: declarations the patterns miss are
//! silently absent. The [`Pass`] seam keeps the regex recognizers
//! swappable for a real tokenizer without touching the model, renderer or
//! resolver.

pub mod comments;
pub mod docblock;
pub mod passes;
pub mod preprocess;

pub use passes::{ExtractContext, Pass, SourceView, extract_entries, group_and_page_entries};
pub use preprocess::apply_defines;
