//! Statistical cloze solver.
//!
//! This crate fills the gaps of a cloze text with words from a candidate
//! list, using word adjacency counts harvested from a reference corpus:
//! - Only the words around the gaps and the candidates are tracked
//! - The corpus is scanned once with a small sliding window
//! - Each gap is scored with smoothed left/right bigram probabilities
//! - Candidates are assigned greedily in text order (or optimally on demand)
//!
//! File loading is kept internal; callers go through `SolveConfig` or pass
//! text and corpus lines directly.

/// Cloze engine: tokenizer, context extraction, table, scoring, solver.
pub mod model;

/// JSON configuration file.
pub mod config;

/// Error type shared by the whole crate.
pub mod error;

/// File reading helpers.
///
/// Not exposed
pub(crate) mod io;

pub use error::{ClozeError, Result};
