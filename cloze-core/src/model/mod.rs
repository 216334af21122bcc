//! Top-level module for the cloze solving engine.
//!
//! This module groups the whole pipeline, from raw text to chosen words:
//! - Text normalization (`tokenizer`)
//! - Gap detection and context extraction (`context`)
//! - Corpus scanning into a co-occurrence table (`cooccurrence`)
//! - Candidate scoring and assignment (`scorer`)
//! - A high-level entry point (`solver`)

/// Word tokenization shared by corpus and cloze text.
pub mod tokenizer;

/// Ordered, consumable pool of candidate words.
pub mod candidates;

/// Gap markers, gap contexts and the set of words tracked during a scan.
pub mod context;

/// Follower counts of a single tracked key.
///
/// Supports additive merging, used by parallel scans.
pub mod statistics;

/// Co-occurrence table and the sliding-window corpus scan that fills it.
///
/// Sequential and parallel construction produce identical tables.
pub mod cooccurrence;

/// On-disk snapshots of co-occurrence tables.
pub mod snapshot;

/// Smoothed bigram scoring and the assignment strategies.
pub mod scorer;

/// Runtime parameters of a solve (marker, strategy, workers).
pub mod options;

/// Hit rate of a solution against expected answers.
pub mod evaluation;

/// High-level solver: validation, table construction and assignment.
pub mod solver;
