use std::collections::{HashMap, VecDeque};
use std::sync::mpsc;
use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ClozeError, Result};
use super::context::TrackedTerms;
use super::statistics::KeyStatistics;
use super::tokenizer::tokenize;

/// Maximum number of corpus tokens held by the scan window.
pub const WINDOW_SIZE: usize = 3;

/// Sliding window over the corpus token stream.
///
/// The window and the line-overflow flag survive from one line to the next.
/// Every window token is paired with the token that follows the *window*
/// on the current line. When a line runs out of tokens the flag is raised;
/// the next non-empty line then only refills the window (nothing is counted)
/// and the rest of it is skipped. As a consequence no pair is ever counted
/// across a line break, and lines following a fully scanned line contribute
/// at most one token to the window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowScanner {
	window: VecDeque<String>,
	line_overflow: bool,
}

impl WindowScanner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds one tokenized line, calling `on_pair(window_token, follower)`
	/// for every pair eligible for counting.
	///
	/// `on_pair` decides what to keep; passing a no-op closure only moves the
	/// window forward, which is how chunk entry states are computed.
	pub fn advance<F>(&mut self, tokens: &[String], mut on_pair: F)
	where
		F: FnMut(&str, &str),
	{
		let mut next = 0;
		while next < tokens.len() {
			if self.window.len() < WINDOW_SIZE {
				self.window.push_back(tokens[next].clone());
				next += 1;
				if next == tokens.len() {
					self.line_overflow = true;
					continue;
				}
			}

			if !self.line_overflow {
				let follower = tokens[next].as_str();
				for token in &self.window {
					on_pair(token, follower);
				}
			}
			self.window.pop_front();

			if self.line_overflow {
				self.line_overflow = false;
				break;
			}
		}
	}
}

/// Incremental construction of a [`CooccurrenceTable`], one corpus line at a
/// time.
pub struct TableBuilder<'a> {
	terms: &'a TrackedTerms,
	table: CooccurrenceTable,
	scanner: WindowScanner,
	lines: usize,
}

impl<'a> TableBuilder<'a> {
	/// Starts a scan at the beginning of the corpus.
	pub fn new(terms: &'a TrackedTerms) -> Self {
		Self::resume(terms, WindowScanner::new())
	}

	/// Starts a scan from an arbitrary window state, with an empty table.
	pub fn resume(terms: &'a TrackedTerms, scanner: WindowScanner) -> Self {
		Self { terms, table: CooccurrenceTable::seeded(terms), scanner, lines: 0 }
	}

	pub fn push_line(&mut self, line: &str) {
		let tokens = tokenize(line);
		let terms = self.terms;
		let table = &mut self.table;
		self.scanner.advance(&tokens, |key, follower| {
			if terms.admits(key, follower) {
				table.record(key, follower);
			}
		});
		self.lines += 1;
	}

	/// Number of lines pushed so far.
	pub fn lines(&self) -> usize {
		self.lines
	}

	pub fn finish(self) -> CooccurrenceTable {
		self.table
	}
}

/// Follower statistics for every tracked key of one cloze.
///
/// # Lifecycle
/// - seeded with an empty entry per candidate and per prefix word
/// - filled by a single scan of the corpus
/// - read-only afterwards
///
/// # Invariants
/// - Keys are never added by the scan; only seeded keys carry counts
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CooccurrenceTable {
	entries: HashMap<String, KeyStatistics>,
}

impl CooccurrenceTable {
	/// Creates a table with an empty entry for every tracked key.
	pub fn seeded(terms: &TrackedTerms) -> Self {
		let entries = terms
			.keys()
			.map(|key| (key.to_owned(), KeyStatistics::new(key)))
			.collect();
		Self { entries }
	}

	/// Scans corpus lines sequentially.
	pub fn build<I, S>(lines: I, terms: &TrackedTerms) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut builder = TableBuilder::new(terms);
		for line in lines {
			builder.push_line(line.as_ref());
		}
		builder.finish()
	}

	/// Scans corpus lines on several threads.
	///
	/// # Parameters
	/// - `workers`: number of chunks scanned concurrently; `0` means one per
	///   CPU.
	///
	/// # Behavior
	/// - Splits the lines into contiguous chunks.
	/// - Replays the window alone (no counting) to find the state the
	///   sequential scan has when entering each chunk.
	/// - Scans every chunk from that state on a scoped thread.
	/// - Collects partial tables over a channel and sums them.
	///
	/// The result is identical to [`CooccurrenceTable::build`].
	///
	/// # Errors
	/// Returns `Worker` if a chunk scan panicked.
	pub fn build_parallel(lines: &[String], terms: &TrackedTerms, workers: usize) -> Result<Self> {
		let workers = if workers == 0 { num_cpus::get() } else { workers };
		if workers <= 1 || lines.len() < workers {
			return Ok(Self::build(lines, terms));
		}

		let chunk_size = lines.len().div_ceil(workers);
		let chunks: Vec<&[String]> = lines.chunks(chunk_size).collect();

		let mut scanner = WindowScanner::new();
		let mut entry_states = Vec::with_capacity(chunks.len());
		for (index, chunk) in chunks.iter().enumerate() {
			entry_states.push(scanner.clone());
			if index + 1 < chunks.len() {
				for line in chunk.iter() {
					scanner.advance(&tokenize(line), |_, _| {});
				}
			}
		}
		debug!("scanning {} lines in {} chunks of {}", lines.len(), chunks.len(), chunk_size);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| -> Result<Self> {
			let handles: Vec<_> = chunks
				.iter()
				.zip(entry_states)
				.map(|(chunk, scanner)| {
					let tx = tx.clone();
					scope.spawn(move || {
						let mut builder = TableBuilder::resume(terms, scanner);
						for line in chunk.iter() {
							builder.push_line(line);
						}
						// Fails only once the receiver gave up after a merge error.
						let _ = tx.send(builder.finish());
					})
				})
				.collect();
			drop(tx);

			let mut table = Self::seeded(terms);
			for partial in rx.iter() {
				table.merge(&partial)?;
			}

			for handle in handles {
				handle
					.join()
					.map_err(|_| ClozeError::Worker("corpus chunk scan panicked".to_owned()))?;
			}
			Ok(table)
		})
	}

	/// Counts `key → follower` if `key` was seeded.
	pub(crate) fn record(&mut self, key: &str, follower: &str) {
		if let Some(stats) = self.entries.get_mut(key) {
			stats.add_transition(follower);
		}
	}

	pub fn get(&self, key: &str) -> Option<&KeyStatistics> {
		self.entries.get(key)
	}

	/// Same as [`CooccurrenceTable::get`], failing on unknown keys.
	///
	/// # Errors
	/// Returns `UnknownKey` if `key` was never seeded.
	pub fn statistics(&self, key: &str) -> Result<&KeyStatistics> {
		self.entries
			.get(key)
			.ok_or_else(|| ClozeError::UnknownKey(key.to_owned()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Total number of transitions counted over all keys.
	pub fn transitions(&self) -> u64 {
		self.entries.values().map(KeyStatistics::total).sum()
	}

	/// Merges another table into this one.
	///
	/// # Notes
	/// - Counts of keys present in both tables are summed.
	/// - Keys only present in `other` are cloned in.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		for (key, stats) in &other.entries {
			if let Some(existing) = self.entries.get_mut(key) {
				existing.merge(stats)?;
			} else {
				self.entries.insert(key.clone(), stats.clone());
			}
		}
		Ok(())
	}
}
