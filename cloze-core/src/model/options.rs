use crate::error::{ClozeError, Result};
use super::context::GapMarker;
use super::scorer::Strategy;

/// Upper bound on corpus workers, well above any sensible CPU count.
pub const MAX_WORKERS: usize = 1024;

/// Runtime parameters of a solve.
///
/// # Responsibilities
/// - Hold the gap marker shared by key seeding and context extraction
/// - Select the assignment strategy
/// - Tell how many threads scan the corpus
///
/// # Invariants
/// - `gap_marker` is a valid marker
/// - `workers` is at most [`MAX_WORKERS`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveOptions {
	gap_marker: GapMarker,

	/// Assignment strategy; greedy unless asked otherwise.
	pub strategy: Strategy,

	/// Corpus scan threads: `1` streams the corpus sequentially, `0` uses one
	/// thread per CPU.
	workers: usize,
}

impl Default for SolveOptions {
	fn default() -> Self {
		Self { gap_marker: GapMarker::default(), strategy: Strategy::Greedy, workers: 1 }
	}
}

impl SolveOptions {
	pub fn gap_marker(&self) -> &GapMarker {
		&self.gap_marker
	}

	/// Sets the gap marker.
	///
	/// # Errors
	/// Returns an error if the marker is invalid (see [`GapMarker::new`]).
	pub fn set_gap_marker(&mut self, marker: &str) -> Result<()> {
		self.gap_marker = GapMarker::new(marker)?;
		Ok(())
	}

	pub fn workers(&self) -> usize {
		self.workers
	}

	/// Number of threads actually used, with `0` resolved to the CPU count.
	pub fn effective_workers(&self) -> usize {
		if self.workers == 0 { num_cpus::get() } else { self.workers }
	}

	/// Sets the number of corpus workers.
	///
	/// # Errors
	/// Returns an error if the value exceeds [`MAX_WORKERS`].
	pub fn set_workers(&mut self, workers: usize) -> Result<()> {
		if workers > MAX_WORKERS {
			return Err(ClozeError::InvalidWorkers(format!("{workers} exceeds {MAX_WORKERS}")));
		}
		self.workers = workers;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_reference_behaviour() {
		let options = SolveOptions::default();
		assert_eq!(options.gap_marker().as_str(), "___");
		assert_eq!(options.strategy, Strategy::Greedy);
		assert_eq!(options.workers(), 1);
		assert_eq!(options.effective_workers(), 1);
	}

	#[test]
	fn setters_validate() {
		let mut options = SolveOptions::default();
		assert!(options.set_gap_marker("").is_err());
		assert_eq!(options.gap_marker().as_str(), "___");
		options.set_gap_marker("<gap>").unwrap();
		assert_eq!(options.gap_marker().as_str(), "<gap>");

		assert!(options.set_workers(MAX_WORKERS + 1).is_err());
		options.set_workers(0).unwrap();
		assert!(options.effective_workers() >= 1);
	}
}
