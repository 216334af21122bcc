use std::fmt;

use serde::Serialize;

use crate::error::{ClozeError, Result};

/// Outcome of comparing a solution with the expected answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HitReport {
	pub hits: usize,
	pub total: usize,
}

impl HitReport {
	/// Fraction of gaps filled with the expected word, in `[0, 1]`.
	pub fn rate(&self) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		self.hits as f64 / self.total as f64
	}
}

impl fmt::Display for HitReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{} ({:.2}%)", self.hits, self.total, self.rate() * 100.0)
	}
}

/// Compares `solution` with `reference` position by position.
///
/// Words must be exactly equal to count as a hit.
///
/// # Errors
/// - `EmptyReference` if there is nothing to compare with
/// - `LengthMismatch` if both sequences differ in length
pub fn evaluate<S, R>(solution: &[S], reference: &[R]) -> Result<HitReport>
where
	S: AsRef<str>,
	R: AsRef<str>,
{
	if reference.is_empty() {
		return Err(ClozeError::EmptyReference);
	}
	if solution.len() != reference.len() {
		return Err(ClozeError::LengthMismatch { solution: solution.len(), reference: reference.len() });
	}

	let hits = solution
		.iter()
		.zip(reference)
		.filter(|(produced, expected)| produced.as_ref() == expected.as_ref())
		.count();
	Ok(HitReport { hits, total: reference.len() })
}
