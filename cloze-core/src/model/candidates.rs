use std::collections::HashSet;

use crate::error::{ClozeError, Result};
use super::tokenizer::normalize_word;

/// The pool of words that may fill gaps.
///
/// Candidates keep the order they were given in: that order decides ties
/// during assignment. Every candidate fills at most one gap and is removed
/// for good once it does.
///
/// # Invariants
/// - Entries are normalized tokens
/// - Entries are distinct
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet {
	words: Vec<String>,
}

impl CandidateSet {
	/// Builds a candidate set from raw words (typically the lines of a file).
	///
	/// Each word is normalized like corpus text; blank entries are skipped.
	///
	/// # Errors
	/// - `NoCandidates` if nothing is left after normalization
	/// - `DuplicateCandidate` if two entries normalize to the same token
	/// - `InvalidCandidate` for an entry holding several words, which could
	///   never match a single corpus token
	pub fn new<I, S>(words: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut seen = HashSet::new();
		let mut normalized = Vec::new();
		for word in words {
			let raw = word.as_ref();
			if raw.trim().is_empty() {
				continue;
			}
			let Some(token) = normalize_word(raw) else {
				return Err(ClozeError::InvalidCandidate(raw.trim().to_owned()));
			};
			if !seen.insert(token.clone()) {
				return Err(ClozeError::DuplicateCandidate(token));
			}
			normalized.push(token);
		}

		if normalized.is_empty() {
			return Err(ClozeError::NoCandidates);
		}
		Ok(Self { words: normalized })
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	pub fn contains(&self, word: &str) -> bool {
		self.words.iter().any(|w| w == word)
	}

	/// Remaining candidates, in pool order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.words.iter().map(String::as_str)
	}

	/// Removes and returns the candidate at `position`, keeping the order of
	/// the others.
	///
	/// Returns `None` if `position` is out of range.
	pub fn take(&mut self, position: usize) -> Option<String> {
		(position < self.words.len()).then(|| self.words.remove(position))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_and_skips_blank_lines() {
		let set = CandidateSet::new(["Dog", "", "  cat ", "car,"]).unwrap();
		assert_eq!(set.iter().collect::<Vec<_>>(), vec!["dog", "cat", "car"]);
	}

	#[test]
	fn rejects_empty_lists() {
		assert!(matches!(CandidateSet::new(Vec::<String>::new()), Err(ClozeError::NoCandidates)));
		assert!(matches!(CandidateSet::new(["", " "]), Err(ClozeError::NoCandidates)));
	}

	#[test]
	fn rejects_duplicates_after_normalization() {
		match CandidateSet::new(["dog", "DOG"]) {
			Err(ClozeError::DuplicateCandidate(word)) => assert_eq!(word, "dog"),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn rejects_multi_word_entries() {
		assert!(matches!(CandidateSet::new(["hot dog"]), Err(ClozeError::InvalidCandidate(_))));
	}

	#[test]
	fn take_preserves_order() {
		let mut set = CandidateSet::new(["a", "b", "c"]).unwrap();
		assert_eq!(set.take(1).as_deref(), Some("b"));
		assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "c"]);
		assert_eq!(set.take(5), None);
		assert!(!set.contains("b"));
		assert_eq!(set.len(), 2);
	}
}
