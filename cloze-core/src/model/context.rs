use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClozeError, Result};
use super::candidates::CandidateSet;
use super::tokenizer::{split_sentences, STRIPPED_PUNCTUATION};

/// Textual stand-in for a missing left neighbour.
pub const START_SENTINEL: &str = "<s>";
/// Textual stand-in for a missing right neighbour.
pub const END_SENTINEL: &str = "</s>";

/// Substring identifying a gap in cloze text.
///
/// A token is a gap when it *contains* the marker, so a marker glued to
/// punctuation (`"___!"`) still counts. The same rule is used when seeding
/// the table and when extracting gap contexts, so every context key is
/// always seeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GapMarker(String);

impl GapMarker {
	pub const DEFAULT: &'static str = "___";

	/// Validates a marker.
	///
	/// # Errors
	/// Returns `InvalidMarker` if the marker is empty, holds whitespace, or
	/// holds a character the tokenizer strips (it would never survive
	/// tokenization).
	pub fn new(marker: &str) -> Result<Self> {
		let invalid = marker.is_empty()
			|| marker
				.chars()
				.any(|c| c.is_whitespace() || STRIPPED_PUNCTUATION.contains(&c));
		if invalid {
			return Err(ClozeError::InvalidMarker(marker.to_owned()));
		}
		// Tokens are lowercased before matching.
		Ok(Self(marker.to_lowercase()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn matches(&self, token: &str) -> bool {
		token.contains(self.0.as_str())
	}
}

impl Default for GapMarker {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}

impl TryFrom<String> for GapMarker {
	type Error = ClozeError;

	fn try_from(value: String) -> Result<Self> {
		Self::new(&value)
	}
}

impl From<GapMarker> for String {
	fn from(marker: GapMarker) -> Self {
		marker.0
	}
}

impl fmt::Display for GapMarker {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Immediate surroundings of one gap.
///
/// `None` means the gap sits at a sentence boundary; scoring then uses the
/// fixed sentinel probability instead of a table lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapContext {
	pub left: Option<String>,
	pub right: Option<String>,
}

impl GapContext {
	/// Left neighbour, or [`START_SENTINEL`].
	pub fn left_key(&self) -> &str {
		self.left.as_deref().unwrap_or(START_SENTINEL)
	}

	/// Right neighbour, or [`END_SENTINEL`].
	pub fn right_key(&self) -> &str {
		self.right.as_deref().unwrap_or(END_SENTINEL)
	}
}

impl fmt::Display for GapContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} _ {}", self.left_key(), self.right_key())
	}
}

/// How a tracked key takes part in counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRole {
	/// Counts transitions toward suffix words of interest.
	Candidate,
	/// Word before a gap; counts transitions toward candidates.
	Prefix,
}

/// The words that matter for one cloze.
///
/// Only these are looked at during the corpus scan. A word that is both a
/// candidate and a prefix word acts as a candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTerms {
	candidates: HashSet<String>,
	prefixes: HashSet<String>,
	suffixes: HashSet<String>,
}

impl TrackedTerms {
	pub fn new<C, P, S>(candidates: C, prefixes: P, suffixes: S) -> Self
	where
		C: IntoIterator<Item = String>,
		P: IntoIterator<Item = String>,
		S: IntoIterator<Item = String>,
	{
		Self {
			candidates: candidates.into_iter().collect(),
			prefixes: prefixes.into_iter().collect(),
			suffixes: suffixes.into_iter().collect(),
		}
	}

	pub fn role(&self, token: &str) -> Option<KeyRole> {
		if self.candidates.contains(token) {
			Some(KeyRole::Candidate)
		} else if self.prefixes.contains(token) {
			Some(KeyRole::Prefix)
		} else {
			None
		}
	}

	/// Tells whether `key → follower` must be counted.
	pub fn admits(&self, key: &str, follower: &str) -> bool {
		match self.role(key) {
			Some(KeyRole::Candidate) => self.suffixes.contains(follower),
			Some(KeyRole::Prefix) => self.candidates.contains(follower),
			None => false,
		}
	}

	/// All keys the table is seeded with: candidates and prefix words.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.candidates
			.iter()
			.chain(self.prefixes.iter().filter(|p| !self.candidates.contains(*p)))
			.map(String::as_str)
	}

	pub fn prefixes(&self) -> &HashSet<String> {
		&self.prefixes
	}

	pub fn suffixes(&self) -> &HashSet<String> {
		&self.suffixes
	}

	pub fn candidates(&self) -> &HashSet<String> {
		&self.candidates
	}
}

/// Cloze text split into tokenized sentences.
#[derive(Clone, Debug)]
pub struct ClozeText {
	sentences: Vec<Vec<String>>,
	marker: GapMarker,
}

impl ClozeText {
	pub fn parse(text: &str, marker: &GapMarker) -> Self {
		Self { sentences: split_sentences(text), marker: marker.clone() }
	}

	pub fn marker(&self) -> &GapMarker {
		&self.marker
	}

	pub fn gap_count(&self) -> usize {
		self.gaps().count()
	}

	/// Iterates over `(sentence, position)` of every gap, in text order.
	fn gaps(&self) -> impl Iterator<Item = (&[String], usize)> {
		self.sentences.iter().flat_map(move |sentence| {
			sentence
				.iter()
				.enumerate()
				.filter(move |(_, token)| self.marker.matches(token))
				.map(move |(position, _)| (sentence.as_slice(), position))
		})
	}

	/// Collects the words the corpus scan has to track.
	///
	/// For every gap, the word before it becomes a prefix key and the word
	/// after it a suffix word of interest. Gaps at a sentence boundary
	/// contribute nothing on that side. A neighbour can itself be a gap
	/// (two adjacent gaps): it is then tracked like any other word and
	/// simply never occurs in the corpus.
	pub fn find_prefix_targets(&self, candidates: &CandidateSet) -> TrackedTerms {
		let mut prefixes = HashSet::new();
		let mut suffixes = HashSet::new();
		for (sentence, position) in self.gaps() {
			if position > 0 {
				prefixes.insert(sentence[position - 1].clone());
			}
			if let Some(next) = sentence.get(position + 1) {
				suffixes.insert(next.clone());
			}
		}

		TrackedTerms::new(candidates.iter().map(str::to_owned), prefixes, suffixes)
	}

	/// Lists the left/right neighbours of every gap, in text order.
	///
	/// This order is the order in which gaps get filled.
	pub fn extract_gap_contexts(&self) -> Vec<GapContext> {
		self.gaps()
			.map(|(sentence, position)| GapContext {
				left: position.checked_sub(1).map(|p| sentence[p].clone()),
				right: sentence.get(position + 1).cloned(),
			})
			.collect()
	}
}
