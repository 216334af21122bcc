use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClozeError, Result};

/// Follower counts observed for one tracked key.
///
/// Conceptually a row of a bigram matrix: the key is the left word, each
/// follower the right word, weighted by how many times the pair was counted
/// during the corpus scan.
///
/// ## Invariants
/// - All followers belong to the same `key`
/// - `total` equals the sum of all follower counts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KeyStatistics {
	/// Tracked word (prefix word or candidate).
	key: String,
	/// Example: { "dog" => 42, "cat" => 3 }
	followers: HashMap<String, u64>,
	total: u64,
}

impl KeyStatistics {
	/// Creates empty statistics for the given key.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			followers: HashMap::new(),
			total: 0,
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Records one occurrence of `key → follower`.
	pub fn add_transition(&mut self, follower: &str) {
		match self.followers.get_mut(follower) {
			Some(count) => *count += 1,
			None => {
				self.followers.insert(follower.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	/// Occurrences of `key → follower`; unseen followers count 0.
	pub fn count(&self, follower: &str) -> u64 {
		self.followers.get(follower).copied().unwrap_or(0)
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	/// Iterates over `(follower, count)` pairs, in no particular order.
	pub fn followers(&self) -> impl Iterator<Item = (&str, u64)> {
		self.followers.iter().map(|(f, c)| (f.as_str(), *c))
	}

	/// Adds the counts of `other` to this one.
	///
	/// Used to combine tables built on separate corpus chunks; counts are
	/// independent per key, so the merge is a plain sum.
	///
	/// # Errors
	/// Returns `KeyMismatch` if the keys differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(ClozeError::KeyMismatch {
				expected: self.key.clone(),
				found: other.key.clone(),
			});
		}

		for (follower, count) in &other.followers {
			*self.followers.entry(follower.clone()).or_insert(0) += *count;
		}
		self.total += other.total;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transitions_update_counts_and_total() {
		let mut stats = KeyStatistics::new("the");
		stats.add_transition("dog");
		stats.add_transition("dog");
		stats.add_transition("cat");

		assert_eq!(stats.count("dog"), 2);
		assert_eq!(stats.count("cat"), 1);
		assert_eq!(stats.count("car"), 0);
		assert_eq!(stats.total(), 3);
		assert_eq!(stats.followers().map(|(_, c)| c).sum::<u64>(), stats.total());
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = KeyStatistics::new("the");
		left.add_transition("dog");
		let mut right = KeyStatistics::new("the");
		right.add_transition("dog");
		right.add_transition("cat");

		left.merge(&right).unwrap();
		assert_eq!(left.count("dog"), 2);
		assert_eq!(left.count("cat"), 1);
		assert_eq!(left.total(), 3);
	}

	#[test]
	fn merge_rejects_other_keys() {
		let mut left = KeyStatistics::new("the");
		let right = KeyStatistics::new("a");
		assert!(matches!(left.merge(&right), Err(ClozeError::KeyMismatch { .. })));
	}
}
