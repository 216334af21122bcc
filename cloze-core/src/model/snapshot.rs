use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ClozeError, Result};
use crate::io;
use super::context::TrackedTerms;
use super::cooccurrence::CooccurrenceTable;

/// Identity of a corpus: its byte length and the SHA-256 of its contents.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorpusFingerprint {
	len: u64,
	digest: [u8; 32],
}

impl CorpusFingerprint {
	/// Fingerprints a corpus file without loading it whole.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let (len, digest) = io::file_digest(path).map_err(ClozeError::io(path))?;
		Ok(Self { len, digest })
	}

	pub fn from_bytes(bytes: &[u8]) -> Self {
		let mut digest = [0u8; 32];
		digest.copy_from_slice(&Sha256::digest(bytes));
		Self { len: bytes.len() as u64, digest }
	}

	pub fn byte_len(&self) -> u64 {
		self.len
	}
}

/// A co-occurrence table saved to disk along with what it was built from.
///
/// A table only answers for the terms it tracked and the corpus it scanned,
/// so both are stored and checked before reuse.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TableSnapshot {
	corpus: CorpusFingerprint,
	terms: TrackedTerms,
	table: CooccurrenceTable,
}

impl TableSnapshot {
	pub fn new(corpus: CorpusFingerprint, terms: TrackedTerms, table: CooccurrenceTable) -> Self {
		Self { corpus, terms, table }
	}

	/// Reads a snapshot, `None` if the file does not exist.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
		let path = path.as_ref();
		if !path.exists() {
			return Ok(None);
		}
		let bytes = fs::read(path).map_err(ClozeError::io(path))?;
		Ok(Some(postcard::from_bytes(&bytes)?))
	}

	/// Writes the snapshot with `postcard`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = postcard::to_stdvec(self)?;
		fs::write(path, bytes).map_err(ClozeError::io(path))
	}

	pub fn matches(&self, corpus: &CorpusFingerprint, terms: &TrackedTerms) -> bool {
		&self.corpus == corpus && &self.terms == terms
	}

	pub fn table(&self) -> &CooccurrenceTable {
		&self.table
	}

	pub fn into_table(self) -> CooccurrenceTable {
		self.table
	}
}

/// Returns the snapshot at `path` if it fits, otherwise builds the table
/// and replaces the snapshot.
///
/// An unreadable or stale snapshot is not an error: it is logged and
/// rebuilt.
///
/// # Errors
/// Propagates `build` errors and failures to write the new snapshot.
pub fn load_or_build<P, F>(
	path: P,
	corpus: &CorpusFingerprint,
	terms: &TrackedTerms,
	build: F,
) -> Result<CooccurrenceTable>
where
	P: AsRef<Path>,
	F: FnOnce() -> Result<CooccurrenceTable>,
{
	let path = path.as_ref();
	match TableSnapshot::load(path) {
		Ok(Some(snapshot)) if snapshot.matches(corpus, terms) => {
			debug!("reusing table snapshot {}", path.display());
			return Ok(snapshot.into_table());
		}
		Ok(Some(_)) => warn!("table snapshot {} is stale, rebuilding", path.display()),
		Ok(None) => debug!("no table snapshot at {}", path.display()),
		Err(e) => warn!("ignoring unreadable table snapshot {}: {e}", path.display()),
	}

	let snapshot = TableSnapshot::new(*corpus, terms.clone(), build()?);
	snapshot.save(path)?;
	Ok(snapshot.into_table())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn terms(prefix: &str) -> TrackedTerms {
		TrackedTerms::new(["dog".to_owned()], [prefix.to_owned()], ["barked".to_owned()])
	}

	fn corpus(text: &str) -> CorpusFingerprint {
		CorpusFingerprint::from_bytes(text.as_bytes())
	}

	#[test]
	fn snapshot_round_trips_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.bin");
		let terms = terms("the");
		let table = CooccurrenceTable::build(["the dog barked"], &terms);

		TableSnapshot::new(corpus("the dog barked"), terms.clone(), table.clone()).save(&path).unwrap();
		let loaded = TableSnapshot::load(&path).unwrap().unwrap();
		assert!(loaded.matches(&corpus("the dog barked"), &terms));
		assert!(!loaded.matches(&corpus("the dog barked\n"), &terms));
		assert_eq!(loaded.table(), &table);
	}

	#[test]
	fn file_fingerprint_matches_its_contents() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.txt");
		fs::write(&path, "the dog barked\n").unwrap();

		let fingerprint = CorpusFingerprint::from_file(&path).unwrap();
		assert_eq!(fingerprint, corpus("the dog barked\n"));
		assert_eq!(fingerprint.byte_len(), 15);
	}

	#[test]
	fn missing_snapshot_loads_as_none() {
		let dir = tempfile::tempdir().unwrap();
		assert!(TableSnapshot::load(dir.path().join("absent.bin")).unwrap().is_none());
	}

	#[test]
	fn fitting_snapshot_skips_the_build() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.bin");
		let terms = terms("the");
		let source = corpus("the dog");

		let built = load_or_build(&path, &source, &terms, || Ok(CooccurrenceTable::build(["the dog"], &terms))).unwrap();
		let reused = load_or_build(&path, &source, &terms, || panic!("snapshot should have been reused")).unwrap();
		assert_eq!(built, reused);
	}

	#[test]
	fn snapshot_for_other_terms_is_rebuilt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.bin");
		let first = terms("the");
		let second = terms("a");
		let source = corpus("a dog");

		load_or_build(&path, &source, &first, || Ok(CooccurrenceTable::seeded(&first))).unwrap();
		let mut rebuilt = false;
		let table = load_or_build(&path, &source, &second, || {
			rebuilt = true;
			Ok(CooccurrenceTable::build(["a dog"], &second))
		})
		.unwrap();

		assert!(rebuilt);
		assert_eq!(table.get("a").unwrap().count("dog"), 1);
		assert!(TableSnapshot::load(&path).unwrap().unwrap().matches(&source, &second));
	}

	#[test]
	fn snapshot_of_same_sized_other_corpus_is_rebuilt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.bin");
		let terms = TrackedTerms::new(["dog".to_owned(), "cat".to_owned()], ["the".to_owned()], ["barked".to_owned()]);
		let before = corpus("the cat barked\n");
		let after = corpus("the dog barked\n");
		assert_eq!(before.byte_len(), after.byte_len());

		load_or_build(&path, &before, &terms, || Ok(CooccurrenceTable::build(["the cat barked"], &terms))).unwrap();
		let table = load_or_build(&path, &after, &terms, || Ok(CooccurrenceTable::build(["the dog barked"], &terms))).unwrap();

		assert_eq!(table, CooccurrenceTable::build(["the dog barked"], &terms));
		assert_eq!(table.get("the").unwrap().count("dog"), 1);
		assert!(TableSnapshot::load(&path).unwrap().unwrap().matches(&after, &terms));
	}

	#[test]
	fn corrupt_snapshot_is_rebuilt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("table.bin");
		fs::write(&path, b"not a table").unwrap();
		let terms = terms("the");

		let table = load_or_build(&path, &corpus("x"), &terms, || Ok(CooccurrenceTable::seeded(&terms))).unwrap();
		assert_eq!(table, CooccurrenceTable::seeded(&terms));
	}
}
