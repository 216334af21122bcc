use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Loads every line of a file, line endings removed.
///
/// Used for word lists and for corpora scanned in parallel, which need all
/// their lines in memory to be split into chunks.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_text(filename)?.lines().map(str::to_owned).collect())
}

/// Reads a whole text file into a single `String`.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads a word list: one entry per line, surrounding whitespace trimmed,
/// blank lines dropped.
pub(crate) fn read_word_list<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_file(filename)?
		.into_iter()
		.map(|line| line.trim().to_owned())
		.filter(|line| !line.is_empty())
		.collect())
}

/// Opens a file for line-by-line streaming.
///
/// The corpus can be far larger than memory, so the sequential scan never
/// loads it whole.
pub(crate) fn stream_lines<P: AsRef<Path>>(filename: P) -> io::Result<io::Lines<BufReader<File>>> {
	Ok(BufReader::new(File::open(filename)?).lines())
}

/// Size and SHA-256 digest of a file, read in fixed-size blocks.
pub(crate) fn file_digest<P: AsRef<Path>>(filename: P) -> io::Result<(u64, [u8; 32])> {
	let mut reader = BufReader::new(File::open(filename)?);
	let mut hasher = Sha256::new();
	let mut buffer = [0u8; 64 * 1024];
	let mut len = 0u64;
	loop {
		let read = reader.read(&mut buffer)?;
		if read == 0 {
			break;
		}
		hasher.update(&buffer[..read]);
		len += read as u64;
	}

	let mut digest = [0u8; 32];
	digest.copy_from_slice(&hasher.finalize());
	Ok((len, digest))
}
