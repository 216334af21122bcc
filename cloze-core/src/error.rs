use std::io;
use std::path::{Path, PathBuf};

/// Everything that can abort a cloze solve.
///
/// Input problems are reported before any corpus work starts, so a failed
/// solve never yields a partial answer.
#[derive(Debug, thiserror::Error)]
pub enum ClozeError {
	#[error("failed to access {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to parse configuration {}: {source}", path.display())]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("invalid gap marker {0:?}: must be non-empty, without whitespace, ',', '.' or ';'")]
	InvalidMarker(String),
	#[error("invalid worker count: {0}")]
	InvalidWorkers(String),
	#[error("candidate list is empty")]
	NoCandidates,
	#[error("duplicate candidate `{0}`")]
	DuplicateCandidate(String),
	#[error("candidate `{0}` is not a single word")]
	InvalidCandidate(String),
	#[error("cloze text contains no gap marked with `{0}`")]
	NoGaps(String),
	#[error("cloze has {gaps} gaps but only {candidates} candidates")]
	TooManyGaps { gaps: usize, candidates: usize },
	#[error("candidate pool exhausted at gap #{gap}")]
	CandidatesExhausted { gap: usize },
	#[error("context key `{0}` was never seeded into the co-occurrence table")]
	UnknownKey(String),
	#[error("statistics key mismatch: `{expected}` vs `{found}`")]
	KeyMismatch { expected: String, found: String },
	#[error("reference answer list is empty")]
	EmptyReference,
	#[error("solution has {solution} entries but the reference has {reference}")]
	LengthMismatch { solution: usize, reference: usize },
	#[error("table snapshot: {0}")]
	Snapshot(#[from] postcard::Error),
	#[error("corpus worker failed: {0}")]
	Worker(String),
}

impl ClozeError {
	/// Returns a mapper attaching `path` to an I/O error, for use with `map_err`.
	pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> ClozeError + '_ {
		move |source| ClozeError::Io { path: path.to_path_buf(), source }
	}
}

pub type Result<T> = std::result::Result<T, ClozeError>;
