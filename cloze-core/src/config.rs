use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClozeError, Result};
use crate::io::read_text;
use crate::model::context::GapMarker;
use crate::model::options::SolveOptions;
use crate::model::scorer::Strategy;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG: &str = "config.json";

/// Contents of the JSON configuration file.
///
/// Paths are taken as is (relative paths resolve against the working
/// directory). Unknown fields are ignored, so older configuration files
/// carrying extra entries keep loading.
///
/// Example:
/// ```json
/// {
///     "input_filename": "data/cloze.txt",
///     "candidates_filename": "data/candidates.txt",
///     "corpus": "data/corpus.txt",
///     "strategy": "greedy",
///     "workers": 4
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SolveConfig {
	/// Cloze text holding the gaps.
	pub input_filename: PathBuf,

	/// Candidate words, one per line.
	pub candidates_filename: PathBuf,

	/// Reference corpus, one segment per line.
	pub corpus: PathBuf,

	/// Expected answers, one per line, in gap order. When absent the
	/// candidate file is used, which only makes sense if it lists the
	/// answers in gap order.
	#[serde(default)]
	pub answers_filename: Option<PathBuf>,

	#[serde(default)]
	pub gap_marker: GapMarker,

	#[serde(default)]
	pub strategy: Strategy,

	#[serde(default = "default_workers")]
	pub workers: usize,

	/// Where to keep a snapshot of the co-occurrence table between runs.
	#[serde(default)]
	pub table_cache: Option<PathBuf>,
}

fn default_workers() -> usize {
	1
}

impl SolveConfig {
	/// Loads and parses a configuration file.
	///
	/// # Errors
	/// - `Io` if the file cannot be read
	/// - `ConfigParse` if it is not valid JSON for this structure
	///   (this includes an invalid gap marker)
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let text = read_text(path).map_err(ClozeError::io(path))?;
		serde_json::from_str(&text).map_err(|source| ClozeError::ConfigParse { path: path.to_path_buf(), source })
	}

	/// Runtime options described by this configuration.
	///
	/// # Errors
	/// Returns `InvalidWorkers` if the worker count is out of range.
	pub fn options(&self) -> Result<SolveOptions> {
		let mut options = SolveOptions::default();
		options.set_gap_marker(self.gap_marker.as_str())?;
		options.strategy = self.strategy;
		options.set_workers(self.workers)?;
		Ok(options)
	}

	/// File holding the expected answers.
	pub fn answers_path(&self) -> &Path {
		self.answers_filename.as_deref().unwrap_or(&self.candidates_filename)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn minimal_configuration_uses_defaults() {
		let config: SolveConfig = serde_json::from_str(
			r#"{
				"input_filename": "cloze.txt",
				"candidates_filename": "candidates.txt",
				"lexicon_filename": "lexicon.txt",
				"corpus": "corpus.txt"
			}"#,
		)
		.unwrap();

		assert_eq!(config.gap_marker, GapMarker::default());
		assert_eq!(config.strategy, Strategy::Greedy);
		assert_eq!(config.workers, 1);
		assert_eq!(config.table_cache, None);
		assert_eq!(config.answers_path(), Path::new("candidates.txt"));
		assert_eq!(config.options().unwrap(), SolveOptions::default());
	}

	#[test]
	fn full_configuration() {
		let config: SolveConfig = serde_json::from_str(
			r#"{
				"input_filename": "cloze.txt",
				"candidates_filename": "candidates.txt",
				"answers_filename": "answers.txt",
				"corpus": "corpus.txt",
				"gap_marker": "[GAP]",
				"strategy": "optimal",
				"workers": 0,
				"table_cache": "table.bin"
			}"#,
		)
		.unwrap();

		let options = config.options().unwrap();
		assert_eq!(options.gap_marker().as_str(), "[gap]");
		assert_eq!(options.strategy, Strategy::Optimal);
		assert_eq!(options.workers(), 0);
		assert_eq!(config.answers_path(), Path::new("answers.txt"));
		assert_eq!(config.table_cache.as_deref(), Some(Path::new("table.bin")));
	}

	#[test]
	fn invalid_marker_is_a_parse_error() {
		let result: serde_json::Result<SolveConfig> = serde_json::from_str(
			r#"{"input_filename": "a", "candidates_filename": "b", "corpus": "c", "gap_marker": ""}"#,
		);
		assert!(result.is_err());
	}

	#[test]
	fn missing_file_reports_its_path() {
		match SolveConfig::from_file("does/not/exist.json") {
			Err(ClozeError::Io { path, .. }) => assert_eq!(path, Path::new("does/not/exist.json")),
			other => panic!("unexpected {other:?}"),
		}
	}
}
