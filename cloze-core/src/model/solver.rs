use std::path::Path;

use log::{debug, info, warn};

use crate::config::SolveConfig;
use crate::error::{ClozeError, Result};
use crate::io;
use super::candidates::CandidateSet;
use super::context::{ClozeText, GapContext, GapMarker, TrackedTerms};
use super::cooccurrence::{CooccurrenceTable, TableBuilder};
use super::evaluation::{evaluate, HitReport};
use super::options::SolveOptions;
use super::snapshot::{load_or_build, CorpusFingerprint};
use super::tokenizer::normalize_word;

/// A validated cloze, ready for a corpus scan.
///
/// Owns the candidate pool of one solve; assignment consumes it.
#[derive(Clone, Debug)]
pub struct ClozeProblem {
	gaps: Vec<GapContext>,
	terms: TrackedTerms,
	candidates: CandidateSet,
}

impl ClozeProblem {
	/// Parses the cloze text and checks it against the candidates.
	///
	/// # Errors
	/// - `NoGaps` if the text holds no gap marker
	/// - `TooManyGaps` if there are fewer candidates than gaps
	pub fn new(text: &str, candidates: CandidateSet, marker: &GapMarker) -> Result<Self> {
		let cloze = ClozeText::parse(text, marker);
		let gaps = cloze.extract_gap_contexts();
		if gaps.is_empty() {
			return Err(ClozeError::NoGaps(marker.to_string()));
		}
		if gaps.len() > candidates.len() {
			return Err(ClozeError::TooManyGaps { gaps: gaps.len(), candidates: candidates.len() });
		}

		let terms = cloze.find_prefix_targets(&candidates);
		debug!(
			"tracking {} candidates, {} prefix words, {} suffix words",
			terms.candidates().len(),
			terms.prefixes().len(),
			terms.suffixes().len()
		);
		Ok(Self { gaps, terms, candidates })
	}

	/// Gap contexts, in filling order.
	pub fn gaps(&self) -> &[GapContext] {
		&self.gaps
	}

	pub fn terms(&self) -> &TrackedTerms {
		&self.terms
	}

	pub fn candidates(&self) -> &CandidateSet {
		&self.candidates
	}
}

/// High-level entry point: cloze text and candidates in, one word per gap out.
///
/// # Responsibilities
/// - Validate the inputs before any corpus work
/// - Scan the corpus (sequentially, in parallel, or through a snapshot)
/// - Run the configured assignment strategy
#[derive(Clone, Debug, Default)]
pub struct ClozeSolver {
	options: SolveOptions,
}

impl ClozeSolver {
	pub fn new(options: SolveOptions) -> Self {
		Self { options }
	}

	/// Creates a solver with the options of a configuration file.
	pub fn from_config(config: &SolveConfig) -> Result<Self> {
		Ok(Self::new(config.options()?))
	}

	pub fn options(&self) -> &SolveOptions {
		&self.options
	}

	pub fn prepare(&self, text: &str, candidates: CandidateSet) -> Result<ClozeProblem> {
		let problem = ClozeProblem::new(text, candidates, self.options.gap_marker())?;
		info!("cloze has {} gaps for {} candidates", problem.gaps.len(), problem.candidates.len());
		Ok(problem)
	}

	/// Builds the co-occurrence table of `problem` from in-memory corpus lines.
	pub fn build_table(&self, problem: &ClozeProblem, corpus: &[String]) -> Result<CooccurrenceTable> {
		let workers = self.options.effective_workers();
		let table = if workers > 1 {
			CooccurrenceTable::build_parallel(corpus, &problem.terms, workers)?
		} else {
			CooccurrenceTable::build(corpus, &problem.terms)
		};
		info!("scanned {} corpus lines, {} transitions counted", corpus.len(), table.transitions());
		Ok(table)
	}

	/// Fills the gaps of `problem` using `table`, consuming its candidates.
	pub fn assign(&self, problem: ClozeProblem, table: &CooccurrenceTable) -> Result<Vec<String>> {
		let ClozeProblem { gaps, mut candidates, .. } = problem;
		self.options.strategy.assigner().assign(table, &gaps, &mut candidates)
	}

	/// Solves a cloze against an in-memory corpus.
	///
	/// # Returns
	/// One word per gap, in the order the gaps appear in `text`.
	pub fn solve(&self, text: &str, candidates: CandidateSet, corpus: &[String]) -> Result<Vec<String>> {
		let problem = self.prepare(text, candidates)?;
		let table = self.build_table(&problem, corpus)?;
		self.assign(problem, &table)
	}

	/// Solves the cloze described by a configuration file.
	///
	/// # Behavior
	/// - Reads the cloze text and candidates, and validates them.
	/// - Reuses the table snapshot if one is configured and still fits,
	///   otherwise scans the corpus (and refreshes the snapshot).
	/// - Streams the corpus when scanning with a single worker; loads it
	///   whole for parallel scans.
	pub fn solve_files(&self, config: &SolveConfig) -> Result<Vec<String>> {
		let text = io::read_text(&config.input_filename).map_err(ClozeError::io(&config.input_filename))?;
		let words = io::read_word_list(&config.candidates_filename)
			.map_err(ClozeError::io(&config.candidates_filename))?;
		let problem = self.prepare(&text, CandidateSet::new(words)?)?;

		let table = match &config.table_cache {
			Some(cache) => {
				let corpus = CorpusFingerprint::from_file(&config.corpus)?;
				load_or_build(cache, &corpus, &problem.terms, || self.scan_corpus_file(&config.corpus, &problem.terms))?
			}
			None => self.scan_corpus_file(&config.corpus, &problem.terms)?,
		};

		self.assign(problem, &table)
	}

	fn scan_corpus_file(&self, path: &Path, terms: &TrackedTerms) -> Result<CooccurrenceTable> {
		let workers = self.options.effective_workers();
		if workers > 1 {
			let lines = io::read_file(path).map_err(ClozeError::io(path))?;
			let table = CooccurrenceTable::build_parallel(&lines, terms, workers)?;
			info!("scanned {} corpus lines with {} workers", lines.len(), workers);
			return Ok(table);
		}

		let mut builder = TableBuilder::new(terms);
		for line in io::stream_lines(path).map_err(ClozeError::io(path))? {
			builder.push_line(&line.map_err(ClozeError::io(path))?);
		}
		info!("scanned {} corpus lines", builder.lines());
		Ok(builder.finish())
	}
}

/// Loads a whole corpus file, one segment per line.
///
/// For callers that solve many clozes against the same corpus.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
	let path = path.as_ref();
	io::read_file(path).map_err(ClozeError::io(path))
}

/// Scores a solution against the answer file of a configuration.
///
/// Answers are normalized like candidates so that both sides compare on
/// equal terms.
///
/// # Returns
/// `None` when no answer file is configured and the candidate file, used in
/// its place, does not hold exactly one word per gap: it is then a plain
/// candidate list and cannot serve as an answer key.
///
/// # Errors
/// An explicit answer file of the wrong length is a `LengthMismatch`.
pub fn evaluate_files(solution: &[String], config: &SolveConfig) -> Result<Option<HitReport>> {
	let path = config.answers_path();
	let answers: Vec<String> = io::read_word_list(path)
		.map_err(ClozeError::io(path))?
		.into_iter()
		.map(|answer| normalize_word(&answer).unwrap_or(answer))
		.collect();
	if config.answers_filename.is_none() && answers.len() != solution.len() {
		warn!(
			"{} lists {} candidates for {} gaps, not an answer key; skipping evaluation",
			path.display(),
			answers.len(),
			solution.len()
		);
		return Ok(None);
	}

	let report = evaluate(solution, &answers)?;
	info!("hit rate {report}");
	Ok(Some(report))
}
