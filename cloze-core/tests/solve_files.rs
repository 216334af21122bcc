use std::fs;
use std::path::Path;

use cloze_core::config::SolveConfig;
use cloze_core::model::scorer::Strategy;
use cloze_core::model::snapshot::TableSnapshot;
use cloze_core::model::solver::{evaluate_files, ClozeSolver};
use cloze_core::ClozeError;
use tempfile::TempDir;

const CLOZE: &str = "The ___ barked at the mailman. Later, a ___ meowed on the roof.\n";
const CANDIDATES: &str = "dog\ncat\n";
const CORPUS: &str = "\
the dog barked at the mailman

a cat meowed on the roof

the dog barked again
";

fn write(dir: &Path, name: &str, contents: &str) {
	fs::write(dir.join(name), contents).unwrap();
}

fn setup(extra: &str) -> (TempDir, SolveConfig) {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "cloze.txt", CLOZE);
	write(dir.path(), "candidates.txt", CANDIDATES);
	write(dir.path(), "corpus.txt", CORPUS);

	let path = |name: &str| dir.path().join(name).display().to_string();
	let json = format!(
		r#"{{
			"input_filename": {:?},
			"candidates_filename": {:?},
			"corpus": {:?},
			"lexicon_filename": "unused.txt"{extra}
		}}"#,
		path("cloze.txt"),
		path("candidates.txt"),
		path("corpus.txt"),
	);
	write(dir.path(), "config.json", &json);

	let config = SolveConfig::from_file(dir.path().join("config.json")).unwrap();
	(dir, config)
}

#[test]
fn solves_and_scores_from_files() {
	let (_dir, config) = setup("");
	let solver = ClozeSolver::from_config(&config).unwrap();

	let solution = solver.solve_files(&config).unwrap();
	assert_eq!(solution, vec!["dog", "cat"]);

	let report = evaluate_files(&solution, &config).unwrap().unwrap();
	assert_eq!(report.hits, 2);
	assert_eq!(report.rate(), 1.0);
}

#[test]
fn parallel_and_optimal_runs_agree() {
	let (_dir, config) = setup(r#", "workers": 2, "strategy": "optimal""#);
	assert_eq!(config.strategy, Strategy::Optimal);

	let solution = ClozeSolver::from_config(&config).unwrap().solve_files(&config).unwrap();
	assert_eq!(solution, vec!["dog", "cat"]);
}

#[test]
fn table_snapshot_is_written_and_reused() {
	let (dir, mut config) = setup("");
	let cache = dir.path().join("table.bin");
	config.table_cache = Some(cache.clone());

	let solver = ClozeSolver::from_config(&config).unwrap();
	let first = solver.solve_files(&config).unwrap();
	assert!(cache.exists());

	let snapshot = TableSnapshot::load(&cache).unwrap().unwrap();
	let the = snapshot.table().get("the").unwrap();
	assert_eq!(the.count("dog"), 2);
	assert_eq!(the.count("cat"), 0);

	let second = solver.solve_files(&config).unwrap();
	assert_eq!(first, second);
}

#[test]
fn snapshot_is_rebuilt_when_the_corpus_changes_but_not_its_size() {
	let (dir, mut config) = setup("");
	config.table_cache = Some(dir.path().join("table.bin"));
	write(dir.path(), "cloze.txt", "The ___ barked.\n");
	write(dir.path(), "corpus.txt", "the cat barked\n");

	let solver = ClozeSolver::from_config(&config).unwrap();
	assert_eq!(solver.solve_files(&config).unwrap(), vec!["cat"]);

	write(dir.path(), "corpus.txt", "the dog barked\n");
	assert_eq!(solver.solve_files(&config).unwrap(), vec!["dog"]);
}

#[test]
fn separate_answer_file_is_used_for_scoring() {
	let (dir, mut config) = setup("");
	write(dir.path(), "answers.txt", "cat\ncat\n");
	config.answers_filename = Some(dir.path().join("answers.txt"));

	let solution = vec!["dog".to_owned(), "cat".to_owned()];
	let report = evaluate_files(&solution, &config).unwrap().unwrap();
	assert_eq!(report.hits, 1);
	assert_eq!(report.rate(), 0.5);
}

#[test]
fn candidate_list_longer_than_the_gaps_is_not_scored() {
	let (dir, config) = setup("");
	write(dir.path(), "candidates.txt", "dog\ncat\nbird\n");

	let solver = ClozeSolver::from_config(&config).unwrap();
	let solution = solver.solve_files(&config).unwrap();
	assert_eq!(solution.len(), 2);
	assert_eq!(evaluate_files(&solution, &config).unwrap(), None);
}

#[test]
fn answer_file_of_the_wrong_length_is_an_error() {
	let (dir, mut config) = setup("");
	write(dir.path(), "answers.txt", "dog\n");
	config.answers_filename = Some(dir.path().join("answers.txt"));

	let solution = vec!["dog".to_owned(), "cat".to_owned()];
	let result = evaluate_files(&solution, &config);
	assert!(matches!(result, Err(ClozeError::LengthMismatch { solution: 2, reference: 1 })));
}

#[test]
fn missing_corpus_aborts_the_solve() {
	let (dir, config) = setup("");
	fs::remove_file(dir.path().join("corpus.txt")).unwrap();

	let result = ClozeSolver::from_config(&config).unwrap().solve_files(&config);
	assert!(matches!(result, Err(ClozeError::Io { .. })));
}

#[test]
fn empty_candidate_file_is_rejected() {
	let (dir, config) = setup("");
	write(dir.path(), "candidates.txt", "\n\n");

	let result = ClozeSolver::from_config(&config).unwrap().solve_files(&config);
	assert!(matches!(result, Err(ClozeError::NoCandidates)));
}

#[test]
fn malformed_configuration_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "config.json", "{ \"corpus\": 3 }");
	let result = SolveConfig::from_file(dir.path().join("config.json"));
	assert!(matches!(result, Err(ClozeError::ConfigParse { .. })));
}
