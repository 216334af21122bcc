use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::info;

use cloze_core::config::{SolveConfig, DEFAULT_CONFIG};
use cloze_core::model::scorer::Strategy;
use cloze_core::model::solver::{evaluate_files, ClozeSolver};

#[derive(Parser)]
#[command(name = "cloze-cli", about = "Fill cloze gaps from corpus bigram statistics")]
struct Cli {
	/// Path to the JSON configuration file
	#[arg(long, short, default_value = DEFAULT_CONFIG)]
	config: PathBuf,
	/// Assignment strategy, overrides the configuration ("greedy" or "optimal")
	#[arg(long)]
	strategy: Option<Strategy>,
	/// Corpus scan threads, overrides the configuration (0 = one per CPU)
	#[arg(long)]
	workers: Option<usize>,
	/// Skip scoring the solution against the answer file
	#[arg(long)]
	no_eval: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let cli = Cli::parse();

	// Load the configuration, then apply command line overrides
	let mut config = SolveConfig::from_file(&cli.config)?;
	if let Some(strategy) = cli.strategy {
		config.strategy = strategy;
	}
	if let Some(workers) = cli.workers {
		config.workers = workers;
	}
	info!(
		"solving {} with {} using {}",
		config.input_filename.display(),
		config.candidates_filename.display(),
		config.corpus.display()
	);

	let begin = Instant::now();
	let solver = ClozeSolver::from_config(&config)?;
	let solution = solver.solve_files(&config)?;
	let elapsed = begin.elapsed();

	println!("time took: {:.3} minutes", elapsed.as_secs_f64() / 60.0);
	println!("cloze solution: {}", solution.join(", "));

	// The answer file defaults to the candidate file, listed in gap order
	if !cli.no_eval {
		match evaluate_files(&solution, &config)? {
			Some(report) => println!("hit percentage: {report}"),
			None => println!("hit percentage: no answer key"),
		}
	}

	Ok(())
}
