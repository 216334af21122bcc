use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use cloze_core::model::candidates::CandidateSet;
use cloze_core::model::evaluation::evaluate;
use cloze_core::model::options::SolveOptions;
use cloze_core::model::scorer::Strategy;
use cloze_core::model::solver::{load_corpus, ClozeSolver};
use cloze_core::ClozeError;

#[derive(Parser)]
#[command(name = "cloze-server", about = "Cloze solving over HTTP")]
struct Args {
	/// Reference corpus, loaded once at startup
	#[arg(long)]
	corpus: PathBuf,
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1:5000")]
	bind: String,
	/// Corpus scan threads per request (0 = one per CPU)
	#[arg(long, default_value_t = 1)]
	workers: usize,
}

/// Body of `POST /v1/solve`
#[derive(Deserialize)]
struct SolveRequest {
	cloze: String,
	candidates: Vec<String>,
	strategy: Option<Strategy>,
	gap_marker: Option<String>,
}

#[derive(Serialize)]
struct SolveResponse {
	solution: Vec<String>,
}

/// Body of `POST /v1/evaluate`
#[derive(Deserialize)]
struct EvaluateRequest {
	solution: Vec<String>,
	reference: Vec<String>,
}

#[derive(Serialize)]
struct EvaluateResponse {
	hits: usize,
	total: usize,
	rate: f64,
}

#[derive(Serialize)]
struct CorpusInfo {
	lines: usize,
}

struct SharedData {
	corpus: Vec<String>,
	workers: usize,
}

impl SolveRequest {
	/// Solver options for this request, on top of the server defaults.
	fn options(&self, workers: usize) -> Result<SolveOptions, ClozeError> {
		let mut options = SolveOptions::default();
		if let Some(marker) = &self.gap_marker {
			options.set_gap_marker(marker)?;
		}
		if let Some(strategy) = self.strategy {
			options.strategy = strategy;
		}
		options.set_workers(workers)?;
		Ok(options)
	}
}

/// Status for a solver error: bad input is the caller's fault, anything
/// else is ours.
fn status_for(error: &ClozeError) -> StatusCode {
	match error {
		ClozeError::Worker(_)
		| ClozeError::Io { .. }
		| ClozeError::Snapshot(_)
		| ClozeError::UnknownKey(_)
		| ClozeError::KeyMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		_ => StatusCode::BAD_REQUEST,
	}
}

fn error_response(error: ClozeError) -> HttpResponse {
	let status = status_for(&error);
	if status.is_server_error() {
		warn!("request failed: {error}");
	}
	HttpResponse::build(status).body(error.to_string())
}

/// HTTP POST endpoint `/v1/solve`
///
/// Solves the cloze of the request body against the loaded corpus.
/// The corpus scan runs on the blocking thread pool.
#[post("/v1/solve")]
async fn post_solve(data: web::Data<SharedData>, request: web::Json<SolveRequest>) -> impl Responder {
	let request = request.into_inner();
	let options = match request.options(data.workers) {
		Ok(o) => o,
		Err(e) => return error_response(e),
	};

	let shared = data.clone();
	let result = web::block(move || {
		let candidates = CandidateSet::new(&request.candidates)?;
		ClozeSolver::new(options).solve(&request.cloze, candidates, &shared.corpus)
	})
	.await;

	match result {
		Ok(Ok(solution)) => HttpResponse::Ok().json(SolveResponse { solution }),
		Ok(Err(e)) => error_response(e),
		Err(_) => HttpResponse::InternalServerError().body("Solver task failed"),
	}
}

#[post("/v1/evaluate")]
async fn post_evaluate(request: web::Json<EvaluateRequest>) -> impl Responder {
	match evaluate(&request.solution, &request.reference) {
		Ok(report) => HttpResponse::Ok().json(EvaluateResponse {
			hits: report.hits,
			total: report.total,
			rate: report.rate(),
		}),
		Err(e) => error_response(e),
	}
}

#[get("/v1/corpus")]
async fn get_corpus(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(CorpusInfo { lines: data.corpus.len() })
}

fn routes(config: &mut web::ServiceConfig) {
	config.service(post_solve).service(post_evaluate).service(get_corpus);
}

/// Main entry point for the server.
///
/// Loads the corpus once, shares it read-only between workers and serves
/// the solve and evaluate endpoints.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	// Fail fast on bad worker counts rather than on every request
	if let Err(e) = SolveOptions::default().set_workers(args.workers) {
		return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
	}

	let corpus = load_corpus(&args.corpus).map_err(|e| std::io::Error::other(e.to_string()))?;
	info!("loaded {} corpus lines from {}", corpus.len(), args.corpus.display());

	let shared_data = web::Data::new(SharedData { corpus, workers: args.workers });

	info!("listening on {}", args.bind);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind(args.bind)?
		.run()
		.await
}
