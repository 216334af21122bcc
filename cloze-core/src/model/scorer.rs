use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ClozeError, Result};
use super::candidates::CandidateSet;
use super::context::GapContext;
use super::cooccurrence::CooccurrenceTable;

/// Fixed term added to every denominator.
///
/// Much larger than any realistic key total, it keeps probabilities small
/// and comparable whatever the corpus size.
pub const SMOOTHING_DENOMINATOR: f64 = 1_000_000.0;

/// Probability used for a side of a gap that has no neighbour.
pub const SENTINEL_PROBABILITY: f64 = 0.25;

/// Add-one smoothed probability of `key → follower`.
///
/// # Errors
/// Returns `UnknownKey` if `key` is not in the table.
pub fn transition_probability(table: &CooccurrenceTable, key: &str, follower: &str) -> Result<f64> {
	let stats = table.statistics(key)?;
	Ok((stats.count(follower) + 1) as f64 / (stats.total() as f64 + SMOOTHING_DENOMINATOR))
}

/// Likelihood of `candidate` filling the gap described by `context`.
///
/// Product of the left probability (`left → candidate`) and the right
/// probability (`candidate → right`); a missing neighbour contributes
/// [`SENTINEL_PROBABILITY`].
pub fn gap_score(table: &CooccurrenceTable, context: &GapContext, candidate: &str) -> Result<f64> {
	let prefix = match &context.left {
		Some(left) => transition_probability(table, left, candidate)?,
		None => SENTINEL_PROBABILITY,
	};
	let suffix = match &context.right {
		Some(right) => transition_probability(table, candidate, right)?,
		None => SENTINEL_PROBABILITY,
	};
	Ok(prefix * suffix)
}

/// Chooses one candidate per gap.
///
/// Implementations must return exactly one word per gap, in gap order,
/// never use a candidate twice, and remove every chosen word from the pool.
pub trait AssignmentStrategy {
	fn assign(
		&self,
		table: &CooccurrenceTable,
		gaps: &[GapContext],
		candidates: &mut CandidateSet,
	) -> Result<Vec<String>>;
}

/// Fills gaps left to right, each with the best candidate still available.
///
/// Ties go to the candidate that comes first in the pool. Not optimal:
/// an early gap may take the word a later gap needed more.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyAssignment;

impl AssignmentStrategy for GreedyAssignment {
	fn assign(
		&self,
		table: &CooccurrenceTable,
		gaps: &[GapContext],
		candidates: &mut CandidateSet,
	) -> Result<Vec<String>> {
		let mut chosen = Vec::with_capacity(gaps.len());
		for (index, gap) in gaps.iter().enumerate() {
			let mut best: Option<(usize, f64)> = None;
			for (position, candidate) in candidates.iter().enumerate() {
				let score = gap_score(table, gap, candidate)?;
				if best.is_none_or(|(_, max)| score > max) {
					best = Some((position, score));
				}
			}

			let word = best
				.and_then(|(position, _)| candidates.take(position))
				.ok_or(ClozeError::CandidatesExhausted { gap: index })?;
			debug!("gap #{index} ({gap}) -> {word}");
			chosen.push(word);
		}
		Ok(chosen)
	}
}

/// Finds the assignment maximizing the product of all gap scores.
///
/// Solved as a rectangular assignment problem (Hungarian algorithm) on
/// `-ln(score)` costs, O(gaps² × candidates).
#[derive(Clone, Copy, Debug, Default)]
pub struct OptimalAssignment;

impl AssignmentStrategy for OptimalAssignment {
	fn assign(
		&self,
		table: &CooccurrenceTable,
		gaps: &[GapContext],
		candidates: &mut CandidateSet,
	) -> Result<Vec<String>> {
		if gaps.is_empty() {
			return Ok(Vec::new());
		}
		if gaps.len() > candidates.len() {
			return Err(ClozeError::CandidatesExhausted { gap: candidates.len() });
		}

		let mut costs = Vec::with_capacity(gaps.len());
		for gap in gaps {
			let row = candidates
				.iter()
				.map(|candidate| gap_score(table, gap, candidate).map(|score| -score.ln()))
				.collect::<Result<Vec<f64>>>()?;
			costs.push(row);
		}

		let columns = hungarian(&costs);
		let words: Vec<String> = candidates.iter().map(str::to_owned).collect();
		let chosen: Vec<String> = columns.iter().map(|&column| words[column].clone()).collect();

		// Remove from the back so positions stay valid.
		let mut taken = columns;
		taken.sort_unstable_by(|a, b| b.cmp(a));
		for position in taken {
			candidates.take(position);
		}

		for (index, (gap, word)) in gaps.iter().zip(&chosen).enumerate() {
			debug!("gap #{index} ({gap}) -> {word}");
		}
		Ok(chosen)
	}
}

/// Minimum-cost assignment of every row to a distinct column.
///
/// Requires `rows <= columns` and finite costs. Returns, for each row, the
/// index of its column.
fn hungarian(costs: &[Vec<f64>]) -> Vec<usize> {
	let rows = costs.len();
	let columns = costs.first().map_or(0, Vec::len);

	// 1-based potentials; column 0 is a virtual start column.
	let mut row_potential = vec![0.0; rows + 1];
	let mut column_potential = vec![0.0; columns + 1];
	let mut owner = vec![0usize; columns + 1];
	let mut way = vec![0usize; columns + 1];

	for row in 1..=rows {
		owner[0] = row;
		let mut current = 0;
		let mut min_slack = vec![f64::INFINITY; columns + 1];
		let mut used = vec![false; columns + 1];

		loop {
			used[current] = true;
			let active_row = owner[current];
			let mut delta = f64::INFINITY;
			let mut next = 0;
			for column in 1..=columns {
				if used[column] {
					continue;
				}
				let slack = costs[active_row - 1][column - 1]
					- row_potential[active_row]
					- column_potential[column];
				if slack < min_slack[column] {
					min_slack[column] = slack;
					way[column] = current;
				}
				if min_slack[column] < delta {
					delta = min_slack[column];
					next = column;
				}
			}

			for column in 0..=columns {
				if used[column] {
					row_potential[owner[column]] += delta;
					column_potential[column] -= delta;
				} else {
					min_slack[column] -= delta;
				}
			}

			current = next;
			if owner[current] == 0 {
				break;
			}
		}

		loop {
			let previous = way[current];
			owner[current] = owner[previous];
			current = previous;
			if current == 0 {
				break;
			}
		}
	}

	let mut assignment = vec![0usize; rows];
	for column in 1..=columns {
		if owner[column] != 0 {
			assignment[owner[column] - 1] = column - 1;
		}
	}
	assignment
}

/// Available assignment strategies, selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// Left-to-right, first come first served.
	#[default]
	Greedy,
	/// Global optimum over all gaps.
	Optimal,
}

impl Strategy {
	pub const ALL: &'static [Self] = &[Self::Greedy, Self::Optimal];

	pub fn assigner(self) -> Box<dyn AssignmentStrategy + Send + Sync> {
		match self {
			Strategy::Greedy => Box::new(GreedyAssignment),
			Strategy::Optimal => Box::new(OptimalAssignment),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Strategy::Greedy => "greedy",
			Strategy::Optimal => "optimal",
		}
	}
}

impl std::str::FromStr for Strategy {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("unknown strategy `{s}`, expected `greedy` or `optimal`"))
	}
}
