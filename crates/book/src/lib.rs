//! In-memory round book.
//!
//! [`RoundBook`] is the simplest useful [`DataSource`]: rounds are appended in order,
//! numbered from 1, and never rewritten. Lookups follow the legacy convention of
//! answering `0` for rounds that do not exist, except for the full-data accessors which
//! report [`SourceError::NoData`].

use parking_lot::RwLock;
use strata_feed::{Answer, DataSource, LocalRound, RoundData, SourceError, Timestamp};
use tracing::debug;


/// One round to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
	pub answer: Answer,
	pub started_at: Timestamp,
	pub updated_at: Timestamp,
	/// Round the answer was computed in. `None` means the new round itself.
	pub answered_in_round: Option<LocalRound>,
}

/// Rejected [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
	#[error("round {round} cannot be answered in round {answered_in_round}")]
	AnsweredOutOfRange {
		round: LocalRound,
		answered_in_round: LocalRound,
	},
	#[error("round {round} updated at {updated_at} before it started at {started_at}")]
	UpdatedBeforeStart {
		round: LocalRound,
		started_at: Timestamp,
		updated_at: Timestamp,
	},
}

#[derive(Debug, Clone, Copy)]
struct Stored {
	answer: Answer,
	started_at: Timestamp,
	updated_at: Timestamp,
	answered_in_round: LocalRound,
}

/// Append-only, thread-safe round store.
#[derive(Debug)]
pub struct RoundBook {
	description: String,
	decimals: u8,
	version: u64,
	rounds: RwLock<Vec<Stored>>,
}

impl RoundBook {
	pub fn new(description: impl Into<String>, decimals: u8, version: u64) -> Self {
		Self {
			description: description.into(),
			decimals,
			version,
			rounds: RwLock::new(Vec::new()),
		}
	}

	/// Appends a fresh round answered in itself and returns its number.
	pub fn submit(&self, answer: Answer, started_at: Timestamp, updated_at: Timestamp) -> LocalRound {
		let mut rounds = self.rounds.write();
		let round = next_round(&rounds);
		rounds.push(Stored {
			answer,
			started_at,
			updated_at,
			answered_in_round: round,
		});
		debug!(round, answer, "submitted round");
		round
	}

	/// Appends `entry` after validating it against the rounds already stored.
	pub fn push(&self, entry: Entry) -> Result<LocalRound, BookError> {
		let mut rounds = self.rounds.write();
		let round = next_round(&rounds);
		let answered_in_round = entry.answered_in_round.unwrap_or(round);

		if answered_in_round == 0 || answered_in_round > round {
			return Err(BookError::AnsweredOutOfRange {
				round,
				answered_in_round,
			});
		}
		if entry.updated_at < entry.started_at {
			return Err(BookError::UpdatedBeforeStart {
				round,
				started_at: entry.started_at,
				updated_at: entry.updated_at,
			});
		}

		rounds.push(Stored {
			answer: entry.answer,
			started_at: entry.started_at,
			updated_at: entry.updated_at,
			answered_in_round,
		});
		debug!(round, answer = entry.answer, answered_in_round, "pushed round");
		Ok(round)
	}

	/// Number of stored rounds, which is also the latest round number.
	pub fn len(&self) -> usize {
		self.rounds.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.rounds.read().is_empty()
	}

	fn get(&self, round: LocalRound) -> Option<Stored> {
		let index = usize::try_from(round.checked_sub(1)?).ok()?;
		self.rounds.read().get(index).copied()
	}

	fn latest(&self) -> Option<(LocalRound, Stored)> {
		let rounds = self.rounds.read();
		let stored = *rounds.last()?;
		Some((rounds.len() as LocalRound, stored))
	}
}

fn next_round(rounds: &[Stored]) -> LocalRound {
	rounds.len() as LocalRound + 1
}

fn to_data(round: LocalRound, stored: Stored) -> RoundData<LocalRound> {
	RoundData {
		round_id: round,
		answer: stored.answer,
		started_at: stored.started_at,
		updated_at: stored.updated_at,
		answered_in_round: stored.answered_in_round,
	}
}

impl DataSource for RoundBook {
	fn latest_answer(&self) -> Result<Answer, SourceError> {
		Ok(self.latest().map_or(0, |(_, stored)| stored.answer))
	}

	fn latest_timestamp(&self) -> Result<Timestamp, SourceError> {
		Ok(self.latest().map_or(0, |(_, stored)| stored.updated_at))
	}

	fn latest_round(&self) -> Result<LocalRound, SourceError> {
		Ok(self.len() as LocalRound)
	}

	fn answer_at(&self, round: LocalRound) -> Result<Answer, SourceError> {
		Ok(self.get(round).map_or(0, |stored| stored.answer))
	}

	fn timestamp_at(&self, round: LocalRound) -> Result<Timestamp, SourceError> {
		Ok(self.get(round).map_or(0, |stored| stored.updated_at))
	}

	fn round_data(&self, round: LocalRound) -> Result<RoundData<LocalRound>, SourceError> {
		self.get(round)
			.map(|stored| to_data(round, stored))
			.ok_or(SourceError::NoData)
	}

	fn latest_round_data(&self) -> Result<RoundData<LocalRound>, SourceError> {
		self.latest()
			.map(|(round, stored)| to_data(round, stored))
			.ok_or(SourceError::NoData)
	}

	fn decimals(&self) -> Result<u8, SourceError> {
		Ok(self.decimals)
	}

	fn version(&self) -> Result<u64, SourceError> {
		Ok(self.version)
	}

	fn description(&self) -> Result<String, SourceError> {
		Ok(self.description.clone())
	}
}
