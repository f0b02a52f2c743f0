use std::sync::Arc;

use strata_feed::{Answer, DataSource, LocalRound, RoundData, SourceError, SourceHandle, Timestamp};

/// Deterministic source: round `r` answers `tag * 1000 + r` and updates at `1000 + r`.
pub(crate) struct Fixture {
	pub tag: Answer,
	pub latest: LocalRound,
}

pub(crate) fn fixture(tag: Answer, latest: LocalRound) -> SourceHandle {
	SourceHandle::from(Arc::new(Fixture { tag, latest }))
}

impl Fixture {
	fn has(&self, round: LocalRound) -> bool {
		round != 0 && round <= self.latest
	}
}

impl DataSource for Fixture {
	fn latest_answer(&self) -> Result<Answer, SourceError> {
		self.answer_at(self.latest)
	}

	fn latest_timestamp(&self) -> Result<Timestamp, SourceError> {
		self.timestamp_at(self.latest)
	}

	fn latest_round(&self) -> Result<LocalRound, SourceError> {
		Ok(self.latest)
	}

	fn answer_at(&self, round: LocalRound) -> Result<Answer, SourceError> {
		Ok(if self.has(round) {
			self.tag * 1000 + Answer::from(round)
		} else {
			0
		})
	}

	fn timestamp_at(&self, round: LocalRound) -> Result<Timestamp, SourceError> {
		Ok(if self.has(round) { 1000 + round } else { 0 })
	}

	fn round_data(&self, round: LocalRound) -> Result<RoundData<LocalRound>, SourceError> {
		if !self.has(round) {
			return Err(SourceError::NoData);
		}
		Ok(RoundData {
			round_id: round,
			answer: self.tag * 1000 + Answer::from(round),
			started_at: 999 + round,
			updated_at: 1000 + round,
			answered_in_round: round,
		})
	}

	fn latest_round_data(&self) -> Result<RoundData<LocalRound>, SourceError> {
		self.round_data(self.latest)
	}

	fn decimals(&self) -> Result<u8, SourceError> {
		Ok(8)
	}

	fn version(&self) -> Result<u64, SourceError> {
		Ok(self.tag as u64)
	}

	fn description(&self) -> Result<String, SourceError> {
		Ok(format!("fixture {}", self.tag))
	}
}

/// Source whose every call fails.
pub(crate) struct Broken;

pub(crate) fn broken() -> SourceHandle {
	SourceHandle::from(Arc::new(Broken))
}

fn down<T>() -> Result<T, SourceError> {
	Err(SourceError::Unavailable("upstream down".into()))
}

impl DataSource for Broken {
	fn latest_answer(&self) -> Result<Answer, SourceError> {
		down()
	}

	fn latest_timestamp(&self) -> Result<Timestamp, SourceError> {
		down()
	}

	fn latest_round(&self) -> Result<LocalRound, SourceError> {
		down()
	}

	fn answer_at(&self, _round: LocalRound) -> Result<Answer, SourceError> {
		down()
	}

	fn timestamp_at(&self, _round: LocalRound) -> Result<Timestamp, SourceError> {
		down()
	}

	fn round_data(&self, _round: LocalRound) -> Result<RoundData<LocalRound>, SourceError> {
		down()
	}

	fn latest_round_data(&self) -> Result<RoundData<LocalRound>, SourceError> {
		down()
	}

	fn decimals(&self) -> Result<u8, SourceError> {
		down()
	}

	fn version(&self) -> Result<u64, SourceError> {
		down()
	}

	fn description(&self) -> Result<String, SourceError> {
		down()
	}
}
