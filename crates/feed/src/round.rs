use crate::id::{Generation, LocalRound, RoundId};

/// Value reported for a round. Zero doubles as the legacy "no data" sentinel.
pub type Answer = i128;

/// Seconds since the Unix epoch. Zero means "never".
pub type Timestamp = u64;

/// Full description of one round.
///
/// Sources report rounds keyed by [`LocalRound`]; the proxy hands them out keyed by
/// [`RoundId`] after folding in the generation the query was dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundData<R = RoundId> {
	/// Round this data belongs to.
	pub round_id: R,
	/// Reported value.
	pub answer: Answer,
	/// When the round started.
	pub started_at: Timestamp,
	/// When the answer was last written.
	pub updated_at: Timestamp,
	/// Round in which `answer` was computed. Lags `round_id` when a round carried an old answer.
	pub answered_in_round: R,
}

impl<R> RoundData<R> {
	/// Rewrites both round fields, leaving the payload untouched.
	pub fn map_rounds<S>(self, mut f: impl FnMut(R) -> S) -> RoundData<S> {
		RoundData {
			round_id: f(self.round_id),
			answer: self.answer,
			started_at: self.started_at,
			updated_at: self.updated_at,
			answered_in_round: f(self.answered_in_round),
		}
	}
}

impl RoundData<LocalRound> {
	/// Encodes both round fields under `generation`.
	///
	/// The caller's generation is authoritative: whatever numbering the source uses
	/// internally, its rounds belong to the phase they were fetched through.
	pub fn into_global(self, generation: Generation) -> RoundData<RoundId> {
		self.map_rounds(|local| RoundId::encode(generation, local))
	}
}
