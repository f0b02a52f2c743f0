//! Public read and admin surface.
//!
//! Two read tiers with deliberately different failure policies:
//!
//! * **Legacy** (`latest_answer`, `latest_timestamp`, `latest_round`, `answer_at`,
//!   `timestamp_at`): ids outside the identifier space and ids from unknown generations
//!   answer `0`. Older integrations cannot express "no data" any other way.
//! * **Recommended** (`round_data`, `latest_round_data`): the same cases are errors, so a
//!   bad id is never mistaken for a zero answer.
//!
//! Source failures are passed through unchanged in both tiers.

use strata_feed::{
	Answer, Generation, LocalRound, RoundData, RoundId, SourceHandle, Timestamp,
};
use tracing::{debug, warn};

use crate::auth::{AdminAction, Authorize};
use crate::error::FeedError;
use crate::events::{EventSink, FeedEvent, TracingSink};
use crate::registry::{FeedState, Phase, PhaseRegistry, UpgradeStatus};


/// A single continuous feed stitched together from successive sources.
pub struct FeedProxy<A> {
	registry: PhaseRegistry,
	auth: A,
	events: Box<dyn EventSink>,
}

impl<A: Authorize> FeedProxy<A> {
	/// Creates a proxy with `initial` as generation 1, logging audit events via `tracing`.
	pub fn new(initial: SourceHandle, auth: A) -> Self {
		Self::with_events(initial, auth, TracingSink)
	}

	/// Creates a proxy that reports audit events to `events`.
	pub fn with_events(initial: SourceHandle, auth: A, events: impl EventSink + 'static) -> Self {
		Self {
			registry: PhaseRegistry::new(initial),
			auth,
			events: Box::new(events),
		}
	}

	/// Returns the authorization gate.
	pub fn authorizer(&self) -> &A {
		&self.auth
	}

	pub fn latest_answer(&self) -> Result<Answer, FeedError> {
		Ok(self.registry.snapshot().current().source.latest_answer()?)
	}

	pub fn latest_timestamp(&self) -> Result<Timestamp, FeedError> {
		Ok(self.registry.snapshot().current().source.latest_timestamp()?)
	}

	/// Returns the current source's latest round under the current generation.
	pub fn latest_round(&self) -> Result<RoundId, FeedError> {
		let state = self.registry.snapshot();
		let phase = state.current();
		let local = phase.source.latest_round()?;
		Ok(RoundId::encode(phase.generation, local))
	}

	/// Legacy historical answer. Unresolvable ids answer `0`.
	pub fn answer_at(&self, id: impl Into<u128>) -> Result<Answer, FeedError> {
		let state = self.registry.snapshot();
		match resolve_legacy(&state, id.into()) {
			Some((source, local)) => Ok(source.answer_at(local)?),
			None => Ok(0),
		}
	}

	/// Legacy historical timestamp. Unresolvable ids answer `0`.
	pub fn timestamp_at(&self, id: impl Into<u128>) -> Result<Timestamp, FeedError> {
		let state = self.registry.snapshot();
		match resolve_legacy(&state, id.into()) {
			Some((source, local)) => Ok(source.timestamp_at(local)?),
			None => Ok(0),
		}
	}

	/// Full data for a historical round.
	///
	/// Both round fields of the result are encoded under the generation the id named, not
	/// under any numbering the source reports.
	pub fn round_data(&self, id: impl Into<u128>) -> Result<RoundData, FeedError> {
		let id = RoundId::try_from(id.into())?;
		let (generation, local) = id.decode();
		let state = self.registry.snapshot();
		let source = state
			.lookup(generation)
			.ok_or(FeedError::UnknownGeneration {
				round: id,
				generation,
			})?;
		Ok(source.round_data(local)?.into_global(generation))
	}

	/// Full data for the latest round, encoded under the generation current at entry.
	pub fn latest_round_data(&self) -> Result<RoundData, FeedError> {
		let state = self.registry.snapshot();
		let phase = state.current();
		Ok(phase.source.latest_round_data()?.into_global(phase.generation))
	}

	pub fn decimals(&self) -> Result<u8, FeedError> {
		Ok(self.registry.snapshot().current().source.decimals()?)
	}

	pub fn version(&self) -> Result<u64, FeedError> {
		Ok(self.registry.snapshot().current().source.version()?)
	}

	pub fn description(&self) -> Result<String, FeedError> {
		Ok(self.registry.snapshot().current().source.description()?)
	}

	pub fn current_source(&self) -> SourceHandle {
		self.registry.current().source
	}

	pub fn current_generation(&self) -> Generation {
		self.registry.current().generation
	}

	pub fn proposed_source(&self) -> Option<SourceHandle> {
		self.registry.snapshot().proposed().cloned()
	}

	/// Returns the source installed under `generation`, or `None` if it never was.
	pub fn source_at(&self, generation: Generation) -> Option<SourceHandle> {
		self.registry.lookup(generation)
	}

	/// Lists every installed phase in generation order.
	pub fn phases(&self) -> Vec<Phase> {
		self.registry.snapshot().phases().iter().cloned().collect()
	}

	pub fn upgrade_status(&self) -> UpgradeStatus {
		self.registry.snapshot().upgrade_status()
	}

	/// Queries the staged source directly, in its own round numbering.
	pub fn peek_proposed_round_data(
		&self,
		local: LocalRound,
	) -> Result<RoundData<LocalRound>, FeedError> {
		let state = self.registry.snapshot();
		let source = state.proposed().ok_or(FeedError::NoProposal)?;
		Ok(source.round_data(local)?)
	}

	/// Queries the staged source's latest round, in its own round numbering.
	pub fn peek_proposed_latest_round_data(&self) -> Result<RoundData<LocalRound>, FeedError> {
		let state = self.registry.snapshot();
		let source = state.proposed().ok_or(FeedError::NoProposal)?;
		Ok(source.latest_round_data()?)
	}

	/// Stages `source` for the next generation, replacing any earlier proposal.
	pub fn propose(&self, caller: &A::Caller, source: SourceHandle) -> Result<(), FeedError> {
		let mut writer = self.registry.writer();
		self.authorize(caller, AdminAction::Propose)?;

		let current = writer.state().current().source.addr();
		let proposed = source.addr();
		writer.propose(source);
		self.events.emit(&FeedEvent::Proposed { current, proposed });
		Ok(())
	}

	/// Installs the staged source as the next generation and returns that generation.
	///
	/// Fails without any change if nothing is staged or `source` is not the staged one.
	pub fn confirm(&self, caller: &A::Caller, source: &SourceHandle) -> Result<Generation, FeedError> {
		let mut writer = self.registry.writer();
		self.authorize(caller, AdminAction::Confirm)?;

		let confirmation = writer.confirm(source)?;
		self.events.emit(&FeedEvent::Confirmed {
			previous: confirmation.previous.source.addr(),
			current: confirmation.current.source.addr(),
			generation: confirmation.current.generation,
		});
		Ok(confirmation.current.generation)
	}

	fn authorize(&self, caller: &A::Caller, action: AdminAction) -> Result<(), FeedError> {
		self.auth.authorize(caller, action).map_err(|err| {
			warn!(%action, %err, "admin call rejected");
			FeedError::from(err)
		})
	}
}

impl<A> std::fmt::Debug for FeedProxy<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FeedProxy")
			.field("registry", &self.registry)
			.finish_non_exhaustive()
	}
}

/// Resolves a legacy round id against one pinned state.
fn resolve_legacy(state: &FeedState, raw: u128) -> Option<(&SourceHandle, LocalRound)> {
	let Some(id) = RoundId::from_raw(raw) else {
		debug!(raw, "legacy lookup outside identifier space");
		return None;
	};
	let (generation, local) = id.decode();
	match state.lookup(generation) {
		Some(source) => Some((source, local)),
		None => {
			debug!(%id, %generation, "legacy lookup for unknown generation");
			None
		}
	}
}
