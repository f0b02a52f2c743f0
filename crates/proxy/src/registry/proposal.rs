//! Two-step upgrade: stage a source, then confirm exactly that source.

use strata_feed::{SourceAddr, SourceHandle};
use tracing::{info, warn};

use super::{FeedState, Phase, RegistryWriter};
use crate::error::FeedError;

/// Whether a source is staged for the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeStatus {
	Stable,
	Proposed(SourceAddr),
}

impl FeedState {
	/// Returns the upgrade state machine's current state.
	pub fn upgrade_status(&self) -> UpgradeStatus {
		match &self.proposed {
			Some(source) => UpgradeStatus::Proposed(source.addr()),
			None => UpgradeStatus::Stable,
		}
	}
}

/// Phases on either side of a confirmed upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
	pub previous: Phase,
	pub current: Phase,
}

impl RegistryWriter<'_> {
	/// Stages `source`, returning whatever it replaced.
	pub fn propose(&mut self, source: SourceHandle) -> Option<SourceHandle> {
		let old = self.state.load_full();
		let replaced = old.proposed.clone();
		info!(
			current = %old.current.source.addr(),
			proposed = %source.addr(),
			replaced = ?replaced.as_ref().map(SourceHandle::addr),
			"staged source"
		);
		self.publish(FeedState {
			phases: old.phases.clone(),
			current: old.current.clone(),
			proposed: Some(source),
		});
		replaced
	}

	/// Installs the staged source, which must be `source`, and clears the stage.
	///
	/// Insisting on the exact source keeps a confirmation from silently applying to a
	/// proposal that replaced the one the caller reviewed.
	pub fn confirm(&mut self, source: &SourceHandle) -> Result<Confirmation, FeedError> {
		let old = self.state.load_full();
		let pending = old.proposed.as_ref().ok_or_else(|| {
			warn!(offered = %source.addr(), "confirm without pending proposal");
			FeedError::NoProposal
		})?;
		if !pending.same_as(source) {
			warn!(pending = %pending.addr(), offered = %source.addr(), "confirm does not match proposal");
			return Err(FeedError::ProposalMismatch {
				pending: pending.addr(),
				offered: source.addr(),
			});
		}

		let (phases, current) = old.phases.appended(source.clone())?;
		self.publish(FeedState {
			phases,
			current: current.clone(),
			proposed: None,
		});
		info!(
			generation = %current.generation,
			previous = %old.current.source.addr(),
			current = %current.source.addr(),
			"confirmed source"
		);
		Ok(Confirmation {
			previous: old.current.clone(),
			current,
		})
	}
}
