//! Phase registry with atomic snapshot publication.
//!
//! # Purpose
//!
//! Track every source ever installed, which one is current, and which one is staged to
//! become current, so that any historical round id keeps resolving after a swap.
//!
//! # Mental model
//!
//! * All state lives in one immutable [`FeedState`] published through an `ArcSwap`.
//! * Readers pin an `Arc<FeedState>` once per call and resolve everything against it. A
//!   concurrent swap can never hand a reader a mix of two generations.
//! * Writers take the single mutation lock through [`PhaseRegistry::writer`], build the
//!   successor state, and publish it with one store.
//!
//! # Invariants
//!
//! * Generations are assigned `1, 2, 3, ...` with no gaps, repeats or wrap-around.
//!   - Enforced in: [`PhaseTable::appended`].
//!   - Tested by: `tests::test_generations_are_dense_and_ordered`.
//! * `FeedState::current` is always the highest-generation table entry.
//!   - Enforced in: [`RegistryWriter::install`], [`RegistryWriter::confirm`].
//! * Failed writes publish nothing.
//!   - Enforced in: every writer method computes the full successor before storing.
//!   - Tested by: `tests::test_mismatched_confirm_changes_nothing`.
//!
//! # Concurrency
//!
//! * Reads are wait-free (`ArcSwap` load).
//! * Writes are mutually exclusive (one `parking_lot::Mutex`), so there is no CAS retry.
//! * An install copies at most one partial segment of [`PhaseTable`] plus its segment index;
//!   sealed segments are shared by every later snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, MutexGuard};
use strata_feed::{Generation, SourceHandle};
use tracing::info;

use crate::error::FeedError;

mod phase;
mod proposal;

pub use phase::{Phase, PhaseTable};
pub use proposal::{Confirmation, UpgradeStatus};

#[cfg(test)]
mod tests;

/// One consistent view of the registry.
#[derive(Debug, Clone)]
pub struct FeedState {
	phases: PhaseTable,
	current: Phase,
	proposed: Option<SourceHandle>,
}

impl FeedState {
	fn genesis(source: SourceHandle) -> Self {
		let (phases, current) = PhaseTable::first(source);
		info!(generation = %current.generation, source = %current.source.addr(), "installed phase");
		Self {
			phases,
			current,
			proposed: None,
		}
	}

	/// Returns the active phase.
	#[inline]
	pub fn current(&self) -> &Phase {
		&self.current
	}

	/// Returns the source installed under `generation`.
	#[inline]
	pub fn lookup(&self, generation: Generation) -> Option<&SourceHandle> {
		self.phases.get(generation).map(|phase| &phase.source)
	}

	/// Returns the staged source, if any.
	#[inline]
	pub fn proposed(&self) -> Option<&SourceHandle> {
		self.proposed.as_ref()
	}

	/// Returns every installed phase.
	pub fn phases(&self) -> &PhaseTable {
		&self.phases
	}
}

/// Registry of installed phases plus the pending proposal slot.
pub struct PhaseRegistry {
	state: ArcSwap<FeedState>,
	write: Mutex<()>,
}

impl PhaseRegistry {
	/// Creates a registry with `initial` installed as generation 1.
	pub fn new(initial: SourceHandle) -> Self {
		Self {
			state: ArcSwap::from_pointee(FeedState::genesis(initial)),
			write: Mutex::new(()),
		}
	}

	/// Pins the current state.
	#[inline]
	pub fn snapshot(&self) -> Arc<FeedState> {
		self.state.load_full()
	}

	/// Returns the source for a historical or current generation.
	pub fn lookup(&self, generation: Generation) -> Option<SourceHandle> {
		self.state.load().lookup(generation).cloned()
	}

	/// Returns the active phase.
	pub fn current(&self) -> Phase {
		self.state.load().current().clone()
	}

	/// Acquires the mutation lock.
	///
	/// Everything done through the returned writer is serialized against other writers;
	/// readers keep seeing the previous state until the writer publishes.
	pub fn writer(&self) -> RegistryWriter<'_> {
		RegistryWriter {
			state: &self.state,
			_guard: self.write.lock(),
		}
	}
}

impl std::fmt::Debug for PhaseRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.load();
		f.debug_struct("PhaseRegistry")
			.field("generation", &state.current.generation)
			.field("phases", &state.phases.len())
			.field("proposed", &state.proposed)
			.finish()
	}
}

/// Exclusive write access to a [`PhaseRegistry`].
pub struct RegistryWriter<'a> {
	state: &'a ArcSwap<FeedState>,
	_guard: MutexGuard<'a, ()>,
}

impl RegistryWriter<'_> {
	/// Returns the state this writer will build on.
	pub fn state(&self) -> Arc<FeedState> {
		self.state.load_full()
	}

	/// Installs `source` under the next generation and makes it current.
	///
	/// This is the only way the phase table grows. The pending proposal is left as is.
	pub fn install(&mut self, source: SourceHandle) -> Result<Phase, FeedError> {
		let old = self.state.load_full();
		let (phases, current) = old.phases.appended(source)?;
		self.publish(FeedState {
			phases,
			current: current.clone(),
			proposed: old.proposed.clone(),
		});
		info!(generation = %current.generation, source = %current.source.addr(), "installed phase");
		Ok(current)
	}

	fn publish(&mut self, next: FeedState) {
		self.state.store(Arc::new(next));
	}
}
