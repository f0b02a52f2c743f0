//! Audit notifications for administrative changes.

use std::sync::Arc;

use parking_lot::Mutex;
use strata_feed::{Generation, SourceAddr};
use tracing::info;

/// Emitted exactly once per successful mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedEvent {
	/// A source was staged for the next generation.
	Proposed {
		current: SourceAddr,
		proposed: SourceAddr,
	},
	/// The staged source became current.
	Confirmed {
		previous: SourceAddr,
		current: SourceAddr,
		generation: Generation,
	},
}

/// Receiver of [`FeedEvent`]s.
pub trait EventSink: Send + Sync {
	/// Handles one event. Called while the proxy's mutation lock is held.
	fn emit(&self, event: &FeedEvent);
}

impl<S> EventSink for Arc<S>
where
	S: EventSink + ?Sized,
{
	fn emit(&self, event: &FeedEvent) {
		(**self).emit(event);
	}
}

/// Renders events as `tracing` records on the `strata::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
	fn emit(&self, event: &FeedEvent) {
		match event {
			FeedEvent::Proposed { current, proposed } => {
				info!(target: "strata::audit", %current, %proposed, "source proposed");
			}
			FeedEvent::Confirmed {
				previous,
				current,
				generation,
			} => {
				info!(target: "strata::audit", %previous, %current, %generation, "source confirmed");
			}
		}
	}
}

/// In-memory audit trail.
#[derive(Debug, Default)]
pub struct EventLog {
	events: Mutex<Vec<FeedEvent>>,
}

impl EventLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of every recorded event in emission order.
	pub fn events(&self) -> Vec<FeedEvent> {
		self.events.lock().clone()
	}

	/// Removes and returns every recorded event.
	pub fn drain(&self) -> Vec<FeedEvent> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn len(&self) -> usize {
		self.events.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.lock().is_empty()
	}
}

impl EventSink for EventLog {
	fn emit(&self, event: &FeedEvent) {
		self.events.lock().push(*event);
	}
}
