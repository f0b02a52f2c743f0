//! Generation-aware proxy over a succession of round feeds.
//!
//! [`FeedProxy`] presents one ever-growing series of rounds even though the rounds come
//! from a succession of independently installed sources. Each installed source is a
//! *phase* with a sequential [`Generation`](strata_feed::Generation); round ids handed out
//! by the proxy carry that generation in their upper bits so they resolve forever, long
//! after the source that produced them stopped being current.
//!
//! Swaps are two-step: an admin [`propose`](FeedProxy::propose)s a source, may inspect it
//! through the `peek_proposed_*` calls, and then [`confirm`](FeedProxy::confirm)s exactly
//! that source.

pub mod auth;
pub mod error;
pub mod events;
pub mod proxy;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use auth::{AdminAction, AuthError, Authorize, SingleAdmin};
pub use error::FeedError;
pub use events::{EventLog, EventSink, FeedEvent, TracingSink};
pub use proxy::FeedProxy;
pub use registry::{
	Confirmation, FeedState, Phase, PhaseRegistry, PhaseTable, RegistryWriter, UpgradeStatus,
};
