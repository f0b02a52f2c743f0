//! Shared vocabulary for versioned round feeds.
//!
//! A feed is a time series of `(round, answer, timestamps)` tuples produced by a
//! succession of upstream [`DataSource`]s. Each source numbers its own rounds; the
//! [`RoundId`] codec folds the owning generation into the upper bits so a single
//! identifier stays meaningful across source swaps.

/// Global round identifier codec.
pub mod id;
/// Round payloads returned by sources.
pub mod round;
/// The upstream data source contract and shared handles.
pub mod source;

pub use id::{Generation, LocalRound, ParseRoundIdError, RoundId, RoundIdOverflow};
pub use round::{Answer, RoundData, Timestamp};
pub use source::{DataSource, SourceAddr, SourceError, SourceHandle};
