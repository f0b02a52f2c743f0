use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::id::LocalRound;
use crate::round::{Answer, RoundData, Timestamp};


/// Upstream provider of round-indexed values.
///
/// Implementations own their round numbering and storage. Callers treat every method as
/// synchronous and non-retryable: an `Err` is reported to the caller as-is.
pub trait DataSource: Send + Sync {
	/// Answer of the most recent round.
	fn latest_answer(&self) -> Result<Answer, SourceError>;

	/// Update time of the most recent round.
	fn latest_timestamp(&self) -> Result<Timestamp, SourceError>;

	/// Number of the most recent round.
	fn latest_round(&self) -> Result<LocalRound, SourceError>;

	/// Answer recorded for `round`.
	fn answer_at(&self, round: LocalRound) -> Result<Answer, SourceError>;

	/// Update time recorded for `round`.
	fn timestamp_at(&self, round: LocalRound) -> Result<Timestamp, SourceError>;

	/// Full data for `round`.
	fn round_data(&self, round: LocalRound) -> Result<RoundData<LocalRound>, SourceError>;

	/// Full data for the most recent round.
	fn latest_round_data(&self) -> Result<RoundData<LocalRound>, SourceError>;

	/// Number of decimals in each answer.
	fn decimals(&self) -> Result<u8, SourceError>;

	/// Implementation version of the source.
	fn version(&self) -> Result<u64, SourceError>;

	/// Human readable description of what the source reports.
	fn description(&self) -> Result<String, SourceError>;
}

/// Failure reported by a [`DataSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	/// The requested round has no data.
	#[error("no data present")]
	NoData,
	/// The source cannot answer right now.
	#[error("source unavailable: {0}")]
	Unavailable(String),
	#[error(transparent)]
	Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Identity of a source handle, stable for as long as any handle to it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceAddr(usize);

impl fmt::Display for SourceAddr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// Shared handle to an externally constructed [`DataSource`].
///
/// Holding a handle never configures or tears down the source. Two handles are equal when
/// they point at the same source instance, regardless of the source's contents.
#[derive(Clone)]
pub struct SourceHandle(Arc<dyn DataSource>);

impl SourceHandle {
	/// Wraps a shared source.
	pub fn new(source: Arc<dyn DataSource>) -> Self {
		Self(source)
	}

	/// Address identifying the underlying source instance.
	#[inline]
	pub fn addr(&self) -> SourceAddr {
		SourceAddr(Arc::as_ptr(&self.0).cast::<()>().addr())
	}

	/// Returns true if both handles point at the same source instance.
	#[inline]
	pub fn same_as(&self, other: &Self) -> bool {
		self.addr() == other.addr()
	}
}

impl<S> From<Arc<S>> for SourceHandle
where
	S: DataSource + 'static,
{
	fn from(source: Arc<S>) -> Self {
		Self(source)
	}
}

impl Deref for SourceHandle {
	type Target = dyn DataSource;

	fn deref(&self) -> &Self::Target {
		&*self.0
	}
}

impl PartialEq for SourceHandle {
	fn eq(&self, other: &Self) -> bool {
		self.same_as(other)
	}
}

impl Eq for SourceHandle {}

impl fmt::Debug for SourceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SourceHandle").field(&self.addr()).finish()
	}
}
