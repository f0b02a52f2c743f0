use strata_feed::{Generation, RoundId, RoundIdOverflow, SourceAddr, SourceError};

use crate::auth::AuthError;

/// Errors surfaced by the proxy.
///
/// Only the recommended read tier and the admin surface produce the addressing variants;
/// the legacy tier answers those cases with a zero sentinel instead.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
	/// The round id names a generation that was never installed.
	#[error("round {round} belongs to unknown generation {generation}")]
	UnknownGeneration {
		round: RoundId,
		generation: Generation,
	},
	#[error(transparent)]
	RoundOutOfRange(#[from] RoundIdOverflow),
	/// Confirm or peek was called with nothing proposed.
	#[error("no upgrade proposal is pending")]
	NoProposal,
	/// Confirm was called with a source other than the pending one.
	#[error("invalid argument: source {offered} is not the pending proposal {pending}")]
	ProposalMismatch {
		pending: SourceAddr,
		offered: SourceAddr,
	},
	/// The 16-bit generation counter has no successor.
	#[error("generation counter exhausted at {0}")]
	GenerationExhausted(Generation),
	/// The next generation's slot was already occupied.
	#[error("phase for generation {0} is already registered")]
	PhaseExists(Generation),
	#[error(transparent)]
	Unauthorized(#[from] AuthError),
	#[error(transparent)]
	Source(#[from] SourceError),
}
