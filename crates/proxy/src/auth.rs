//! Authorization for administrative calls.
//!
//! The proxy asks an [`Authorize`] implementation before every mutating call and never
//! assumes an identity model of its own. [`SingleAdmin`] is the stock implementation: one
//! owner, handed over in two steps so a typo cannot strand the feed without an admin.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

/// Operations that require authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
	/// Stage a new source.
	Propose,
	/// Install the staged source.
	Confirm,
	/// Nominate a new owner.
	TransferOwnership,
}

impl fmt::Display for AdminAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Propose => "propose",
			Self::Confirm => "confirm",
			Self::TransferOwnership => "transfer ownership",
		})
	}
}

/// Rejection from an [`Authorize`] check or an ownership handover.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	#[error("caller is not allowed to {action}")]
	Denied { action: AdminAction },
	#[error("only the nominated owner may accept ownership")]
	NotPendingOwner,
	#[error("cannot transfer ownership to the current owner")]
	SelfTransfer,
}

/// Predicate consulted before every mutating call.
pub trait Authorize: Send + Sync {
	/// Identity presented by callers.
	type Caller: ?Sized;

	/// Returns `Ok` if `caller` may perform `action`.
	fn authorize(&self, caller: &Self::Caller, action: AdminAction) -> Result<(), AuthError>;
}

impl<A> Authorize for Arc<A>
where
	A: Authorize + ?Sized,
{
	type Caller = A::Caller;

	fn authorize(&self, caller: &Self::Caller, action: AdminAction) -> Result<(), AuthError> {
		(**self).authorize(caller, action)
	}
}

struct Ownership<Id> {
	owner: Id,
	pending: Option<Id>,
}

/// Single-owner gate with two-step handover.
pub struct SingleAdmin<Id> {
	state: Mutex<Ownership<Id>>,
}

impl<Id> SingleAdmin<Id>
where
	Id: Clone + Eq + fmt::Debug + Send,
{
	/// Creates a gate owned by `owner`.
	pub fn new(owner: Id) -> Self {
		Self {
			state: Mutex::new(Ownership {
				owner,
				pending: None,
			}),
		}
	}

	/// Returns the current owner.
	pub fn owner(&self) -> Id {
		self.state.lock().owner.clone()
	}

	/// Returns the nominated owner, if a handover is in progress.
	pub fn pending_owner(&self) -> Option<Id> {
		self.state.lock().pending.clone()
	}

	/// Nominates `to` as the next owner. Replaces any earlier nomination.
	pub fn transfer_ownership(&self, caller: &Id, to: Id) -> Result<(), AuthError> {
		let mut state = self.state.lock();
		if *caller != state.owner {
			return Err(AuthError::Denied {
				action: AdminAction::TransferOwnership,
			});
		}
		if to == state.owner {
			return Err(AuthError::SelfTransfer);
		}
		info!(from = ?state.owner, to = ?to, "ownership transfer requested");
		state.pending = Some(to);
		Ok(())
	}

	/// Completes a handover. Only the nominated owner may call this.
	pub fn accept_ownership(&self, caller: &Id) -> Result<(), AuthError> {
		let mut state = self.state.lock();
		if state.pending.as_ref() != Some(caller) {
			return Err(AuthError::NotPendingOwner);
		}
		state.pending = None;
		let previous = std::mem::replace(&mut state.owner, caller.clone());
		info!(from = ?previous, to = ?caller, "ownership transferred");
		Ok(())
	}
}

impl<Id> Authorize for SingleAdmin<Id>
where
	Id: Clone + Eq + fmt::Debug + Send,
{
	type Caller = Id;

	fn authorize(&self, caller: &Id, action: AdminAction) -> Result<(), AuthError> {
		if self.state.lock().owner == *caller {
			Ok(())
		} else {
			Err(AuthError::Denied { action })
		}
	}
}

impl<Id: fmt::Debug> fmt::Debug for SingleAdmin<Id> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("SingleAdmin")
			.field("owner", &state.owner)
			.field("pending", &state.pending)
			.finish()
	}
}
