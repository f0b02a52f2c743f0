//! End-to-end upgrade of a feed from one round book to another.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use strata_book::RoundBook;
use strata_feed::{Generation, RoundId, SourceHandle};
use strata_proxy::{EventLog, FeedError, FeedEvent, FeedProxy, SingleAdmin};

fn gid(generation: u16, local: u64) -> RoundId {
	RoundId::encode(Generation::new(generation), local)
}

#[test]
fn upgrade_keeps_history_addressable() {
	let book_a = Arc::new(RoundBook::new("ETH / USD", 8, 3));
	book_a.submit(1_850, 100, 101);
	book_a.submit(1_870, 200, 201);
	book_a.submit(1_860, 300, 301);
	let a = SourceHandle::from(book_a.clone());

	let log = Arc::new(EventLog::new());
	let proxy = FeedProxy::with_events(a.clone(), SingleAdmin::new("ops"), log.clone());
	assert_eq!(proxy.current_generation(), Generation::FIRST);
	assert_eq!(proxy.latest_round().unwrap(), gid(1, 3));

	let book_b = Arc::new(RoundBook::new("ETH / USD", 8, 4));
	book_b.submit(1_900, 400, 401);
	let b = SourceHandle::from(book_b.clone());

	proxy.propose(&"ops", b.clone()).unwrap();
	let peeked = proxy.peek_proposed_latest_round_data().unwrap();
	assert_eq!((peeked.round_id, peeked.answer), (1, 1_900));
	assert_eq!(proxy.latest_answer().unwrap(), 1_860, "proposal is not live yet");

	assert_eq!(proxy.confirm(&"ops", &b).unwrap(), Generation::new(2));
	assert_eq!(proxy.current_source(), b);

	// New reads land on B under generation 2.
	assert_eq!(proxy.latest_round().unwrap(), gid(2, 1));
	assert_eq!(proxy.latest_answer().unwrap(), 1_900);
	let latest = proxy.latest_round_data().unwrap();
	assert_eq!(latest.round_id, gid(2, 1));
	assert_eq!(latest.answered_in_round, gid(2, 1));

	// Historical ids from A still resolve through both tiers.
	assert_eq!(proxy.answer_at(gid(1, 2)).unwrap(), 1_870);
	assert_eq!(proxy.timestamp_at(gid(1, 2)).unwrap(), 201);
	let old = proxy.round_data(gid(1, 2)).unwrap();
	assert_eq!((old.round_id, old.answer), (gid(1, 2), 1_870));

	// A keeps growing on its own; the proxy can still reach those rounds by id.
	book_a.submit(1_880, 500, 501);
	assert_eq!(proxy.answer_at(gid(1, 4)).unwrap(), 1_880);

	// Generation 3 does not exist yet.
	assert_eq!(proxy.answer_at(gid(3, 1)).unwrap(), 0);
	assert!(matches!(
		proxy.round_data(gid(3, 1)),
		Err(FeedError::UnknownGeneration { .. })
	));

	assert_eq!(log.len(), 2);
	assert_eq!(
		log.events()[1],
		FeedEvent::Confirmed {
			previous: a.addr(),
			current: b.addr(),
			generation: Generation::new(2),
		}
	);
}

#[test]
fn reproposal_supersedes_and_stale_confirm_is_rejected() {
	let a = SourceHandle::from(Arc::new(RoundBook::new("feed", 0, 1)));
	let proxy = FeedProxy::new(a.clone(), SingleAdmin::new(7u64));

	let b = SourceHandle::from(Arc::new(RoundBook::new("feed", 0, 2)));
	let c = SourceHandle::from(Arc::new(RoundBook::new("feed", 0, 3)));
	proxy.propose(&7, b.clone()).unwrap();
	proxy.propose(&7, c.clone()).unwrap();

	assert!(matches!(
		proxy.confirm(&7, &b),
		Err(FeedError::ProposalMismatch { .. })
	));
	assert_eq!(proxy.current_source(), a);
	assert_eq!(proxy.proposed_source(), Some(c.clone()));

	assert_eq!(proxy.confirm(&7, &c).unwrap(), Generation::new(2));
	assert_eq!(proxy.version().unwrap(), 3);
}

#[test]
fn ownership_handover_moves_admin_rights() {
	let a = SourceHandle::from(Arc::new(RoundBook::new("feed", 0, 1)));
	let proxy = FeedProxy::new(a, SingleAdmin::new("alice"));
	let gate = proxy.authorizer();

	gate.transfer_ownership(&"alice", "bob").unwrap();
	assert_eq!(gate.pending_owner(), Some("bob"));
	gate.accept_ownership(&"bob").unwrap();
	assert_eq!(gate.owner(), "bob");

	let b = SourceHandle::from(Arc::new(RoundBook::new("feed", 0, 2)));
	assert!(matches!(
		proxy.propose(&"alice", b.clone()),
		Err(FeedError::Unauthorized(_))
	));
	proxy.propose(&"bob", b.clone()).unwrap();
	proxy.confirm(&"bob", &b).unwrap();
	assert_eq!(proxy.current_generation(), Generation::new(2));
}
