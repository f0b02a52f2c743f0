use std::sync::Arc;

use proptest::prelude::*;
use strata_feed::Generation;

use super::phase::SEGMENT_LEN;
use super::{Phase, PhaseRegistry, PhaseTable, UpgradeStatus};
use crate::error::FeedError;
use crate::test_fixtures::fixture;

#[test]
fn test_new_registry_starts_at_first_generation() {
	let a = fixture(1, 3);
	let registry = PhaseRegistry::new(a.clone());

	let current = registry.current();
	assert_eq!(current.generation, Generation::FIRST);
	assert_eq!(current.source, a);
	assert_eq!(registry.lookup(Generation::FIRST), Some(a));
	assert_eq!(registry.lookup(Generation::UNASSIGNED), None);
	assert_eq!(registry.lookup(Generation::new(2)), None);
	assert_eq!(registry.snapshot().upgrade_status(), UpgradeStatus::Stable);
}

#[test]
fn test_generations_are_dense_and_ordered() {
	let registry = PhaseRegistry::new(fixture(1, 1));
	let mut writer = registry.writer();
	for tag in 2..=6 {
		let phase = writer.install(fixture(tag, 1)).unwrap();
		assert_eq!(phase.generation, Generation::new(tag as u16));
	}
	drop(writer);

	let snap = registry.snapshot();
	let generations: Vec<u16> = snap.phases().iter().map(|p| p.generation.get()).collect();
	assert_eq!(generations, vec![1, 2, 3, 4, 5, 6]);
	assert_eq!(snap.current().generation, Generation::new(6));
	assert_eq!(snap.phases().latest(), Some(snap.current()));
}

#[test]
fn test_pinned_snapshot_survives_install() {
	let a = fixture(1, 1);
	let registry = PhaseRegistry::new(a.clone());
	let before = registry.snapshot();

	let b = fixture(2, 1);
	registry.writer().install(b.clone()).unwrap();

	assert_eq!(before.current().source, a);
	assert_eq!(before.lookup(Generation::new(2)), None);
	assert_eq!(registry.current().source, b);
	assert!(!Arc::ptr_eq(&before, &registry.snapshot()));
}

#[test]
fn test_install_keeps_pending_proposal() {
	let registry = PhaseRegistry::new(fixture(1, 1));
	let staged = fixture(9, 1);
	let mut writer = registry.writer();
	writer.propose(staged.clone());
	writer.install(fixture(2, 1)).unwrap();
	drop(writer);

	assert_eq!(registry.snapshot().proposed(), Some(&staged));
}

#[test]
fn test_propose_overwrites_and_confirm_clears() {
	let a = fixture(1, 1);
	let b = fixture(2, 1);
	let c = fixture(3, 1);
	let registry = PhaseRegistry::new(a.clone());

	let mut writer = registry.writer();
	assert_eq!(writer.propose(b.clone()), None);
	assert_eq!(writer.propose(c.clone()), Some(b));

	let confirmation = writer.confirm(&c).unwrap();
	drop(writer);

	assert_eq!(
		confirmation.previous,
		Phase {
			generation: Generation::FIRST,
			source: a
		}
	);
	assert_eq!(confirmation.current.generation, Generation::new(2));
	assert_eq!(confirmation.current.source, c);

	let snap = registry.snapshot();
	assert_eq!(snap.proposed(), None);
	assert_eq!(snap.upgrade_status(), UpgradeStatus::Stable);
}

#[test]
fn test_mismatched_confirm_changes_nothing() {
	let a = fixture(1, 1);
	let registry = PhaseRegistry::new(a.clone());
	let pending = fixture(2, 1);
	let other = fixture(2, 1);

	let mut writer = registry.writer();
	writer.propose(pending.clone());
	let before = writer.state();

	let err = writer.confirm(&other).unwrap_err();
	assert!(matches!(
		err,
		FeedError::ProposalMismatch { pending: p, offered: o }
			if p == pending.addr() && o == other.addr()
	));
	assert!(Arc::ptr_eq(&before, &writer.state()), "failed confirm must not publish");
	drop(writer);

	assert_eq!(registry.current().source, a);
	assert_eq!(registry.current().generation, Generation::FIRST);
	assert_eq!(
		registry.snapshot().upgrade_status(),
		UpgradeStatus::Proposed(pending.addr())
	);
}

#[test]
fn test_confirm_without_proposal() {
	let registry = PhaseRegistry::new(fixture(1, 1));
	let err = registry.writer().confirm(&fixture(2, 1)).unwrap_err();
	assert!(matches!(err, FeedError::NoProposal));
	assert_eq!(registry.snapshot().phases().len(), 1);
}

#[test]
fn test_lookups_cross_segment_boundaries() {
	let count = SEGMENT_LEN * 2 + 3;
	let sources: Vec<_> = (0..count).map(|i| fixture(i as i128, 1)).collect();
	let (mut table, _) = PhaseTable::first(sources[0].clone());
	let mut snapshots = Vec::new();
	for source in &sources[1..] {
		snapshots.push(table.clone());
		table = table.appended(source.clone()).unwrap().0;
	}

	assert_eq!(table.len(), count);
	assert_eq!(table.latest_generation(), Generation::new(count as u16));
	for (i, source) in sources.iter().enumerate() {
		let phase = table.get(Generation::new(i as u16 + 1)).unwrap();
		assert_eq!(&phase.source, source);
	}
	assert_eq!(table.get(Generation::new(count as u16 + 1)), None);

	let generations: Vec<u16> = table.iter().map(|p| p.generation.get()).collect();
	let expected: Vec<u16> = (1..=count as u16).collect();
	assert_eq!(generations, expected);

	for earlier in &snapshots {
		assert!(earlier.sealed_shared_with(&table));
	}
}

#[test]
fn test_boundary_latest_is_last_sealed_phase() {
	let (mut table, _) = PhaseTable::first(fixture(0, 1));
	for tag in 1..SEGMENT_LEN {
		table = table.appended(fixture(tag as i128, 1)).unwrap().0;
	}

	assert_eq!(table.len(), SEGMENT_LEN);
	assert_eq!(table.latest_generation(), Generation::new(SEGMENT_LEN as u16));
	let (next, phase) = table.appended(fixture(-1, 1)).unwrap();
	assert_eq!(phase.generation, Generation::new(SEGMENT_LEN as u16 + 1));
	assert_eq!(next.latest(), Some(&phase));
}

#[test]
fn test_full_table_reports_exhaustion() {
	let source = fixture(1, 1);
	let (mut table, _) = PhaseTable::first(source.clone());
	for _ in 1..u16::MAX {
		table = table.appended(source.clone()).unwrap().0;
	}

	assert_eq!(table.len(), usize::from(u16::MAX));
	assert_eq!(table.latest_generation(), Generation::MAX);
	assert!(matches!(
		table.appended(fixture(2, 1)),
		Err(FeedError::GenerationExhausted(g)) if g == Generation::MAX
	));
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	#[test]
	fn prop_every_generation_resolves_to_its_source(count in 1usize..48) {
		let sources: Vec<_> = (0..count).map(|i| fixture(i as i128, 1)).collect();
		let registry = PhaseRegistry::new(sources[0].clone());
		{
			let mut writer = registry.writer();
			for source in &sources[1..] {
				writer.install(source.clone()).unwrap();
			}
		}

		let snap = registry.snapshot();
		prop_assert_eq!(snap.phases().len(), count);
		for (i, source) in sources.iter().enumerate() {
			let generation = Generation::new(i as u16 + 1);
			prop_assert_eq!(snap.lookup(generation), Some(source));
		}
		prop_assert_eq!(snap.lookup(Generation::new(count as u16 + 1)), None);
	}
}
