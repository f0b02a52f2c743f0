use std::sync::Arc;

use strata_feed::{Generation, SourceHandle};

use crate::error::FeedError;

/// Phases per sealed segment.
pub(super) const SEGMENT_LEN: usize = 256;

/// One installed source and the generation it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
	pub generation: Generation,
	pub source: SourceHandle,
}

/// Append-only arena of phases addressed by generation.
///
/// Slot `i` always holds generation `i + 1`. Slots are stored in full segments of
/// [`SEGMENT_LEN`] phases followed by a partial tail. Sealed segments are never copied again,
/// so growing a table clones at most one tail and the segment index, and successive tables
/// share every sealed segment.
#[derive(Debug, Clone, Default)]
pub struct PhaseTable {
	sealed: Arc<[Arc<[Phase]>]>,
	tail: Arc<[Phase]>,
}

impl PhaseTable {
	/// Returns the phase for `generation`, if it was ever installed.
	#[inline]
	pub fn get(&self, generation: Generation) -> Option<&Phase> {
		let slot = generation.slot()?;
		let (segment, offset) = (slot / SEGMENT_LEN, slot % SEGMENT_LEN);
		match self.sealed.get(segment) {
			Some(sealed) => sealed.get(offset),
			None if segment == self.sealed.len() => self.tail.get(offset),
			None => None,
		}
	}

	/// Returns the highest-generation phase.
	#[inline]
	pub fn latest(&self) -> Option<&Phase> {
		self.tail
			.last()
			.or_else(|| self.sealed.last().and_then(|segment| segment.last()))
	}

	/// Returns the highest assigned generation, or [`Generation::UNASSIGNED`] if empty.
	pub fn latest_generation(&self) -> Generation {
		self.latest()
			.map_or(Generation::UNASSIGNED, |phase| phase.generation)
	}

	/// Returns a one-entry table holding `source` as [`Generation::FIRST`].
	pub(crate) fn first(source: SourceHandle) -> (Self, Phase) {
		let phase = Phase {
			generation: Generation::FIRST,
			source,
		};
		let table = Self {
			sealed: Arc::default(),
			tail: Arc::new([phase.clone()]),
		};
		(table, phase)
	}

	/// Returns a table with `source` installed under the next generation.
	pub(crate) fn appended(&self, source: SourceHandle) -> Result<(Self, Phase), FeedError> {
		let last = self.latest_generation();
		let generation = last.next().ok_or(FeedError::GenerationExhausted(last))?;

		if self.get(generation).is_some() {
			return Err(FeedError::PhaseExists(generation));
		}
		debug_assert_eq!(generation.slot(), Some(self.len()));

		let phase = Phase { generation, source };
		let mut tail = Vec::with_capacity(self.tail.len() + 1);
		tail.extend_from_slice(&self.tail);
		tail.push(phase.clone());

		let table = if tail.len() == SEGMENT_LEN {
			let sealed = self
				.sealed
				.iter()
				.cloned()
				.chain(std::iter::once(Arc::from(tail)))
				.collect();
			Self {
				sealed,
				tail: Arc::default(),
			}
		} else {
			Self {
				sealed: self.sealed.clone(),
				tail: Arc::from(tail),
			}
		};
		Ok((table, phase))
	}

	/// Iterates phases in generation order.
	pub fn iter(&self) -> impl Iterator<Item = &Phase> + '_ {
		self.sealed
			.iter()
			.flat_map(|segment| segment.iter())
			.chain(self.tail.iter())
	}

	pub fn len(&self) -> usize {
		self.sealed.len() * SEGMENT_LEN + self.tail.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sealed.is_empty() && self.tail.is_empty()
	}

	/// Returns whether every sealed segment of `self` is stored by reference in `later`.
	#[cfg(test)]
	pub(super) fn sealed_shared_with(&self, later: &Self) -> bool {
		self.sealed.len() <= later.sealed.len()
			&& self
				.sealed
				.iter()
				.zip(later.sealed.iter())
				.all(|(a, b)| Arc::ptr_eq(a, b))
	}
}
