use std::fmt;
use std::str::FromStr;


/// Round number as understood by a single source.
///
/// The value is owned by the source that produced it; this crate never interprets it.
pub type LocalRound = u64;

const LOCAL_BITS: u32 = u64::BITS;
const LOCAL_MASK: u128 = u64::MAX as u128;

/// Sequence number of an installed source.
///
/// Generation `0` is never assigned; the first installed source is generation `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u16);

impl Generation {
	/// Marker for "nothing installed". No registry hands this value out.
	pub const UNASSIGNED: Self = Self(0);
	/// Generation of the source installed at construction.
	pub const FIRST: Self = Self(1);
	/// Last generation the 16-bit counter can represent.
	pub const MAX: Self = Self(u16::MAX);

	/// Wraps a raw generation number.
	pub const fn new(raw: u16) -> Self {
		Self(raw)
	}

	/// Returns the raw generation number.
	#[inline]
	pub const fn get(self) -> u16 {
		self.0
	}

	/// Returns true for every value except [`Generation::UNASSIGNED`].
	#[inline]
	pub const fn is_assigned(self) -> bool {
		self.0 != 0
	}

	/// Returns the following generation, or `None` once the counter is exhausted.
	#[inline]
	pub const fn next(self) -> Option<Self> {
		match self.0.checked_add(1) {
			Some(raw) => Some(Self(raw)),
			None => None,
		}
	}

	/// Zero-based arena slot of an assigned generation.
	#[inline]
	pub const fn slot(self) -> Option<usize> {
		match self.0 {
			0 => None,
			raw => Some(raw as usize - 1),
		}
	}
}

impl From<u16> for Generation {
	fn from(raw: u16) -> Self {
		Self(raw)
	}
}

impl From<Generation> for u16 {
	fn from(generation: Generation) -> Self {
		generation.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

/// Global round identifier, `(generation << 64) | local`.
///
/// Backed by a `u128` so the 80-bit composition can never truncate. Every value of this
/// type lies inside the identifier space: raw integers above [`RoundId::MAX_RAW`] are
/// rejected at construction, which keeps [`RoundId::decode`] total and lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoundId(u128);

impl RoundId {
	/// Largest raw value in the identifier space, `2^80 - 1`.
	pub const MAX_RAW: u128 = (1 << (LOCAL_BITS + u16::BITS)) - 1;
	/// Largest representable identifier.
	pub const MAX: Self = Self(Self::MAX_RAW);

	/// Packs a generation and a source-local round into one identifier.
	#[inline]
	pub const fn encode(generation: Generation, local: LocalRound) -> Self {
		Self(((generation.0 as u128) << LOCAL_BITS) | local as u128)
	}

	/// Splits the identifier back into its generation and source-local round.
	#[inline]
	pub const fn decode(self) -> (Generation, LocalRound) {
		(
			Generation((self.0 >> LOCAL_BITS) as u16),
			(self.0 & LOCAL_MASK) as u64,
		)
	}

	/// Accepts a raw value if it lies inside the 80-bit identifier space.
	#[inline]
	pub const fn from_raw(raw: u128) -> Option<Self> {
		if raw > Self::MAX_RAW {
			None
		} else {
			Some(Self(raw))
		}
	}

	/// Returns the packed value.
	#[inline]
	pub const fn raw(self) -> u128 {
		self.0
	}

	/// Returns the generation component.
	#[inline]
	pub const fn generation(self) -> Generation {
		self.decode().0
	}

	/// Returns the source-local component.
	#[inline]
	pub const fn local(self) -> LocalRound {
		self.decode().1
	}
}

/// Raw round identifier that does not fit the 80-bit identifier space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("round id {0} exceeds the 80-bit identifier space")]
pub struct RoundIdOverflow(pub u128);

impl TryFrom<u128> for RoundId {
	type Error = RoundIdOverflow;

	fn try_from(raw: u128) -> Result<Self, Self::Error> {
		Self::from_raw(raw).ok_or(RoundIdOverflow(raw))
	}
}

impl From<RoundId> for u128 {
	fn from(id: RoundId) -> Self {
		id.0
	}
}

impl fmt::Display for RoundId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

/// Failure to parse a [`RoundId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRoundIdError {
	#[error("invalid round id component: {0}")]
	Int(#[from] std::num::ParseIntError),
	#[error(transparent)]
	Overflow(#[from] RoundIdOverflow),
}

impl FromStr for RoundId {
	type Err = ParseRoundIdError;

	/// Accepts a packed decimal value or the `generation:local` pair form.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		match s.split_once(':') {
			Some((generation, local)) => {
				let generation = Generation(generation.trim().parse()?);
				let local = local.trim().parse()?;
				Ok(Self::encode(generation, local))
			}
			None => Ok(Self::try_from(s.parse::<u128>()?)?),
		}
	}
}
