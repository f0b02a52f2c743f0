//! Feed configuration.
//!
//! A feed file names the admin and lists the sources that make up the feed, in the order
//! they were installed. The first source becomes generation 1, the next generation 2, and
//! so on.
//!
//! ```toml
//! [feed]
//! description = "ETH / USD"
//! admin = "ops"
//!
//! [[source]]
//! name = "aggregator-a"
//! description = "ETH / USD"
//! decimals = 8
//! version = 4
//! rounds = [
//!     { answer = 185000000000, started_at = 1700000000, updated_at = 1700000010 },
//! ]
//! ```

pub mod error;

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};


/// Parsed and validated feed file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
	pub feed: FeedSection,
	/// Sources in installation order.
	#[serde(rename = "source")]
	pub sources: Vec<SourceConfig>,
}

/// Feed-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedSection {
	#[serde(default)]
	pub description: String,
	/// Identity allowed to propose and confirm sources.
	pub admin: String,
}

/// One upstream source and its recorded rounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub decimals: u8,
	#[serde(default = "default_version")]
	pub version: u64,
	/// Rounds numbered from 1 in listing order.
	#[serde(default)]
	pub rounds: Vec<RoundConfig>,
}

/// One recorded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoundConfig {
	/// TOML integers are 64-bit; widened to the feed answer type when loaded.
	pub answer: i64,
	pub started_at: u64,
	pub updated_at: u64,
	/// Round the answer was computed in, when it differs from this round.
	pub answered_in_round: Option<u64>,
}

fn default_version() -> u64 {
	1
}

impl FeedConfig {
	/// Reads and validates a feed file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		text.parse()
	}

	/// Checks the cross-field rules serde cannot express.
	pub fn validate(&self) -> Result<()> {
		if self.sources.is_empty() {
			return Err(ConfigError::Invalid("at least one [[source]] is required".into()));
		}
		if self.sources.len() > usize::from(u16::MAX) {
			return Err(ConfigError::Invalid(format!(
				"{} sources exceed the {} generations available",
				self.sources.len(),
				u16::MAX
			)));
		}

		let mut names = HashSet::new();
		for source in &self.sources {
			if !names.insert(source.name.as_str()) {
				return Err(ConfigError::Invalid(format!(
					"duplicate source name '{}'",
					source.name
				)));
			}
			for (index, round) in source.rounds.iter().enumerate() {
				let number = index as u64 + 1;
				if round.updated_at < round.started_at {
					return Err(ConfigError::Invalid(format!(
						"source '{}' round {number}: updated_at precedes started_at",
						source.name
					)));
				}
				if let Some(answered) = round.answered_in_round
					&& !(1..=number).contains(&answered)
				{
					return Err(ConfigError::Invalid(format!(
						"source '{}' round {number}: answered_in_round {answered} out of range",
						source.name
					)));
				}
			}
		}
		Ok(())
	}
}

impl FromStr for FeedConfig {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self> {
		let config: Self = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}
