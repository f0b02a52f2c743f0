use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect a versioned round feed.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Inspect a feed stitched together from successive round sources")]
pub struct Cli {
	/// Feed description file (TOML)
	#[arg(short, long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Pack a generation and a source-local round into a round id
	Encode { generation: u16, local: u64 },
	/// Split a round id into generation and source-local round
	Decode {
		/// Decimal id or `generation:local`
		id: String,
	},
	#[command(flatten)]
	Feed(FeedCommand),
}

/// Commands that query a feed loaded from `--config`.
#[derive(Subcommand, Debug)]
pub enum FeedCommand {
	/// List every phase of the feed
	Phases,
	/// Show the latest round
	Latest,
	/// Show full data for a round (fails on unknown generations)
	Round {
		/// Decimal id or `generation:local`
		id: String,
	},
	/// Legacy answer lookup (0 for unknown rounds)
	Answer {
		/// Decimal id or `generation:local`
		id: String,
	},
	/// Legacy timestamp lookup (0 for unknown rounds)
	Timestamp {
		/// Decimal id or `generation:local`
		id: String,
	},
}
