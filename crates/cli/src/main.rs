//! `strata` binary.
//!
//! Loads a feed file, replays its sources through the propose/confirm workflow, and
//! answers queries against the resulting proxy. `encode` and `decode` work without a feed.

mod cli;
mod feed;

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, FeedCommand};
use feed::LoadedFeed;
use strata_feed::{Generation, RoundData, RoundId};
use strata_feed_config::FeedConfig;
use tracing::info;

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Encode { generation, local } => {
			let id = RoundId::encode(Generation::new(generation), local);
			println!("{id}");
		}
		Command::Decode { id } => {
			let id: RoundId = id.parse().context("parsing round id")?;
			let (generation, local) = id.decode();
			println!("generation {generation} local {local}");
		}
		Command::Feed(command) => {
			let Some(path) = cli.config.as_deref() else {
				bail!("--config is required for this command");
			};
			let feed = load(path)?;
			run_feed_command(&feed, command)?;
		}
	}
	Ok(())
}

fn load(path: &Path) -> Result<LoadedFeed> {
	let config = FeedConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
	let feed = LoadedFeed::build(&config)?;
	info!(
		path = %path.display(),
		generation = %feed.proxy.current_generation(),
		"feed loaded"
	);
	Ok(feed)
}

fn run_feed_command(feed: &LoadedFeed, command: FeedCommand) -> Result<()> {
	let proxy = &feed.proxy;
	match command {
		FeedCommand::Phases => print!("{}", render_phases(feed)?),
		FeedCommand::Latest => print_round(&proxy.latest_round_data()?),
		FeedCommand::Round { id } => print_round(&proxy.round_data(parse_raw_id(&id)?)?),
		FeedCommand::Answer { id } => println!("{}", proxy.answer_at(parse_raw_id(&id)?)?),
		FeedCommand::Timestamp { id } => println!("{}", proxy.timestamp_at(parse_raw_id(&id)?)?),
	}
	Ok(())
}

/// Lists every phase, marking the current one, under the feed's own description.
fn render_phases(feed: &LoadedFeed) -> Result<String> {
	let proxy = &feed.proxy;
	let current = proxy.current_generation();
	let mut out = String::new();
	writeln!(out, "feed {:?}", feed.description)?;
	for phase in proxy.phases() {
		let marker = if phase.generation == current { "*" } else { " " };
		let latest = phase.source.latest_round()?;
		writeln!(
			out,
			"{marker} {:>5}  {:<16} {}  latest {}",
			phase.generation,
			feed.name_of(&phase.source),
			phase.source.addr(),
			RoundId::encode(phase.generation, latest),
		)?;
	}
	writeln!(
		out,
		"source description {:?} decimals {} version {}",
		proxy.description()?,
		proxy.decimals()?,
		proxy.version()?
	)?;
	Ok(out)
}

/// Parses an id without range checks, so legacy lookups can see out-of-range values.
fn parse_raw_id(text: &str) -> Result<u128> {
	if text.contains(':') {
		let id: RoundId = text.parse().context("parsing round id")?;
		Ok(id.raw())
	} else {
		text.trim().parse().context("parsing round id")
	}
}

fn print_round(data: &RoundData) {
	let (generation, local) = data.round_id.decode();
	println!("round {} (generation {generation} local {local})", data.round_id);
	println!("answer {}", data.answer);
	println!("started_at {}", data.started_at);
	println!("updated_at {}", data.updated_at);
	println!("answered_in_round {}", data.answered_in_round);
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("strata=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
