//! Builds a live proxy from a feed file.

use std::sync::Arc;

use anyhow::{Context, Result};
use strata_book::{Entry, RoundBook};
use strata_feed::{SourceAddr, SourceHandle};
use strata_feed_config::{FeedConfig, SourceConfig};
use strata_proxy::{FeedProxy, SingleAdmin};
use tracing::debug;

/// Proxy assembled from a feed file, plus the configured names of its sources.
pub struct LoadedFeed {
	pub proxy: FeedProxy<SingleAdmin<String>>,
	/// Feed-wide label from `[feed] description`.
	pub description: String,
	names: Vec<(SourceAddr, String)>,
}

impl LoadedFeed {
	/// Installs the configured sources in order, upgrading through the admin workflow.
	pub fn build(config: &FeedConfig) -> Result<Self> {
		let mut sources = Vec::with_capacity(config.sources.len());
		for source in &config.sources {
			let handle = SourceHandle::from(Arc::new(book_from(source)?));
			sources.push((source.name.clone(), handle));
		}

		let admin = config.feed.admin.clone();
		let mut iter = sources.iter();
		let (first_name, first) = iter.next().context("feed has no sources")?;
		debug!(name = %first_name, "installing initial source");
		let proxy = FeedProxy::new(first.clone(), SingleAdmin::new(admin.clone()));

		for (name, handle) in iter {
			proxy
				.propose(&admin, handle.clone())
				.with_context(|| format!("proposing source '{name}'"))?;
			proxy
				.confirm(&admin, handle)
				.with_context(|| format!("confirming source '{name}'"))?;
		}

		let names = sources
			.into_iter()
			.map(|(name, handle)| (handle.addr(), name))
			.collect();
		Ok(Self {
			proxy,
			description: config.feed.description.clone(),
			names,
		})
	}

	/// Configured name of a source, if it came from the feed file.
	pub fn name_of(&self, source: &SourceHandle) -> &str {
		let addr = source.addr();
		self.names
			.iter()
			.find(|(candidate, _)| *candidate == addr)
			.map_or("?", |(_, name)| name.as_str())
	}
}

fn book_from(source: &SourceConfig) -> Result<RoundBook> {
	let book = RoundBook::new(source.description.clone(), source.decimals, source.version);
	for round in &source.rounds {
		book.push(Entry {
			answer: i128::from(round.answer),
			started_at: round.started_at,
			updated_at: round.updated_at,
			answered_in_round: round.answered_in_round,
		})
		.with_context(|| format!("loading rounds of source '{}'", source.name))?;
	}
	Ok(book)
}
