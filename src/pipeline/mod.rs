//! The harvest pipeline: collect, enrich, persist.
//!
//! A run harvests records from every enabled source, enriches them with
//! bounded concurrency, then upserts movies and episodes. Per-record
//! failures are logged and skipped so one bad record never aborts a run.

pub mod writer;

use filmradar_common::Result;
use filmradar_db::pool::DbPool;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::info;

use crate::metadata::Enricher;
use crate::sources::{SourceKind, SourceSet};

/// Per-run options, typically derived from the trigger request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Cap the number of records that go through enrichment.
    pub limit: Option<usize>,
    /// Restrict the harvest to a single source.
    pub source: Option<SourceKind>,
}

/// What a completed run wrote.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PipelineReport {
    pub processed_movies: usize,
    pub processed_episodes: usize,
}

/// One configured pipeline instance, shared by the server and the CLI.
pub struct Pipeline {
    sources: SourceSet,
    enricher: Enricher,
    pool: DbPool,
    enrich_concurrency: usize,
}

impl Pipeline {
    pub fn new(
        sources: SourceSet,
        enricher: Enricher,
        pool: DbPool,
        enrich_concurrency: usize,
    ) -> Self {
        Self {
            sources,
            enricher,
            pool,
            enrich_concurrency,
        }
    }

    /// Execute one full harvest pass.
    ///
    /// Enrichment runs `enrich_concurrency` records at a time; `buffered`
    /// preserves harvest order so writes stay deterministic.
    pub async fn run(&self, options: &PipelineOptions) -> Result<PipelineReport> {
        info!(
            source = ?options.source,
            limit = ?options.limit,
            "Starting harvest run"
        );

        let mut harvest = self.sources.collect(options.source).await;
        if let Some(limit) = options.limit {
            harvest.movies.truncate(limit);
        }
        info!(
            movies = harvest.movies.len(),
            episode_groups = harvest.episodes.len(),
            "Harvest collected"
        );

        let enriched: Vec<_> = stream::iter(harvest.movies)
            .map(|record| self.enricher.enrich(record))
            .buffered(self.enrich_concurrency)
            .collect()
            .await;

        let processed_movies = writer::write_movies(&self.pool, &enriched)?;
        let processed_episodes = writer::write_episodes(&self.pool, &harvest.episodes)?;

        let report = PipelineReport {
            processed_movies,
            processed_episodes,
        };
        info!(
            movies = report.processed_movies,
            episodes = report.processed_episodes,
            "Harvest run finished"
        );
        Ok(report)
    }
}
