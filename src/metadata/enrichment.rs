//! Enrichment: merging provider metadata into harvested records.
//!
//! The [`Enricher`] wraps a [`MetadataProvider`] and upgrades sparse source
//! records with artwork, overviews, genres and ratings. The harvest title
//! and year are never replaced: they identify the record. Enrichment is
//! best-effort: a record whose lookup fails keeps its source values and the
//! batch continues.

use std::sync::Arc;

use anyhow::Result;
use filmradar_common::MediaKind;
use tracing::{debug, warn};

use crate::metadata::provider::{select_hit, MetadataProvider};
use crate::quality::score_quality;
use crate::sources::MovieRecord;

/// Enriches harvested records against a metadata provider.
///
/// # Example
///
/// ```rust,ignore
/// let enricher = Enricher::new(provider);
/// let record = enricher.enrich(record).await;
/// ```
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
}

impl Enricher {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Enrich one record. Never fails: on provider errors the record is
    /// returned with its source values intact, and the quality score is
    /// always recomputed from the quality label.
    pub async fn enrich(&self, mut record: MovieRecord) -> MovieRecord {
        record.source_quality_score = score_quality(record.quality.as_deref().unwrap_or(""));

        if !self.provider.is_available() {
            return record;
        }

        match self.lookup(&mut record).await {
            Ok(true) => {
                debug!(title = %record.title, tmdb_id = ?record.tmdb_id, "Record enriched")
            }
            Ok(false) => {
                debug!(title = %record.title, "No provider match, keeping source values")
            }
            Err(error) => {
                warn!(
                    title = %record.title,
                    provider = self.provider.name(),
                    %error,
                    "Enrichment failed, keeping source values"
                );
            }
        }
        record
    }

    /// Search, select and merge. Returns `Ok(false)` when the provider has
    /// no hit for the record.
    async fn lookup(&self, record: &mut MovieRecord) -> Result<bool> {
        let hits = match record.kind {
            MediaKind::Movie => self.provider.search_movie(&record.title, record.year).await?,
            MediaKind::Series => self.provider.search_tv(&record.title, record.year).await?,
        };
        let Some(hit) = select_hit(&hits, record.year) else {
            return Ok(false);
        };
        let hit = hit.clone();

        let details = match record.kind {
            MediaKind::Movie => self.provider.movie_details(hit.id).await?,
            MediaKind::Series => self.provider.tv_details(hit.id).await?,
        };

        // Provider data wins where present; source values remain as
        // fallbacks. Title and year stay untouched: they are the record's
        // identity and episode groups are keyed on the harvest title.
        record.tmdb_id = Some(hit.id);
        if hit.overview.is_some() {
            record.description = hit.overview;
        }
        if hit.vote_average.is_some() {
            record.imdb_rating = hit.vote_average;
        }
        if hit.poster_url.is_some() {
            record.poster_url = hit.poster_url;
        }
        if hit.backdrop_url.is_some() {
            record.backdrop_url = hit.backdrop_url;
        }
        record.popularity = hit.popularity;
        record.vote_count = hit.vote_count;
        record.genres = details.genres;
        record.runtime = details.runtime;
        record.status = details.status;
        record.original_language = details.original_language;

        Ok(true)
    }
}
