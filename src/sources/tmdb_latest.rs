//! TMDB discover feed.
//!
//! Harvests recently released, well-rated movies and series straight from
//! TMDB. These records arrive with the TMDB id and artwork already set, so
//! enrichment only has to fill in detail fields.

use std::sync::Arc;

use chrono::Utc;
use filmradar_common::MediaKind;
use tracing::warn;

use crate::metadata::{SearchHit, TmdbProvider};
use crate::quality::score_quality;
use crate::sources::MovieRecord;

/// Quality assumed for fresh digital releases.
const ASSUMED_QUALITY: &str = "1080p.WEB-DL";

/// Source over the TMDB discover endpoints.
pub struct TmdbLatestSource {
    provider: Arc<TmdbProvider>,
    movie_limit: usize,
    tv_limit: usize,
}

impl TmdbLatestSource {
    pub fn new(provider: Arc<TmdbProvider>, movie_limit: usize, tv_limit: usize) -> Self {
        Self {
            provider,
            movie_limit,
            tv_limit,
        }
    }

    /// Fetch recent movies and series. The movie and TV halves fail
    /// independently: one erroring leaves the other's records intact.
    pub async fn fetch(&self) -> anyhow::Result<Vec<MovieRecord>> {
        let mut records = Vec::new();

        match self.provider.discover_movies().await {
            Ok(hits) => records.extend(
                hits.into_iter()
                    .take(self.movie_limit)
                    .map(|hit| record_from_hit(hit, MediaKind::Movie)),
            ),
            Err(error) => warn!(%error, "TMDB movie discover failed, skipping"),
        }

        match self.provider.discover_tv().await {
            Ok(hits) => records.extend(
                hits.into_iter()
                    .take(self.tv_limit)
                    .map(|hit| record_from_hit(hit, MediaKind::Series)),
            ),
            Err(error) => warn!(%error, "TMDB series discover failed, skipping"),
        }

        Ok(records)
    }
}

fn record_from_hit(hit: SearchHit, kind: MediaKind) -> MovieRecord {
    let now = Utc::now();
    let mut record = MovieRecord::new(hit.title, kind);
    record.year = hit.year;
    record.description = hit.overview;
    record.quality = Some(ASSUMED_QUALITY.to_string());
    record.imdb_rating = hit.vote_average;
    record.tmdb_id = Some(hit.id);
    record.poster_url = hit.poster_url;
    record.backdrop_url = hit.backdrop_url;
    record.source_quality_score = score_quality(ASSUMED_QUALITY);
    record.popularity = hit.popularity;
    record.vote_count = hit.vote_count;
    match kind {
        MediaKind::Movie => record.torrent_release_date = Some(now),
        MediaKind::Series => record.last_episode_date = Some(now),
    }
    record
}
