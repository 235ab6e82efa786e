//! Row models for the filmradar catalog.

use chrono::{DateTime, Utc};
use filmradar_common::{EpisodeId, MediaKind, MovieId};
use serde::{Deserialize, Serialize};

/// A movie or series row in the catalog.
///
/// Identity is the TMDB id plus kind when `tmdb_id` is set, otherwise the
/// (title, year, kind) tuple matched best-effort by the upsert writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: Option<i32>,
    pub kind: MediaKind,
    pub description: Option<String>,
    /// Free-text encode quality label, e.g. "1080p.WEB-DL".
    pub quality: Option<String>,
    pub imdb_rating: Option<f64>,
    pub tmdb_id: Option<i64>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    /// Integer 0-100 derived from `quality` by the scorer.
    pub source_quality_score: i32,
    pub torrent_release_date: Option<DateTime<Utc>>,
    pub last_episode_date: Option<DateTime<Utc>>,
    pub genres: Vec<String>,
    /// Runtime in minutes (movie runtime, or a representative episode
    /// runtime for series).
    pub runtime: Option<i32>,
    pub status: Option<String>,
    pub original_language: Option<String>,
    pub popularity: Option<f64>,
    pub vote_count: Option<i64>,
    pub last_checked: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// Whether this record counts as "fresh" at `now`: the release date
    /// (movies) or latest-episode date (series) falls within the kind's
    /// recency window.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let reference = match self.kind {
            MediaKind::Movie => self.torrent_release_date,
            MediaKind::Series => self.last_episode_date,
        };
        match reference {
            Some(date) => {
                let age = now.signed_duration_since(date);
                age.num_days() < self.kind.fresh_window_days() && age.num_seconds() >= 0
            }
            None => false,
        }
    }
}

/// An episode row, owned by a series movie row.
///
/// Uniquely keyed by (movie_id, season_number, episode_number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub movie_id: MovieId,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    /// Air date as an ISO-8601 date string (YYYY-MM-DD).
    pub air_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
