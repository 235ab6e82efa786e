//! Release sources: where harvested records come from.
//!
//! Each source turns an external feed (TMDB discover, YTS, EZTV) or a
//! built-in table (curated) into [`MovieRecord`]s. Sources are independent:
//! one failing feed is logged and skipped, the others still contribute.

pub mod curated;
pub mod eztv;
pub mod tmdb_latest;
pub mod yts;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use filmradar_common::MediaKind;
use tracing::{info, warn};

use crate::config::SourcesConfig;
use crate::metadata::TmdbProvider;
use crate::quality::DEFAULT_SCORE;

/// A harvested release before persistence.
///
/// Records start sparse (title, kind, maybe a quality label) and are filled
/// in by enrichment before the writer upserts them.
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub title: String,
    pub year: Option<i32>,
    pub kind: MediaKind,
    pub description: Option<String>,
    pub quality: Option<String>,
    pub imdb_rating: Option<f64>,
    pub tmdb_id: Option<i64>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub source_quality_score: i32,
    pub torrent_release_date: Option<DateTime<Utc>>,
    pub last_episode_date: Option<DateTime<Utc>>,
    pub genres: Vec<String>,
    pub runtime: Option<i32>,
    pub status: Option<String>,
    pub original_language: Option<String>,
    pub popularity: Option<f64>,
    pub vote_count: Option<i64>,
}

impl MovieRecord {
    /// A sparse record with only identity fields set.
    pub fn new(title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            title: title.into(),
            year: None,
            kind,
            description: None,
            quality: None,
            imdb_rating: None,
            tmdb_id: None,
            poster_url: None,
            backdrop_url: None,
            source_quality_score: DEFAULT_SCORE,
            torrent_release_date: None,
            last_episode_date: None,
            genres: Vec::new(),
            runtime: None,
            status: None,
            original_language: None,
            popularity: None,
            vote_count: None,
        }
    }
}

/// An episode observed by a source, keyed by season and episode number
/// within its series.
#[derive(Debug, Clone)]
pub struct EpisodeDraft {
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    /// Air date as YYYY-MM-DD when the feed provides one.
    pub air_date: Option<String>,
}

/// Episodes grouped under the (localized) series title they belong to.
#[derive(Debug, Clone)]
pub struct SeriesEpisodes {
    pub series_title: String,
    pub episodes: Vec<EpisodeDraft>,
}

/// Everything one harvest pass produced.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub movies: Vec<MovieRecord>,
    pub episodes: Vec<SeriesEpisodes>,
}

/// Identifies a single source, for restricting a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Tmdb,
    Yts,
    Eztv,
    Curated,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Tmdb => "tmdb",
            SourceKind::Yts => "yts",
            SourceKind::Eztv => "eztv",
            SourceKind::Curated => "curated",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SourceKind {
    type Err = filmradar_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tmdb" => Ok(SourceKind::Tmdb),
            "yts" => Ok(SourceKind::Yts),
            "eztv" => Ok(SourceKind::Eztv),
            "curated" => Ok(SourceKind::Curated),
            other => Err(filmradar_common::Error::invalid_input(format!(
                "unknown source: {other} (expected tmdb, yts, eztv or curated)"
            ))),
        }
    }
}

/// The set of configured sources, collected once per pipeline run.
pub struct SourceSet {
    tmdb: Option<tmdb_latest::TmdbLatestSource>,
    yts: Option<yts::YtsClient>,
    eztv: Option<eztv::EztvClient>,
    curated_enabled: bool,
}

impl SourceSet {
    pub fn from_config(config: &SourcesConfig, provider: Arc<TmdbProvider>) -> Self {
        let tmdb = config.tmdb_enabled.then(|| {
            tmdb_latest::TmdbLatestSource::new(
                provider,
                config.tmdb_movie_limit,
                config.tmdb_tv_limit,
            )
        });
        let yts = config
            .yts_enabled
            .then(|| yts::YtsClient::new(config.yts_base_url.clone(), config.yts_limit));
        let eztv = config
            .eztv_enabled
            .then(|| eztv::EztvClient::new(config.eztv_base_url.clone(), config.eztv_limit));

        Self {
            tmdb,
            yts,
            eztv,
            curated_enabled: config.curated_enabled,
        }
    }

    /// Collect from every enabled source, or just `only` when given.
    ///
    /// Source failures are absorbed here: a feed that errors contributes
    /// nothing and the harvest continues.
    pub async fn collect(&self, only: Option<SourceKind>) -> Harvest {
        let enabled = |kind: SourceKind| only.is_none_or(|o| o == kind);
        let mut harvest = Harvest::default();

        if enabled(SourceKind::Tmdb) {
            if let Some(source) = &self.tmdb {
                match source.fetch().await {
                    Ok(records) => {
                        info!(source = "tmdb", count = records.len(), "Source harvested");
                        harvest.movies.extend(records);
                    }
                    Err(error) => {
                        warn!(source = "tmdb", %error, "Source fetch failed, skipping")
                    }
                }
            }
        }

        if enabled(SourceKind::Yts) {
            if let Some(client) = &self.yts {
                match client.fetch().await {
                    Ok(records) => {
                        info!(source = "yts", count = records.len(), "Source harvested");
                        harvest.movies.extend(records);
                    }
                    Err(error) => warn!(source = "yts", %error, "Source fetch failed, skipping"),
                }
            }
        }

        if enabled(SourceKind::Eztv) {
            if let Some(client) = &self.eztv {
                match client.fetch().await {
                    Ok((records, episodes)) => {
                        info!(
                            source = "eztv",
                            series = records.len(),
                            groups = episodes.len(),
                            "Source harvested"
                        );
                        harvest.movies.extend(records);
                        harvest.episodes.extend(episodes);
                    }
                    Err(error) => warn!(source = "eztv", %error, "Source fetch failed, skipping"),
                }
            }
        }

        if enabled(SourceKind::Curated) && self.curated_enabled {
            let records = curated::releases();
            info!(source = "curated", count = records.len(), "Source harvested");
            harvest.movies.extend(records);
        }

        harvest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_round_trips_through_str() {
        for kind in [
            SourceKind::Tmdb,
            SourceKind::Yts,
            SourceKind::Eztv,
            SourceKind::Curated,
        ] {
            assert_eq!(kind.to_string().parse::<SourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn source_kind_rejects_unknown_names() {
        assert!("rarbg".parse::<SourceKind>().is_err());
    }

    #[test]
    fn new_record_is_sparse() {
        let record = MovieRecord::new("Barbie", MediaKind::Movie);
        assert_eq!(record.title, "Barbie");
        assert_eq!(record.kind, MediaKind::Movie);
        assert_eq!(record.source_quality_score, DEFAULT_SCORE);
        assert!(record.tmdb_id.is_none());
        assert!(record.genres.is_empty());
    }
}
