//! Generic metadata provider trait and supporting types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single hit from a provider title search.
///
/// Ratings and counts come straight from the provider; image paths are
/// already resolved to full URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Provider-side numeric id (TMDB id).
    pub id: i64,
    /// Localized title in the provider's configured language.
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub vote_count: Option<i64>,
}

/// Detail fields fetched with a second per-title request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleDetails {
    pub genres: Vec<String>,
    /// Runtime in minutes; for series, a representative episode runtime.
    pub runtime: Option<i32>,
    pub status: Option<String>,
    pub original_language: Option<String>,
}

/// Trait implemented by external metadata services.
///
/// Implementations must be `Send + Sync` as they are shared across the
/// enrichment tasks behind an `Arc`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provider name for logging, e.g. `"tmdb"`.
    fn name(&self) -> &'static str;

    /// Whether the provider is configured and able to serve requests.
    fn is_available(&self) -> bool;

    /// Search for a movie by title, optionally constrained by year.
    async fn search_movie(&self, title: &str, year: Option<i32>)
        -> anyhow::Result<Vec<SearchHit>>;

    /// Search for a TV series by title, optionally constrained by year.
    async fn search_tv(&self, title: &str, year: Option<i32>) -> anyhow::Result<Vec<SearchHit>>;

    /// Fetch detail fields for a movie by provider id.
    async fn movie_details(&self, id: i64) -> anyhow::Result<TitleDetails>;

    /// Fetch detail fields for a TV series by provider id.
    async fn tv_details(&self, id: i64) -> anyhow::Result<TitleDetails>;
}

/// Pick the best hit for a record: the first hit whose year is within one
/// year of the record's, falling back to the provider's top-ranked hit.
pub fn select_hit<'a>(hits: &'a [SearchHit], year: Option<i32>) -> Option<&'a SearchHit> {
    if let Some(target) = year {
        if let Some(hit) = hits
            .iter()
            .find(|h| h.year.is_some_and(|y| (y - target).abs() <= 1))
        {
            return Some(hit);
        }
    }
    hits.first()
}
