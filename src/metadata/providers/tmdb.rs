//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] by querying the TMDB v3 REST API, and
//! additionally exposes the discover endpoints used by the latest-releases
//! source.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 30-second request timeout.
//! - Responses localized through the configured `language` tag.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::metadata::provider::{MetadataProvider, SearchHit, TitleDetails};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;

/// Discover window and vote thresholds for recently released movies.
const DISCOVER_MOVIE_WINDOW_DAYS: i64 = 30;
const DISCOVER_MOVIE_MIN_VOTE_AVERAGE: &str = "6.0";
const DISCOVER_MOVIE_MIN_VOTE_COUNT: &str = "100";

/// Discover window and vote thresholds for recently aired series.
const DISCOVER_TV_WINDOW_DAYS: i64 = 14;
const DISCOVER_TV_MIN_VOTE_AVERAGE: &str = "7.0";
const DISCOVER_TV_MIN_VOTE_COUNT: &str = "50";

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbListResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieResult {
    id: i64,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f64>,
    popularity: Option<f64>,
    vote_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvResult {
    id: i64,
    name: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f64>,
    popularity: Option<f64>,
    vote_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    genres: Option<Vec<TmdbGenre>>,
    runtime: Option<i32>,
    status: Option<String>,
    original_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvDetail {
    genres: Option<Vec<TmdbGenre>>,
    episode_run_time: Option<Vec<i32>>,
    status: Option<String>,
    original_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB metadata provider.
///
/// Wraps the TMDB v3 REST API with built-in rate limiting and retry logic.
///
/// # Examples
///
/// ```no_run
/// use filmradar::metadata::TmdbProvider;
///
/// let provider = TmdbProvider::new("your-api-key".into(), "ru-RU".into());
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new TMDB provider with the given API key and language.
    ///
    /// The `language` parameter is an ISO-639-1 tag such as `"ru-RU"` and is
    /// sent with every request, so search results and overviews come back
    /// localized. Rate limiting is configured at 4 requests per second.
    pub fn new(api_key: String, language: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            api_key,
            language,
            base_url: TMDB_BASE_URL.to_string(),
            rate_limiter,
        }
    }

    /// Override the API base URL (used by tests to point at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("TMDB request failed: {url}"))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            let resp = resp
                .error_for_status()
                .with_context(|| format!("TMDB request returned error: {url}"))?;

            return Ok(resp);
        }
    }

    /// Build a full API URL with the API key and language query parameters.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}{path}?api_key={}&language={}",
            self.base_url, self.api_key, self.language
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    /// Discover movies released in the last 30 days with decent ratings,
    /// sorted by popularity.
    pub async fn discover_movies(&self) -> anyhow::Result<Vec<SearchHit>> {
        let cutoff = (Utc::now() - chrono::Duration::days(DISCOVER_MOVIE_WINDOW_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let url = self.url(
            "/discover/movie",
            &[
                ("primary_release_date.gte", cutoff.as_str()),
                ("sort_by", "popularity.desc"),
                ("vote_average.gte", DISCOVER_MOVIE_MIN_VOTE_AVERAGE),
                ("vote_count.gte", DISCOVER_MOVIE_MIN_VOTE_COUNT),
            ],
        );
        let resp: TmdbListResponse<TmdbMovieResult> = self.get(&url).await?.json().await?;
        Ok(resp.results.into_iter().map(movie_hit).collect())
    }

    /// Discover series that aired an episode in the last 14 days, sorted by
    /// popularity. The rating bar is higher than for movies.
    pub async fn discover_tv(&self) -> anyhow::Result<Vec<SearchHit>> {
        let cutoff = (Utc::now() - chrono::Duration::days(DISCOVER_TV_WINDOW_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let url = self.url(
            "/discover/tv",
            &[
                ("first_air_date.gte", cutoff.as_str()),
                ("sort_by", "popularity.desc"),
                ("vote_average.gte", DISCOVER_TV_MIN_VOTE_AVERAGE),
                ("vote_count.gte", DISCOVER_TV_MIN_VOTE_COUNT),
            ],
        );
        let resp: TmdbListResponse<TmdbTvResult> = self.get(&url).await?.json().await?;
        Ok(resp.results.into_iter().map(tv_hit).collect())
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> anyhow::Result<Vec<SearchHit>> {
        let year_string;
        let mut params = vec![("query", title)];
        if let Some(year) = year {
            year_string = year.to_string();
            params.push(("primary_release_year", year_string.as_str()));
        }
        let url = self.url("/search/movie", &params);
        let resp: TmdbListResponse<TmdbMovieResult> = self.get(&url).await?.json().await?;
        Ok(resp.results.into_iter().map(movie_hit).collect())
    }

    async fn search_tv(&self, title: &str, year: Option<i32>) -> anyhow::Result<Vec<SearchHit>> {
        let year_string;
        let mut params = vec![("query", title)];
        if let Some(year) = year {
            year_string = year.to_string();
            params.push(("first_air_date_year", year_string.as_str()));
        }
        let url = self.url("/search/tv", &params);
        let resp: TmdbListResponse<TmdbTvResult> = self.get(&url).await?.json().await?;
        Ok(resp.results.into_iter().map(tv_hit).collect())
    }

    async fn movie_details(&self, id: i64) -> anyhow::Result<TitleDetails> {
        let url = self.url(&format!("/movie/{id}"), &[]);
        let detail: TmdbMovieDetail = self.get(&url).await?.json().await?;
        Ok(TitleDetails {
            genres: genre_names(detail.genres),
            runtime: detail.runtime,
            status: detail.status,
            original_language: detail.original_language,
        })
    }

    async fn tv_details(&self, id: i64) -> anyhow::Result<TitleDetails> {
        let url = self.url(&format!("/tv/{id}"), &[]);
        let detail: TmdbTvDetail = self.get(&url).await?.json().await?;
        Ok(TitleDetails {
            genres: genre_names(detail.genres),
            runtime: detail.episode_run_time.and_then(|r| r.first().copied()),
            status: detail.status,
            original_language: detail.original_language,
        })
    }
}

fn movie_hit(result: TmdbMovieResult) -> SearchHit {
    SearchHit {
        id: result.id,
        title: result.title.unwrap_or_default(),
        year: parse_year(result.release_date.as_deref()),
        overview: result.overview.filter(|o| !o.is_empty()),
        poster_url: result.poster_path.as_deref().map(image_url),
        backdrop_url: result.backdrop_path.as_deref().map(image_url),
        vote_average: result.vote_average,
        popularity: result.popularity,
        vote_count: result.vote_count,
    }
}

fn tv_hit(result: TmdbTvResult) -> SearchHit {
    SearchHit {
        id: result.id,
        title: result.name.unwrap_or_default(),
        year: parse_year(result.first_air_date.as_deref()),
        overview: result.overview.filter(|o| !o.is_empty()),
        poster_url: result.poster_path.as_deref().map(image_url),
        backdrop_url: result.backdrop_path.as_deref().map(image_url),
        vote_average: result.vote_average,
        popularity: result.popularity,
        vote_count: result.vote_count,
    }
}

fn genre_names(genres: Option<Vec<TmdbGenre>>) -> Vec<String> {
    genres
        .unwrap_or_default()
        .into_iter()
        .map(|g| g.name)
        .collect()
}

/// Resolve a TMDB image path to a full w500 URL.
fn image_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}{path}")
}

/// Extract the year from a `YYYY-MM-DD` date string.
fn parse_year(date: Option<&str>) -> Option<i32> {
    date?.get(0..4)?.parse().ok()
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_year_from_release_date() {
        assert_eq!(parse_year(Some("2024-03-01")), Some(2024));
        assert_eq!(parse_year(Some("")), None);
        assert_eq!(parse_year(None), None);
    }

    #[test]
    fn image_paths_resolve_to_w500() {
        assert_eq!(
            image_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn urlencodes_query_values() {
        assert_eq!(urlencoded("The Bear"), "The+Bear");
        assert_eq!(urlencoded("Дюна"), "%D0%94%D1%8E%D0%BD%D0%B0");
        assert_eq!(urlencoded("safe-chars_.~"), "safe-chars_.~");
    }

    #[test]
    fn unconfigured_provider_is_unavailable() {
        let provider = TmdbProvider::new(String::new(), "ru-RU".into());
        assert!(!provider.is_available());
        let provider = TmdbProvider::new("key".into(), "ru-RU".into());
        assert!(provider.is_available());
    }
}
