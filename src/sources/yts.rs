//! YTS movie feed.
//!
//! Pulls the latest additions from the YTS JSON API and keeps only releases
//! whose best torrent scores at least 720p-grade quality.

use anyhow::Context;
use chrono::{NaiveDateTime, TimeZone, Utc};
use filmradar_common::MediaKind;
use serde::Deserialize;
use tracing::debug;

use crate::quality::score_quality;
use crate::sources::MovieRecord;

/// Minimum quality score a YTS release must reach to be kept.
const MIN_SCORE: i32 = 60;

/// Resolutions in preference order for picking the best torrent.
const QUALITY_PRIORITY: &[&str] = &["2160p", "1080p", "720p", "480p"];

#[derive(Debug, Deserialize)]
struct YtsResponse {
    status: String,
    data: Option<YtsData>,
}

#[derive(Debug, Deserialize)]
struct YtsData {
    movies: Option<Vec<YtsMovie>>,
}

#[derive(Debug, Deserialize)]
struct YtsMovie {
    title: String,
    year: Option<i32>,
    rating: Option<f64>,
    synopsis: Option<String>,
    description_full: Option<String>,
    date_uploaded: Option<String>,
    torrents: Option<Vec<YtsTorrent>>,
}

#[derive(Debug, Deserialize)]
struct YtsTorrent {
    quality: Option<String>,
}

/// Client for the YTS `list_movies` endpoint.
pub struct YtsClient {
    client: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl YtsClient {
    pub fn new(base_url: String, limit: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            limit,
        }
    }

    /// Fetch the latest YTS additions rated 6+ and keep the well-encoded ones.
    pub async fn fetch(&self) -> anyhow::Result<Vec<MovieRecord>> {
        let url = format!(
            "{}/list_movies.json?limit={}&sort_by=date_added&minimum_rating=6",
            self.base_url, self.limit
        );
        let resp: YtsResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("YTS request failed: {url}"))?
            .error_for_status()
            .context("YTS request returned error")?
            .json()
            .await
            .context("YTS response was not valid JSON")?;

        if resp.status != "ok" {
            anyhow::bail!("YTS responded with status {:?}", resp.status);
        }

        let movies = resp.data.and_then(|d| d.movies).unwrap_or_default();
        let mut records = Vec::new();
        for movie in movies {
            let quality = best_torrent_quality(movie.torrents.as_deref().unwrap_or_default());
            let score = score_quality(&quality);
            if score < MIN_SCORE {
                debug!(title = %movie.title, %quality, score, "Skipping low-grade YTS release");
                continue;
            }

            let description = movie
                .synopsis
                .filter(|s| !s.is_empty())
                .or(movie.description_full.filter(|s| !s.is_empty()))
                .unwrap_or_else(|| match movie.year {
                    Some(year) => format!("{} ({year})", movie.title),
                    None => movie.title.clone(),
                });

            let mut record = MovieRecord::new(movie.title, MediaKind::Movie);
            record.year = movie.year;
            record.imdb_rating = movie.rating;
            record.description = Some(description);
            record.quality = Some(quality);
            record.source_quality_score = score;
            record.torrent_release_date =
                Some(parse_uploaded(movie.date_uploaded.as_deref()).unwrap_or_else(Utc::now));
            records.push(record);
        }
        Ok(records)
    }
}

/// Pick the best available resolution from a torrent list, rendered as
/// "{resolution}.BluRay". Falls back to the first torrent's raw label.
fn best_torrent_quality(torrents: &[YtsTorrent]) -> String {
    if torrents.is_empty() {
        return "Unknown".to_string();
    }
    for resolution in QUALITY_PRIORITY {
        if torrents
            .iter()
            .any(|t| t.quality.as_deref() == Some(resolution))
        {
            return format!("{resolution}.BluRay");
        }
    }
    torrents[0]
        .quality
        .clone()
        .unwrap_or_else(|| "Unknown".to_string())
}

/// YTS upload timestamps look like "2024-03-01 12:30:00" (UTC).
fn parse_uploaded(raw: Option<&str>) -> Option<chrono::DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw?, "%Y-%m-%d %H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent(quality: &str) -> YtsTorrent {
        YtsTorrent {
            quality: Some(quality.to_string()),
        }
    }

    #[test]
    fn best_quality_prefers_higher_resolution() {
        let torrents = vec![torrent("720p"), torrent("2160p"), torrent("1080p")];
        assert_eq!(best_torrent_quality(&torrents), "2160p.BluRay");
    }

    #[test]
    fn best_quality_falls_back_to_first_raw_label() {
        let torrents = vec![torrent("3D")];
        assert_eq!(best_torrent_quality(&torrents), "3D");
        assert_eq!(best_torrent_quality(&[]), "Unknown");
    }

    #[test]
    fn best_quality_scores_above_threshold() {
        // A 720p-or-better pick always clears MIN_SCORE.
        for resolution in ["2160p", "1080p", "720p"] {
            let quality = best_torrent_quality(&[torrent(resolution)]);
            assert!(score_quality(&quality) >= MIN_SCORE);
        }
        // 480p renders as 480p.BluRay, which does not clear the bar.
        let quality = best_torrent_quality(&[torrent("480p")]);
        assert!(score_quality(&quality) < MIN_SCORE);
    }

    #[test]
    fn parses_upload_timestamps() {
        let parsed = parse_uploaded(Some("2024-03-01 12:30:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T12:30:00+00:00");
        assert!(parse_uploaded(Some("not a date")).is_none());
        assert!(parse_uploaded(None).is_none());
    }
}
