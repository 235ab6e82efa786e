//! EZTV series feed.
//!
//! Pulls recent torrents from the EZTV API and aggregates them into one
//! record per series (localized title) plus the episodes observed for it.

use anyhow::Context;
use chrono::{DateTime, Datelike, Utc};
use filmradar_common::MediaKind;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::quality::extract_quality;
use crate::sources::{EpisodeDraft, MovieRecord, SeriesEpisodes};
use crate::titles::{localize_title, parse_series_title};

/// Rating assigned to series the feed gives no rating for.
const DEFAULT_RATING: f64 = 7.5;

/// At most this many episodes are kept per series per harvest.
const MAX_EPISODES_PER_SERIES: usize = 20;

#[derive(Debug, Deserialize)]
struct EztvResponse {
    torrents: Option<Vec<EztvTorrent>>,
}

#[derive(Debug, Deserialize)]
struct EztvTorrent {
    title: String,
    date_released_unix: Option<i64>,
}

/// Client for the EZTV `get-torrents` endpoint.
pub struct EztvClient {
    client: reqwest::Client,
    base_url: String,
    limit: u32,
}

impl EztvClient {
    pub fn new(base_url: String, limit: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            limit,
        }
    }

    /// Fetch recent torrents and fold them into per-series records.
    ///
    /// Series order follows first appearance in the feed. Episode drafts
    /// keep feed order and are capped at [`MAX_EPISODES_PER_SERIES`].
    pub async fn fetch(&self) -> anyhow::Result<(Vec<MovieRecord>, Vec<SeriesEpisodes>)> {
        let url = format!("{}/get-torrents?limit={}", self.base_url, self.limit);
        let resp: EztvResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("EZTV request failed: {url}"))?
            .error_for_status()
            .context("EZTV request returned error")?
            .json()
            .await
            .context("EZTV response was not valid JSON")?;

        let torrents = resp.torrents.unwrap_or_default();
        Ok(aggregate(&torrents))
    }
}

fn aggregate(torrents: &[EztvTorrent]) -> (Vec<MovieRecord>, Vec<SeriesEpisodes>) {
    let current_year = Utc::now().year();
    let mut records: Vec<MovieRecord> = Vec::new();
    let mut episode_groups: Vec<Vec<EpisodeDraft>> = Vec::new();
    let mut index_by_title: HashMap<String, usize> = HashMap::new();

    for torrent in torrents {
        let parsed = parse_series_title(&torrent.title);
        let localized = localize_title(&parsed.title);
        let quality = extract_quality(&torrent.title);

        let index = *index_by_title.entry(localized.clone()).or_insert_with(|| {
            let mut record = MovieRecord::new(localized.clone(), MediaKind::Series);
            record.year = Some(current_year);
            record.imdb_rating = Some(DEFAULT_RATING);
            record.description = Some(format!("Популярный сериал с качеством {quality}"));
            record.quality = Some(quality.clone());
            records.push(record);
            episode_groups.push(Vec::new());
            records.len() - 1
        });

        if let (Some(season), Some(episode)) = (parsed.season, parsed.episode) {
            let group = &mut episode_groups[index];
            if group.len() >= MAX_EPISODES_PER_SERIES {
                debug!(series = %localized, "Episode cap reached, dropping the rest");
                continue;
            }
            group.push(EpisodeDraft {
                season_number: season,
                episode_number: episode,
                title: Some(format!("S{season}E{episode}")),
                air_date: torrent
                    .date_released_unix
                    .and_then(|ts| DateTime::from_timestamp(ts, 0))
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            });
        }
    }

    let episodes = records
        .iter()
        .zip(episode_groups)
        .filter(|(_, group)| !group.is_empty())
        .map(|(record, group)| SeriesEpisodes {
            series_title: record.title.clone(),
            episodes: group,
        })
        .collect();

    (records, episodes)
}
