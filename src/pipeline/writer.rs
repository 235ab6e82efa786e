//! Persistence step of the pipeline.
//!
//! Upserts enriched records into the catalog. Identity is resolved by TMDB
//! id plus kind first, then by (title, year, kind); a miss on both inserts
//! a new row. Episode groups are matched to series rows by localized title.

use chrono::Utc;
use filmradar_common::{MovieId, Result};
use filmradar_db::models::Movie;
use filmradar_db::pool::{get_conn, DbPool};
use filmradar_db::queries::{episodes, movies};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::sources::{MovieRecord, SeriesEpisodes};

/// Upsert every record, returning how many were written. A record that
/// fails to persist is logged and skipped.
pub fn write_movies(pool: &DbPool, records: &[MovieRecord]) -> Result<usize> {
    let conn = get_conn(pool)?;
    let mut written = 0;
    for record in records {
        match upsert_movie(&conn, record) {
            Ok(()) => written += 1,
            Err(error) => {
                warn!(title = %record.title, %error, "Failed to persist record, skipping")
            }
        }
    }
    Ok(written)
}

fn upsert_movie(conn: &Connection, record: &MovieRecord) -> Result<()> {
    let existing = match record.tmdb_id {
        Some(tmdb_id) => movies::find_by_tmdb_id(conn, tmdb_id, record.kind)?,
        None => None,
    };
    let existing = match existing {
        Some(movie) => Some(movie),
        None => movies::find_by_title_year(conn, &record.title, record.year, record.kind)?,
    };

    let now = Utc::now();
    match existing {
        Some(mut movie) => {
            debug!(title = %record.title, id = %movie.id, "Updating existing row");
            apply_record(&mut movie, record);
            movie.last_checked = now;
            movie.updated_at = now;
            movies::update_movie(conn, &movie)
        }
        None => {
            debug!(title = %record.title, "Inserting new row");
            let mut movie = Movie {
                id: MovieId::new(),
                title: record.title.clone(),
                year: record.year,
                kind: record.kind,
                description: None,
                quality: None,
                imdb_rating: None,
                tmdb_id: None,
                poster_url: None,
                backdrop_url: None,
                source_quality_score: record.source_quality_score,
                torrent_release_date: None,
                last_episode_date: None,
                genres: Vec::new(),
                runtime: None,
                status: None,
                original_language: None,
                popularity: None,
                vote_count: None,
                last_checked: now,
                created_at: now,
                updated_at: now,
            };
            apply_record(&mut movie, record);
            movies::insert_movie(conn, &movie)
        }
    }
}

/// Copy record fields onto a row. Identity fields (id, created_at) are left
/// alone; everything the sources produce overwrites the stored value.
fn apply_record(movie: &mut Movie, record: &MovieRecord) {
    movie.title = record.title.clone();
    movie.year = record.year;
    movie.kind = record.kind;
    movie.description = record.description.clone();
    movie.quality = record.quality.clone();
    movie.imdb_rating = record.imdb_rating;
    movie.tmdb_id = record.tmdb_id;
    movie.poster_url = record.poster_url.clone();
    movie.backdrop_url = record.backdrop_url.clone();
    movie.source_quality_score = record.source_quality_score;
    movie.torrent_release_date = record.torrent_release_date;
    movie.last_episode_date = record.last_episode_date;
    movie.genres = record.genres.clone();
    movie.runtime = record.runtime;
    movie.status = record.status.clone();
    movie.original_language = record.original_language.clone();
    movie.popularity = record.popularity;
    movie.vote_count = record.vote_count;
}

/// Upsert harvested episodes under their series rows, returning how many
/// were written. Groups whose series is missing from the catalog are
/// skipped; so are individual episodes that fail to persist.
pub fn write_episodes(pool: &DbPool, groups: &[SeriesEpisodes]) -> Result<usize> {
    let conn = get_conn(pool)?;
    let mut written = 0;
    for group in groups {
        let Some(series) = movies::find_series_by_title(&conn, &group.series_title)? else {
            warn!(series = %group.series_title, "No series row for episode group, skipping");
            continue;
        };
        for draft in &group.episodes {
            let upsert = episodes::EpisodeUpsert {
                season_number: draft.season_number,
                episode_number: draft.episode_number,
                title: draft.title.clone(),
                air_date: draft.air_date.clone(),
            };
            match episodes::upsert_episode(&conn, series.id, &upsert) {
                Ok(()) => written += 1,
                Err(error) => warn!(
                    series = %group.series_title,
                    season = draft.season_number,
                    episode = draft.episode_number,
                    %error,
                    "Failed to persist episode, skipping"
                ),
            }
        }
    }
    Ok(written)
}
