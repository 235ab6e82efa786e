//! Episode table queries.
//!
//! Episodes are upserted idempotently on (movie_id, season_number,
//! episode_number): re-upserting the same key overwrites title and air date
//! in place. The pipeline never deletes episodes.

use chrono::{DateTime, Utc};
use filmradar_common::{EpisodeId, Error, MovieId, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::Episode;

/// Fields accepted by an episode upsert.
#[derive(Debug, Clone)]
pub struct EpisodeUpsert {
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    pub air_date: Option<String>,
}

/// Insert or update an episode keyed by (movie_id, season, episode).
pub fn upsert_episode(conn: &Connection, movie_id: MovieId, episode: &EpisodeUpsert) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO episodes (
            id, movie_id, season_number, episode_number, title, air_date,
            created_at, updated_at
         ) VALUES (
            :id, :movie_id, :season_number, :episode_number, :title, :air_date,
            :now, :now
         )
         ON CONFLICT(movie_id, season_number, episode_number) DO UPDATE SET
            title = :title,
            air_date = :air_date,
            updated_at = :now",
        rusqlite::named_params! {
            ":id": EpisodeId::new().to_string(),
            ":movie_id": movie_id.to_string(),
            ":season_number": episode.season_number,
            ":episode_number": episode.episode_number,
            ":title": &episode.title,
            ":air_date": &episode.air_date,
            ":now": now,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Parse an episode from a database row.
fn parse_episode_row(row: &rusqlite::Row) -> rusqlite::Result<Episode> {
    Ok(Episode {
        id: EpisodeId::from(parse_uuid(&row.get::<_, String>(0)?)?),
        movie_id: MovieId::from(parse_uuid(&row.get::<_, String>(1)?)?),
        season_number: row.get(2)?,
        episode_number: row.get(3)?,
        title: row.get(4)?,
        air_date: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(7)?)?,
    })
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| rusqlite::Error::InvalidQuery)
}

fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

/// List all episodes for a series, ordered by season then episode.
pub fn list_episodes(conn: &Connection, movie_id: MovieId) -> Result<Vec<Episode>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, movie_id, season_number, episode_number, title, air_date,
                    created_at, updated_at
             FROM episodes
             WHERE movie_id = ?
             ORDER BY season_number, episode_number",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([movie_id.to_string()], parse_episode_row)
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Count episodes belonging to a series.
pub fn count_episodes(conn: &Connection, movie_id: MovieId) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM episodes WHERE movie_id = ?",
        [movie_id.to_string()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
