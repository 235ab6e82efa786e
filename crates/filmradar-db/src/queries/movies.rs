//! Movie table queries.
//!
//! CRUD operations for catalog movie/series rows, plus the identity lookups
//! used by the upsert writer: by TMDB id and kind first, then by
//! (title, year, kind).

use chrono::{DateTime, Utc};
use filmradar_common::{Error, MediaKind, MovieId, Result};
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::Movie;

/// Filter options for listing movies.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub kind: Option<MediaKind>,
    pub search_term: Option<String>,
}

/// Insert a new movie row.
pub fn insert_movie(conn: &Connection, movie: &Movie) -> Result<()> {
    let genres_json =
        serde_json::to_string(&movie.genres).map_err(|e| Error::internal(e.to_string()))?;

    conn.execute(
        "INSERT INTO movies (
            id, title, year, kind, description, quality, imdb_rating, tmdb_id,
            poster_url, backdrop_url, source_quality_score, torrent_release_date,
            last_episode_date, genres, runtime, status, original_language,
            popularity, vote_count, last_checked, created_at, updated_at
         ) VALUES (
            :id, :title, :year, :kind, :description, :quality, :imdb_rating, :tmdb_id,
            :poster_url, :backdrop_url, :source_quality_score, :torrent_release_date,
            :last_episode_date, :genres, :runtime, :status, :original_language,
            :popularity, :vote_count, :last_checked, :created_at, :updated_at
         )",
        rusqlite::named_params! {
            ":id": movie.id.to_string(),
            ":title": &movie.title,
            ":year": movie.year,
            ":kind": movie.kind.to_string(),
            ":description": &movie.description,
            ":quality": &movie.quality,
            ":imdb_rating": movie.imdb_rating,
            ":tmdb_id": movie.tmdb_id,
            ":poster_url": &movie.poster_url,
            ":backdrop_url": &movie.backdrop_url,
            ":source_quality_score": movie.source_quality_score,
            ":torrent_release_date": movie.torrent_release_date.map(|d| d.to_rfc3339()),
            ":last_episode_date": movie.last_episode_date.map(|d| d.to_rfc3339()),
            ":genres": genres_json,
            ":runtime": movie.runtime,
            ":status": &movie.status,
            ":original_language": &movie.original_language,
            ":popularity": movie.popularity,
            ":vote_count": movie.vote_count,
            ":last_checked": movie.last_checked.to_rfc3339(),
            ":created_at": movie.created_at.to_rfc3339(),
            ":updated_at": movie.updated_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Update an existing movie row by id, overwriting all mutable fields.
pub fn update_movie(conn: &Connection, movie: &Movie) -> Result<()> {
    let genres_json =
        serde_json::to_string(&movie.genres).map_err(|e| Error::internal(e.to_string()))?;

    let updated = conn
        .execute(
            "UPDATE movies SET
                title = :title,
                year = :year,
                kind = :kind,
                description = :description,
                quality = :quality,
                imdb_rating = :imdb_rating,
                tmdb_id = :tmdb_id,
                poster_url = :poster_url,
                backdrop_url = :backdrop_url,
                source_quality_score = :source_quality_score,
                torrent_release_date = :torrent_release_date,
                last_episode_date = :last_episode_date,
                genres = :genres,
                runtime = :runtime,
                status = :status,
                original_language = :original_language,
                popularity = :popularity,
                vote_count = :vote_count,
                last_checked = :last_checked,
                updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": movie.id.to_string(),
                ":title": &movie.title,
                ":year": movie.year,
                ":kind": movie.kind.to_string(),
                ":description": &movie.description,
                ":quality": &movie.quality,
                ":imdb_rating": movie.imdb_rating,
                ":tmdb_id": movie.tmdb_id,
                ":poster_url": &movie.poster_url,
                ":backdrop_url": &movie.backdrop_url,
                ":source_quality_score": movie.source_quality_score,
                ":torrent_release_date": movie.torrent_release_date.map(|d| d.to_rfc3339()),
                ":last_episode_date": movie.last_episode_date.map(|d| d.to_rfc3339()),
                ":genres": genres_json,
                ":runtime": movie.runtime,
                ":status": &movie.status,
                ":original_language": &movie.original_language,
                ":popularity": movie.popularity,
                ":vote_count": movie.vote_count,
                ":last_checked": movie.last_checked.to_rfc3339(),
                ":updated_at": movie.updated_at.to_rfc3339(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if updated == 0 {
        return Err(Error::not_found(format!("movie {}", movie.id)));
    }

    Ok(())
}

const MOVIE_COLUMNS: &str = "id, title, year, kind, description, quality, imdb_rating, tmdb_id,
    poster_url, backdrop_url, source_quality_score, torrent_release_date,
    last_episode_date, genres, runtime, status, original_language,
    popularity, vote_count, last_checked, created_at, updated_at";

/// Parse a movie from a database row.
fn parse_movie_row(row: &rusqlite::Row) -> rusqlite::Result<Movie> {
    let genres_json: String = row.get(13)?;
    let kind_str: String = row.get(3)?;

    Ok(Movie {
        id: MovieId::from(parse_uuid(&row.get::<_, String>(0)?)?),
        title: row.get(1)?,
        year: row.get(2)?,
        kind: kind_str
            .parse()
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        description: row.get(4)?,
        quality: row.get(5)?,
        imdb_rating: row.get(6)?,
        tmdb_id: row.get(7)?,
        poster_url: row.get(8)?,
        backdrop_url: row.get(9)?,
        source_quality_score: row.get(10)?,
        torrent_release_date: parse_timestamp_opt(row.get::<_, Option<String>>(11)?),
        last_episode_date: parse_timestamp_opt(row.get::<_, Option<String>>(12)?),
        genres: serde_json::from_str(&genres_json).unwrap_or_default(),
        runtime: row.get(14)?,
        status: row.get(15)?,
        original_language: row.get(16)?,
        popularity: row.get(17)?,
        vote_count: row.get(18)?,
        last_checked: parse_timestamp(&row.get::<_, String>(19)?)?,
        created_at: parse_timestamp(&row.get::<_, String>(20)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(21)?)?,
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

fn parse_timestamp_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// Get a movie by id.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let mut rows = stmt
        .query_map([id.to_string()], parse_movie_row)
        .map_err(|e| Error::database(e.to_string()))?;

    match rows.next() {
        Some(row) => Ok(Some(row.map_err(|e| Error::database(e.to_string()))?)),
        None => Ok(None),
    }
}

/// Find a movie by TMDB id and kind (the primary identity).
pub fn find_by_tmdb_id(conn: &Connection, tmdb_id: i64, kind: MediaKind) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE tmdb_id = ? AND kind = ?");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let mut rows = stmt
        .query_map(
            rusqlite::params![tmdb_id, kind.to_string()],
            parse_movie_row,
        )
        .map_err(|e| Error::database(e.to_string()))?;

    match rows.next() {
        Some(row) => Ok(Some(row.map_err(|e| Error::database(e.to_string()))?)),
        None => Ok(None),
    }
}

/// Find a movie by title, year, and kind (the fallback identity).
///
/// A `None` year matches only rows whose year is NULL.
pub fn find_by_title_year(
    conn: &Connection,
    title: &str,
    year: Option<i32>,
    kind: MediaKind,
) -> Result<Option<Movie>> {
    let sql = format!(
        "SELECT {MOVIE_COLUMNS} FROM movies
         WHERE title = :title AND kind = :kind
           AND ((:year IS NULL AND year IS NULL) OR year = :year)"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let mut rows = stmt
        .query_map(
            rusqlite::named_params! {
                ":title": title,
                ":year": year,
                ":kind": kind.to_string(),
            },
            parse_movie_row,
        )
        .map_err(|e| Error::database(e.to_string()))?;

    match rows.next() {
        Some(row) => Ok(Some(row.map_err(|e| Error::database(e.to_string()))?)),
        None => Ok(None),
    }
}

/// Find a series row by title alone, used to resolve the owner of parsed
/// episodes.
pub fn find_series_by_title(conn: &Connection, title: &str) -> Result<Option<Movie>> {
    let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE title = ? AND kind = 'series'");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let mut rows = stmt
        .query_map([title], parse_movie_row)
        .map_err(|e| Error::database(e.to_string()))?;

    match rows.next() {
        Some(row) => Ok(Some(row.map_err(|e| Error::database(e.to_string()))?)),
        None => Ok(None),
    }
}

/// List movies matching a filter, most recently updated first.
pub fn list_movies(conn: &Connection, filter: &MovieFilter) -> Result<Vec<Movie>> {
    let mut sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE 1=1");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind = ?");
        params.push(Box::new(kind.to_string()));
    }
    if let Some(ref term) = filter.search_term {
        sql.push_str(" AND title LIKE ?");
        params.push(Box::new(format!("%{}%", term)));
    }

    sql.push_str(" ORDER BY updated_at DESC");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), parse_movie_row)
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Count all movie rows.
pub fn count_movies(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
