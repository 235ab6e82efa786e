use crate::pipeline::PipelineOptions;
use crate::server::AppContext;
use crate::sources::SourceKind;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use filmradar_common::{MediaKind, MovieId};
use filmradar_db::pool::get_conn;
use filmradar_db::queries::{episodes, movies};
use serde::{Deserialize, Serialize};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/parse", post(trigger_parse))
        .route("/movies", get(list_movies))
        .route("/movies/:id/episodes", get(list_episodes))
}

// ---------------------------------------------------------------------------
// POST /api/parse
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ParseRequest {
    #[serde(default)]
    force: bool,
    limit: Option<usize>,
    source: Option<String>,
}

#[derive(Debug, Serialize)]
struct ParseResponse {
    success: bool,
    message: String,
    processed_movies: usize,
    processed_episodes: usize,
    timestamp: String,
}

fn failure(status: StatusCode, error: impl std::fmt::Display) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": error.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

async fn trigger_parse(
    State(ctx): State<AppContext>,
    body: Option<Json<ParseRequest>>,
) -> Result<Json<ParseResponse>, (StatusCode, Json<serde_json::Value>)> {
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let source = match request.source.as_deref() {
        Some(raw) => match raw.parse::<SourceKind>() {
            Ok(kind) => Some(kind),
            Err(error) => return Err(failure(StatusCode::BAD_REQUEST, error)),
        },
        None => None,
    };

    // One run at a time unless forced. try_lock instead of lock: a busy
    // pipeline answers immediately rather than queueing triggers.
    let _guard = if request.force {
        None
    } else {
        match ctx.run_guard.try_lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                return Err(failure(
                    StatusCode::CONFLICT,
                    "A harvest run is already in progress",
                ))
            }
        }
    };

    let options = PipelineOptions {
        limit: request.limit,
        source,
    };

    match ctx.pipeline.run(&options).await {
        Ok(report) => Ok(Json(ParseResponse {
            success: true,
            message: format!("Successfully processed {} movies", report.processed_movies),
            processed_movies: report.processed_movies,
            processed_episodes: report.processed_episodes,
            timestamp: Utc::now().to_rfc3339(),
        })),
        Err(error) => Err(failure(StatusCode::INTERNAL_SERVER_ERROR, error)),
    }
}

// ---------------------------------------------------------------------------
// GET /api/movies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MoviesQuery {
    /// "movie" or "series".
    kind: Option<String>,
    /// Keep only records inside their kind's recency window.
    fresh: Option<bool>,
    search: Option<String>,
    limit: Option<usize>,
}

async fn list_movies(
    State(ctx): State<AppContext>,
    Query(params): Query<MoviesQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let kind = match params.kind.as_deref() {
        Some(raw) => match raw.parse::<MediaKind>() {
            Ok(kind) => Some(kind),
            Err(error) => return Err(failure(StatusCode::BAD_REQUEST, error)),
        },
        None => None,
    };

    let filter = movies::MovieFilter {
        kind,
        search_term: params.search,
    };
    let mut rows = get_conn(&ctx.pool)
        .and_then(|conn| movies::list_movies(&conn, &filter))
        .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    if params.fresh.unwrap_or(false) {
        let now = Utc::now();
        rows.retain(|movie| movie.is_fresh(now));
    }
    rows.truncate(params.limit.unwrap_or(100));

    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// GET /api/movies/:id/episodes
// ---------------------------------------------------------------------------

async fn list_episodes(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let movie_id: MovieId = id
        .parse()
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e))?;

    let conn = get_conn(&ctx.pool).map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let Some(_movie) = movies::get_movie(&conn, movie_id)
        .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e))?
    else {
        return Err(failure(
            StatusCode::NOT_FOUND,
            format!("No movie with id {movie_id}"),
        ));
    };

    let rows = episodes::list_episodes(&conn, movie_id)
        .map_err(|e| failure(StatusCode::INTERNAL_SERVER_ERROR, e))?;
    Ok(Json(rows))
}
