//! Pipeline integration tests
//!
//! Exercises the harvest pipeline end to end against wiremock-backed TMDB,
//! YTS and EZTV endpoints, asserting on the resulting catalog rows.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use filmradar::config::Config;
use filmradar::metadata::{Enricher, TmdbProvider};
use filmradar::pipeline::{Pipeline, PipelineOptions};
use filmradar::server::AppContext;
use filmradar::sources::{SourceKind, SourceSet};
use filmradar_common::MediaKind;
use filmradar_db::pool::{init_memory_pool, DbPool};
use filmradar_db::queries::{episodes, movies};

/// Build a pipeline whose TMDB, YTS and EZTV endpoints all point at `server`.
fn build_pipeline(server: &MockServer, config: &mut Config) -> (Pipeline, DbPool) {
    config.tmdb.base_url = server.uri();
    config.sources.yts_base_url = server.uri();
    config.sources.eztv_base_url = server.uri();
    config.sources.curated_enabled = false;

    let pool = init_memory_pool().expect("failed to create in-memory pool");
    let provider = Arc::new(
        TmdbProvider::new(config.tmdb.api_key.clone(), config.tmdb.language.clone())
            .with_base_url(config.tmdb.base_url.clone()),
    );
    let sources = SourceSet::from_config(&config.sources, provider.clone());
    let enricher = Enricher::new(provider);
    let pipeline = Pipeline::new(
        sources,
        enricher,
        pool.clone(),
        config.pipeline.enrich_concurrency,
    );
    (pipeline, pool)
}

fn source_only(source: SourceKind) -> PipelineOptions {
    PipelineOptions {
        limit: None,
        source: Some(source),
    }
}

async fn mount_empty_searches(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn tmdb_discover_populates_movies_and_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("language", "ru-RU"))
        .and(query_param("sort_by", "popularity.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 693134,
                "title": "Дюна: Часть вторая",
                "release_date": "2024-02-28",
                "overview": "Пол Атрейдес объединяется с фрименами",
                "poster_path": "/dune2.jpg",
                "backdrop_path": "/dune2-wide.jpg",
                "vote_average": 8.2,
                "popularity": 912.4,
                "vote_count": 4200
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 94997,
                "name": "Дом дракона",
                "first_air_date": "2022-08-21",
                "overview": "За двести лет до Игры престолов",
                "poster_path": "/hotd.jpg",
                "vote_average": 8.4,
                "popularity": 701.0,
                "vote_count": 3900
            }]
        })))
        .mount(&server)
        .await;

    // Discovered records already carry a TMDB id: enrichment still searches
    // by title, so answer with the same hits.
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 693134,
                "title": "Дюна: Часть вторая",
                "release_date": "2024-02-28",
                "overview": "Пол Атрейдес объединяется с фрименами",
                "poster_path": "/dune2.jpg",
                "vote_average": 8.2,
                "vote_count": 4200
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 94997,
                "name": "Дом дракона",
                "first_air_date": "2022-08-21",
                "vote_average": 8.4,
                "vote_count": 3900
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/693134"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{"id": 878, "name": "фантастика"}],
            "runtime": 166,
            "status": "Released",
            "original_language": "en"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/94997"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{"id": 10765, "name": "фэнтези"}],
            "episode_run_time": [52],
            "status": "Returning Series",
            "original_language": "en"
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&source_only(SourceKind::Tmdb)).await.unwrap();
    assert_eq!(report.processed_movies, 2);
    assert_eq!(report.processed_episodes, 0);

    let conn = pool.get().unwrap();
    let movie = movies::find_by_tmdb_id(&conn, 693134, MediaKind::Movie)
        .unwrap()
        .unwrap();
    assert_eq!(movie.title, "Дюна: Часть вторая");
    assert_eq!(movie.genres, vec!["фантастика".to_string()]);
    assert_eq!(movie.runtime, Some(166));
    assert_eq!(movie.quality.as_deref(), Some("1080p.WEB-DL"));
    assert_eq!(movie.source_quality_score, 80);
    assert!(movie.is_fresh(chrono::Utc::now()));

    let series = movies::find_by_tmdb_id(&conn, 94997, MediaKind::Series)
        .unwrap()
        .unwrap();
    assert_eq!(series.kind, MediaKind::Series);
    assert_eq!(series.runtime, Some(52));
    assert!(series.is_fresh(chrono::Utc::now()));
}

#[tokio::test]
async fn yts_harvest_drops_low_grade_releases() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_movies.json"))
        .and(query_param("minimum_rating", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "movies": [
                    {
                        "title": "Oppenheimer",
                        "year": 2023,
                        "rating": 8.4,
                        "synopsis": "The story of the atomic bomb",
                        "date_uploaded": "2024-02-10 08:00:00",
                        "torrents": [{"quality": "1080p"}, {"quality": "720p"}]
                    },
                    {
                        "title": "Old Cam Release",
                        "year": 2023,
                        "rating": 6.1,
                        "torrents": [{"quality": "480p"}]
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    mount_empty_searches(&server).await;

    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&source_only(SourceKind::Yts)).await.unwrap();
    assert_eq!(report.processed_movies, 1);

    let conn = pool.get().unwrap();
    let movie = movies::find_by_title_year(&conn, "Oppenheimer", Some(2023), MediaKind::Movie)
        .unwrap()
        .unwrap();
    assert_eq!(movie.quality.as_deref(), Some("1080p.BluRay"));
    assert_eq!(movie.source_quality_score, 85);
    assert!(movie.torrent_release_date.is_some());
}

#[tokio::test]
async fn eztv_harvest_writes_series_and_episodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-torrents"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "torrents": [
                {"title": "The Bear S03E01 1080p WEB-DL", "date_released_unix": 1719446400},
                {"title": "The Bear S03E02 1080p WEB-DL", "date_released_unix": 1719532800}
            ]
        })))
        .mount(&server)
        .await;

    // Enrichment localizes the series against TMDB.
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 136315,
                "name": "Медведь",
                "first_air_date": "2022-06-23",
                "overview": "Кухня в Чикаго",
                "vote_average": 8.3,
                "vote_count": 1200
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/136315"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{"id": 35, "name": "комедия"}],
            "episode_run_time": [30],
            "status": "Returning Series",
            "original_language": "en"
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&source_only(SourceKind::Eztv)).await.unwrap();
    assert_eq!(report.processed_movies, 1);
    assert_eq!(report.processed_episodes, 2);

    let conn = pool.get().unwrap();
    let series = movies::find_series_by_title(&conn, "Медведь").unwrap().unwrap();
    assert_eq!(series.imdb_rating, Some(8.3));
    assert_eq!(series.genres, vec!["комедия".to_string()]);

    let rows = episodes::list_episodes(&conn, series.id).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].season_number, 3);
    assert_eq!(rows[0].episode_number, 1);
    assert_eq!(rows[0].air_date.as_deref(), Some("2024-06-27"));
}

#[tokio::test]
async fn episodes_attach_when_tmdb_names_the_series_differently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "torrents": [
                {"title": "The Bear S03E01 1080p WEB-DL", "date_released_unix": 1719446400}
            ]
        })))
        .mount(&server)
        .await;

    // TMDB's localized name disagrees with the translation table. The series
    // row must stay keyed on the harvest title or its episodes are orphaned.
    Mock::given(method("GET"))
        .and(path("/search/tv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": 136315,
                "name": "Медведь: Кухня",
                "first_air_date": "2022-06-23",
                "vote_average": 8.3,
                "vote_count": 1200
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/136315"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{"id": 35, "name": "комедия"}],
            "episode_run_time": [30],
            "status": "Returning Series",
            "original_language": "en"
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&source_only(SourceKind::Eztv)).await.unwrap();
    assert_eq!(report.processed_movies, 1);
    assert_eq!(report.processed_episodes, 1);

    let conn = pool.get().unwrap();
    let series = movies::find_series_by_title(&conn, "Медведь").unwrap().unwrap();
    assert_eq!(series.tmdb_id, Some(136315));
    assert_eq!(episodes::count_episodes(&conn, series.id).unwrap(), 1);
}

#[tokio::test]
async fn provider_outage_keeps_source_values_for_the_whole_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list_movies.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "data": {
                "movies": [
                    {
                        "title": "First Movie",
                        "year": 2024,
                        "rating": 7.0,
                        "torrents": [{"quality": "1080p"}]
                    },
                    {
                        "title": "Second Movie",
                        "year": 2024,
                        "rating": 7.5,
                        "torrents": [{"quality": "2160p"}]
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    // Every enrichment lookup fails.
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.tmdb.api_key = "test-key".to_string();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&source_only(SourceKind::Yts)).await.unwrap();
    // Both records persist with their source values despite the outage.
    assert_eq!(report.processed_movies, 2);

    let conn = pool.get().unwrap();
    let movie = movies::find_by_title_year(&conn, "First Movie", Some(2024), MediaKind::Movie)
        .unwrap()
        .unwrap();
    assert!(movie.tmdb_id.is_none());
    assert_eq!(movie.imdb_rating, Some(7.0));
}

#[tokio::test]
async fn failed_feed_does_not_abort_the_run() {
    let server = MockServer::start().await;

    // YTS is down; EZTV still serves.
    Mock::given(method("GET"))
        .and(path("/list_movies.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "torrents": [{"title": "Severance S02E01 1080p WEB-DL", "date_released_unix": null}]
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    // No TMDB key: the tmdb source and enrichment stay off.
    config.sources.tmdb_enabled = false;
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let report = pipeline.run(&PipelineOptions::default()).await.unwrap();
    assert_eq!(report.processed_movies, 1);
    assert_eq!(report.processed_episodes, 1);

    let conn = pool.get().unwrap();
    let series = movies::find_series_by_title(&conn, "Severance")
        .unwrap()
        .unwrap();
    assert_eq!(series.imdb_rating, Some(7.5));
    assert_eq!(series.quality.as_deref(), Some("1080p"));
}

#[tokio::test]
async fn reruns_update_rows_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/get-torrents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "torrents": [
                {"title": "Dark S01E01 720p", "date_released_unix": null},
                {"title": "Dark S01E02 720p", "date_released_unix": null}
            ]
        })))
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.sources.tmdb_enabled = false;
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    pipeline.run(&source_only(SourceKind::Eztv)).await.unwrap();
    pipeline.run(&source_only(SourceKind::Eztv)).await.unwrap();

    let conn = pool.get().unwrap();
    assert_eq!(movies::count_movies(&conn).unwrap(), 1);
    let series = movies::find_series_by_title(&conn, "Dark").unwrap().unwrap();
    assert_eq!(episodes::count_episodes(&conn, series.id).unwrap(), 2);
}

/// The server context shares one pipeline between the API and the run
/// guard; make sure the pieces assemble the way main does.
#[tokio::test]
async fn app_context_wires_a_shared_pipeline() {
    let server = MockServer::start().await;
    let mut config = Config::default();
    let (pipeline, pool) = build_pipeline(&server, &mut config);

    let ctx = AppContext::new(config, pool, Arc::new(pipeline));
    let guard = ctx.run_guard.try_lock();
    assert!(guard.is_ok());
    drop(guard);
    assert!(ctx.run_guard.try_lock().is_ok());
}
