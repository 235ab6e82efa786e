mod cli;

use filmradar::{
    config::{self, Config},
    metadata::{Enricher, TmdbProvider},
    pipeline::{Pipeline, PipelineOptions},
    quality, server,
    sources::{SourceKind, SourceSet},
};
use filmradar_db::pool::{init_pool, DbPool};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

fn build_pipeline(config: &Config, pool: DbPool) -> Pipeline {
    let provider = Arc::new(
        TmdbProvider::new(config.tmdb.api_key.clone(), config.tmdb.language.clone())
            .with_base_url(config.tmdb.base_url.clone()),
    );
    let sources = SourceSet::from_config(&config.sources, provider.clone());
    let enricher = Enricher::new(provider);
    Pipeline::new(sources, enricher, pool, config.pipeline.enrich_concurrency)
}

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting Film Radar server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let db_path = config.database.path.to_string_lossy().into_owned();
    tracing::info!("Initializing database at {}", db_path);
    let pool = init_pool(&db_path)?;

    let pipeline = Arc::new(build_pipeline(&config, pool.clone()));
    let ctx = server::AppContext::new(config, pool, pipeline);

    server::start_server(ctx).await
}

async fn run_once(
    config_path: Option<&std::path::Path>,
    limit: Option<usize>,
    source: Option<String>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let source = source
        .as_deref()
        .map(str::parse::<SourceKind>)
        .transpose()?;

    let db_path = config.database.path.to_string_lossy().into_owned();
    let pool = init_pool(&db_path)?;
    let pipeline = build_pipeline(&config, pool);

    let options = PipelineOptions { limit, source };
    let report = pipeline.run(&options).await?;

    println!(
        "Processed {} movies and {} episodes",
        report.processed_movies, report.processed_episodes
    );
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(path)?;
    config::validate_config(&config)?;
    println!("Configuration is valid");
    println!("  server: {}:{}", config.server.host, config.server.port);
    println!("  database: {:?}", config.database.path);
    println!(
        "  tmdb: {} ({})",
        if config.tmdb.api_key.is_empty() {
            "not configured"
        } else {
            "configured"
        },
        config.tmdb.language
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "filmradar=trace,filmradar_db=debug,filmradar_common=debug,tower_http=debug"
                .to_string()
        } else {
            "filmradar=debug,filmradar_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Run { limit, source } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_once(cli.config.as_deref(), limit, source))
        }
        Commands::Score { quality } => {
            println!("{}", quality::score_quality(&quality));
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("filmradar {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
