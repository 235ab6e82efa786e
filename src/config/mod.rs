mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./filmradar.toml",
        "~/.config/filmradar/config.toml",
        "/etc/filmradar/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.pipeline.enrich_concurrency == 0 {
        anyhow::bail!("pipeline.enrich_concurrency cannot be 0");
    }

    if config.tmdb.api_key.is_empty() {
        tracing::warn!("No TMDB API key configured, enrichment and the tmdb source are disabled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tmdb.language, "ru-RU");
        assert_eq!(config.pipeline.enrich_concurrency, 4);
        assert!(config.sources.curated_enabled);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [tmdb]
            api_key = "secret"

            [sources]
            eztv_enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.tmdb.api_key, "secret");
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert!(!config.sources.eztv_enabled);
        assert!(config.sources.yts_enabled);
        assert_eq!(config.sources.yts_limit, 30);
    }

    #[test]
    fn zero_port_is_rejected() {
        let config: Config = toml::from_str("[server]\nport = 0").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config: Config = toml::from_str("[pipeline]\nenrich_concurrency = 0").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
