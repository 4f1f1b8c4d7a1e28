//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use study_buddy_core::PipelineConfig;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
    pub flashcard_service_url: String,
    pub extraction_service_url: String,
    pub pipeline: PipelineConfig,
    pub summary_api_key: Option<String>,
    pub summary_api_base: String,
    pub summary_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required =
            |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server and Database ---
        let bind_address = parse_var::<SocketAddr>(
            "BIND_ADDRESS",
            &or_default("BIND_ADDRESS", "0.0.0.0:3000"),
        )?;
        let database_url = required("DATABASE_URL")?;
        let log_level = parse_var::<Level>("RUST_LOG", &or_default("RUST_LOG", "INFO"))?;
        let cors_origin = or_default("CORS_ORIGIN", "http://localhost:3000");
        let max_upload_bytes =
            parse_var::<usize>("MAX_UPLOAD_BYTES", &or_default("MAX_UPLOAD_BYTES", "10485760"))?;

        // --- AI Services ---
        let flashcard_service_url = required("FLASHCARD_SERVICE_URL")?;
        let extraction_service_url =
            or_default("EXTRACTION_SERVICE_URL", "http://localhost:8000/extract");

        // --- Flashcard Pipeline ---
        let defaults = PipelineConfig::default();
        let chunk_size = parse_var::<usize>(
            "FLASHCARD_CHUNK_SIZE",
            &or_default("FLASHCARD_CHUNK_SIZE", &defaults.chunk_size.to_string()),
        )?;
        let timeout_secs = parse_var::<u64>(
            "FLASHCARD_TIMEOUT_SECS",
            &or_default("FLASHCARD_TIMEOUT_SECS", &defaults.chunk_timeout.as_secs().to_string()),
        )?;
        let max_concurrent_chunks = parse_var::<usize>(
            "FLASHCARD_MAX_CONCURRENT_CHUNKS",
            &or_default(
                "FLASHCARD_MAX_CONCURRENT_CHUNKS",
                &defaults.max_concurrent_chunks.to_string(),
            ),
        )?;
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "FLASHCARD_CHUNK_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        if max_concurrent_chunks == 0 {
            return Err(ConfigError::InvalidValue(
                "FLASHCARD_MAX_CONCURRENT_CHUNKS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        // --- Summaries (OpenAI-compatible endpoint) ---
        let summary_api_key = lookup("SUMMARY_API_KEY");
        let summary_api_base = or_default("SUMMARY_API_BASE", "https://api.groq.com/openai/v1");
        let summary_model = or_default("SUMMARY_MODEL", "llama-3.3-70b-versatile");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            max_upload_bytes,
            flashcard_service_url,
            extraction_service_url,
            pipeline: PipelineConfig {
                chunk_size,
                chunk_timeout: Duration::from_secs(timeout_secs),
                max_concurrent_chunks,
            },
            summary_api_key,
            summary_api_base,
            summary_model,
        })
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("'{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/study_buddy"),
        ("FLASHCARD_SERVICE_URL", "http://localhost:8001/generate"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.pipeline.chunk_size, 2000);
        assert_eq!(config.pipeline.chunk_timeout, Duration::from_secs(120));
        assert_eq!(config.pipeline.max_concurrent_chunks, 1);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.extraction_service_url, "http://localhost:8000/extract");
        assert!(config.summary_api_key.is_none());
    }

    #[test]
    fn pipeline_settings_are_read_from_the_environment() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("FLASHCARD_CHUNK_SIZE", "500"),
            ("FLASHCARD_TIMEOUT_SECS", "30"),
            ("FLASHCARD_MAX_CONCURRENT_CHUNKS", "4"),
            ("SUMMARY_API_KEY", "gsk_test"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.pipeline.chunk_size, 500);
        assert_eq!(config.pipeline.chunk_timeout, Duration::from_secs(30));
        assert_eq!(config.pipeline.max_concurrent_chunks, 4);
        assert_eq!(config.summary_api_key.as_deref(), Some("gsk_test"));
    }

    #[test]
    fn missing_flashcard_service_url_is_an_error() {
        let err = Config::from_lookup(lookup(&REQUIRED[..1])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "FLASHCARD_SERVICE_URL"));
    }

    #[test]
    fn invalid_numbers_are_reported_by_name() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("FLASHCARD_CHUNK_SIZE", "lots"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "FLASHCARD_CHUNK_SIZE"));

        let mut vars = REQUIRED.to_vec();
        vars.push(("FLASHCARD_MAX_CONCURRENT_CHUNKS", "0"));
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }
}
