//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `cafe-server.{toml,yaml,json}` file, then `CAFE_*` environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Shared secret used when none is configured.
pub const DEFAULT_API_KEY: &str = "TopSecretAPIKey";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub database_path: String,
    pub api_key: String,
    pub static_dir: PathBuf,
}

impl Settings {
    /// Load from `CAFE_CONFIG` (if set) or `./cafe-server.*`, then the environment.
    pub fn load() -> Result<Self> {
        let file = std::env::var("CAFE_CONFIG").ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        Self::load_with(file, ::config::Environment::with_prefix("CAFE"))
    }

    /// Load with an explicit environment source layered over the file.
    pub fn load_with(file: Option<&Path>, env: ::config::Environment) -> Result<Self> {
        let default_static = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");

        let mut builder = ::config::Config::builder()
            .set_default("bind_address", "127.0.0.1:5000")?
            .set_default("database_path", "cafes.db")?
            .set_default("api_key", DEFAULT_API_KEY)?
            .set_default("static_dir", default_static.to_string_lossy().to_string())?;

        builder = match file {
            Some(path) => builder.add_source(::config::File::from(path)),
            None => builder.add_source(::config::File::with_name("cafe-server").required(false)),
        };

        let settings: Settings = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;

        if settings.api_key == DEFAULT_API_KEY {
            tracing::warn!("CAFE_API_KEY not set, using default (insecure for production)");
        }

        Ok(settings)
    }
}
