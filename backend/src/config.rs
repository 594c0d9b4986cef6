//! Startup configuration, read once from the process environment.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_DATABASE_PATH: &str = "formdata.sqlite";
const DEFAULT_UPLOADS_DIR: &str = "uploads";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got `{0}`")]
    InvalidPort(String),
}

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
}

impl Config {
    /// Reads configuration from the environment, falling back to defaults
    /// for anything unset. Only a malformed `PORT` is a hard error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH));
        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOADS_DIR));

        Ok(Self {
            host,
            port,
            database_path,
            uploads_dir,
        })
    }
}
