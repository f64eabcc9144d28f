//! Configuration management for the server.

use std::collections::HashSet;
use std::env;

use crate::handlers::is_valid_kind;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Entity kinds whose mutations answer 503, for exercising client rollback
    pub fail_kinds: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            fail_kinds: HashSet::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let fail_kinds = match env::var("PADDOCK_FAIL_KINDS") {
            Ok(raw) => parse_fail_kinds(&raw)?,
            Err(_) => HashSet::new(),
        };

        Ok(Self {
            host,
            port,
            fail_kinds,
        })
    }

    pub fn with_fail_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Whether mutations of `kind` should be refused.
    pub fn should_fail(&self, kind: &str) -> bool {
        self.fail_kinds.contains(kind)
    }
}

/// Parse a comma-separated kind list. Blank entries are skipped.
pub fn parse_fail_kinds(raw: &str) -> Result<HashSet<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map(|kind| {
            if is_valid_kind(kind) {
                Ok(kind.to_string())
            } else {
                Err(ConfigError::InvalidFailKind(kind.to_string()))
            }
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid entity kind in PADDOCK_FAIL_KINDS: {0}")]
    InvalidFailKind(String),
}
