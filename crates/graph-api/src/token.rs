//! Access token resolution
//!
//! Configuration wins over the command line: `FB_ACCESS_TOKEN` from the
//! process environment or the key/value file, then `--fb-token <value>` from
//! the argument vector. The first successful resolution is cached for the
//! lifetime of the [`TokenSource`].

use std::sync::OnceLock;

use common::{EnvFile, Secret};
use tracing::info;

use crate::error::{Error, Result};

/// Configuration key holding the bearer token
pub const ACCESS_TOKEN_ENV: &str = "FB_ACCESS_TOKEN";

/// Command-line flag carrying the bearer token
pub const ACCESS_TOKEN_FLAG: &str = "--fb-token";

/// Resolve a token from an already-read configuration value and the
/// argument vector. Blank configured values count as absent.
pub fn resolve_access_token(configured: Option<String>, args: &[String]) -> Result<Secret<String>> {
    if let Some(token) = configured.filter(|t| !t.trim().is_empty()) {
        info!(source = "configuration", "Using access token");
        return Ok(Secret::new(token));
    }

    let Some(idx) = args.iter().position(|a| a == ACCESS_TOKEN_FLAG) else {
        return Err(Error::Configuration(format!(
            "access token must be provided via the {ACCESS_TOKEN_ENV} setting or the {ACCESS_TOKEN_FLAG} argument"
        )));
    };

    match args.get(idx + 1) {
        Some(value) if !value.is_empty() && !value.starts_with("--") => {
            info!(source = "argument", "Using access token");
            Ok(Secret::new(value.clone()))
        }
        _ => Err(Error::Configuration(format!(
            "{ACCESS_TOKEN_FLAG} argument provided but no token value followed it"
        ))),
    }
}

/// Lazily resolved, write-once access token.
#[derive(Debug)]
pub struct TokenSource {
    configured: Option<String>,
    args: Vec<String>,
    cached: OnceLock<Secret<String>>,
}

impl TokenSource {
    pub fn new(configured: Option<String>, args: Vec<String>) -> Self {
        Self {
            configured,
            args,
            cached: OnceLock::new(),
        }
    }

    /// Read `FB_ACCESS_TOKEN` through the key/value file (process
    /// environment first).
    pub fn from_env_file(env: &EnvFile, args: Vec<String>) -> Self {
        Self::new(env.lookup_non_empty(ACCESS_TOKEN_ENV), args)
    }

    /// A source that is already resolved.
    pub fn fixed(token: Secret<String>) -> Self {
        let cached = OnceLock::new();
        let _ = cached.set(token);
        Self {
            configured: None,
            args: Vec::new(),
            cached,
        }
    }

    /// The bearer token, resolving it on first use.
    pub fn access_token(&self) -> Result<&Secret<String>> {
        if let Some(token) = self.cached.get() {
            return Ok(token);
        }
        let token = resolve_access_token(self.configured.clone(), &self.args)?;
        Ok(self.cached.get_or_init(|| token))
    }
}
