//! App credentials and token persistence
//!
//! `FB_APP_ID` and `FB_APP_SECRET` are read through the key/value file view
//! (process environment first). Both must be present before any exchange.
//! The long-lived token is written back to the same file under
//! `FB_ACCESS_TOKEN`, leaving every other line untouched.

use std::path::Path;

use common::{EnvFile, Secret};
use tracing::info;

use crate::constants::{ACCESS_TOKEN_KEY, APP_ID_KEY, APP_SECRET_KEY};
use crate::error::{Error, Result};

/// The application's id and secret.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: Secret<String>,
}

impl AppCredentials {
    pub fn new(app_id: impl Into<String>, app_secret: Secret<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret,
        }
    }

    /// Resolve both values, naming every missing key in the error.
    pub fn from_env_file(env: &EnvFile) -> Result<Self> {
        let app_id = env.lookup_non_empty(APP_ID_KEY);
        let app_secret = env.lookup_non_empty(APP_SECRET_KEY);

        match (app_id, app_secret) {
            (Some(app_id), Some(app_secret)) => Ok(Self::new(app_id, Secret::new(app_secret))),
            (app_id, app_secret) => {
                let missing: Vec<&str> = [
                    app_id.is_none().then_some(APP_ID_KEY),
                    app_secret.is_none().then_some(APP_SECRET_KEY),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(Error::MissingConfiguration(format!(
                    "{} not set in the environment or {}",
                    missing.join(" and "),
                    env.path().display()
                )))
            }
        }
    }

    /// App access token (`{app_id}|{app_secret}`) used for introspection.
    pub fn app_access_token(&self) -> Secret<String> {
        Secret::new(format!("{}|{}", self.app_id, self.app_secret.expose()))
    }
}

/// Write `FB_ACCESS_TOKEN` into the key/value file at `path`.
pub fn persist_access_token(path: &Path, token: &Secret<String>) -> Result<()> {
    EnvFile::set_key(path, ACCESS_TOKEN_KEY, token.expose())
        .map_err(|e| Error::Io(format!("saving {ACCESS_TOKEN_KEY} to {}: {e}", path.display())))?;
    info!(path = %path.display(), "access token saved");
    Ok(())
}
