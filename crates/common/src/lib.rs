//! Shared types for the Meta Ads toolkit
//!
//! Everything here is synchronous and free of network concerns: the secret
//! wrapper, the configuration error type, the dotenv-style credential file
//! and the optional TOML settings file.

mod env_file;
mod error;
mod secret;
mod settings;

pub use env_file::EnvFile;
pub use error::{Error, Result};
pub use secret::Secret;
pub use settings::{
    DEFAULT_SETTINGS_PATH, ENV_FILE_ENV, GraphSettings, OAuthSettings, Settings,
};
