//! Optional TOML settings
//!
//! Settings precedence: CLI args > env vars > settings file > defaults.
//! Every field has a default, so running without a settings file talks to
//! the production Graph API and listens on the documented OAuth port.
//! Credentials never live here; they come from the environment or the
//! key/value file named by `env_file`.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Settings file looked up in the working directory when no path is given
pub const DEFAULT_SETTINGS_PATH: &str = "meta-ads.toml";

/// Env var overriding the key/value credential file location
pub const ENV_FILE_ENV: &str = "META_ENV_FILE";

/// Root settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
    /// Key/value file holding app credentials and the access token
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,
}

/// Graph API endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphSettings {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

/// Local OAuth listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Host serving the login dialog (`{base}/{version}/dialog/oauth`)
    #[serde(default = "default_dialog_base_url")]
    pub dialog_base_url: String,
    /// Delay between a successful exchange and the listener shutting down
    #[serde(default = "default_shutdown_delay")]
    pub shutdown_delay_secs: u64,
    /// Lifetime of an issued CSRF state token
    #[serde(default = "default_state_ttl")]
    pub state_ttl_secs: u64,
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".into()
}

fn default_api_version() -> String {
    "v23.0".into()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_redirect_uri() -> String {
    "http://localhost:8000/callback".into()
}

fn default_dialog_base_url() -> String {
    "https://www.facebook.com".into()
}

fn default_shutdown_delay() -> u64 {
    2
}

fn default_state_ttl() -> u64 {
    600
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
            api_version: default_api_version(),
        }
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            redirect_uri: default_redirect_uri(),
            dialog_base_url: default_dialog_base_url(),
            shutdown_delay_secs: default_shutdown_delay(),
            state_ttl_secs: default_state_ttl(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph: GraphSettings::default(),
            oauth: OAuthSettings::default(),
            env_file: default_env_file(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Resolve the settings file from the CLI arg or `CONFIG_PATH`, falling
    /// back to [`DEFAULT_SETTINGS_PATH`].
    ///
    /// An explicitly named file must exist; the default file is optional and
    /// its absence yields [`Settings::default`].
    pub fn load_or_default(cli_path: Option<&str>) -> Result<Self> {
        let explicit = cli_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));

        match explicit {
            Some(path) => Self::load(&path).map_err(|e| match e {
                Error::Io(io) => Error::Config(format!(
                    "failed to read settings file {}: {io}",
                    path.display()
                )),
                other => other,
            }),
            None => {
                let path = Path::new(DEFAULT_SETTINGS_PATH);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Key/value file location, honouring the `META_ENV_FILE` override.
    pub fn env_file_path(&self) -> PathBuf {
        match std::env::var(ENV_FILE_ENV) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => self.env_file.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("graph.base_url", &self.graph.base_url),
            ("oauth.redirect_uri", &self.oauth.redirect_uri),
            ("oauth.dialog_base_url", &self.oauth.dialog_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if !self.graph.api_version.starts_with('v') {
            return Err(Error::Config(format!(
                "graph.api_version must look like v23.0, got: {}",
                self.graph.api_version
            )));
        }

        if self.oauth.state_ttl_secs == 0 {
            return Err(Error::Config(
                "oauth.state_ttl_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.graph.base_url, "https://graph.facebook.com");
        assert_eq!(settings.graph.api_version, "v23.0");
        assert_eq!(settings.oauth.listen_addr.port(), 8000);
        assert_eq!(settings.oauth.redirect_uri, "http://localhost:8000/callback");
        assert_eq!(settings.oauth.shutdown_delay_secs, 2);
        assert_eq!(settings.oauth.state_ttl_secs, 600);
        assert_eq!(settings.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_toml(
            r#"
env_file = "/etc/meta/.env"

[graph]
base_url = "http://127.0.0.1:9999"
api_version = "v22.0"

[oauth]
listen_addr = "127.0.0.1:8123"
redirect_uri = "http://localhost:8123/callback"
shutdown_delay_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(settings.graph.base_url, "http://127.0.0.1:9999");
        assert_eq!(settings.graph.api_version, "v22.0");
        assert_eq!(settings.oauth.listen_addr.port(), 8123);
        assert_eq!(settings.oauth.shutdown_delay_secs, 0);
        assert_eq!(settings.oauth.dialog_base_url, "https://www.facebook.com");
        assert_eq!(settings.env_file, PathBuf::from("/etc/meta/.env"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = Settings::from_toml("[graph]\nbase_url = \"graph.facebook.com\"\n").unwrap_err();
        assert!(err.to_string().contains("graph.base_url"), "got: {err}");
    }

    #[test]
    fn rejects_bad_api_version() {
        let err = Settings::from_toml("[graph]\napi_version = \"23.0\"\n").unwrap_err();
        assert!(err.to_string().contains("api_version"), "got: {err}");
    }

    #[test]
    fn rejects_zero_state_ttl() {
        assert!(Settings::from_toml("[oauth]\nstate_ttl_secs = 0\n").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::from_toml("[graph]\nbase = \"x\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let err = Settings::load_or_default(Some("/nonexistent/meta-ads.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/meta-ads.toml"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[graph]\napi_version = \"v21.0\"\n").unwrap();

        let settings = Settings::load_or_default(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.graph.api_version, "v21.0");
    }

    #[test]
    fn env_file_override_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let settings = Settings::default();

        unsafe { set_env(ENV_FILE_ENV, "/tmp/meta-test.env") };
        assert_eq!(settings.env_file_path(), PathBuf::from("/tmp/meta-test.env"));
        unsafe { remove_env(ENV_FILE_ENV) };

        assert_eq!(settings.env_file_path(), PathBuf::from(".env"));
    }
}
