use common::{EnvFile, Settings};
use meta_auth::Endpoints;

/// Resolved configuration shared by every subcommand.
pub struct App {
    pub http: reqwest::Client,
    pub settings: Settings,
    pub env: EnvFile,
}

impl App {
    pub fn new(http: reqwest::Client, settings: Settings, env: EnvFile) -> Self {
        Self {
            http,
            settings,
            env,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_settings(&self.settings)
    }
}
