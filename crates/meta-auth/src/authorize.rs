//! Authorization dialog redirect
//!
//! The CSRF `state` is 32 random bytes encoded as URL-safe base64 without
//! padding (43 characters). The provider echoes it back on the callback.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use reqwest::Url;

use common::Settings;

use crate::constants::SCOPES;
use crate::error::{Error, Result};

/// Provider URLs derived from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Versioned Graph API base, e.g. `https://graph.facebook.com/v23.0`
    pub graph: String,
    /// Login dialog, e.g. `https://www.facebook.com/v23.0/dialog/oauth`
    pub dialog: String,
}

impl Endpoints {
    pub fn from_settings(settings: &Settings) -> Self {
        let version = settings.graph.api_version.trim_matches('/');
        Self {
            graph: format!(
                "{}/{version}",
                settings.graph.base_url.trim_end_matches('/')
            ),
            dialog: format!(
                "{}/{version}/dialog/oauth",
                settings.oauth.dialog_base_url.trim_end_matches('/')
            ),
        }
    }

    /// Code exchange and long-lived upgrade endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/access_token", self.graph)
    }

    /// Token introspection endpoint.
    pub fn debug_token_url(&self) -> String {
        format!("{}/debug_token", self.graph)
    }
}

/// Generate an unguessable CSRF state value.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the login dialog URL the browser is redirected to.
pub fn build_authorization_url(
    endpoints: &Endpoints,
    app_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String> {
    let scope = SCOPES.join(",");
    let url = Url::parse_with_params(
        &endpoints.dialog,
        [
            ("client_id", app_id),
            ("redirect_uri", redirect_uri),
            ("state", state),
            ("scope", scope.as_str()),
            ("response_type", "code"),
        ],
    )
    .map_err(|e| Error::MissingConfiguration(format!("invalid dialog URL: {e}")))?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn endpoints() -> Endpoints {
        Endpoints::from_settings(&Settings::default())
    }

    #[test]
    fn state_is_43_url_safe_chars() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(
            state
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "state must be URL-safe base64 (no padding): {state}"
        );
        assert_eq!(URL_SAFE_NO_PAD.decode(&state).unwrap().len(), 32);
    }

    #[test]
    fn states_are_unique() {
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn default_endpoints() {
        let endpoints = endpoints();
        assert_eq!(endpoints.dialog, "https://www.facebook.com/v23.0/dialog/oauth");
        assert_eq!(
            endpoints.token_url(),
            "https://graph.facebook.com/v23.0/oauth/access_token"
        );
        assert_eq!(
            endpoints.debug_token_url(),
            "https://graph.facebook.com/v23.0/debug_token"
        );
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let state = generate_state();
        let url = build_authorization_url(
            &endpoints(),
            "1234567890",
            "http://localhost:8000/callback",
            &state,
        )
        .unwrap();

        assert!(url.starts_with("https://www.facebook.com/v23.0/dialog/oauth?"));

        let parsed = Url::parse(&url).unwrap();
        let query: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "1234567890");
        assert_eq!(query["redirect_uri"], "http://localhost:8000/callback");
        assert_eq!(query["state"], state);
        assert_eq!(query["response_type"], "code");
        assert_eq!(
            query["scope"],
            "ads_read,ads_management,business_management,read_insights"
        );
    }

    #[test]
    fn query_parameter_order_is_stable() {
        let url = build_authorization_url(&endpoints(), "1", "http://localhost:8000/callback", "s")
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let keys: Vec<String> = parsed.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(
            keys,
            vec!["client_id", "redirect_uri", "state", "scope", "response_type"]
        );
    }
}
