//! Token endpoint interactions
//!
//! Three GETs against the Graph API:
//! 1. Authorization code exchange (short-lived user token)
//! 2. Long-lived upgrade (`grant_type=fb_exchange_token`)
//! 3. `debug_token` introspection, authenticated with the app token
//!
//! Every request carries the app secret in its query string, so reqwest
//! errors are stripped of their URL before they are reported.

use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use common::Secret;

use crate::authorize::Endpoints;
use crate::constants::LONG_LIVED_GRANT_TYPE;
use crate::credentials::AppCredentials;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DebugTokenResponse {
    #[serde(default)]
    data: TokenInfo,
}

/// Token metadata from `debug_token`. Every field is optional; an empty
/// value is what callers fall back to when introspection fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub token_type: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub app_id: Option<String>,
    pub application: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    /// Unix seconds; 0 means the token never expires
    pub expires_at: Option<i64>,
    pub data_access_expires_at: Option<i64>,
    pub is_valid: bool,
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// `Never` for non-expiring tokens, `N/A` when unknown.
    pub fn expires_display(&self) -> String {
        match self.expires_at {
            Some(0) => "Never".into(),
            Some(ts) => ts.to_string(),
            None => "N/A".into(),
        }
    }

    /// Scopes from `required` that the token lacks.
    pub fn missing_scopes<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|scope| !self.scopes.iter().any(|s| s == scope))
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Exchange an authorization code for a short-lived user token.
pub async fn exchange_code(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &AppCredentials,
    redirect_uri: &str,
    code: &str,
) -> Result<Secret<String>> {
    let body = get_json(
        client,
        &endpoints.token_url(),
        &[
            ("client_id", credentials.app_id.as_str()),
            ("client_secret", credentials.app_secret.expose().as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ],
        "code exchange",
    )
    .await?;
    access_token_from(body, "code exchange")
}

/// Upgrade a short-lived user token to a long-lived one (about 60 days).
pub async fn exchange_long_lived(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &AppCredentials,
    short_lived: &str,
) -> Result<Secret<String>> {
    let body = get_json(
        client,
        &endpoints.token_url(),
        &[
            ("grant_type", LONG_LIVED_GRANT_TYPE),
            ("client_id", credentials.app_id.as_str()),
            ("client_secret", credentials.app_secret.expose().as_str()),
            ("fb_exchange_token", short_lived),
        ],
        "long-lived exchange",
    )
    .await?;
    access_token_from(body, "long-lived exchange")
}

/// Introspect `token` using the app access token.
pub async fn debug_token(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &AppCredentials,
    token: &str,
) -> Result<TokenInfo> {
    let app_token = credentials.app_access_token();
    let body = get_json(
        client,
        &endpoints.debug_token_url(),
        &[
            ("input_token", token),
            ("access_token", app_token.expose().as_str()),
        ],
        "debug_token",
    )
    .await?;
    let parsed: DebugTokenResponse = serde_json::from_value(body)
        .map_err(|e| Error::TokenExchange(format!("invalid debug_token response: {e}")))?;
    Ok(parsed.data)
}

fn access_token_from(body: Value, what: &str) -> Result<Secret<String>> {
    let parsed: AccessTokenResponse = serde_json::from_value(body)
        .map_err(|e| Error::TokenExchange(format!("invalid {what} response: {e}")))?;
    match parsed.access_token {
        Some(token) if !token.is_empty() => Ok(Secret::new(token)),
        _ => Err(Error::TokenExchange(format!(
            "{what} response did not contain an access_token"
        ))),
    }
}

async fn get_json(
    client: &reqwest::Client,
    endpoint: &str,
    params: &[(&str, &str)],
    what: &str,
) -> Result<Value> {
    let url = Url::parse_with_params(endpoint, params)
        .map_err(|e| Error::Http(format!("invalid {what} URL: {e}")))?;
    debug!(path = url.path(), what, "token endpoint request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Http(format!("{what} request failed: {}", e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "{what} returned {status}: {body}"
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid {what} response: {}", e.without_url())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;
    use tokio::net::TcpListener;

    fn credentials() -> AppCredentials {
        AppCredentials::new("app-1", Secret::new("app-secret".into()))
    }

    /// Mock Graph token endpoints. The short-lived code `good` and token
    /// `short` succeed; anything else is rejected like the provider does.
    async fn start_mock_provider() -> Endpoints {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let app = axum::Router::new()
                .route(
                    "/v23.0/oauth/access_token",
                    get(|Query(q): Query<HashMap<String, String>>| async move {
                        let ok = match q.get("grant_type").map(String::as_str) {
                            Some("fb_exchange_token") => {
                                q.get("fb_exchange_token").map(String::as_str) == Some("short")
                            }
                            _ => {
                                q.get("code").map(String::as_str) == Some("good")
                                    && q.get("redirect_uri").is_some()
                            }
                        };
                        let secret_ok =
                            q.get("client_secret").map(String::as_str) == Some("app-secret");
                        if ok && secret_ok {
                            let token = if q.contains_key("grant_type") { "long" } else { "short" };
                            (
                                StatusCode::OK,
                                json!({"access_token": token, "token_type": "bearer"}).to_string(),
                            )
                        } else {
                            (
                                StatusCode::BAD_REQUEST,
                                json!({"error": {"message": "Invalid verification code format."}})
                                    .to_string(),
                            )
                        }
                    }),
                )
                .route(
                    "/v23.0/debug_token",
                    get(|Query(q): Query<HashMap<String, String>>| async move {
                        assert_eq!(q["access_token"], "app-1|app-secret");
                        axum::Json(json!({
                            "data": {
                                "app_id": "app-1",
                                "type": "USER",
                                "application": "Ads Toolkit",
                                "expires_at": 0,
                                "is_valid": true,
                                "scopes": ["ads_read", "read_insights"],
                                "user_id": 10157
                            }
                        }))
                    }),
                );
            axum::serve(listener, app).await.unwrap();
        });

        Endpoints {
            graph: format!("http://{addr}/v23.0"),
            dialog: format!("http://{addr}/v23.0/dialog/oauth"),
        }
    }

    #[tokio::test]
    async fn code_then_upgrade_yields_long_lived_token() {
        let endpoints = start_mock_provider().await;
        let client = reqwest::Client::new();
        let creds = credentials();

        let short = exchange_code(&client, &endpoints, &creds, "http://localhost:8000/callback", "good")
            .await
            .unwrap();
        assert_eq!(short.expose(), "short");

        let long = exchange_long_lived(&client, &endpoints, &creds, short.expose())
            .await
            .unwrap();
        assert_eq!(long.expose(), "long");
    }

    #[tokio::test]
    async fn rejected_code_carries_provider_body() {
        let endpoints = start_mock_provider().await;
        let err = exchange_code(
            &reqwest::Client::new(),
            &endpoints,
            &credentials(),
            "http://localhost:8000/callback",
            "bad",
        )
        .await
        .unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, Error::TokenExchange(_)));
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("Invalid verification code"), "got: {msg}");
        assert!(!msg.contains("app-secret"), "secret leaked: {msg}");
    }

    #[tokio::test]
    async fn debug_token_parses_metadata() {
        let endpoints = start_mock_provider().await;
        let info = debug_token(&reqwest::Client::new(), &endpoints, &credentials(), "long")
            .await
            .unwrap();

        assert!(info.is_valid);
        assert_eq!(info.token_type.as_deref(), Some("USER"));
        assert_eq!(info.user_id.as_deref(), Some("10157"));
        assert_eq!(info.expires_display(), "Never");
        assert_eq!(
            info.missing_scopes(&crate::constants::REQUIRED_SCOPES),
            vec!["ads_management", "business_management"]
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error_without_secret() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoints = Endpoints {
            graph: format!("http://{addr}/v23.0"),
            dialog: String::new(),
        };
        let err = exchange_long_lived(&reqwest::Client::new(), &endpoints, &credentials(), "short")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got: {err:?}");
        assert!(!err.to_string().contains("app-secret"));
    }

    #[test]
    fn missing_access_token_is_exchange_error() {
        let err = access_token_from(json!({"token_type": "bearer"}), "code exchange").unwrap_err();
        assert!(err.to_string().contains("did not contain an access_token"));
    }

    #[test]
    fn token_info_defaults_when_empty() {
        let info: TokenInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info, TokenInfo::default());
        assert_eq!(info.expires_display(), "N/A");
        assert!(!info.is_valid);
    }

    #[test]
    fn token_info_expiry_timestamp() {
        let info = TokenInfo {
            expires_at: Some(1_767_225_600),
            ..Default::default()
        };
        assert_eq!(info.expires_display(), "1767225600");
    }
}
