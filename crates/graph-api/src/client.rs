//! Graph call executor
//!
//! One GET per call. Non-2xx responses are surfaced with their body so the
//! provider's error object reaches the caller; nothing is retried. Request
//! URLs carry the access token, so only the path is ever logged and reqwest
//! errors are stripped of their URL before they are stringified.

use common::GraphSettings;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::params::QueryParams;

/// Thin Graph API client bound to one base URL and API version.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl GraphClient {
    pub fn new(http: reqwest::Client, settings: &GraphSettings) -> Self {
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            api_version: settings.api_version.trim_matches('/').to_owned(),
        }
    }

    /// `{base_url}/{api_version}/{path}`. An empty path addresses the API
    /// root, which is where multi-id lookups go.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.api_version,
            path.trim_start_matches('/')
        )
    }

    /// GET `url` with `params` as the query string.
    pub async fn get(&self, url: &str, params: &QueryParams) -> Result<Value> {
        let url = Url::parse_with_params(url, params.iter())
            .map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        self.execute(url).await
    }

    /// GET a fully formed URL (a `paging.next`/`paging.previous` link that
    /// already embeds its token).
    pub async fn get_url(&self, url: &str) -> Result<Value> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        self.execute(url).await
    }

    async fn execute(&self, url: Url) -> Result<Value> {
        let call_id = Uuid::new_v4();
        let path = url.path().to_owned();
        debug!(%call_id, %path, "Graph API request");

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(%call_id, %path, "Graph API request failed");
            Error::Transport(e.without_url().to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            warn!(%call_id, %path, status = status.as_u16(), "Graph API returned error status");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.without_url().to_string()))?;
        debug!(%call_id, %path, status = status.as_u16(), bytes = body.len(), "Graph API response");

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}
