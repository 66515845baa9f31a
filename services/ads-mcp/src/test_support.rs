//! Shared fixtures: a mock Graph API that echoes each request back.

use axum::http::{StatusCode, Uri};
use common::{GraphSettings, Secret};
use graph_api::{GraphClient, GraphTools, TokenSource};
use serde_json::json;
use tokio::net::TcpListener;

/// `GraphTools` pointed at a local server answering `{path, query}`.
/// Requests under `/v23.0/fail` answer 400 with a provider error body.
pub async fn echo_tools() -> GraphTools {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let app = axum::Router::new().fallback(|uri: Uri| async move {
            if uri.path().starts_with("/v23.0/fail") {
                return (
                    StatusCode::BAD_REQUEST,
                    axum::Json(json!({"error": {"message": "Invalid OAuth access token"}})),
                );
            }
            (
                StatusCode::OK,
                axum::Json(json!({
                    "path": uri.path(),
                    "query": uri.query().unwrap_or(""),
                })),
            )
        });
        axum::serve(listener, app).await.unwrap();
    });

    let settings = GraphSettings {
        base_url: format!("http://{addr}"),
        api_version: "v23.0".into(),
    };
    GraphTools::new(
        GraphClient::new(reqwest::Client::new(), &settings),
        TokenSource::fixed(Secret::new("test-token".to_owned())),
    )
}
