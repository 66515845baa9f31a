//! HTTP routes of the local OAuth listener
//!
//! Routes:
//! - GET /          issue a CSRF state, 302 to the login dialog
//! - GET /callback  verify state, exchange code, upgrade, persist, render
//! - anything else  404
//!
//! Flow state and the CSRF slot live in one context behind a mutex that is
//! held for the whole callback, so a callback is processed end to end before
//! the next one is looked at.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info, warn};

use common::Secret;
use meta_auth::{
    AppCredentials, Endpoints, StateStore, TokenInfo, build_authorization_url, debug_token,
    exchange_code, exchange_long_lived, persist_access_token,
};

use crate::flow::{FlowAction, FlowEvent, FlowState, handle_event};
use crate::page;

/// Mutable flow state guarded by the context mutex.
#[derive(Debug)]
pub struct FlowContext {
    flow: FlowState,
    states: StateStore,
}

impl FlowContext {
    fn transition(&mut self, event: FlowEvent) -> FlowAction {
        let current = std::mem::replace(&mut self.flow, FlowState::Start);
        let (next, action) = handle_event(current, event);
        info!(state = ?next, "flow transition");
        self.flow = next;
        action
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }
}

/// Shared state for the listener's handlers.
#[derive(Clone)]
pub struct OAuthState {
    inner: Arc<Mutex<FlowContext>>,
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: AppCredentials,
    redirect_uri: String,
    env_file: PathBuf,
    completion: mpsc::Sender<()>,
}

impl OAuthState {
    pub fn new(
        http: reqwest::Client,
        endpoints: Endpoints,
        credentials: AppCredentials,
        redirect_uri: String,
        env_file: PathBuf,
        states: StateStore,
        completion: mpsc::Sender<()>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FlowContext {
                flow: FlowState::Start,
                states,
            })),
            http,
            endpoints,
            credentials,
            redirect_uri,
            env_file,
            completion,
        }
    }

    /// Current flow state.
    pub async fn flow(&self) -> FlowState {
        self.inner.lock().await.flow().clone()
    }
}

/// Query parameters the provider may send to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Build the listener router.
///
/// A concurrency limit of one serializes requests.
pub fn build_router(state: OAuthState) -> Router {
    Router::new()
        .route("/", get(authorize))
        .route("/callback", get(callback))
        .fallback(not_found)
        .layer(tower::limit::ConcurrencyLimitLayer::new(1))
        .with_state(state)
}

/// `GET /`: start the flow.
async fn authorize(State(state): State<OAuthState>) -> Response {
    let mut ctx = state.inner.lock().await;

    match ctx.transition(FlowEvent::AuthorizeRequested) {
        FlowAction::Redirect => {
            let csrf = ctx.states.issue();
            match build_authorization_url(
                &state.endpoints,
                &state.credentials.app_id,
                &state.redirect_uri,
                &csrf,
            ) {
                Ok(url) => {
                    info!("redirecting to login dialog");
                    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
                }
                Err(e) => {
                    error!(error = %e, "failed to build authorization URL");
                    html(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        page::status_error(500, &e.to_string()),
                    )
                }
            }
        }
        action => respond_other(action),
    }
}

/// `GET /callback`: finish the flow.
async fn callback(
    State(state): State<OAuthState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let mut ctx = state.inner.lock().await;

    let check = ctx.states.verify(non_blank(params.state).as_deref());
    let action = ctx.transition(FlowEvent::CallbackReceived {
        check,
        code: non_blank(params.code),
        error: non_blank(params.error),
        error_description: non_blank(params.error_description),
    });

    let code = match action {
        FlowAction::ExchangeCode { code } => code,
        action => return respond_other(action),
    };

    let short_lived = match exchange_code(
        &state.http,
        &state.endpoints,
        &state.credentials,
        &state.redirect_uri,
        &code,
    )
    .await
    {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "code exchange failed");
            let action = ctx.transition(FlowEvent::ExchangeFailed(format!("Error: {e}")));
            return respond_other(action);
        }
    };
    ctx.transition(FlowEvent::CodeExchanged);

    let long_lived = match exchange_long_lived(
        &state.http,
        &state.endpoints,
        &state.credentials,
        short_lived.expose(),
    )
    .await
    {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "long-lived token exchange failed");
            return respond_other(ctx.transition(FlowEvent::ExchangeFailed(
                "Failed to get long-lived token".into(),
            )));
        }
    };

    match ctx.transition(FlowEvent::TokenUpgraded) {
        FlowAction::Complete => complete(&state, &long_lived).await,
        action => respond_other(action),
    }
}

/// Introspect, persist and signal completion. Introspection and persistence
/// failures only degrade the page.
async fn complete(state: &OAuthState, token: &Secret<String>) -> Response {
    let introspection =
        debug_token(&state.http, &state.endpoints, &state.credentials, token.expose()).await;
    let info = match introspection {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "token introspection failed");
            TokenInfo::default()
        }
    };

    let saved = match persist_access_token(&state.env_file, token) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not save access token; add it manually");
            false
        }
    };

    info!(
        token_type = info.token_type.as_deref().unwrap_or("N/A"),
        valid = info.is_valid,
        scopes = %info.scopes.join(","),
        saved,
        "authorization complete"
    );

    if state.completion.try_send(()).is_err() {
        warn!("completion already signalled");
    }

    html(
        StatusCode::OK,
        page::success(token, &info, saved, &state.env_file.display().to_string()),
    )
}

fn respond_other(action: FlowAction) -> Response {
    match action {
        FlowAction::Reject { status, message } => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            warn!(status, message, "callback rejected");
            html(code, page::status_error(status, message))
        }
        FlowAction::ProviderError { error, description } => {
            warn!(%error, %description, "authorization denied by provider");
            html(StatusCode::BAD_REQUEST, page::provider_error(&error, &description))
        }
        FlowAction::Fail { message } => html(
            StatusCode::INTERNAL_SERVER_ERROR,
            page::status_error(500, &message),
        ),
        other => {
            error!(action = ?other, "unexpected flow action");
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                page::status_error(500, "Unexpected flow state"),
            )
        }
    }
}

async fn not_found() -> Response {
    html(StatusCode::NOT_FOUND, page::status_error(404, "Not Found"))
}

fn html(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
