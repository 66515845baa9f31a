//! Meta Ads OAuth server
//!
//! Local single-use listener that:
//! 1. Redirects the browser to the Facebook login dialog
//! 2. Verifies the CSRF state on the callback
//! 3. Exchanges the code and upgrades it to a long-lived token
//! 4. Saves `FB_ACCESS_TOKEN` to the env file
//! 5. Shuts itself down a couple of seconds later

mod flow;
mod handlers;
mod page;

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{EnvFile, Settings};
use meta_auth::{APP_DASHBOARD_URL, AppCredentials, Endpoints, SCOPES, StateStore};

use crate::handlers::{OAuthState, build_router};

/// Upper bound on draining in-flight requests after shutdown starts
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting meta-oauth-server");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let settings = Settings::load_or_default(cli_config_path).context("failed to load settings")?;
    let env_path = settings.env_file_path();
    let env = EnvFile::load(&env_path)
        .with_context(|| format!("failed to read {}", env_path.display()))?;

    let credentials = match AppCredentials::from_env_file(&env) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "missing Facebook app configuration");
            eprintln!(
                "\nFacebook app credentials are required.\n\
                 1. Create or open an app at {APP_DASHBOARD_URL}\n\
                 2. Add to {}:\n   FB_APP_ID=\"your_app_id\"\n   FB_APP_SECRET=\"your_app_secret\"\n\
                 3. Register this redirect URI in the app settings:\n   {}\n",
                env_path.display(),
                settings.oauth.redirect_uri
            );
            std::process::exit(1);
        }
    };

    let listen_addr = settings.oauth.listen_addr;
    let (completion_tx, mut completion_rx) = mpsc::channel::<()>(1);

    let state = OAuthState::new(
        reqwest::Client::new(),
        Endpoints::from_settings(&settings),
        credentials.clone(),
        settings.oauth.redirect_uri.clone(),
        env_path.clone(),
        StateStore::new(Duration::from_secs(settings.oauth.state_ttl_secs)),
        completion_tx,
    );
    let app = build_router(state);

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    info!(
        addr = %listen_addr,
        app_id = %credentials.app_id,
        redirect_uri = %settings.oauth.redirect_uri,
        scopes = %SCOPES.join(","),
        env_file = %env_path.display(),
        "waiting for authorization; open http://localhost:{} in a browser",
        listen_addr.port()
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    // Stop after a successful exchange (plus a short delay so the browser
    // receives the page) or on SIGINT/SIGTERM.
    tokio::select! {
        Some(()) = completion_rx.recv() => {
            let delay = Duration::from_secs(settings.oauth.shutdown_delay_secs);
            info!(delay_secs = delay.as_secs(), "authorization complete, shutting down");
            tokio::time::sleep(delay).await;
        }
        _ = shutdown_signal() => {}
    }

    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
