//! Meta Ads MCP server
//!
//! Exposes the Graph API tool catalog to an MCP client over stdio. stdout
//! carries the protocol only; logs go to stderr.

mod catalog;
mod dispatch;
mod server;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{EnvFile, Settings};
use graph_api::{GraphClient, GraphTools, TokenSource};

use crate::server::AdsServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

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

    let tools = GraphTools::new(
        GraphClient::new(reqwest::Client::new(), &settings.graph),
        TokenSource::from_env_file(&env, args),
    );

    // Fail fast: a server without a token can only return errors
    if let Err(e) = tools.ensure_token() {
        error!(error = %e, "no access token available");
        eprintln!("{e}");
        std::process::exit(1);
    }

    info!(
        api_version = %settings.graph.api_version,
        tools = catalog::tools().len(),
        "starting meta-ads-mcp on stdio"
    );

    let service = AdsServer::new(tools)
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP initialization failed")?;
    let reason = service.waiting().await.context("MCP service failed")?;
    info!(?reason, "stdio session ended");

    Ok(())
}
