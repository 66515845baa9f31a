//! Meta Ads token tool
//!
//! `exchange` turns a short-lived Graph API Explorer token into a long-lived
//! one without the redirect flow; `check` verifies the saved token.

mod app;
mod check;
mod error;
mod exchange;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{EnvFile, Settings};

use crate::app::App;

#[derive(Parser)]
#[command(name = "meta-token")]
#[command(about = "Obtain and verify Facebook Marketing API access tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to CONFIG_PATH, then meta-ads.toml)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange a short-lived token for a long-lived one and save it
    Exchange {
        /// Short-lived token; read from stdin when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Verify the saved token: user, ad accounts and permissions
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let settings =
        Settings::load_or_default(cli.config.as_deref()).context("failed to load settings")?;
    let env_path = settings.env_file_path();
    let env = EnvFile::load(&env_path)
        .with_context(|| format!("failed to read {}", env_path.display()))?;
    let app = App::new(reqwest::Client::new(), settings, env);

    let mut stdout = std::io::stdout();
    let outcome = match cli.command {
        Commands::Exchange { token } => {
            exchange::run(&app, token, std::io::stdin().lock(), &mut stdout)
                .await
                .map(|done| {
                    info!(
                        token_chars = done.token.char_len(),
                        saved = done.saved,
                        introspected = done.info.is_some(),
                        "exchange complete"
                    );
                })
        }
        Commands::Check => check::run(&app, &mut stdout).await.map(|report| {
            info!(
                accounts = report.accounts,
                permissions = ?report.permissions,
                "check complete"
            );
        }),
    };

    if let Err(e) = outcome {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
