//! `meta-token check`: verify the saved access token against the Graph API.

use std::io::Write;

use graph_api::{ACCESS_TOKEN_ENV, GraphClient, Param, ParamSet, resolve_access_token};
use meta_auth::{AppCredentials, REQUIRED_SCOPES, debug_token};
use serde_json::Value;
use tracing::warn;

use crate::app::App;
use crate::error::{CliError, Result};

const ACCOUNT_FIELDS: &str = "id,name,account_status";

/// Outcome of the optional permission step.
#[derive(Debug, PartialEq, Eq)]
pub enum Permissions {
    /// No app credentials configured
    Skipped,
    /// Introspection failed; not fatal
    Unverified,
    Missing(Vec<&'static str>),
    Complete,
}

#[derive(Debug)]
pub struct CheckReport {
    pub accounts: usize,
    pub permissions: Permissions,
}

pub async fn run<W: Write>(app: &App, out: &mut W) -> Result<CheckReport> {
    let token = resolve_access_token(app.env.lookup_non_empty(ACCESS_TOKEN_ENV), &[])?;
    writeln!(out, "Token found ({} chars)", token.char_len())?;

    let client = GraphClient::new(app.http.clone(), &app.settings.graph);

    writeln!(out, "\nUser info")?;
    let me = client
        .get(&client.endpoint("me"), &ParamSet::new().build(token.expose()))
        .await
        .map_err(|source| CliError::Step {
            step: "user lookup",
            source,
        })?;
    writeln!(
        out,
        "  {} (ID: {})",
        text(&me, "name"),
        text(&me, "id")
    )?;

    writeln!(out, "\nAd accounts")?;
    let mut params = ParamSet::new();
    params.set(Param::Fields, ACCOUNT_FIELDS);
    let accounts = client
        .get(&client.endpoint("me/adaccounts"), &params.build(token.expose()))
        .await
        .map_err(|source| CliError::Step {
            step: "ad account listing",
            source,
        })?;
    let list = accounts["data"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    if list.is_empty() {
        writeln!(
            out,
            "  none found; link an ad account in Business Manager and grant the app access"
        )?;
    }
    for (i, account) in list.iter().enumerate() {
        writeln!(
            out,
            "  {}. {} (ID: {}) status {}",
            i + 1,
            text(account, "name"),
            text(account, "id"),
            text(account, "account_status")
        )?;
    }

    writeln!(out, "\nPermissions")?;
    let permissions = match AppCredentials::from_env_file(&app.env) {
        Err(_) => {
            writeln!(out, "  skipped: FB_APP_ID / FB_APP_SECRET not configured")?;
            Permissions::Skipped
        }
        Ok(credentials) => {
            match debug_token(&app.http, &app.endpoints(), &credentials, token.expose()).await {
                Err(e) => {
                    warn!(error = %e, "could not verify permissions");
                    writeln!(out, "  could not verify permissions: {e}")?;
                    Permissions::Unverified
                }
                Ok(info) => {
                    writeln!(
                        out,
                        "  token is {}",
                        if info.is_valid { "valid" } else { "invalid" }
                    )?;
                    writeln!(out, "  granted: {}", info.scopes.join(", "))?;
                    let missing = info.missing_scopes(&REQUIRED_SCOPES);
                    if missing.is_empty() {
                        writeln!(out, "  all required permissions present")?;
                        Permissions::Complete
                    } else {
                        writeln!(out, "  missing: {}", missing.join(", "))?;
                        Permissions::Missing(missing)
                    }
                }
            }
        }
    };

    Ok(CheckReport {
        accounts: list.len(),
        permissions,
    })
}

/// String or number field rendered for display, `N/A` when absent.
fn text(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::String(s) => s.clone(),
        Value::Null => "N/A".to_owned(),
        other => other.to_string(),
    }
}
