//! `meta-token exchange`: upgrade a short-lived token from the Graph API
//! Explorer to a long-lived one and save it.

use std::io::{BufRead, Write};

use common::Secret;
use meta_auth::{
    AppCredentials, REQUIRED_SCOPES, TokenInfo, debug_token, exchange_long_lived,
    persist_access_token,
};
use tracing::{info, warn};

use crate::app::App;
use crate::error::{CliError, Result};

const EXPLORER_URL: &str = "https://developers.facebook.com/tools/explorer/";

/// What a successful exchange produced.
#[derive(Debug)]
pub struct Exchanged {
    pub token: Secret<String>,
    pub info: Option<TokenInfo>,
    pub saved: bool,
}

pub async fn run<R: BufRead, W: Write>(
    app: &App,
    token: Option<String>,
    input: R,
    out: &mut W,
) -> Result<Exchanged> {
    let credentials = AppCredentials::from_env_file(&app.env)?;
    writeln!(out, "App ID: {}", credentials.app_id)?;

    let short_lived = match token {
        Some(token) => token,
        None => prompt(input, out)?,
    };
    let short_lived = short_lived.trim();
    if short_lived.is_empty() {
        return Err(CliError::NoToken);
    }

    let endpoints = app.endpoints();
    let long_lived =
        exchange_long_lived(&app.http, &endpoints, &credentials, short_lived).await?;
    info!("long-lived token generated");

    let info = match debug_token(&app.http, &endpoints, &credentials, long_lived.expose()).await {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(error = %e, "could not introspect token");
            None
        }
    };

    let path = app.env.path();
    let saved = match persist_access_token(path, &long_lived) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not save token");
            false
        }
    };

    report(out, &long_lived, info.as_ref(), saved, &path.display().to_string())?;

    Ok(Exchanged {
        token: long_lived,
        info,
        saved,
    })
}

fn prompt<R: BufRead, W: Write>(mut input: R, out: &mut W) -> Result<String> {
    writeln!(out, "\n1. Open {EXPLORER_URL}")?;
    writeln!(out, "2. Select your app and click 'Generate Access Token'")?;
    writeln!(out, "3. Grant: {}", REQUIRED_SCOPES.join(", "))?;
    writeln!(out, "4. Paste the token below\n")?;
    write!(out, "> ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

fn report<W: Write>(
    out: &mut W,
    token: &Secret<String>,
    info: Option<&TokenInfo>,
    saved: bool,
    env_file: &str,
) -> std::io::Result<()> {
    writeln!(out)?;
    if saved {
        writeln!(out, "Token saved to {env_file}")?;
    } else {
        writeln!(out, "Could not save to {env_file} automatically")?;
    }

    writeln!(out, "\nLong-lived access token:\n{}", token.expose())?;

    if let Some(info) = info {
        writeln!(out, "\nToken details:")?;
        writeln!(out, "  User ID: {}", info.user_id.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "  App ID:  {}", info.app_id.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "  Valid:   {}", if info.is_valid { "yes" } else { "no" })?;
        writeln!(out, "  Expires: {}", info.expires_display())?;
        if !info.scopes.is_empty() {
            writeln!(out, "  Permissions: {}", info.scopes.join(", "))?;
        }
    }

    if !saved {
        writeln!(out, "\nAdd this line to {env_file}:")?;
        writeln!(out, "FB_ACCESS_TOKEN=\"{}\"", token.expose())?;
    }
    Ok(())
}
