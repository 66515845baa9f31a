//! HTML pages served on the callback
//!
//! Every interpolated value is escaped; `error` and `error_description`
//! come straight from the query string.

use common::Secret;
use meta_auth::TokenInfo;

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Success page with the long-lived token and its metadata.
pub fn success(token: &Secret<String>, info: &TokenInfo, saved: bool, env_file: &str) -> String {
    let token = escape_html(token.expose());
    let env_file = escape_html(env_file);

    let (save_status, save_color) = if saved {
        (format!("Token saved to {env_file}"), "#28a745")
    } else {
        (
            format!("Could not save to {env_file} automatically"),
            "#ffc107",
        )
    };

    let scopes: String = info
        .scopes
        .iter()
        .map(|s| format!("<li>{}</li>", escape_html(s)))
        .collect();

    let save_step = if saved {
        format!("<li><s>Token already saved to {env_file}</s></li>")
    } else {
        "<li>Add the token to your env file manually: <code>FB_ACCESS_TOKEN=\"YOUR_TOKEN\"</code></li>"
            .to_owned()
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Meta Ads OAuth Success</title></head>
<body style="font-family: Arial, sans-serif; padding: 40px; max-width: 800px; margin: 0 auto;">
  <h1 style="color: #1877f2;">Authorization Successful</h1>
  <p>Your long-lived access token has been generated and is ready to use.</p>
  <div style="background: {save_color}; color: white; padding: 10px; border-radius: 5px; margin: 20px 0;">{save_status}</div>
  <h2>Access Token</h2>
  <textarea id="token" readonly style="width: 100%; height: 100px; font-family: monospace;">{token}</textarea>
  <p><button onclick="navigator.clipboard.writeText(document.getElementById('token').value)">Copy Token</button></p>
  <h2>Token Details</h2>
  <ul>
    <li><strong>Type:</strong> {token_type}</li>
    <li><strong>App ID:</strong> {app_id}</li>
    <li><strong>User ID:</strong> {user_id}</li>
    <li><strong>Expires:</strong> {expires}</li>
    <li><strong>Valid:</strong> {valid}</li>
  </ul>
  <h3>Granted Permissions</h3>
  <ul>{scopes}</ul>
  <h2>Next Steps</h2>
  <ol>
    {save_step}
    <li>Start the MCP server: <code>meta-ads-mcp --fb-token YOUR_TOKEN</code>, or rely on the saved token</li>
  </ol>
  <p style="background: #fff3cd; padding: 15px; border-radius: 5px;">This token is valid for about 60 days. Run this flow again when it expires.</p>
  <p style="color: #666;">This server shuts down automatically in a few seconds.</p>
</body>
</html>
"#,
        token_type = escape_html(info.token_type.as_deref().unwrap_or("N/A")),
        app_id = escape_html(info.app_id.as_deref().unwrap_or("N/A")),
        user_id = escape_html(info.user_id.as_deref().unwrap_or("N/A")),
        expires = escape_html(&info.expires_display()),
        valid = if info.is_valid { "Yes" } else { "No" },
    )
}

/// Page for an `error` returned by the login dialog.
pub fn provider_error(error: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Authorization Failed</title></head>
<body style="font-family: Arial, sans-serif; padding: 40px;">
  <h1 style="color: red;">Authorization Failed</h1>
  <p><strong>Error:</strong> {}</p>
  <p><strong>Description:</strong> {}</p>
  <p><a href="/">Try again</a></p>
</body>
</html>
"#,
        escape_html(error),
        escape_html(description)
    )
}

/// Minimal page for plain error statuses.
pub fn status_error(status: u16, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Error {status}</title></head>
<body style="font-family: Arial, sans-serif; padding: 40px;">
  <h1>Error {status}</h1>
  <p>{}</p>
</body>
</html>
"#,
        escape_html(message)
    )
}
