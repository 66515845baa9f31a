//! Meta OAuth constants
//!
//! Endpoint hosts and the API version are configurable through settings;
//! what lives here is fixed by the provider.

/// Permissions requested on the login dialog.
pub const SCOPES: [&str; 4] = [
    "ads_read",
    "ads_management",
    "business_management",
    "read_insights",
];

/// Permissions a token needs before the ads tools are usable.
pub const REQUIRED_SCOPES: [&str; 3] = ["ads_read", "ads_management", "business_management"];

/// Grant type that upgrades a short-lived user token to a long-lived one
pub const LONG_LIVED_GRANT_TYPE: &str = "fb_exchange_token";

/// Key/value file key for the application id
pub const APP_ID_KEY: &str = "FB_APP_ID";

/// Key/value file key for the application secret
pub const APP_SECRET_KEY: &str = "FB_APP_SECRET";

/// Key/value file key the long-lived token is persisted under
pub const ACCESS_TOKEN_KEY: &str = "FB_ACCESS_TOKEN";

/// Where app credentials are created; shown when they are missing.
pub const APP_DASHBOARD_URL: &str = "https://developers.facebook.com/apps";
