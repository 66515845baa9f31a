//! Meta (Facebook) OAuth library
//!
//! Everything the local authorization server and the token CLI need to turn
//! a user's consent into a long-lived access token, independent of any HTTP
//! listener so it can be tested on its own.
//!
//! Token flow:
//! 1. Server issues a CSRF value via `state::StateStore::issue()`
//! 2. User is redirected to `authorize::build_authorization_url()`
//! 3. Callback state checked with `state::StateStore::verify()`
//! 4. `token::exchange_code()` trades the code for a short-lived token
//! 5. `token::exchange_long_lived()` upgrades it (about 60 days)
//! 6. `token::debug_token()` fetches metadata for display
//! 7. `credentials::persist_access_token()` writes `FB_ACCESS_TOKEN`

pub mod authorize;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod state;
pub mod token;

pub use authorize::{Endpoints, build_authorization_url, generate_state};
pub use constants::*;
pub use credentials::{AppCredentials, persist_access_token};
pub use error::{Error, Result};
pub use state::{StateCheck, StateStore};
pub use token::{TokenInfo, debug_token, exchange_code, exchange_long_lived};
