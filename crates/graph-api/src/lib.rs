//! Facebook Marketing Graph API tool surface
//!
//! Every tool follows the same shape: resolve the access token, pick an
//! endpoint (`{id}`, `{id}/{edge}` or a pagination URL verbatim), build the
//! query string, issue one GET and hand the JSON body back untouched.
//! Nothing here paginates, retries or inspects the response; `paging.next`
//! is the caller's business via [`GraphTools::fetch_pagination_url`].
//!
//! Layers, leaf to root:
//! 1. `token::TokenSource` resolves and caches the bearer token
//! 2. `params::ParamSet` encodes typed options into query pairs
//! 3. `client::GraphClient` executes one GET
//! 4. `tools::GraphTools` composes the three per named operation

pub mod client;
pub mod error;
pub mod insights;
pub mod options;
pub mod params;
pub mod token;
pub mod tools;

pub use client::GraphClient;
pub use error::{Error, Result};
pub use insights::{InsightsOptions, TimeIncrement, TimeRange, TimeSelection};
pub use options::{
    ActivityOptions, CampaignListOptions, CreativeOptions, ListOptions, NodeOptions, PageOptions,
};
pub use params::{Encoding, Param, ParamSet, ParamValue, QueryParams};
pub use token::{ACCESS_TOKEN_ENV, ACCESS_TOKEN_FLAG, TokenSource, resolve_access_token};
pub use tools::{DEFAULT_AD_ACCOUNT_FIELDS, GraphTools};
