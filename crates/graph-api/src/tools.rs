//! The tool catalog
//!
//! One method per named operation. Each resolves the token, builds its
//! query and awaits exactly one GET; the provider's JSON comes back as-is.

use serde_json::Value;
use tracing::info;

use crate::client::GraphClient;
use crate::error::{Error, Result};
use crate::insights::InsightsOptions;
use crate::options::{
    ActivityOptions, CampaignListOptions, CreativeOptions, ListOptions, NodeOptions, PageOptions,
};
use crate::params::{Param, ParamSet};
use crate::token::TokenSource;

/// Fields requested for an ad account when the caller names none.
pub const DEFAULT_AD_ACCOUNT_FIELDS: [&str; 14] = [
    "name",
    "business_name",
    "age",
    "account_status",
    "balance",
    "amount_spent",
    "attribution_spec",
    "account_id",
    "business",
    "business_city",
    "brand_safety_content_filter_levels",
    "currency",
    "created_time",
    "id",
];

/// Graph API tools bound to a client and a token source.
#[derive(Debug)]
pub struct GraphTools {
    client: GraphClient,
    token: TokenSource,
}

impl GraphTools {
    pub fn new(client: GraphClient, token: TokenSource) -> Self {
        Self { client, token }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// Fail early if no access token can be resolved.
    pub fn ensure_token(&self) -> Result<()> {
        self.token.access_token().map(|_| ())
    }

    async fn call(&self, tool: &'static str, path: &str, params: &ParamSet) -> Result<Value> {
        let token = self.token.access_token()?;
        info!(tool, path, "Calling Graph API");
        let query = params.build(token.expose());
        self.client.get(&self.client.endpoint(path), &query).await
    }

    // Accounts

    /// Ad accounts reachable by the token owner, with their names.
    pub async fn list_ad_accounts(&self) -> Result<Value> {
        let mut params = ParamSet::new();
        params.set(Param::Fields, "adaccounts{name}");
        self.call("list_ad_accounts", "me", &params).await
    }

    pub async fn get_details_of_ad_account(
        &self,
        act_id: &str,
        options: &NodeOptions,
    ) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        let mut params = options.to_params();
        if !params.contains(Param::Fields) {
            params.set(
                Param::Fields,
                DEFAULT_AD_ACCOUNT_FIELDS
                    .iter()
                    .map(|f| (*f).to_owned())
                    .collect::<Vec<_>>(),
            );
        }
        self.call("get_details_of_ad_account", act_id, &params).await
    }

    // Insights

    pub async fn get_adaccount_insights(
        &self,
        act_id: &str,
        options: &InsightsOptions,
    ) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        let params = options.to_params("account");
        self.call("get_adaccount_insights", &format!("{act_id}/insights"), &params)
            .await
    }

    pub async fn get_campaign_insights(
        &self,
        campaign_id: &str,
        options: &InsightsOptions,
    ) -> Result<Value> {
        let campaign_id = require_id("campaign_id", campaign_id)?;
        let params = options.to_params("campaign");
        self.call(
            "get_campaign_insights",
            &format!("{campaign_id}/insights"),
            &params,
        )
        .await
    }

    pub async fn get_adset_insights(
        &self,
        adset_id: &str,
        options: &InsightsOptions,
    ) -> Result<Value> {
        let adset_id = require_id("adset_id", adset_id)?;
        let params = options.to_params("adset");
        self.call("get_adset_insights", &format!("{adset_id}/insights"), &params)
            .await
    }

    pub async fn get_ad_insights(&self, ad_id: &str, options: &InsightsOptions) -> Result<Value> {
        let ad_id = require_id("ad_id", ad_id)?;
        let params = options.to_params("ad");
        self.call("get_ad_insights", &format!("{ad_id}/insights"), &params)
            .await
    }

    // Pagination

    /// Follow a `paging.next`/`paging.previous` URL. The link already holds
    /// its own token and cursor, so nothing is added to it.
    pub async fn fetch_pagination_url(&self, url: &str) -> Result<Value> {
        let url = require_non_empty("url", url)?;
        info!(tool = "fetch_pagination_url", "Following pagination link");
        self.client.get_url(url).await
    }

    // Creatives

    pub async fn get_ad_creative_by_id(
        &self,
        creative_id: &str,
        options: &CreativeOptions,
    ) -> Result<Value> {
        let creative_id = require_id("creative_id", creative_id)?;
        self.call("get_ad_creative_by_id", creative_id, &options.to_params())
            .await
    }

    pub async fn get_ad_creatives_by_ad_id(
        &self,
        ad_id: &str,
        options: &PageOptions,
    ) -> Result<Value> {
        let ad_id = require_id("ad_id", ad_id)?;
        self.call(
            "get_ad_creatives_by_ad_id",
            &format!("{ad_id}/adcreatives"),
            &options.to_params(),
        )
        .await
    }

    // Ads

    pub async fn get_ad_by_id(&self, ad_id: &str, options: &NodeOptions) -> Result<Value> {
        let ad_id = require_id("ad_id", ad_id)?;
        self.call("get_ad_by_id", ad_id, &options.to_params()).await
    }

    pub async fn get_ads_by_adaccount(&self, act_id: &str, options: &ListOptions) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        self.call(
            "get_ads_by_adaccount",
            &format!("{act_id}/ads"),
            &options.to_params(),
        )
        .await
    }

    pub async fn get_ads_by_campaign(
        &self,
        campaign_id: &str,
        options: &ListOptions,
    ) -> Result<Value> {
        let campaign_id = require_id("campaign_id", campaign_id)?;
        self.call(
            "get_ads_by_campaign",
            &format!("{campaign_id}/ads"),
            &options.to_params(),
        )
        .await
    }

    pub async fn get_ads_by_adset(&self, adset_id: &str, options: &ListOptions) -> Result<Value> {
        let adset_id = require_id("adset_id", adset_id)?;
        self.call(
            "get_ads_by_adset",
            &format!("{adset_id}/ads"),
            &options.to_params(),
        )
        .await
    }

    // Ad sets

    pub async fn get_adset_by_id(&self, adset_id: &str, options: &NodeOptions) -> Result<Value> {
        let adset_id = require_id("adset_id", adset_id)?;
        self.call("get_adset_by_id", adset_id, &options.to_params())
            .await
    }

    /// Several ad sets in one call; the response is keyed by id.
    pub async fn get_adsets_by_ids(
        &self,
        adset_ids: &[String],
        options: &NodeOptions,
    ) -> Result<Value> {
        let ids: Vec<String> = adset_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect();
        if ids.is_empty() {
            return Err(Error::InvalidArgument(
                "adset_ids must contain at least one id".into(),
            ));
        }
        let mut params = options.to_params();
        params.set(Param::Ids, ids);
        self.call("get_adsets_by_ids", "", &params).await
    }

    pub async fn get_adsets_by_adaccount(
        &self,
        act_id: &str,
        options: &ListOptions,
    ) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        self.call(
            "get_adsets_by_adaccount",
            &format!("{act_id}/adsets"),
            &options.to_params(),
        )
        .await
    }

    pub async fn get_adsets_by_campaign(
        &self,
        campaign_id: &str,
        options: &ListOptions,
    ) -> Result<Value> {
        let campaign_id = require_id("campaign_id", campaign_id)?;
        self.call(
            "get_adsets_by_campaign",
            &format!("{campaign_id}/adsets"),
            &options.to_params(),
        )
        .await
    }

    // Campaigns

    pub async fn get_campaign_by_id(
        &self,
        campaign_id: &str,
        options: &NodeOptions,
    ) -> Result<Value> {
        let campaign_id = require_id("campaign_id", campaign_id)?;
        self.call("get_campaign_by_id", campaign_id, &options.to_params())
            .await
    }

    pub async fn get_campaigns_by_adaccount(
        &self,
        act_id: &str,
        options: &CampaignListOptions,
    ) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        self.call(
            "get_campaigns_by_adaccount",
            &format!("{act_id}/campaigns"),
            &options.to_params(),
        )
        .await
    }

    // Activities

    pub async fn get_activities_by_adaccount(
        &self,
        act_id: &str,
        options: &ActivityOptions,
    ) -> Result<Value> {
        let act_id = require_id("act_id", act_id)?;
        self.call(
            "get_activities_by_adaccount",
            &format!("{act_id}/activities"),
            &options.to_params(),
        )
        .await
    }

    pub async fn get_activities_by_adset(
        &self,
        adset_id: &str,
        options: &ActivityOptions,
    ) -> Result<Value> {
        let adset_id = require_id("adset_id", adset_id)?;
        self.call(
            "get_activities_by_adset",
            &format!("{adset_id}/activities"),
            &options.to_params(),
        )
        .await
    }
}

fn require_non_empty<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(value)
}

/// An object id becomes a path segment, so it may not carry path, query or
/// fragment delimiters.
fn require_id<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = require_non_empty(name, value)?;
    if value.contains(['/', '?', '#']) {
        return Err(Error::InvalidArgument(format!(
            "{name} must be a single object id, got {value:?}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use common::{GraphSettings, Secret};
    use reqwest::Url;
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Mock Graph API echoing the request path and raw query string.
    async fn start_echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let app = axum::Router::new().fallback(|uri: Uri| async move {
                axum::Json(json!({
                    "path": uri.path(),
                    "query": uri.query().unwrap_or(""),
                }))
            });
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn tools() -> GraphTools {
        let base = start_echo_server().await;
        let settings = GraphSettings {
            base_url: base,
            api_version: "v23.0".into(),
        };
        GraphTools::new(
            GraphClient::new(reqwest::Client::new(), &settings),
            TokenSource::fixed(Secret::new("test-token".to_owned())),
        )
    }

    /// Decoded query pairs of an echoed request, in wire order.
    fn pairs(echo: &Value) -> Vec<(String, String)> {
        let query = echo["query"].as_str().unwrap();
        Url::parse(&format!("http://echo/?{query}"))
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn list_ad_accounts_uses_fixed_field_expansion() {
        let echo = tools().await.list_ad_accounts().await.unwrap();
        assert_eq!(echo["path"], "/v23.0/me");
        let pairs = pairs(&echo);
        assert_eq!(pairs[0], ("access_token".into(), "test-token".into()));
        assert_eq!(lookup(&pairs, "fields"), Some("adaccounts{name}"));
    }

    #[tokio::test]
    async fn account_details_default_fields() {
        let echo = tools()
            .await
            .get_details_of_ad_account("act_1", &NodeOptions::default())
            .await
            .unwrap();
        assert_eq!(echo["path"], "/v23.0/act_1");
        let pairs = pairs(&echo);
        assert_eq!(
            lookup(&pairs, "fields"),
            Some(DEFAULT_AD_ACCOUNT_FIELDS.join(",").as_str())
        );
    }

    #[tokio::test]
    async fn campaign_insights_default_to_last_30d() {
        let echo = tools()
            .await
            .get_campaign_insights("c1", &InsightsOptions::default())
            .await
            .unwrap();
        assert_eq!(echo["path"], "/v23.0/c1/insights");
        let pairs = pairs(&echo);
        assert_eq!(lookup(&pairs, "date_preset"), Some("last_30d"));
        assert_eq!(lookup(&pairs, "level"), Some("campaign"));
        assert_eq!(lookup(&pairs, "use_unified_attribution_setting"), Some("true"));
        assert_eq!(lookup(&pairs, "time_range"), None);
    }

    #[tokio::test]
    async fn insights_levels_follow_the_object() {
        let tools = tools().await;
        let options = InsightsOptions::default();

        let account = tools.get_adaccount_insights("act_9", &options).await.unwrap();
        assert_eq!(lookup(&pairs(&account), "level"), Some("account"));

        let adset = tools.get_adset_insights("s9", &options).await.unwrap();
        assert_eq!(adset["path"], "/v23.0/s9/insights");
        assert_eq!(lookup(&pairs(&adset), "level"), Some("adset"));

        let ad = tools.get_ad_insights("a9", &options).await.unwrap();
        assert_eq!(lookup(&pairs(&ad), "level"), Some("ad"));
    }

    #[tokio::test]
    async fn adsets_by_ids_hits_api_root() {
        let echo = tools()
            .await
            .get_adsets_by_ids(
                &["111".to_owned(), "222".to_owned()],
                &NodeOptions::with_fields(&["name"]),
            )
            .await
            .unwrap();
        assert_eq!(echo["path"], "/v23.0/");
        let pairs = pairs(&echo);
        assert_eq!(lookup(&pairs, "ids"), Some("111,222"));
        assert_eq!(lookup(&pairs, "fields"), Some("name"));
    }

    #[tokio::test]
    async fn adsets_by_ids_requires_ids() {
        let err = tools()
            .await
            .get_adsets_by_ids(&[" ".to_owned()], &NodeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn empty_object_id_is_rejected_before_any_request() {
        let err = tools()
            .await
            .get_ad_by_id("", &NodeOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ad_id"), "got: {err}");
    }

    #[tokio::test]
    async fn object_id_with_delimiters_is_rejected() {
        let tools = tools().await;
        for id in ["act_1?fields=x", "act_1/campaigns", "act_1#frag"] {
            let err = tools
                .get_details_of_ad_account(id, &NodeOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{id}: {err}");
        }
    }

    #[tokio::test]
    async fn list_edges_carry_default_limit() {
        let tools = tools().await;
        let options = ListOptions::default();

        for (echo, path) in [
            (tools.get_ads_by_adaccount("act_1", &options).await.unwrap(), "/v23.0/act_1/ads"),
            (tools.get_ads_by_campaign("c1", &options).await.unwrap(), "/v23.0/c1/ads"),
            (tools.get_ads_by_adset("s1", &options).await.unwrap(), "/v23.0/s1/ads"),
            (tools.get_adsets_by_adaccount("act_1", &options).await.unwrap(), "/v23.0/act_1/adsets"),
            (tools.get_adsets_by_campaign("c1", &options).await.unwrap(), "/v23.0/c1/adsets"),
        ] {
            assert_eq!(echo["path"], path);
            assert_eq!(lookup(&pairs(&echo), "limit"), Some("25"), "{path}");
        }
    }

    #[tokio::test]
    async fn campaigns_by_adaccount_encodes_campaign_filters() {
        let options: CampaignListOptions = serde_json::from_value(json!({
            "effective_status": ["ACTIVE"],
            "objective": ["OUTCOME_LEADS", "OUTCOME_SALES"],
        }))
        .unwrap();
        let echo = tools()
            .await
            .get_campaigns_by_adaccount("act_5", &options)
            .await
            .unwrap();
        assert_eq!(echo["path"], "/v23.0/act_5/campaigns");
        let pairs = pairs(&echo);
        assert_eq!(lookup(&pairs, "effective_status"), Some(r#"["ACTIVE"]"#));
        assert_eq!(
            lookup(&pairs, "objective"),
            Some(r#"["OUTCOME_LEADS","OUTCOME_SALES"]"#)
        );
    }

    #[tokio::test]
    async fn creatives_and_activities_use_their_edges() {
        let tools = tools().await;

        let creatives = tools
            .get_ad_creatives_by_ad_id("a1", &PageOptions::default())
            .await
            .unwrap();
        assert_eq!(creatives["path"], "/v23.0/a1/adcreatives");

        let creative = tools
            .get_ad_creative_by_id("cr1", &CreativeOptions::default())
            .await
            .unwrap();
        assert_eq!(creative["path"], "/v23.0/cr1");

        let activities = tools
            .get_activities_by_adset("s1", &ActivityOptions::default())
            .await
            .unwrap();
        assert_eq!(activities["path"], "/v23.0/s1/activities");
        assert_eq!(lookup(&pairs(&activities), "limit"), None);

        let account = tools
            .get_activities_by_adaccount("act_1", &ActivityOptions::default())
            .await
            .unwrap();
        assert_eq!(account["path"], "/v23.0/act_1/activities");
    }

    #[tokio::test]
    async fn single_object_reads() {
        let tools = tools().await;
        let options = NodeOptions {
            fields: None,
            date_format: Some("U".into()),
        };

        let campaign = tools.get_campaign_by_id("c7", &options).await.unwrap();
        assert_eq!(campaign["path"], "/v23.0/c7");
        assert_eq!(lookup(&pairs(&campaign), "date_format"), Some("U"));

        let adset = tools.get_adset_by_id("s7", &options).await.unwrap();
        assert_eq!(adset["path"], "/v23.0/s7");
    }

    #[tokio::test]
    async fn pagination_url_is_fetched_verbatim() {
        let tools = tools().await;
        let link = format!(
            "{}?access_token=embedded&after=abc",
            tools.client().endpoint("act_1/ads")
        );
        let echo = tools.fetch_pagination_url(&link).await.unwrap();
        assert_eq!(echo["query"], "access_token=embedded&after=abc");
    }

    #[tokio::test]
    async fn missing_token_surfaces_configuration_error() {
        let settings = GraphSettings::default();
        let tools = GraphTools::new(
            GraphClient::new(reqwest::Client::new(), &settings),
            TokenSource::new(None, Vec::new()),
        );
        assert!(tools.ensure_token().is_err());
        let err = tools.list_ad_accounts().await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
