//! `tools/call` dispatch onto [`GraphTools`]

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use graph_api::{
    ActivityOptions, CampaignListOptions, CreativeOptions, GraphTools, InsightsOptions,
    ListOptions, NodeOptions, PageOptions,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The tool ran and the Graph API call failed
    #[error(transparent)]
    Tool(#[from] graph_api::Error),
}

/// Decoded `arguments` object; missing or `null` arguments mean `{}`.
struct Arguments<'a> {
    tool: &'a str,
    raw: Value,
}

impl<'a> Arguments<'a> {
    fn new(tool: &'a str, raw: Option<Value>) -> Result<Self, DispatchError> {
        let raw = match raw {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v @ Value::Object(_)) => v,
            Some(_) => return Err(invalid(tool, "arguments must be an object")),
        };
        Ok(Self { tool, raw })
    }

    fn string(&self, key: &str) -> Result<String, DispatchError> {
        match self.raw.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(invalid(self.tool, &format!("{key} must be a string"))),
            None => Err(invalid(self.tool, &format!("missing required argument {key}"))),
        }
    }

    fn string_list(&self, key: &str) -> Result<Vec<String>, DispatchError> {
        match self.raw.get(key) {
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                invalid(self.tool, &format!("{key} must be a list of strings: {e}"))
            }),
            None => Err(invalid(self.tool, &format!("missing required argument {key}"))),
        }
    }

    /// Decode the option struct from the same object; id keys are ignored.
    fn options<T: DeserializeOwned>(&self) -> Result<T, DispatchError> {
        serde_json::from_value(self.raw.clone())
            .map_err(|e| invalid(self.tool, &e.to_string()))
    }
}

fn invalid(tool: &str, message: &str) -> DispatchError {
    DispatchError::InvalidArguments {
        tool: tool.to_owned(),
        message: message.to_owned(),
    }
}

/// Run one tool by name and return the raw Graph API body.
pub async fn call_tool(
    tools: &GraphTools,
    name: &str,
    arguments: Option<Value>,
) -> Result<Value, DispatchError> {
    let args = Arguments::new(name, arguments)?;

    let value = match name {
        "list_ad_accounts" => tools.list_ad_accounts().await?,
        "get_details_of_ad_account" => {
            let act_id = args.string("act_id")?;
            let options: NodeOptions = args.options()?;
            tools.get_details_of_ad_account(&act_id, &options).await?
        }
        "get_adaccount_insights" => {
            let options: InsightsOptions = args.options()?;
            tools
                .get_adaccount_insights(&args.string("act_id")?, &options)
                .await?
        }
        "get_campaign_insights" => {
            let options: InsightsOptions = args.options()?;
            tools
                .get_campaign_insights(&args.string("campaign_id")?, &options)
                .await?
        }
        "get_adset_insights" => {
            let options: InsightsOptions = args.options()?;
            tools
                .get_adset_insights(&args.string("adset_id")?, &options)
                .await?
        }
        "get_ad_insights" => {
            let options: InsightsOptions = args.options()?;
            tools.get_ad_insights(&args.string("ad_id")?, &options).await?
        }
        "fetch_pagination_url" => tools.fetch_pagination_url(&args.string("url")?).await?,
        "get_ad_creative_by_id" => {
            let options: CreativeOptions = args.options()?;
            tools
                .get_ad_creative_by_id(&args.string("creative_id")?, &options)
                .await?
        }
        "get_ad_creatives_by_ad_id" => {
            let options: PageOptions = args.options()?;
            tools
                .get_ad_creatives_by_ad_id(&args.string("ad_id")?, &options)
                .await?
        }
        "get_ad_by_id" => {
            let options: NodeOptions = args.options()?;
            tools.get_ad_by_id(&args.string("ad_id")?, &options).await?
        }
        "get_ads_by_adaccount" => {
            let options: ListOptions = args.options()?;
            tools
                .get_ads_by_adaccount(&args.string("act_id")?, &options)
                .await?
        }
        "get_ads_by_campaign" => {
            let options: ListOptions = args.options()?;
            tools
                .get_ads_by_campaign(&args.string("campaign_id")?, &options)
                .await?
        }
        "get_ads_by_adset" => {
            let options: ListOptions = args.options()?;
            tools
                .get_ads_by_adset(&args.string("adset_id")?, &options)
                .await?
        }
        "get_adset_by_id" => {
            let options: NodeOptions = args.options()?;
            tools.get_adset_by_id(&args.string("adset_id")?, &options).await?
        }
        "get_adsets_by_ids" => {
            let options: NodeOptions = args.options()?;
            tools
                .get_adsets_by_ids(&args.string_list("adset_ids")?, &options)
                .await?
        }
        "get_adsets_by_adaccount" => {
            let options: ListOptions = args.options()?;
            tools
                .get_adsets_by_adaccount(&args.string("act_id")?, &options)
                .await?
        }
        "get_adsets_by_campaign" => {
            let options: ListOptions = args.options()?;
            tools
                .get_adsets_by_campaign(&args.string("campaign_id")?, &options)
                .await?
        }
        "get_campaign_by_id" => {
            let options: NodeOptions = args.options()?;
            tools
                .get_campaign_by_id(&args.string("campaign_id")?, &options)
                .await?
        }
        "get_campaigns_by_adaccount" => {
            let options: CampaignListOptions = args.options()?;
            tools
                .get_campaigns_by_adaccount(&args.string("act_id")?, &options)
                .await?
        }
        "get_activities_by_adaccount" => {
            let options: ActivityOptions = args.options()?;
            tools
                .get_activities_by_adaccount(&args.string("act_id")?, &options)
                .await?
        }
        "get_activities_by_adset" => {
            let options: ActivityOptions = args.options()?;
            tools
                .get_activities_by_adset(&args.string("adset_id")?, &options)
                .await?
        }
        other => return Err(DispatchError::UnknownTool(other.to_owned())),
    };

    Ok(value)
}
