//! Tool descriptors advertised by `tools/list`
//!
//! Input schemas mirror the option structs in `graph_api`; the structs stay
//! the source of truth for decoding, these are only hints for the client.

use rmcp::model::{JsonObject, Tool};
use serde_json::{Map, Value, json};

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn string_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

fn integer(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn time_range() -> Value {
    json!({
        "type": "object",
        "properties": {
            "since": { "type": "string", "description": "YYYY-MM-DD" },
            "until": { "type": "string", "description": "YYYY-MM-DD" }
        },
        "required": ["since", "until"]
    })
}

fn filtering() -> Value {
    json!({
        "type": "array",
        "items": { "type": "object" },
        "description": "Filter objects: {\"field\", \"operator\", \"value\"}"
    })
}

fn schema(required: &[&str], properties: Vec<(&str, Value)>) -> JsonObject {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    let mut object = JsonObject::new();
    object.insert("type".into(), json!("object"));
    object.insert("properties".into(), Value::Object(properties));
    object.insert("required".into(), json!(required));
    object
}

fn fields() -> (&'static str, Value) {
    ("fields", string_list("Fields to return; provider defaults when omitted"))
}

fn cursors() -> [(&'static str, Value); 3] {
    [
        ("limit", integer("Page size")),
        ("after", string("Cursor for the next page")),
        ("before", string("Cursor for the previous page")),
    ]
}

fn node_schema(id: &str, id_description: &str) -> JsonObject {
    schema(
        &[id],
        vec![
            (id, string(id_description)),
            fields(),
            ("date_format", string("Date serialization format")),
        ],
    )
}

fn insights_schema(id: &str, id_description: &str) -> JsonObject {
    let mut props = vec![
        (id, string(id_description)),
        fields(),
        (
            "date_preset",
            json!({
                "type": ["string", "null"],
                "description": "Relative range such as last_7d; defaults to last_30d, null disables it"
            }),
        ),
        ("time_range", time_range()),
        (
            "time_ranges",
            json!({ "type": "array", "items": time_range(), "description": "Several ranges; overrides everything else" }),
        ),
        (
            "time_increment",
            json!({
                "type": ["integer", "string"],
                "description": "Days per row (1-90), \"monthly\" or \"all_days\""
            }),
        ),
        ("level", string("ad, adset, campaign or account")),
        ("action_attribution_windows", string_list("Attribution windows such as 7d_click")),
        ("action_breakdowns", string_list("Action breakdown dimensions")),
        ("action_report_time", string("impression, conversion or mixed")),
        ("breakdowns", string_list("Result breakdown dimensions")),
        ("default_summary", boolean("Include a summary row")),
        ("use_account_attribution_setting", boolean("Use the account attribution setting")),
        ("use_unified_attribution_setting", boolean("Use the unified attribution setting (default true)")),
        ("filtering", filtering()),
        ("sort", string("Sort expression such as reach_descending")),
        ("offset", integer("Result offset")),
        ("since", string("Lower time bound for pagination")),
        ("until", string("Upper time bound for pagination")),
        ("locale", string("Locale for text fields")),
    ];
    props.extend(cursors());
    schema(&[id], props)
}

fn list_props(id: &'static str, id_description: &'static str) -> Vec<(&'static str, Value)> {
    let mut props = vec![
        (id, string(id_description)),
        fields(),
        ("filtering", filtering()),
        ("date_preset", string("Relative date range")),
        ("time_range", time_range()),
        ("updated_since", integer("Unix timestamp")),
        ("effective_status", string_list("Statuses such as ACTIVE or PAUSED")),
        ("date_format", string("Date serialization format")),
    ];
    props.extend(cursors());
    props
}

fn list_schema(id: &'static str, id_description: &'static str) -> JsonObject {
    schema(&[id], list_props(id, id_description))
}

fn campaign_list_schema() -> JsonObject {
    let mut props = list_props("act_id", "Ad account id (act_<ID>)");
    props.extend([
        ("is_completed", boolean("Only completed campaigns")),
        ("special_ad_categories", string_list("Special ad categories")),
        (
            "objective",
            json!({ "type": ["string", "array"], "description": "Objective or list of objectives" }),
        ),
        (
            "buyer_guarantee_agreement_status",
            json!({ "type": ["string", "array"], "description": "Agreement status filter" }),
        ),
        ("include_drafts", boolean("Include draft campaigns")),
    ]);
    schema(&["act_id"], props)
}

fn activity_schema(id: &'static str, id_description: &'static str) -> JsonObject {
    let mut props = vec![
        (id, string(id_description)),
        fields(),
        ("time_range", time_range()),
        ("since", string("Start of the window")),
        ("until", string("End of the window")),
    ];
    props.extend(cursors());
    schema(&[id], props)
}

const ACT_ID: &str = "Ad account id (act_<ID>)";
const CAMPAIGN_ID: &str = "Campaign id";
const ADSET_ID: &str = "Ad set id";
const AD_ID: &str = "Ad id";

/// Every tool the server exposes, in catalog order.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "list_ad_accounts",
            "List the ad accounts linked to the token's user.",
            schema(&[], vec![]),
        ),
        Tool::new(
            "get_details_of_ad_account",
            "Fetch fields of one ad account.",
            schema(&["act_id"], vec![("act_id", string(ACT_ID)), fields()]),
        ),
        Tool::new(
            "get_adaccount_insights",
            "Performance insights for an ad account.",
            insights_schema("act_id", ACT_ID),
        ),
        Tool::new(
            "get_campaign_insights",
            "Performance insights for a campaign.",
            insights_schema("campaign_id", CAMPAIGN_ID),
        ),
        Tool::new(
            "get_adset_insights",
            "Performance insights for an ad set.",
            insights_schema("adset_id", ADSET_ID),
        ),
        Tool::new(
            "get_ad_insights",
            "Performance insights for an ad.",
            insights_schema("ad_id", AD_ID),
        ),
        Tool::new(
            "fetch_pagination_url",
            "Fetch a paging.next or paging.previous URL returned by another tool.",
            schema(&["url"], vec![("url", string("Complete pagination URL"))]),
        ),
        Tool::new(
            "get_ad_creative_by_id",
            "Fetch one ad creative.",
            schema(
                &["creative_id"],
                vec![
                    ("creative_id", string("Creative id")),
                    fields(),
                    ("thumbnail_width", integer("Thumbnail width in pixels")),
                    ("thumbnail_height", integer("Thumbnail height in pixels")),
                ],
            ),
        ),
        Tool::new(
            "get_ad_creatives_by_ad_id",
            "List the creatives attached to an ad.",
            {
                let mut props = vec![
                    ("ad_id", string(AD_ID)),
                    fields(),
                    ("date_format", string("Date serialization format")),
                ];
                props.extend(cursors());
                schema(&["ad_id"], props)
            },
        ),
        Tool::new(
            "get_ad_by_id",
            "Fetch one ad.",
            node_schema("ad_id", AD_ID),
        ),
        Tool::new(
            "get_ads_by_adaccount",
            "List the ads of an ad account.",
            list_schema("act_id", ACT_ID),
        ),
        Tool::new(
            "get_ads_by_campaign",
            "List the ads of a campaign.",
            list_schema("campaign_id", CAMPAIGN_ID),
        ),
        Tool::new(
            "get_ads_by_adset",
            "List the ads of an ad set.",
            list_schema("adset_id", ADSET_ID),
        ),
        Tool::new(
            "get_adset_by_id",
            "Fetch one ad set.",
            node_schema("adset_id", ADSET_ID),
        ),
        Tool::new(
            "get_adsets_by_ids",
            "Fetch several ad sets in one call.",
            schema(
                &["adset_ids"],
                vec![
                    ("adset_ids", string_list("Ad set ids")),
                    fields(),
                    ("date_format", string("Date serialization format")),
                ],
            ),
        ),
        Tool::new(
            "get_adsets_by_adaccount",
            "List the ad sets of an ad account.",
            list_schema("act_id", ACT_ID),
        ),
        Tool::new(
            "get_adsets_by_campaign",
            "List the ad sets of a campaign.",
            list_schema("campaign_id", CAMPAIGN_ID),
        ),
        Tool::new(
            "get_campaign_by_id",
            "Fetch one campaign.",
            node_schema("campaign_id", CAMPAIGN_ID),
        ),
        Tool::new(
            "get_campaigns_by_adaccount",
            "List the campaigns of an ad account.",
            campaign_list_schema(),
        ),
        Tool::new(
            "get_activities_by_adaccount",
            "Change history of an ad account.",
            activity_schema("act_id", ACT_ID),
        ),
        Tool::new(
            "get_activities_by_adset",
            "Change history of an ad set.",
            activity_schema("adset_id", ADSET_ID),
        ),
    ]
}
