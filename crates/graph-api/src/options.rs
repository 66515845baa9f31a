//! Option sets for the node and edge tools
//!
//! Each struct deserializes straight from tool-call arguments (unknown keys
//! such as the object id are ignored) and lowers itself into a [`ParamSet`].
//! Blank strings and empty lists are treated as not given.

use serde::Deserialize;
use serde_json::Value;

use crate::insights::TimeRange;
use crate::params::{Param, ParamSet, non_empty_list, non_empty_str};

/// Page size used by the list tools when the caller does not choose one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

fn default_limit() -> Option<u32> {
    Some(DEFAULT_PAGE_LIMIT)
}

fn time_range_json(range: &TimeRange) -> Value {
    serde_json::json!({ "since": range.since, "until": range.until })
}

/// Single-object read: `fields` and optionally `date_format`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
    pub fields: Option<Vec<String>>,
    pub date_format: Option<String>,
}

impl NodeOptions {
    pub fn with_fields(fields: &[&str]) -> Self {
        Self {
            fields: Some(fields.iter().map(|f| (*f).to_owned()).collect()),
            date_format: None,
        }
    }

    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set_opt(Param::DateFormat, non_empty_str(&self.date_format));
        params
    }
}

/// Creative read with thumbnail sizing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreativeOptions {
    pub fields: Option<Vec<String>>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
}

impl CreativeOptions {
    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set_opt(Param::ThumbnailWidth, self.thumbnail_width.filter(|w| *w > 0))
            .set_opt(Param::ThumbnailHeight, self.thumbnail_height.filter(|h| *h > 0));
        params
    }
}

/// Cursor-paged edge read without filters (creatives of an ad).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub fields: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub date_format: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            fields: None,
            limit: default_limit(),
            after: None,
            before: None,
            date_format: None,
        }
    }
}

impl PageOptions {
    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set_opt(Param::Limit, self.limit)
            .set_opt(Param::After, non_empty_str(&self.after))
            .set_opt(Param::Before, non_empty_str(&self.before))
            .set_opt(Param::DateFormat, non_empty_str(&self.date_format));
        params
    }
}

/// Filters shared by the ads and ad sets list edges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    pub fields: Option<Vec<String>>,
    pub filtering: Option<Vec<Value>>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub date_preset: Option<String>,
    pub time_range: Option<TimeRange>,
    /// Unix timestamp
    pub updated_since: Option<i64>,
    pub effective_status: Option<Vec<String>>,
    pub date_format: Option<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            fields: None,
            filtering: None,
            limit: default_limit(),
            after: None,
            before: None,
            date_preset: None,
            time_range: None,
            updated_since: None,
            effective_status: None,
            date_format: None,
        }
    }
}

impl ListOptions {
    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        self.apply(&mut params);
        params
    }

    fn apply(&self, params: &mut ParamSet) {
        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set_opt(
                Param::Filtering,
                non_empty_list(&self.filtering).map(|f| Value::Array(f.to_vec())),
            )
            .set_opt(Param::Limit, self.limit)
            .set_opt(Param::After, non_empty_str(&self.after))
            .set_opt(Param::Before, non_empty_str(&self.before))
            .set_opt(Param::DatePreset, non_empty_str(&self.date_preset))
            .set_opt(Param::TimeRange, self.time_range.as_ref().map(time_range_json))
            .set_opt(Param::UpdatedSince, self.updated_since.filter(|t| *t != 0))
            .set_opt(
                Param::EffectiveStatus,
                non_empty_list(&self.effective_status).map(|s| s.to_vec()),
            )
            .set_opt(Param::DateFormat, non_empty_str(&self.date_format));
    }
}

/// Campaign listing: the shared list filters plus campaign-only selectors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignListOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    pub is_completed: Option<bool>,
    pub special_ad_categories: Option<Vec<String>>,
    /// A single objective or a list of them
    pub objective: Option<Value>,
    pub buyer_guarantee_agreement_status: Option<Value>,
    pub include_drafts: Option<bool>,
}

impl CampaignListOptions {
    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        self.list.apply(&mut params);
        params
            .set_opt(Param::IsCompleted, self.is_completed)
            .set_opt(
                Param::SpecialAdCategories,
                non_empty_list(&self.special_ad_categories).map(|c| c.to_vec()),
            )
            .set_opt(Param::Objective, non_empty_value(&self.objective))
            .set_opt(
                Param::BuyerGuaranteeAgreementStatus,
                non_empty_value(&self.buyer_guarantee_agreement_status),
            )
            .set_opt(Param::IncludeDrafts, self.include_drafts);
        params
    }
}

/// Change-history read. `time_range` overrides `since`/`until`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityOptions {
    pub fields: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub time_range: Option<TimeRange>,
    pub since: Option<String>,
    pub until: Option<String>,
}

impl ActivityOptions {
    pub fn to_params(&self) -> ParamSet {
        let mut params = ParamSet::new();
        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set_opt(Param::Limit, self.limit)
            .set_opt(Param::After, non_empty_str(&self.after))
            .set_opt(Param::Before, non_empty_str(&self.before));

        match &self.time_range {
            Some(range) => {
                params.set(Param::TimeRange, time_range_json(range));
            }
            None => {
                params
                    .set_opt(Param::Since, non_empty_str(&self.since))
                    .set_opt(Param::Until, non_empty_str(&self.until));
            }
        }
        params
    }
}

fn non_empty_value(value: &Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(v) => Some(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_defaults_to_page_of_25() {
        let query = ListOptions::default().to_params().build("tok");
        let keys: Vec<&str> = query.keys().collect();
        assert_eq!(keys, vec!["access_token", "limit"]);
        assert_eq!(query.get("limit"), Some("25"));
    }

    #[test]
    fn list_options_encode_structured_values_as_json() {
        let options: ListOptions = serde_json::from_value(json!({
            "act_id": "act_123",
            "fields": ["id", "name", "status"],
            "filtering": [{"field": "effective_status", "operator": "IN", "value": ["ACTIVE"]}],
            "effective_status": ["ACTIVE", "PAUSED"],
            "time_range": {"since": "2024-01-01", "until": "2024-01-31"},
            "updated_since": 1_700_000_000,
            "limit": 50
        }))
        .unwrap();
        let query = options.to_params().build("tok");

        assert_eq!(query.get("fields"), Some("id,name,status"));
        assert_eq!(query.get("effective_status"), Some(r#"["ACTIVE","PAUSED"]"#));
        assert_eq!(
            query.get("time_range"),
            Some(r#"{"since":"2024-01-01","until":"2024-01-31"}"#)
        );
        assert_eq!(query.get("updated_since"), Some("1700000000"));
        assert_eq!(query.get("limit"), Some("50"));

        let filtering: Value = serde_json::from_str(query.get("filtering").unwrap()).unwrap();
        assert_eq!(filtering[0]["operator"], "IN");
    }

    #[test]
    fn blank_values_are_omitted() {
        let options: ListOptions = serde_json::from_value(json!({
            "fields": [],
            "after": "",
            "effective_status": [],
            "date_preset": ""
        }))
        .unwrap();
        let query = options.to_params().build("tok");
        for key in ["fields", "after", "effective_status", "date_preset"] {
            assert!(!query.contains_key(key), "{key} must be omitted");
        }
    }

    #[test]
    fn campaign_options_flatten_list_filters() {
        let options: CampaignListOptions = serde_json::from_value(json!({
            "date_preset": "last_7d",
            "is_completed": false,
            "special_ad_categories": ["HOUSING"],
            "objective": "OUTCOME_SALES",
            "include_drafts": true
        }))
        .unwrap();
        let query = options.to_params().build("tok");

        assert_eq!(query.get("date_preset"), Some("last_7d"));
        assert_eq!(query.get("limit"), Some("25"));
        assert_eq!(query.get("is_completed"), Some("false"));
        assert_eq!(query.get("special_ad_categories"), Some(r#"["HOUSING"]"#));
        assert_eq!(query.get("objective"), Some(r#""OUTCOME_SALES""#));
        assert_eq!(query.get("include_drafts"), Some("true"));
        assert!(!query.contains_key("buyer_guarantee_agreement_status"));
    }

    #[test]
    fn activity_time_range_overrides_bounds() {
        let options = ActivityOptions {
            time_range: Some(TimeRange {
                since: "2024-01-01".into(),
                until: "2024-01-02".into(),
            }),
            since: Some("2023-01-01".into()),
            until: Some("2023-12-31".into()),
            ..Default::default()
        };
        let query = options.to_params().build("tok");
        assert!(query.contains_key("time_range"));
        assert!(!query.contains_key("since"));
        assert!(!query.contains_key("until"));
    }

    #[test]
    fn activity_has_no_default_limit() {
        let query = ActivityOptions {
            since: Some("2024-05-01".into()),
            ..Default::default()
        }
        .to_params()
        .build("tok");
        assert!(!query.contains_key("limit"));
        assert_eq!(query.get("since"), Some("2024-05-01"));
    }

    #[test]
    fn creative_thumbnail_dimensions() {
        let query = CreativeOptions {
            fields: Some(vec!["name".into(), "thumbnail_url".into()]),
            thumbnail_width: Some(300),
            thumbnail_height: Some(200),
        }
        .to_params()
        .build("tok");
        assert_eq!(query.get("thumbnail_width"), Some("300"));
        assert_eq!(query.get("thumbnail_height"), Some("200"));
        assert_eq!(query.get("fields"), Some("name,thumbnail_url"));
    }

    #[test]
    fn page_options_default_limit() {
        let options: PageOptions = serde_json::from_value(json!({"date_format": "U"})).unwrap();
        let query = options.to_params().build("tok");
        assert_eq!(query.get("limit"), Some("25"));
        assert_eq!(query.get("date_format"), Some("U"));
    }

    #[test]
    fn node_options_with_fields() {
        let query = NodeOptions::with_fields(&["name", "currency"])
            .to_params()
            .build("tok");
        assert_eq!(query.get("fields"), Some("name,currency"));
        assert!(!query.contains_key("date_format"));
    }
}
