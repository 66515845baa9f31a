//! Query parameter catalog and builder
//!
//! Every option a tool can send is a [`Param`] variant carrying its wire name
//! and its [`Encoding`]. A [`ParamSet`] stores typed values keyed by `Param`
//! in a `BTreeMap`, so [`ParamSet::build`] is a single pass in catalog order:
//! the output never depends on the order options were set in, and options
//! that were never set never reach the wire.

use std::collections::BTreeMap;

use serde_json::Value;

/// How a value is rendered onto the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Text as-is, integers in decimal, booleans as `true`/`false`
    Scalar,
    /// Lists joined with a literal comma (field selectors, breakdowns)
    CommaList,
    /// Lists and objects serialized to JSON text (filters, time ranges)
    Json,
}

/// Every query option recognized by the tool surface, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    Ids,
    Fields,
    Level,
    DatePreset,
    TimeRange,
    TimeRanges,
    TimeIncrement,
    Since,
    Until,
    ActionAttributionWindows,
    ActionBreakdowns,
    ActionReportTime,
    Breakdowns,
    DefaultSummary,
    UseAccountAttributionSetting,
    UseUnifiedAttributionSetting,
    Filtering,
    EffectiveStatus,
    UpdatedSince,
    IsCompleted,
    SpecialAdCategories,
    Objective,
    BuyerGuaranteeAgreementStatus,
    IncludeDrafts,
    ThumbnailWidth,
    ThumbnailHeight,
    Sort,
    Limit,
    After,
    Before,
    Offset,
    DateFormat,
    Locale,
}

impl Param {
    pub const ALL: [Param; 33] = [
        Param::Ids,
        Param::Fields,
        Param::Level,
        Param::DatePreset,
        Param::TimeRange,
        Param::TimeRanges,
        Param::TimeIncrement,
        Param::Since,
        Param::Until,
        Param::ActionAttributionWindows,
        Param::ActionBreakdowns,
        Param::ActionReportTime,
        Param::Breakdowns,
        Param::DefaultSummary,
        Param::UseAccountAttributionSetting,
        Param::UseUnifiedAttributionSetting,
        Param::Filtering,
        Param::EffectiveStatus,
        Param::UpdatedSince,
        Param::IsCompleted,
        Param::SpecialAdCategories,
        Param::Objective,
        Param::BuyerGuaranteeAgreementStatus,
        Param::IncludeDrafts,
        Param::ThumbnailWidth,
        Param::ThumbnailHeight,
        Param::Sort,
        Param::Limit,
        Param::After,
        Param::Before,
        Param::Offset,
        Param::DateFormat,
        Param::Locale,
    ];

    /// Wire name of the parameter.
    pub fn name(self) -> &'static str {
        match self {
            Param::Ids => "ids",
            Param::Fields => "fields",
            Param::Level => "level",
            Param::DatePreset => "date_preset",
            Param::TimeRange => "time_range",
            Param::TimeRanges => "time_ranges",
            Param::TimeIncrement => "time_increment",
            Param::Since => "since",
            Param::Until => "until",
            Param::ActionAttributionWindows => "action_attribution_windows",
            Param::ActionBreakdowns => "action_breakdowns",
            Param::ActionReportTime => "action_report_time",
            Param::Breakdowns => "breakdowns",
            Param::DefaultSummary => "default_summary",
            Param::UseAccountAttributionSetting => "use_account_attribution_setting",
            Param::UseUnifiedAttributionSetting => "use_unified_attribution_setting",
            Param::Filtering => "filtering",
            Param::EffectiveStatus => "effective_status",
            Param::UpdatedSince => "updated_since",
            Param::IsCompleted => "is_completed",
            Param::SpecialAdCategories => "special_ad_categories",
            Param::Objective => "objective",
            Param::BuyerGuaranteeAgreementStatus => "buyer_guarantee_agreement_status",
            Param::IncludeDrafts => "include_drafts",
            Param::ThumbnailWidth => "thumbnail_width",
            Param::ThumbnailHeight => "thumbnail_height",
            Param::Sort => "sort",
            Param::Limit => "limit",
            Param::After => "after",
            Param::Before => "before",
            Param::Offset => "offset",
            Param::DateFormat => "date_format",
            Param::Locale => "locale",
        }
    }

    /// Encoding rule applied to this parameter's value.
    pub fn encoding(self) -> Encoding {
        match self {
            Param::Ids
            | Param::Fields
            | Param::ActionAttributionWindows
            | Param::ActionBreakdowns
            | Param::Breakdowns => Encoding::CommaList,
            Param::Filtering
            | Param::TimeRange
            | Param::TimeRanges
            | Param::EffectiveStatus
            | Param::SpecialAdCategories
            | Param::Objective
            | Param::BuyerGuaranteeAgreementStatus => Encoding::Json,
            _ => Encoding::Scalar,
        }
    }
}

/// A typed option value before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    List(Vec<String>),
    Structured(Value),
}

impl ParamValue {
    /// Render under `encoding`. Total: every value/encoding pair has a
    /// string form, so building a query never fails.
    pub fn encode(&self, encoding: Encoding) -> String {
        match (self, encoding) {
            (ParamValue::Text(s), _) => s.clone(),
            (ParamValue::Integer(n), _) => n.to_string(),
            (ParamValue::Flag(b), _) => b.to_string(),
            (ParamValue::List(items), Encoding::Json) => Value::from(items.clone()).to_string(),
            (ParamValue::List(items), _) => items.join(","),
            (ParamValue::Structured(Value::String(s)), Encoding::Scalar) => s.clone(),
            (ParamValue::Structured(Value::Array(items)), Encoding::CommaList)
                if items.iter().all(Value::is_string) =>
            {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            }
            (ParamValue::Structured(v), _) => v.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<&[String]> for ParamValue {
    fn from(value: &[String]) -> Self {
        ParamValue::List(value.to_vec())
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Structured(value)
    }
}

/// Typed options for one call, keyed by catalog entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: BTreeMap<Param, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `param`, replacing any previous value.
    pub fn set(&mut self, param: Param, value: impl Into<ParamValue>) -> &mut Self {
        self.values.insert(param, value.into());
        self
    }

    /// Set `param` only when a value is present.
    pub fn set_opt<V: Into<ParamValue>>(&mut self, param: Param, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(param, v);
        }
        self
    }

    pub fn contains(&self, param: Param) -> bool {
        self.values.contains_key(&param)
    }

    /// Encode into query pairs: `access_token` first, then every set option
    /// in catalog order.
    pub fn build(&self, access_token: &str) -> QueryParams {
        let mut pairs = Vec::with_capacity(self.values.len() + 1);
        pairs.push(("access_token".to_owned(), access_token.to_owned()));
        for (param, value) in &self.values {
            pairs.push((param.name().to_owned(), value.encode(param.encoding())));
        }
        QueryParams(pairs)
    }
}

/// Flat, ordered, string-keyed query mapping ready for URL encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.0.iter()
    }
}

#[cfg(test)]
impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

/// `Some` only for a non-blank string.
pub(crate) fn non_empty_str(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// `Some` only for a non-empty list.
pub(crate) fn non_empty_list<T>(value: &Option<Vec<T>>) -> Option<&[T]> {
    value.as_deref().filter(|v| !v.is_empty())
}
