//! Insights edge options
//!
//! Shared by the account, campaign, ad set and ad insights tools. The only
//! logic beyond plain encoding is time selection: exactly one of
//! `time_ranges`, `time_range`, `since`/`until` or `date_preset` is sent,
//! chosen by first match in that order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{Param, ParamSet, non_empty_list, non_empty_str};

/// Default relative window when no explicit time selection is given.
pub const DEFAULT_DATE_PRESET: &str = "last_30d";

/// Provider default granularity; never sent on the wire.
const ALL_DAYS: &str = "all_days";

/// Inclusive `YYYY-MM-DD` date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub since: String,
    pub until: String,
}

/// Granularity of the time breakdown: a day count (1-90) or a named
/// increment such as `monthly` or `all_days`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimeIncrement {
    Days(u32),
    Named(String),
}

/// The single time selection that reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSelection<'a> {
    Ranges(&'a [TimeRange]),
    Range(&'a TimeRange),
    Bounds {
        since: Option<&'a str>,
        until: Option<&'a str>,
    },
    Preset(&'a str),
    Unbounded,
}

/// Options accepted by every insights tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsOptions {
    pub fields: Option<Vec<String>>,
    /// `null` disables the preset entirely
    pub date_preset: Option<String>,
    pub time_range: Option<TimeRange>,
    pub time_ranges: Option<Vec<TimeRange>>,
    pub time_increment: Option<TimeIncrement>,
    pub level: Option<String>,
    pub action_attribution_windows: Option<Vec<String>>,
    pub action_breakdowns: Option<Vec<String>>,
    pub action_report_time: Option<String>,
    pub breakdowns: Option<Vec<String>>,
    pub default_summary: bool,
    pub use_account_attribution_setting: bool,
    pub use_unified_attribution_setting: bool,
    pub filtering: Option<Vec<Value>>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub offset: Option<u32>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub locale: Option<String>,
}

impl Default for InsightsOptions {
    fn default() -> Self {
        Self {
            fields: None,
            date_preset: Some(DEFAULT_DATE_PRESET.to_owned()),
            time_range: None,
            time_ranges: None,
            time_increment: Some(TimeIncrement::Named(ALL_DAYS.to_owned())),
            level: None,
            action_attribution_windows: None,
            action_breakdowns: None,
            action_report_time: None,
            breakdowns: None,
            default_summary: false,
            use_account_attribution_setting: false,
            use_unified_attribution_setting: true,
            filtering: None,
            sort: None,
            limit: None,
            after: None,
            before: None,
            offset: None,
            since: None,
            until: None,
            locale: None,
        }
    }
}

impl InsightsOptions {
    /// Resolve the time selection by first match.
    pub fn time_selection(&self) -> TimeSelection<'_> {
        if let Some(ranges) = non_empty_list(&self.time_ranges) {
            return TimeSelection::Ranges(ranges);
        }
        if let Some(range) = &self.time_range {
            return TimeSelection::Range(range);
        }
        let since = non_empty_str(&self.since);
        let until = non_empty_str(&self.until);
        if since.is_some() || until.is_some() {
            return TimeSelection::Bounds { since, until };
        }
        match non_empty_str(&self.date_preset) {
            Some(preset) => TimeSelection::Preset(preset),
            None => TimeSelection::Unbounded,
        }
    }

    /// Build the insights parameter set. `default_level` applies when the
    /// caller did not pick an aggregation level.
    pub fn to_params(&self, default_level: &str) -> ParamSet {
        let mut params = ParamSet::new();

        params
            .set_opt(Param::Fields, non_empty_list(&self.fields))
            .set(
                Param::Level,
                non_empty_str(&self.level).unwrap_or(default_level),
            )
            .set_opt(
                Param::ActionAttributionWindows,
                non_empty_list(&self.action_attribution_windows),
            )
            .set_opt(
                Param::ActionBreakdowns,
                non_empty_list(&self.action_breakdowns),
            )
            .set_opt(
                Param::ActionReportTime,
                non_empty_str(&self.action_report_time),
            )
            .set_opt(Param::Breakdowns, non_empty_list(&self.breakdowns))
            .set_opt(
                Param::Filtering,
                non_empty_list(&self.filtering).map(|f| Value::Array(f.to_vec())),
            )
            .set_opt(Param::Sort, non_empty_str(&self.sort))
            .set_opt(Param::Limit, self.limit)
            .set_opt(Param::After, non_empty_str(&self.after))
            .set_opt(Param::Before, non_empty_str(&self.before))
            .set_opt(Param::Offset, self.offset)
            .set_opt(Param::Locale, non_empty_str(&self.locale));

        match self.time_selection() {
            TimeSelection::Ranges(ranges) => {
                params.set(Param::TimeRanges, to_json(ranges));
            }
            TimeSelection::Range(range) => {
                params.set(Param::TimeRange, to_json(range));
            }
            TimeSelection::Bounds { since, until } => {
                params.set_opt(Param::Since, since).set_opt(Param::Until, until);
            }
            TimeSelection::Preset(preset) => {
                params.set(Param::DatePreset, preset);
            }
            TimeSelection::Unbounded => {}
        }

        match &self.time_increment {
            Some(TimeIncrement::Days(days)) => {
                params.set(Param::TimeIncrement, *days);
            }
            Some(TimeIncrement::Named(name)) if !name.is_empty() && name != ALL_DAYS => {
                params.set(Param::TimeIncrement, name.as_str());
            }
            _ => {}
        }

        if self.default_summary {
            params.set(Param::DefaultSummary, true);
        }
        if self.use_account_attribution_setting {
            params.set(Param::UseAccountAttributionSetting, true);
        }
        if self.use_unified_attribution_setting {
            params.set(Param::UseUnifiedAttributionSetting, true);
        }

        params
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
