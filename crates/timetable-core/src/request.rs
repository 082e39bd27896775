//! Per-call settings for a calendar feed request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `strftime` pattern for the `start` and `end` query bounds (`yyyy/MM/dd`).
pub const BOUND_DATE_FORMAT: &str = "%Y/%m/%d";

/// Formats a date bound the way the calendar server expects it.
pub fn format_bound(date: NaiveDate) -> String {
    date.format(BOUND_DATE_FORMAT).to_string()
}

/// Settings for one calendar feed request.
///
/// Supplied fresh for every authentication attempt and left untouched for the
/// duration of the request. The base URL and extra query parameters are
/// passed through verbatim, so callers must make sure they are well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequestConfig {
    /// Base URL of the calendar server, without a trailing slash.
    pub base_server_url: String,

    /// Name of the calendar under the user's home collection.
    pub calendar_name: String,

    /// Lower bound of the requested range (`start=`).
    pub min_date: Option<NaiveDate>,

    /// Upper bound of the requested range (`end=`).
    pub max_date: Option<NaiveDate>,

    /// Raw query string placed right after `?`.
    pub extra_query_parameters: Option<String>,
}

impl SyncRequestConfig {
    /// Creates settings for the given server and calendar, without bounds.
    pub fn new(base_server_url: impl Into<String>, calendar_name: impl Into<String>) -> Self {
        Self {
            base_server_url: base_server_url.into(),
            calendar_name: calendar_name.into(),
            min_date: None,
            max_date: None,
            extra_query_parameters: None,
        }
    }

    /// Sets the lower date bound.
    #[must_use]
    pub fn with_min_date(mut self, date: NaiveDate) -> Self {
        self.min_date = Some(date);
        self
    }

    /// Sets the upper date bound.
    #[must_use]
    pub fn with_max_date(mut self, date: NaiveDate) -> Self {
        self.max_date = Some(date);
        self
    }

    /// Sets the raw extra query parameters.
    #[must_use]
    pub fn with_extra_query_parameters(mut self, params: impl Into<String>) -> Self {
        self.extra_query_parameters = Some(params.into());
        self
    }

    /// Returns the extra query parameters, empty when unset.
    pub fn extra_query_parameters(&self) -> &str {
        self.extra_query_parameters.as_deref().unwrap_or_default()
    }

    /// Returns true if the lower bound is after the upper bound.
    pub fn has_inverted_bounds(&self) -> bool {
        matches!((self.min_date, self.max_date), (Some(min), Some(max)) if min > max)
    }
}
