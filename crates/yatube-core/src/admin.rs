//! Admin listing configuration.
//!
//! Declarative description of how the staff listings show posts and groups:
//! which columns appear, which can be edited in place, what is searched,
//! what is filtered and what to print for empty values.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Shown in place of empty values.
pub const EMPTY_VALUE_DISPLAY: &str = "-пусто-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelAdmin {
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub empty_value_display: &'static str,
}

pub const POST_ADMIN: ModelAdmin = ModelAdmin {
    list_display: &["pk", "text", "pub_date", "author", "group"],
    list_editable: &["group"],
    search_fields: &["text"],
    list_filter: &["pub_date"],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

pub const GROUP_ADMIN: ModelAdmin = ModelAdmin {
    list_display: &["pk", "title", "description"],
    list_editable: &[],
    search_fields: &[],
    list_filter: &[],
    empty_value_display: EMPTY_VALUE_DISPLAY,
};

impl ModelAdmin {
    pub fn is_editable(&self, column: &str) -> bool {
        self.list_editable.contains(&column)
    }

    pub fn is_searchable(&self) -> bool {
        !self.search_fields.is_empty()
    }

    pub fn is_filtered_by(&self, column: &str) -> bool {
        self.list_filter.contains(&column)
    }

    /// Cell text for a possibly missing value.
    pub fn display(&self, value: Option<&str>) -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => self.empty_value_display.to_string(),
        }
    }
}

/// Choices offered by a date column filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    AnyDate,
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    pub const ALL: [DateFilter; 5] = [
        DateFilter::AnyDate,
        DateFilter::Today,
        DateFilter::PastSevenDays,
        DateFilter::ThisMonth,
        DateFilter::ThisYear,
    ];

    /// Unknown values fall back to no filtering.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("today") => Self::Today,
            Some("past_7_days") => Self::PastSevenDays,
            Some("this_month") => Self::ThisMonth,
            Some("this_year") => Self::ThisYear,
            _ => Self::AnyDate,
        }
    }

    pub fn param(&self) -> &'static str {
        match self {
            Self::AnyDate => "",
            Self::Today => "today",
            Self::PastSevenDays => "past_7_days",
            Self::ThisMonth => "this_month",
            Self::ThisYear => "this_year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AnyDate => "Any date",
            Self::Today => "Today",
            Self::PastSevenDays => "Past 7 days",
            Self::ThisMonth => "This month",
            Self::ThisYear => "This year",
        }
    }

    /// Inclusive lower bound on `pub_date`, relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let start = match self {
            Self::AnyDate => return None,
            Self::Today => today,
            Self::PastSevenDays => today - Duration::days(7),
            Self::ThisMonth => NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?,
            Self::ThisYear => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        };
        Some(start.and_time(NaiveTime::MIN).and_utc())
    }
}
