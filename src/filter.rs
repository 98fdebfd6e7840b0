use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{trace, warn};

use crate::columns::{CellValue, ColumnId};

/// Predicate kind, chosen per column when the column is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match over the value's search terms.
    Text,
    /// Loose equality after numeric normalisation of both sides.
    ExactMatch,
    /// Inclusive `[start, end]` range, either bound may be empty.
    DateRange,
}

/// Which input widget a filter needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    DateRange,
}

impl FilterKind {
    pub fn input_kind(&self) -> InputKind {
        match self {
            FilterKind::Text | FilterKind::ExactMatch => InputKind::Text,
            FilterKind::DateRange => InputKind::DateRange,
        }
    }

    pub fn matches(&self, value: &CellValue, filter: &FilterValue) -> bool {
        match (self, filter) {
            (FilterKind::Text, FilterValue::Text(needle)) => {
                text_matches(&value.search_terms(), needle)
            }
            (FilterKind::ExactMatch, FilterValue::Text(needle)) => exact_matches(value, needle),
            (FilterKind::DateRange, FilterValue::Range(start, end)) => match value {
                CellValue::Date(date) => date_in_range(*date, start, end),
                _ => false,
            },
            (kind, value) => {
                warn!("Ignoring {value:?} for a {kind:?} filter");
                true
            }
        }
    }
}

/// Filter value as typed by the user. Text for text and numeric columns,
/// a `(start, end)` pair of date strings for date columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Range(String, String),
}

impl FilterValue {
    /// An empty value puts no constraint on the column.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Range(start, end) => start.is_empty() && end.is_empty(),
        }
    }

    /// Parse `START..END` (either side may be empty) or a single date as the start.
    pub fn parse_range(s: &str) -> FilterValue {
        match s.split_once("..") {
            Some((start, end)) => FilterValue::Range(start.trim().into(), end.trim().into()),
            None => FilterValue::Range(s.trim().into(), String::new()),
        }
    }
}

pub fn text_matches(candidates: &[String], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    candidates
        .iter()
        .any(|c| c.to_lowercase().contains(&needle))
}

pub fn exact_matches(value: &CellValue, needle: &str) -> bool {
    let needle = needle.trim();
    match value {
        CellValue::Number(n) => needle.parse::<f64>().is_ok_and(|v| v == *n as f64),
        other => other.search_terms().first().is_some_and(|s| s == needle),
    }
}

/// Parses an ISO date (`2022-12-01`), a partial one (`2022-12`, `2022`) that
/// stands for its first day, a local date-time (`2022-12-01T10:30`) or an
/// RFC 3339 timestamp, which is converted to UTC.
pub fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(NaiveDateTime::from(date));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Some(NaiveDateTime::from(date));
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .map(NaiveDateTime::from);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Inclusive on both ends. `end < start` is evaluated literally and never
/// matches; a bound that fails to parse never matches either.
pub fn date_in_range(date: NaiveDate, start: &str, end: &str) -> bool {
    let instant = NaiveDateTime::from(date);
    match (start.is_empty(), end.is_empty()) {
        (true, true) => true,
        (true, false) => parse_instant(end).is_some_and(|e| instant <= e),
        (false, true) => parse_instant(start).is_some_and(|s| instant >= s),
        (false, false) => match (parse_instant(start), parse_instant(end)) {
            (Some(s), Some(e)) => s <= instant && instant <= e,
            _ => false,
        },
    }
}

/// Per column filter values. Each committed edit replaces a column's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<ColumnId, FilterValue>,
}

impl FilterState {
    pub fn set(&mut self, column: ColumnId, value: FilterValue) {
        trace!("Set filter {column} => {value:?}");
        if matches!(&value, FilterValue::Text(s) if s.is_empty()) {
            self.values.remove(&column);
        } else {
            self.values.insert(column, value);
        }
    }

    pub fn set_range_start(&mut self, column: ColumnId, start: impl Into<String>) {
        let end = self.range(column).1;
        self.set(column, FilterValue::Range(start.into(), end));
    }

    pub fn set_range_end(&mut self, column: ColumnId, end: impl Into<String>) {
        let start = self.range(column).0;
        self.set(column, FilterValue::Range(start, end.into()));
    }

    pub fn get(&self, column: ColumnId) -> Option<&FilterValue> {
        self.values.get(&column)
    }

    /// Committed text of a column, empty when unset.
    pub fn text(&self, column: ColumnId) -> String {
        match self.values.get(&column) {
            Some(FilterValue::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Committed range of a column, empty bounds when unset.
    pub fn range(&self, column: ColumnId) -> (String, String) {
        match self.values.get(&column) {
            Some(FilterValue::Range(s, e)) => (s.clone(), e.clone()),
            _ => (String::new(), String::new()),
        }
    }

    pub fn remove(&mut self, column: ColumnId) {
        self.values.remove(&column);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Filters that constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (ColumnId, &FilterValue)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(c, v)| (*c, v))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}
