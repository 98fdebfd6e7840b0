use std::cmp::Ordering;

use chrono::NaiveDateTime;
use tracing::trace;

use crate::columns::{CellValue, ColumnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    /// Chronological, on the raw instant and never on the formatted text.
    Datetime,
    /// The value's own ordering: numeric for numbers, lexicographic for text.
    Natural,
}

impl SortKind {
    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        match (self, a, b) {
            (SortKind::Datetime, CellValue::Date(a), CellValue::Date(b)) => {
                NaiveDateTime::from(*a).cmp(&NaiveDateTime::from(*b))
            }
            _ => a.natural_cmp(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn glyph(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Ordered (column, direction) pairs. Toggling replaces instead of
/// stacking, so at most one entry is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    entries: Vec<(ColumnId, SortDirection)>,
}

impl SortState {
    /// Cycles none -> ascending -> descending -> none for `column`.
    pub fn toggle(&mut self, column: ColumnId) {
        let next = match self.direction(column) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        self.entries.clear();
        if let Some(direction) = next {
            self.entries.push((column, direction));
        }
        trace!("Sort state for {column}: {next:?}");
    }

    pub fn set(&mut self, column: ColumnId, direction: SortDirection) {
        self.entries = vec![(column, direction)];
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn direction(&self, column: ColumnId) -> Option<SortDirection> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, d)| *d)
    }

    pub fn entries(&self) -> &[(ColumnId, SortDirection)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
