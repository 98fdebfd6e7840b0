//! Pure row-model recomputation.
//!
//! Given the records, the column configuration, the filter state and the
//! sort state, these functions derive the visible rows as indices into the
//! record list. They hold no state and know nothing about the terminal.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::columns::{ColumnDef, ColumnId, find_column};
use crate::filter::{FilterState, InputKind};
use crate::records::Record;
use crate::sort::SortState;

/// Filtered and sorted record indices.
pub fn visible_rows(
    records: &[Record],
    columns: &[ColumnDef],
    filters: &FilterState,
    sorting: &SortState,
) -> Vec<usize> {
    let start_time = Instant::now();
    let mut rows = filter_rows(records, columns, filters, None);
    sort_rows(&mut rows, records, columns, sorting);
    debug!(
        "Recomputed {}/{} visible rows in {}us",
        rows.len(),
        records.len(),
        start_time.elapsed().as_micros()
    );
    rows
}

/// A record passes when every active filter accepts it. `skip` leaves one
/// column's filter out, which is what the faceted row model needs.
pub fn filter_rows(
    records: &[Record],
    columns: &[ColumnDef],
    filters: &FilterState,
    skip: Option<ColumnId>,
) -> Vec<usize> {
    let active: Vec<_> = filters
        .active()
        .filter(|(id, _)| Some(*id) != skip)
        .filter_map(|(id, value)| {
            let column = find_column(columns, id)?;
            Some((column, column.filter?, value))
        })
        .collect();

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            active
                .iter()
                .all(|(column, kind, value)| kind.matches(&column.value(record), value))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Stable sort of `rows` by the active sort entry. Columns without a
/// comparator leave the order untouched.
pub fn sort_rows(rows: &mut [usize], records: &[Record], columns: &[ColumnDef], sorting: &SortState) {
    for &(id, direction) in sorting.entries().iter().rev() {
        let Some(column) = find_column(columns, id) else {
            continue;
        };
        let Some(kind) = column.sort else {
            trace!("Column {id} can not be sorted");
            continue;
        };
        rows.sort_by(|&a, &b| {
            direction.apply(kind.compare(&column.value(&records[a]), &column.value(&records[b])))
        });
    }
}

/// Number of distinct values of `column` among rows passing all other filters.
pub fn faceted_unique_values(
    records: &[Record],
    columns: &[ColumnDef],
    filters: &FilterState,
    column: &ColumnDef,
) -> usize {
    filter_rows(records, columns, filters, Some(column.id))
        .into_iter()
        .map(|idx| column.value(&records[idx]).facet_key())
        .collect::<HashSet<String>>()
        .len()
}

/// Faceted counts of all filterable columns, one column per worker.
pub fn faceted_counts(
    records: &[Record],
    columns: &[ColumnDef],
    filters: &FilterState,
) -> HashMap<ColumnId, usize> {
    columns
        .par_iter()
        .filter(|c| c.can_filter())
        .map(|c| (c.id, faceted_unique_values(records, columns, filters, c)))
        .collect()
}

/// Input widget for a column, decided from its configuration so that an
/// empty record list still gets the right widget.
pub fn filter_input_kind(column: &ColumnDef) -> Option<InputKind> {
    column.filter.map(|kind| kind.input_kind())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// At least one page, even without rows.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn page_range(&self, total: usize) -> Range<usize> {
        let begin = std::cmp::min(self.page_index * self.page_size, total);
        let end = std::cmp::min(begin + self.page_size, total);
        begin..end
    }

    pub fn next_page(&mut self, total: usize) -> bool {
        if self.page_index + 1 < self.page_count(total) {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn last_page(&mut self, total: usize) {
        self.page_index = self.page_count(total) - 1;
    }

    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    pub fn clamp(&mut self, total: usize) {
        self.page_index = std::cmp::min(self.page_index, self.page_count(total) - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::default_columns;
    use crate::filter::FilterValue;
    use crate::records::RecordStore;
    use crate::sort::SortDirection;
    use proptest::prelude::*;

    fn orders(records: &[Record], rows: &[usize]) -> Vec<u32> {
        rows.iter().map(|&i| records[i].order_number).collect()
    }

    #[test]
    fn no_filters_keeps_load_order() {
        let store = RecordStore::sample();
        let rows = visible_rows(
            store.list_all(),
            &default_columns(),
            &FilterState::default(),
            &SortState::default(),
        );
        assert_eq!(orders(store.list_all(), &rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn sorts_by_date_chronologically() {
        let store = RecordStore::sample();
        let mut sorting = SortState::default();
        sorting.set(ColumnId::Date, SortDirection::Ascending);
        let rows = visible_rows(store.list_all(), &default_columns(), &FilterState::default(), &sorting);
        assert_eq!(orders(store.list_all(), &rows), vec![1, 4, 3, 2]);

        sorting.set(ColumnId::Date, SortDirection::Descending);
        let rows = visible_rows(store.list_all(), &default_columns(), &FilterState::default(), &sorting);
        assert_eq!(orders(store.list_all(), &rows), vec![2, 3, 4, 1]);
    }

    #[test]
    fn status_sort_is_stable() {
        let store = RecordStore::sample();
        let mut sorting = SortState::default();
        sorting.set(ColumnId::Status, SortDirection::Ascending);
        let rows = visible_rows(store.list_all(), &default_columns(), &FilterState::default(), &sorting);
        // Cancelled, Done, In Progress (1 before 2)
        assert_eq!(orders(store.list_all(), &rows), vec![4, 3, 1, 2]);
    }

    #[test]
    fn faceted_counts_ignore_own_filter() {
        let store = RecordStore::sample();
        let columns = default_columns();
        let mut filters = FilterState::default();
        filters.set(ColumnId::Status, FilterValue::Text("progress".into()));
        let counts = faceted_counts(store.list_all(), &columns, &filters);
        assert_eq!(counts[&ColumnId::Status], 3);
        assert_eq!(counts[&ColumnId::Laboratory], 2);
    }

    #[test]
    fn input_kind_comes_from_configuration() {
        let columns = default_columns();
        assert_eq!(filter_input_kind(&columns[0]), Some(InputKind::DateRange));
        assert_eq!(filter_input_kind(&columns[1]), Some(InputKind::Text));
        let rows = visible_rows(&[], &columns, &FilterState::default(), &SortState::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn pagination_walks_pages() {
        let mut page = Pagination::new(3);
        assert_eq!(page.page_count(7), 3);
        assert_eq!(page.page_range(7), 0..3);
        assert!(page.next_page(7));
        assert!(page.next_page(7));
        assert!(!page.next_page(7));
        assert_eq!(page.page_range(7), 6..7);
        page.clamp(2);
        assert_eq!(page.page_index, 0);
        assert!(!page.previous_page());
        assert_eq!(page.page_count(0), 1);
        assert_eq!(page.page_range(0), 0..0);
    }

    proptest! {
        #[test]
        fn visibility_is_conjunction_of_filters(
            lab in prop::option::of("[0-9Lab ]{0,3}"),
            status in prop::option::of("[a-zDIPC ]{0,3}"),
            order in prop::option::of(0u32..6),
        ) {
            let store = RecordStore::sample();
            let records = store.list_all();
            let columns = default_columns();
            let mut filters = FilterState::default();
            if let Some(lab) = &lab {
                filters.set(ColumnId::Laboratory, FilterValue::Text(lab.clone()));
            }
            if let Some(status) = &status {
                filters.set(ColumnId::Status, FilterValue::Text(status.clone()));
            }
            if let Some(order) = order {
                filters.set(ColumnId::OrderNumber, FilterValue::Text(order.to_string()));
            }
            let rows = filter_rows(records, &columns, &filters, None);
            for (idx, record) in records.iter().enumerate() {
                let expected = filters.active().all(|(id, value)| {
                    let column = find_column(&columns, id).unwrap();
                    column.filter.unwrap().matches(&column.value(record), value)
                });
                prop_assert_eq!(rows.contains(&idx), expected);
            }

            // dropping one filter keeps exactly the rows the others accept
            let mut relaxed = filters.clone();
            relaxed.remove(ColumnId::Laboratory);
            let wider = filter_rows(records, &columns, &relaxed, None);
            prop_assert!(rows.iter().all(|r| wider.contains(r)));
            for (idx, record) in records.iter().enumerate() {
                let expected = relaxed.active().all(|(id, value)| {
                    let column = find_column(&columns, id).unwrap();
                    column.filter.unwrap().matches(&column.value(record), value)
                });
                prop_assert_eq!(wider.contains(&idx), expected);
            }
        }
    }
}
