//! Terminal viewer for laboratory orders with per column filters and sorting.

pub mod columns;
pub mod controller;
pub mod debounce;
pub mod domain;
pub mod filter;
pub mod inputter;
pub mod logging;
pub mod model;
pub mod records;
pub mod sort;
pub mod ui;
pub mod view;

pub use columns::{ColumnDef, ColumnId, default_columns};
pub use domain::{LOVConfig, LOVError, Message};
pub use filter::{FilterKind, FilterState, FilterValue};
pub use model::Model;
pub use records::{Record, RecordStore};
pub use sort::{SortDirection, SortKind, SortState};
