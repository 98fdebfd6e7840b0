use std::io;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::columns::ColumnId;

#[derive(Debug, Error)]
pub enum LOVError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' can not be filtered")]
    NotFilterable(ColumnId),
    #[error("column '{0}' can not be sorted")]
    NotSortable(ColumnId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("clipboard: {0}")]
    Clipboard(String),
    #[error("logging: {0}")]
    Logging(String),
}

impl From<arboard::Error> for LOVError {
    fn from(err: arboard::Error) -> Self {
        LOVError::Clipboard(err.to_string())
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct LOVConfig {
    /// Upper bound for one event poll in ms.
    pub event_poll_time: u64,
    /// Quiet period of filter inputs in ms.
    pub debounce: u64,
    pub page_size: usize,
    pub max_column_width: usize,
}

impl Default for LOVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            debounce: 500,
            page_size: 10,
            max_column_width: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    NextPage,
    PreviousPage,
    ToggleSort,
    EditFilter,
    ResetFilters,
    CopyCell,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// Which half of a filter is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Text,
    RangeStart,
    RangeEnd,
}

pub const HELP_TEXT: &str = "\
q          quit
←↓↑→ hjkl  move selection
PgUp PgDn  previous / next page (also p / n)
g G        first / last row
s          sort selected column (asc, desc, none)
/ f        edit filter of selected column
             Tab: switch start/end of a date range
             Enter: done, Esc: revert the whole filter
r          reset all filters
c C        copy cell / row
?          this help
Esc        close";
