use arboard::Clipboard;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

use crate::columns::{ColumnDef, ColumnId, default_columns, find_column};
use crate::debounce::DebouncedInput;
use crate::domain::{EditField, HELP_TEXT, LOVConfig, LOVError, Message};
use crate::filter::{FilterState, FilterValue, InputKind};
use crate::inputter::{InputResult, Inputter};
use crate::records::Record;
use crate::sort::{SortDirection, SortState};
use crate::ui::COLUMN_WIDTH_MARGIN;
use crate::view::{self, Pagination};

const DATE_PLACEHOLDER: &str = "jjjj-mm-tt";

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    FILTERINPUT,
}

/// Debounced inputs of one column, alive as long as the model.
#[derive(Debug)]
pub enum FilterWidget {
    Text(DebouncedInput),
    DateRange {
        start: DebouncedInput,
        end: DebouncedInput,
    },
}

impl FilterWidget {
    fn new(kind: InputKind, quiet: Duration) -> Self {
        match kind {
            InputKind::Text => FilterWidget::Text(DebouncedInput::new("", quiet)),
            InputKind::DateRange => FilterWidget::DateRange {
                start: DebouncedInput::new("", quiet),
                end: DebouncedInput::new("", quiet),
            },
        }
    }

    fn input(&self, field: EditField) -> Option<&DebouncedInput> {
        match (self, field) {
            (FilterWidget::Text(i), EditField::Text) => Some(i),
            (FilterWidget::DateRange { start, .. }, EditField::RangeStart) => Some(start),
            (FilterWidget::DateRange { end, .. }, EditField::RangeEnd) => Some(end),
            _ => None,
        }
    }

    fn input_mut(&mut self, field: EditField) -> Option<&mut DebouncedInput> {
        match (self, field) {
            (FilterWidget::Text(i), EditField::Text) => Some(i),
            (FilterWidget::DateRange { start, .. }, EditField::RangeStart) => Some(start),
            (FilterWidget::DateRange { end, .. }, EditField::RangeEnd) => Some(end),
            _ => None,
        }
    }

    fn first_field(&self) -> EditField {
        match self {
            FilterWidget::Text(_) => EditField::Text,
            FilterWidget::DateRange { .. } => EditField::RangeStart,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match self {
            FilterWidget::Text(i) => i.deadline(),
            FilterWidget::DateRange { start, end } => match (start.deadline(), end.deadline()) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// Apply expired drafts to `filters`. Returns true if anything was committed.
    fn commit(&mut self, column: ColumnId, filters: &mut FilterState, now: Instant) -> bool {
        match self {
            FilterWidget::Text(input) => input
                .poll(now)
                .map(|v| filters.set(column, FilterValue::Text(v)))
                .is_some(),
            FilterWidget::DateRange { start, end } => {
                let s = start.poll(now).map(|v| filters.set_range_start(column, v));
                let e = end.poll(now).map(|v| filters.set_range_end(column, v));
                s.is_some() || e.is_some()
            }
        }
    }

    /// Drop pending commits of every input and restore the committed values.
    fn revert(&mut self) {
        match self {
            FilterWidget::Text(input) => input.revert(),
            FilterWidget::DateRange { start, end } => {
                start.revert();
                end.revert();
            }
        }
    }

    /// Mirror the committed filter of `column` into the inputs.
    fn sync(&mut self, column: ColumnId, filters: &FilterState) {
        match self {
            FilterWidget::Text(input) => input.sync(&filters.text(column)),
            FilterWidget::DateRange { start, end } => {
                let (s, e) = filters.range(column);
                start.sync(&s);
                end.sync(&e);
            }
        }
    }

    fn display(&self, facets: usize) -> (String, bool) {
        match self {
            FilterWidget::Text(i) if i.value().is_empty() => (format!("Search ({facets})"), true),
            FilterWidget::Text(i) => (i.value().to_string(), false),
            FilterWidget::DateRange { start, end } => {
                let placeholder = start.value().is_empty() && end.value().is_empty();
                let bound = |i: &DebouncedInput| {
                    if i.value().is_empty() {
                        DATE_PLACEHOLDER.to_string()
                    } else {
                        i.value().to_string()
                    }
                };
                (format!("{}..{}", bound(start), bound(end)), placeholder)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderCell {
    pub label: String,
    pub filter: String,
    pub placeholder: bool,
    pub width: usize,
}

pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>, // Cells of the current page
    pub nrows: usize,           // Visible rows over all pages
    pub total: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub editing: Option<(usize, EditField)>,
    pub cmdinput: InputResult,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub width: usize,
    pub height: usize,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            total: 0,
            page_index: 0,
            page_count: 1,
            selected_row: 0,
            selected_column: 0,
            editing: None,
            cmdinput: InputResult::default(),
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            width: 0,
            height: 0,
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: LOVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    records: Vec<Record>,
    columns: Vec<ColumnDef>,
    filters: FilterState,
    sorting: SortState,
    pagination: Pagination,
    rows: Vec<usize>, // Record indices after filtering and sorting
    facets: HashMap<ColumnId, usize>,
    widgets: BTreeMap<ColumnId, FilterWidget>,
    editing: Option<(ColumnId, EditField)>,
    input: Inputter,
    last_input: InputResult,
    curser_row: usize, // Relative to the current page
    curser_column: usize,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &LOVConfig,
        records: Vec<Record>,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, LOVError> {
        Self::with_columns(config, records, default_columns(), ui_width, ui_height)
    }

    pub fn with_columns(
        config: &LOVConfig,
        records: Vec<Record>,
        columns: Vec<ColumnDef>,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, LOVError> {
        if columns.is_empty() {
            return Err(LOVError::InvalidArgument("no columns configured".into()));
        }
        let quiet = Duration::from_millis(config.debounce);
        let widgets = columns
            .iter()
            .filter_map(|c| Some((c.id, FilterWidget::new(view::filter_input_kind(c)?, quiet))))
            .collect();

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            records,
            columns,
            filters: FilterState::default(),
            sorting: SortState::default(),
            pagination: Pagination::new(config.page_size),
            rows: Vec::new(),
            facets: HashMap::new(),
            widgets,
            editing: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            curser_row: 0,
            curser_column: 0,
            uidata: UIData::empty(),
            clipboard: None,
            status_message: String::new(),
        };
        model.uidata.width = ui_width;
        model.uidata.height = ui_height;
        model.recompute();
        model.set_status_message(format!("Loaded {} orders", model.records.len()));
        info!("Model ready with {} records", model.records.len());
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sorting(&self) -> &SortState {
        &self.sorting
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Visible records across all pages, in display order.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.rows.iter().map(|&i| &self.records[i]).collect()
    }

    /// Visible records of the current page.
    pub fn page_records(&self) -> Vec<&Record> {
        self.rows[self.pagination.page_range(self.rows.len())]
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Earliest moment a debounced input wants to commit.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.widgets.values().filter_map(|w| w.next_deadline()).min()
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTERINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Draft text of a column's filter input.
    pub fn filter_draft(&self, column: ColumnId, field: EditField) -> Option<&str> {
        self.widgets
            .get(&column)
            .and_then(|w| w.input(field))
            .map(|i| i.value())
    }

    // -------------------- State changes from outside ---------------------- //

    /// Set a committed filter directly, bypassing debouncing. Inputs mirror it.
    pub fn set_filter(&mut self, column: ColumnId, value: FilterValue) -> Result<(), LOVError> {
        let def = find_column(&self.columns, column)
            .ok_or_else(|| LOVError::UnknownColumn(column.to_string()))?;
        let kind = def.filter.ok_or(LOVError::NotFilterable(column))?;
        match (kind.input_kind(), &value) {
            (InputKind::Text, FilterValue::Text(_))
            | (InputKind::DateRange, FilterValue::Range(_, _)) => {}
            _ => {
                return Err(LOVError::InvalidArgument(format!(
                    "{value:?} does not fit the {kind:?} filter of {column}"
                )));
            }
        }
        self.filters.set(column, value);
        self.filters_changed();
        Ok(())
    }

    pub fn set_sort(&mut self, column: ColumnId, direction: SortDirection) -> Result<(), LOVError> {
        let def = find_column(&self.columns, column)
            .ok_or_else(|| LOVError::UnknownColumn(column.to_string()))?;
        if !def.can_sort() {
            return Err(LOVError::NotSortable(column));
        }
        self.sorting.set(column, direction);
        self.pagination.reset();
        self.recompute();
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
        self.filters_changed();
        self.set_status_message("Filters reset");
    }

    /// Commit debounced inputs whose quiet period is over.
    pub fn commit_pending(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for (column, widget) in self.widgets.iter_mut() {
            changed |= widget.commit(*column, &mut self.filters, now);
        }
        if changed {
            debug!("Committed filter state {:?}", self.filters);
            self.filters_changed();
        }
        changed
    }

    fn filters_changed(&mut self) {
        for (column, widget) in self.widgets.iter_mut() {
            widget.sync(*column, &self.filters);
        }
        self.pagination.reset();
        self.curser_row = 0;
        self.recompute();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), LOVError> {
        self.update_at(message, Instant::now())
    }

    #[instrument(skip_all)]
    pub fn update_at(&mut self, message: Option<Message>, now: Instant) -> Result<(), LOVError> {
        self.commit_pending(now);

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::NextPage => self.next_page(),
                    Message::PreviousPage => self.previous_page(),
                    Message::ToggleSort => self.toggle_current_sort(),
                    Message::EditFilter => self.enter_filter_mode(),
                    Message::ResetFilters => self.reset_filters(),
                    Message::CopyCell => self.copy_table_cell(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::FILTERINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key, now),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.uidata.show_popup = false;
            self.uidata.last_update = Instant::now();
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uidata.width, width, self.uidata.height, height
        );
        self.uidata.width = width;
        self.uidata.height = height;
        self.uidata.last_update = Instant::now();
    }

    fn current_column(&self) -> &ColumnDef {
        &self.columns[self.curser_column]
    }

    fn toggle_current_sort(&mut self) {
        let (id, header, sortable) = {
            let column = self.current_column();
            (column.id, column.header, column.can_sort())
        };
        if !sortable {
            self.set_status_message(format!("{header} can not be sorted"));
            return;
        }
        self.sorting.toggle(id);
        self.pagination.reset();
        self.curser_row = 0;
        self.recompute();
        let message = match self.sorting.direction(id) {
            Some(SortDirection::Ascending) => format!("Sorted by {id} ascending"),
            Some(SortDirection::Descending) => format!("Sorted by {id} descending"),
            None => "Sorting removed".to_string(),
        };
        self.set_status_message(message);
    }

    fn enter_filter_mode(&mut self) {
        let id = self.current_column().id;
        let Some(widget) = self.widgets.get(&id) else {
            let header = self.current_column().header;
            self.set_status_message(format!("{header} can not be filtered"));
            return;
        };
        let field = widget.first_field();
        trace!("Editing filter of {id} ({field:?})");
        self.start_editing(id, field);
        self.previous_modus = self.modus;
        self.modus = Modus::FILTERINPUT;
        self.update_uidata();
    }

    fn start_editing(&mut self, column: ColumnId, field: EditField) {
        let draft = self.filter_draft(column, field).unwrap_or_default().to_string();
        self.input.set(&draft);
        self.last_input = self.input.get();
        self.editing = Some((column, field));
    }

    fn leave_filter_mode(&mut self) {
        self.editing = None;
        self.input.clear();
        self.last_input = InputResult::default();
        self.modus = self.previous_modus;
        self.previous_modus = Modus::FILTERINPUT;
        self.update_uidata();
    }

    fn raw_input(&mut self, key: KeyEvent, now: Instant) {
        let Some((column, field)) = self.editing else {
            self.leave_filter_mode();
            return;
        };

        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            let other = match field {
                EditField::RangeStart => EditField::RangeEnd,
                EditField::RangeEnd => EditField::RangeStart,
                EditField::Text => EditField::Text,
            };
            self.start_editing(column, other);
            self.update_uidata();
            return;
        }

        self.last_input = self.input.read(key);
        let Some(widget) = self.widgets.get_mut(&column) else {
            warn!("No filter input for {column}");
            self.leave_filter_mode();
            return;
        };
        if self.last_input.canceled {
            widget.revert();
            self.leave_filter_mode();
            return;
        }
        let Some(input) = widget.input_mut(field) else {
            warn!("No filter input for {column} {field:?}");
            self.leave_filter_mode();
            return;
        };
        input.edit(self.last_input.input.clone(), now);
        if self.last_input.finished {
            self.leave_filter_mode();
        } else {
            self.update_uidata();
        }
    }

    fn page_len(&self) -> usize {
        self.pagination.page_range(self.rows.len()).len()
    }

    fn move_selection_down(&mut self) {
        if self.curser_row + 1 < self.page_len() {
            self.curser_row += 1;
        } else if self.pagination.next_page(self.rows.len()) {
            self.curser_row = 0;
        }
        self.update_uidata();
    }

    fn move_selection_up(&mut self) {
        if self.curser_row > 0 {
            self.curser_row -= 1;
        } else if self.pagination.previous_page() {
            self.curser_row = self.page_len().saturating_sub(1);
        }
        self.update_uidata();
    }

    fn move_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
        self.update_uidata();
    }

    fn move_selection_right(&mut self) {
        if self.curser_column + 1 < self.columns.len() {
            self.curser_column += 1;
        }
        self.update_uidata();
    }

    fn move_selection_beginning(&mut self) {
        self.pagination.reset();
        self.curser_row = 0;
        self.update_uidata();
    }

    fn move_selection_end(&mut self) {
        self.pagination.last_page(self.rows.len());
        self.curser_row = self.page_len().saturating_sub(1);
        self.update_uidata();
    }

    fn next_page(&mut self) {
        if self.pagination.next_page(self.rows.len()) {
            self.curser_row = std::cmp::min(self.curser_row, self.page_len().saturating_sub(1));
        }
        self.update_uidata();
    }

    fn previous_page(&mut self) {
        self.pagination.previous_page();
        self.update_uidata();
    }

    fn selected_record(&self) -> Option<&Record> {
        let range = self.pagination.page_range(self.rows.len());
        self.rows[range]
            .get(self.curser_row)
            .map(|&idx| &self.records[idx])
    }

    fn clipboard(&mut self) -> Result<&mut Clipboard, LOVError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| LOVError::Clipboard("not available".into()))
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Clipboard content: {}", content);
        let result = self
            .clipboard()
            .and_then(|c| c.set_text(content).map_err(LOVError::from));
        match result {
            Ok(_) => self.set_status_message("Copied to clipboard"),
            Err(e) => {
                warn!("Error copying to clipboard: {e}");
                self.set_status_message(format!("Copy failed: {e}"));
            }
        }
    }

    fn copy_table_cell(&mut self) {
        let column = self.current_column();
        if let Some(cell) = self.selected_record().map(|r| column.render(r)) {
            self.copy_to_clipboard(cell);
        }
    }

    fn copy_table_row(&mut self) {
        if let Some(row) = self.selected_record().map(|r| csv_row(&self.columns, r)) {
            self.copy_to_clipboard(row);
        }
    }

    // -------------------- Derived data ---------------------- //

    fn recompute(&mut self) {
        self.rows = view::visible_rows(&self.records, &self.columns, &self.filters, &self.sorting);
        self.facets = view::faceted_counts(&self.records, &self.columns, &self.filters);
        self.pagination.clamp(self.rows.len());
        self.curser_row = std::cmp::min(self.curser_row, self.page_len().saturating_sub(1));
        self.update_uidata();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_update = Instant::now();
    }

    fn update_uidata(&mut self) {
        let range = self.pagination.page_range(self.rows.len());
        let rows: Vec<Vec<String>> = self.rows[range]
            .iter()
            .map(|&idx| {
                self.columns
                    .iter()
                    .map(|c| c.render(&self.records[idx]))
                    .collect()
            })
            .collect();

        let headers = self
            .columns
            .iter()
            .enumerate()
            .map(|(cidx, c)| {
                let glyph = self.sorting.direction(c.id).map(|d| d.glyph()).unwrap_or("");
                let label = format!("{}{}", c.header, glyph);
                let (filter, placeholder) = self
                    .widgets
                    .get(&c.id)
                    .map(|w| w.display(self.facets.get(&c.id).copied().unwrap_or(0)))
                    .unwrap_or_default();
                let content_width = rows
                    .iter()
                    .map(|r| r[cidx].chars().count())
                    .chain([label.chars().count(), filter.chars().count()])
                    .max()
                    .unwrap_or(0);
                HeaderCell {
                    label,
                    filter,
                    placeholder,
                    width: std::cmp::min(
                        content_width + COLUMN_WIDTH_MARGIN,
                        self.config.max_column_width,
                    ),
                }
            })
            .collect();

        let editing = self.editing.and_then(|(id, field)| {
            self.columns
                .iter()
                .position(|c| c.id == id)
                .map(|cidx| (cidx, field))
        });

        self.uidata = UIData {
            name: "Laboraufträge".to_string(),
            headers,
            rows,
            nrows: self.rows.len(),
            total: self.records.len(),
            page_index: self.pagination.page_index,
            page_count: self.pagination.page_count(self.rows.len()),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            editing,
            cmdinput: self.last_input.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.uidata.popup_message.clone(),
            status_message: self.status_message.clone(),
            width: self.uidata.width,
            height: self.uidata.height,
            last_update: Instant::now(),
        };
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}

/// One record as a CSV line of its displayed cells.
pub fn csv_row(columns: &[ColumnDef], record: &Record) -> String {
    columns
        .iter()
        .map(|c| wrap_cell_content(&c.render(record)))
        .collect::<Vec<String>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordStore;
    use ratatui::crossterm::event::KeyModifiers;

    fn model() -> Model {
        Model::init(&LOVConfig::default(), RecordStore::sample().list_all().to_vec(), 120, 30)
            .unwrap()
    }

    fn orders(model: &Model) -> Vec<u32> {
        model.visible_records().iter().map(|r| r.order_number).collect()
    }

    fn type_text(model: &mut Model, text: &str, now: Instant) {
        for c in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            model.update_at(Some(Message::RawKey(key)), now).unwrap();
        }
    }

    fn key(model: &mut Model, code: KeyCode, now: Instant) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        model.update_at(Some(Message::RawKey(key)), now).unwrap();
    }

    #[test]
    fn typed_filter_commits_after_quiet_period() {
        let mut m = model();
        let t0 = Instant::now();
        for _ in 0..3 {
            m.update_at(Some(Message::MoveRight), t0).unwrap();
        }
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        assert!(m.raw_keyevents());
        type_text(&mut m, "Lab 2", t0);
        key(&mut m, KeyCode::Enter, t0);
        assert!(!m.raw_keyevents());

        m.update_at(None, t0 + Duration::from_millis(499)).unwrap();
        assert_eq!(orders(&m), vec![1, 2, 3, 4]);
        m.update_at(None, t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(orders(&m), vec![2]);
        assert_eq!(m.filters().text(ColumnId::Laboratory), "Lab 2");
        assert!(m.next_deadline().is_none());
    }

    #[test]
    fn escape_reverts_draft() {
        let mut m = model();
        let t0 = Instant::now();
        m.set_filter(ColumnId::Date, FilterValue::Text("x".into()))
            .expect_err("date columns take ranges");
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        type_text(&mut m, "2022-03-01", t0);
        key(&mut m, KeyCode::Esc, t0);
        m.update_at(None, t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(m.filter_draft(ColumnId::Date, EditField::RangeStart), Some(""));
        assert_eq!(orders(&m), vec![1, 2, 3, 4]);
    }

    #[test]
    fn tab_switches_to_range_end() {
        let mut m = model();
        let t0 = Instant::now();
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        type_text(&mut m, "2022-03-01", t0);
        key(&mut m, KeyCode::Tab, t0);
        type_text(&mut m, "2022-09-30", t0);
        key(&mut m, KeyCode::Enter, t0);
        m.update_at(None, t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(
            m.filters().range(ColumnId::Date),
            ("2022-03-01".to_string(), "2022-09-30".to_string())
        );
        assert_eq!(orders(&m), vec![3, 4]);
    }

    #[test]
    fn escape_reverts_both_range_halves() {
        let mut m = model();
        let t0 = Instant::now();
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        type_text(&mut m, "2022-09-01", t0);
        key(&mut m, KeyCode::Tab, t0);
        type_text(&mut m, "2022-12-31", t0);
        key(&mut m, KeyCode::Esc, t0);
        assert!(m.next_deadline().is_none());
        m.update_at(None, t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(m.filters().range(ColumnId::Date), (String::new(), String::new()));
        assert_eq!(m.filter_draft(ColumnId::Date, EditField::RangeStart), Some(""));
        assert_eq!(m.filter_draft(ColumnId::Date, EditField::RangeEnd), Some(""));
        assert_eq!(orders(&m), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_mirrors_into_inputs() {
        let mut m = model();
        let t0 = Instant::now();
        m.set_filter(ColumnId::Status, FilterValue::Text("done".into())).unwrap();
        assert_eq!(m.filter_draft(ColumnId::Status, EditField::Text), Some("done"));
        assert_eq!(orders(&m), vec![3]);
        m.update_at(Some(Message::ResetFilters), t0).unwrap();
        assert_eq!(m.filter_draft(ColumnId::Status, EditField::Text), Some(""));
        assert_eq!(orders(&m), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_cancels_pending_commit() {
        let mut m = model();
        let t0 = Instant::now();
        m.update_at(Some(Message::MoveEnd), t0).unwrap();
        for _ in 0..5 {
            m.update_at(Some(Message::MoveRight), t0).unwrap();
        }
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        type_text(&mut m, "Done", t0);
        key(&mut m, KeyCode::Enter, t0);
        m.set_filter(ColumnId::Status, FilterValue::Text("Cancel".into())).unwrap();
        m.update_at(None, t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(m.filters().text(ColumnId::Status), "Cancel");
        assert_eq!(orders(&m), vec![4]);
    }

    #[test]
    fn sort_toggle_updates_header_glyph() {
        let mut m = model();
        let t0 = Instant::now();
        m.update_at(Some(Message::ToggleSort), t0).unwrap();
        assert_eq!(orders(&m), vec![1, 4, 3, 2]);
        assert_eq!(m.get_uidata().headers[0].label, "DATUM ▲");
        m.update_at(Some(Message::ToggleSort), t0).unwrap();
        assert_eq!(orders(&m), vec![2, 3, 4, 1]);
        assert_eq!(m.get_uidata().headers[0].label, "DATUM ▼");
        m.update_at(Some(Message::ToggleSort), t0).unwrap();
        assert_eq!(orders(&m), vec![1, 2, 3, 4]);
        assert_eq!(m.get_uidata().headers[0].label, "DATUM");
    }

    #[test]
    fn placeholders_show_faceted_counts() {
        let m = model();
        let headers = &m.get_uidata().headers;
        assert_eq!(headers[3].filter, "Search (4)");
        assert!(headers[3].placeholder);
        assert_eq!(headers[5].filter, "Search (3)");
        assert_eq!(headers[0].filter, "jjjj-mm-tt..jjjj-mm-tt");
    }

    #[test]
    fn paging_moves_selection_across_pages() {
        let config = LOVConfig::default().with_page_size(3);
        let mut m =
            Model::init(&config, RecordStore::sample().list_all().to_vec(), 120, 30).unwrap();
        let t0 = Instant::now();
        assert_eq!(m.page_records().len(), 3);
        for _ in 0..3 {
            m.update_at(Some(Message::MoveDown), t0).unwrap();
        }
        assert_eq!(m.pagination().page_index, 1);
        assert_eq!(m.get_uidata().rows.len(), 1);
        assert_eq!(m.get_uidata().rows[0][1], "4");
        m.update_at(Some(Message::MoveUp), t0).unwrap();
        assert_eq!(m.pagination().page_index, 0);
        assert_eq!(m.get_uidata().selected_row, 2);
    }

    #[test]
    fn empty_dataset_still_offers_filter_inputs() {
        let mut m = Model::init(&LOVConfig::default(), Vec::new(), 80, 20).unwrap();
        let t0 = Instant::now();
        m.update_at(Some(Message::EditFilter), t0).unwrap();
        assert!(m.raw_keyevents());
        assert_eq!(m.get_uidata().editing, Some((0, EditField::RangeStart)));
        m.update_at(Some(Message::MoveDown), t0).unwrap();
        assert!(m.visible_records().is_empty());
    }

    #[test]
    fn help_popup_closes_on_exit() {
        let mut m = model();
        let t0 = Instant::now();
        m.update_at(Some(Message::Help), t0).unwrap();
        assert!(m.get_uidata().show_popup);
        m.update_at(Some(Message::MoveDown), t0).unwrap();
        assert_eq!(m.get_uidata().selected_row, 0);
        m.update_at(Some(Message::Exit), t0).unwrap();
        assert!(!m.get_uidata().show_popup);
    }

    #[test]
    fn csv_row_quotes_cells_with_spaces() {
        let store = RecordStore::sample();
        let row = csv_row(&default_columns(), &store.list_all()[0]);
        assert_eq!(row, "1.1.2022,1,\"John Doe\",\"Lab 1\",11.11.2022,\"In Progress\"");
    }
}
