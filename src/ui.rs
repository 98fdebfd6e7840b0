use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::EditField;
use crate::model::{Model, UIData};

pub const CMDLINE_HEIGH: u16 = 1;
pub const TABLE_HEADER_HEIGHT: u16 = 2;
pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(TABLE_HEADER_HEIGHT),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        self.draw_table(uidata, frame, table_area);
        self.draw_statusline(uidata, frame, status_area);
        if uidata.show_popup {
            self.draw_popup(uidata, frame);
        }
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header_style = Style::new().bold().fg(Color::Yellow);
        let header = Row::new(uidata.headers.iter().enumerate().map(|(cidx, h)| {
            let filter_style = match uidata.editing {
                Some((c, _)) if c == cidx => Style::new().fg(Color::Black).bg(Color::Cyan),
                _ if h.placeholder => Style::new().fg(Color::DarkGray).italic(),
                _ => Style::new().fg(Color::Cyan),
            };
            Cell::from(Text::from(vec![
                Line::styled(h.label.clone(), header_style),
                Line::styled(h.filter.clone(), filter_style),
            ]))
        }))
        .height(TABLE_HEADER_HEIGHT);

        let rows = uidata
            .rows
            .iter()
            .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.as_str()))));

        let widths = uidata
            .headers
            .iter()
            .map(|h| Constraint::Length(h.width as u16));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .cell_highlight_style(Style::new().fg(Color::Black).bg(Color::Yellow));

        let mut state = TableState::default().with_selected_column(Some(uidata.selected_column));
        if !uidata.rows.is_empty() {
            state = state.with_selected(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if let Some((cidx, field)) = uidata.editing {
            let header = uidata
                .headers
                .get(cidx)
                .map(|h| h.label.as_str())
                .unwrap_or("?");
            let prompt = match field {
                EditField::Text => format!("Filter {header}: "),
                EditField::RangeStart => format!("Filter {header} von: "),
                EditField::RangeEnd => format!("Filter {header} bis: "),
            };
            let cursor_x = area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
            let line = Line::from(vec![
                Span::styled(prompt, Style::new().bold().fg(Color::Cyan)),
                Span::raw(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            frame.set_cursor_position((cursor_x, area.y));
        } else {
            let line = Line::from(vec![
                Span::styled(format!(" {} ", uidata.name), Style::new().bold().reversed()),
                Span::raw(format!(" {}", summary(uidata))),
                Span::styled(
                    format!("  {}", uidata.status_message),
                    Style::new().fg(Color::DarkGray),
                ),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let text = Text::from(uidata.popup_message.as_str());
        let width = text.width() as u16 + 4;
        let height = text.height() as u16 + 2;
        let area = centered(frame.area(), width, height);
        let block = Block::bordered().title(Line::from(" Hilfe ".bold()).centered());
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn summary(uidata: &UIData) -> String {
    format!(
        "Rows {}/{} · Page {}/{}",
        uidata.nrows,
        uidata.total,
        uidata.page_index + 1,
        uidata.page_count
    )
}

fn fit(s: &str, width: usize) -> String {
    let cut: String = s.chars().take(width).collect();
    format!("{cut:<width$}")
}

/// Render the current page as plain text, without a terminal.
pub fn render_plain(uidata: &UIData) -> String {
    let spacer = " ".repeat(COLUMN_SPACING as usize);
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(uidata.headers.iter())
            .map(|(c, h)| fit(c, h.width))
            .collect::<Vec<String>>()
            .join(&spacer)
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(uidata.rows.len() + 3);
    out.push(line(uidata.headers.iter().map(|h| h.label.as_str()).collect()));
    out.push(line(uidata.headers.iter().map(|h| h.filter.as_str()).collect()));
    for row in uidata.rows.iter() {
        out.push(line(row.iter().map(|c| c.as_str()).collect()));
    }
    out.push(summary(uidata));
    out.join("\n")
}
