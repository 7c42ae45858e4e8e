//! Current records: one row per record, selection highlight and a marker on
//! the row being edited.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Cell, Row, StatefulWidget, Table, TableState},
};

use crate::chart_data::format_value;
use crate::config::Theme;
use crate::record::Record;

pub struct RecordTable<'a> {
    pub records: &'a [Record],
    pub editing: Option<usize>,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> RecordTable<'a> {
    pub fn new(records: &'a [Record], theme: &'a Theme) -> Self {
        Self {
            records,
            editing: None,
            focused: false,
            theme,
        }
    }

    pub fn with_editing(mut self, editing: Option<usize>) -> Self {
        self.editing = editing;
        self
    }

    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl StatefulWidget for RecordTable<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut TableState) {
        let theme = self.theme;
        let border = if self.focused {
            theme.get("modal_border_active")
        } else {
            theme.get("modal_border")
        };

        let rows: Vec<Row> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let marker = if self.editing == Some(i) { "✎" } else { "" };
                Row::new(vec![
                    Cell::from(marker),
                    Cell::from(r.name.as_str()),
                    Cell::from(Line::from(format_value(r.value)).right_aligned()),
                ])
                .style(Style::default().fg(theme.get("text_primary")))
            })
            .collect();

        let header = Row::new(vec![
            Cell::from(""),
            Cell::from("Nom"),
            Cell::from(Line::from("Valeur").right_aligned()),
        ])
        .style(
            Style::default()
                .fg(theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        );

        // "reversed" parses to Reset, so the modifier carries the highlight
        let highlight = if self.focused {
            Style::default()
                .fg(theme.get("table_selected"))
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
                .fg(theme.get("table_selected"))
                .add_modifier(Modifier::BOLD)
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .row_highlight_style(highlight)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border))
                .title(format!(" Données actuelles ({}) ", self.records.len())),
        );

        StatefulWidget::render(table, area, buf, state);
    }
}
