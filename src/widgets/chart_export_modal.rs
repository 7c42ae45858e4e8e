//! Chart export modal rendering: format (PNG/EPS), path and buttons.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::chart_export::ChartExportFormat;
use crate::chart_export_modal::{ChartExportFocus, ChartExportModal};
use crate::config::Theme;
use crate::widgets::form::render_button;
use crate::widgets::radio_block::RadioBlock;

pub fn render_chart_export_modal(
    area: Rect,
    buf: &mut Buffer,
    modal: &mut ChartExportModal,
    theme: &Theme,
) {
    let border_color = theme.get("modal_border");
    let active_color = theme.get("modal_border_active");

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Exporter le graphique ");
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Format
            Constraint::Length(3), // Path
            Constraint::Length(3), // Buttons
        ])
        .split(inner);

    let labels: Vec<&str> = ChartExportFormat::ALL.iter().map(|f| f.as_str()).collect();
    let selected = ChartExportFormat::ALL
        .iter()
        .position(|f| *f == modal.selected_format)
        .unwrap_or(0);
    RadioBlock::new(" Format ", &labels, selected)
        .focused(modal.focus == ChartExportFocus::FormatSelector)
        .colors(border_color, active_color)
        .render(chunks[0], buf);

    let is_path_focused = modal.focus == ChartExportFocus::PathInput;
    let path_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if is_path_focused {
            active_color
        } else {
            border_color
        }))
        .title(" Fichier ");
    let path_inner = path_block.inner(chunks[1]);
    path_block.render(chunks[1], buf);
    modal.path_input.set_focused(is_path_focused);
    (&modal.path_input).render(path_inner, buf);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_button(
        buttons[0],
        buf,
        "Exporter",
        modal.focus == ChartExportFocus::ExportButton,
        theme,
    );
    render_button(
        buttons[1],
        buf,
        "Annuler",
        modal.focus == ChartExportFocus::CancelButton,
        theme,
    );
}
