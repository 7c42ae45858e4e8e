//! Path prompt for importing a JSON document.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::config::Theme;
use crate::import_modal::ImportModal;

pub fn render_import_modal(area: Rect, buf: &mut Buffer, modal: &ImportModal, theme: &Theme) {
    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("modal_border_active")))
        .title(" Importer JSON ");
    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let path_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("modal_border")))
        .title(" Chemin du fichier ");
    let path_inner = path_block.inner(chunks[0]);
    path_block.render(chunks[0], buf);
    (&modal.path_input).render(path_inner, buf);

    Paragraph::new("Enter: importer (remplace toutes les données)   Esc: fermer")
        .style(Style::default().fg(theme.get("text_secondary")))
        .render(chunks[1], buf);
}
