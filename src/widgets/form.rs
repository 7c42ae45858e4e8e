//! Add/edit form: name and value fields plus the Add (or Save/Cancel) buttons.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::config::Theme;
use crate::editor::{EditController, FormFocus};

/// Height the form needs: two inputs and the button row, each 3 rows tall, plus borders.
pub const FORM_HEIGHT: u16 = 11;

pub fn form_title(editor: &EditController) -> &'static str {
    if editor.is_editing() {
        " Modifier une donnée "
    } else {
        " Ajouter une donnée "
    }
}

/// Renders the form. `focused` is whether the form, rather than the table, owns keys.
pub fn render_record_form(
    area: Rect,
    buf: &mut Buffer,
    editor: &EditController,
    focused: bool,
    theme: &Theme,
) {
    let border = theme.get("modal_border");
    let active = theme.get("modal_border_active");

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { active } else { border }))
        .title(form_title(editor));
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);

    let field = |title: &'static str, has_focus: bool| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused && has_focus { active } else { border }))
            .title(title)
    };

    let name_block = field(" Nom ", editor.focus == FormFocus::Name);
    let name_inner = name_block.inner(rows[0]);
    name_block.render(rows[0], buf);
    editor.name_input.render(name_inner, buf);

    let value_block = field(" Valeur ", editor.focus == FormFocus::Value);
    let value_inner = value_block.inner(rows[1]);
    value_block.render(rows[1], buf);
    editor.value_input.render(value_inner, buf);

    let submit_label = if editor.is_editing() {
        "Enregistrer"
    } else {
        "Ajouter"
    };
    if editor.is_editing() {
        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        render_button(
            buttons[0],
            buf,
            submit_label,
            focused && editor.focus == FormFocus::Submit,
            theme,
        );
        render_button(
            buttons[1],
            buf,
            "Annuler",
            focused && editor.focus == FormFocus::Cancel,
            theme,
        );
    } else {
        render_button(
            rows[2],
            buf,
            submit_label,
            focused && editor.focus == FormFocus::Submit,
            theme,
        );
    }
}

/// Bordered, centered button. Focus uses the active border color and bold text.
pub fn render_button(area: Rect, buf: &mut Buffer, label: &str, focused: bool, theme: &Theme) {
    let color = if focused {
        theme.get("modal_border_active")
    } else {
        theme.get("modal_border")
    };
    let mut style = Style::default().fg(color);
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    Paragraph::new(label)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .centered()
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use crate::record::RecordStore;

    fn render(editor: &EditController) -> String {
        let theme = Theme::from_config(&ThemeConfig::default(), false).unwrap();
        let area = Rect::new(0, 0, 40, FORM_HEIGHT);
        let mut buf = Buffer::empty(area);
        render_record_form(area, &mut buf, editor, true, &theme);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn adding_shows_add_button_only() {
        let text = render(&EditController::new());
        assert!(text.contains("Ajouter une donnée"));
        assert!(text.contains("Ajouter"));
        assert!(!text.contains("Annuler"));
    }

    #[test]
    fn editing_shows_save_and_cancel() {
        let store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(0, &store);
        let text = render(&editor);
        assert!(text.contains("Modifier une donnée"));
        assert!(text.contains("Enregistrer"));
        assert!(text.contains("Annuler"));
        assert!(text.contains("Janvier"));
    }
}
