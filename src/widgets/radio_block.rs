//! Bordered row (or grid) of radio options: ● selected, ○ unselected.
//! Used for the chart kind selector and the image export format.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

pub struct RadioBlock<'a> {
    title: &'a str,
    options: &'a [&'a str],
    selected: usize,
    focused: bool,
    /// Options per row; defaults to all of them on one row
    columns: usize,
    border_color: Color,
    active_color: Color,
}

impl<'a> RadioBlock<'a> {
    pub fn new(title: &'a str, options: &'a [&'a str], selected: usize) -> Self {
        Self {
            title,
            options,
            selected,
            focused: false,
            columns: options.len().max(1),
            border_color: Color::DarkGray,
            active_color: Color::Cyan,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn colors(mut self, border: Color, active: Color) -> Self {
        self.border_color = border;
        self.active_color = active;
        self
    }

    fn option_style(&self, is_selected: bool) -> Style {
        let style = Style::default().fg(if is_selected {
            self.active_color
        } else {
            self.border_color
        });
        if self.focused && is_selected {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }
}

impl Widget for RadioBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title)
            .border_style(Style::default().fg(if self.focused {
                self.active_color
            } else {
                self.border_color
            }));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.options.is_empty() || inner.width == 0 {
            return;
        }
        let cols = self.columns.min(self.options.len());
        let col_width = inner.width / cols as u16;
        for (idx, label) in self.options.iter().enumerate() {
            let (row, col) = ((idx / cols) as u16, (idx % cols) as u16);
            if row >= inner.height {
                break;
            }
            let cell = Rect {
                x: inner.x + col * col_width,
                y: inner.y + row,
                width: col_width,
                height: 1,
            };
            let is_selected = idx == self.selected;
            let marker = if is_selected { "●" } else { "○" };
            Paragraph::new(Line::from(Span::styled(
                format!("{} {}", marker, label),
                self.option_style(is_selected),
            )))
            .render(cell, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_selected_option() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        RadioBlock::new("Kind", &["Line", "Bar", "Pie"], 1).render(area, &mut buf);
        let row: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(row.contains("○ Line"));
        assert!(row.contains("● Bar"));
        assert!(row.contains("○ Pie"));
    }

    #[test]
    fn grid_wraps_rows() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        RadioBlock::new("Fmt", &["A", "B", "C"], 2)
            .columns(2)
            .render(area, &mut buf);
        let second: String = (0..area.width)
            .map(|x| buf[(x, 2)].symbol().to_string())
            .collect();
        assert!(second.contains("● C"));
    }
}
