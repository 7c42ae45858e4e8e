use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

/// Key hints shown in the main view.
pub const MAIN_CONTROLS: [(&str, &str); 9] = [
    ("e", "Edit"),
    ("x", "Delete"),
    ("a", "Add"),
    ("c", "Chart"),
    ("s", "Export"),
    ("o", "Import"),
    ("p", "Image"),
    ("d", "Dark"),
    ("q", "Quit"),
];

pub const FORM_CONTROLS: [(&str, &str); 3] = [("Tab", "Next"), ("Enter", "Submit"), ("Esc", "Back")];

pub const PROMPT_CONTROLS: [(&str, &str); 3] = [("Tab", "Next"), ("Enter", "Confirm"), ("Esc", "Close")];

/// Bottom bar: key/label pairs, then the record count and status on the right.
pub struct Controls<'a> {
    pub controls: &'a [(&'a str, &'a str)],
    pub record_count: Option<usize>,
    pub status: Option<&'a str>,
    pub dimmed: bool,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
}

impl<'a> Controls<'a> {
    pub fn new(controls: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            controls,
            record_count: None,
            status: None,
            dimmed: false,
            bg_color: Color::DarkGray,
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }

    pub fn with_record_count(mut self, count: usize) -> Self {
        self.record_count = Some(count);
        self
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_colors(mut self, bg: Color, key: Color, label: Color) -> Self {
        self.bg_color = bg;
        self.key_color = key;
        self.label_color = label;
        self
    }
}

impl Widget for &Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self
            .controls
            .iter()
            .fold(vec![], |mut acc, (key, action)| {
                acc.push(Constraint::Length(key.chars().count() as u16 + 2));
                acc.push(Constraint::Length(action.chars().count() as u16 + 1));
                acc
            });
        constraints.push(Constraint::Fill(1));
        if self.record_count.is_some() {
            constraints.push(Constraint::Length(14));
        }
        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let (key_fg, label_fg) = if self.dimmed {
            (Color::DarkGray, Color::DarkGray)
        } else {
            (self.key_color, self.label_color)
        };
        let bar = Style::default().bg(self.bg_color);

        for (i, (key, action)) in self.controls.iter().enumerate() {
            Paragraph::new(*key)
                .style(Style::default().fg(key_fg).add_modifier(Modifier::BOLD))
                .centered()
                .render(layout[i * 2], buf);
            Paragraph::new(*action)
                .style(bar.fg(label_fg))
                .render(layout[i * 2 + 1], buf);
        }

        let fill_idx = self.controls.len() * 2;
        Paragraph::new(self.status.unwrap_or(""))
            .style(bar.fg(label_fg))
            .right_aligned()
            .render(layout[fill_idx], buf);

        if let Some(count) = self.record_count {
            Paragraph::new(format!("Records: {}", count))
                .style(bar.fg(label_fg))
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_keys_count_and_status() {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        Controls::new(&MAIN_CONTROLS)
            .with_record_count(4)
            .with_status(Some("saved"))
            .render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Edit"));
        assert!(text.contains("Records: 4"));
        assert!(text.contains("saved"));
    }
}
