use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Submit, // Enter pressed
    Cancel, // Esc pressed
}

/// Single-line text input widget wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    cursor: usize,
    placeholder: String,
    text_color: Option<Color>,
    placeholder_color: Option<Color>,
    cursor_focused: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            cursor: 0,
            placeholder: String::new(),
            text_color: None,
            placeholder_color: None,
            cursor_focused: None,
            focused: false,
        };
        widget.apply_style();
        widget
    }

    /// Placeholder shown (dimmed) while the input is empty
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self.apply_style();
        self
    }

    /// Take text, placeholder and cursor colors from the theme
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.set_theme(theme);
        self
    }

    /// Re-apply theme colors (used when toggling dark mode)
    pub fn set_theme(&mut self, theme: &Theme) {
        self.text_color = Some(theme.get("text_primary"));
        self.placeholder_color = Some(theme.get("text_secondary"));
        self.cursor_focused = Some(theme.get("cursor_focused"));
        self.apply_style();
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
        self.cursor = self.textarea.cursor().1;
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(text_color) = self.text_color {
            style = style.fg(text_color);
        }
        self.textarea.set_style(style);
        // No underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
        if !self.placeholder.is_empty() {
            self.textarea.set_placeholder_text(self.placeholder.clone());
            if let Some(color) = self.placeholder_color {
                self.textarea
                    .set_placeholder_style(Style::default().fg(color));
            }
        }
        let was_focused = self.focused;
        self.set_focused(was_focused);
    }

    fn sync_to_textarea(&mut self) {
        let single_line = self.value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line]);
        // A new TextArea resets all styling
        self.apply_style();
        self.textarea.move_cursor(CursorMove::Jump(
            0,
            self.cursor.min(u16::MAX as usize) as u16,
        ));
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            let cursor_color = self.cursor_focused.unwrap_or(Color::Reset);
            let cursor_style = if cursor_color == Color::Reset {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                let text_color = match cursor_color {
                    Color::White
                    | Color::Green
                    | Color::Yellow
                    | Color::Cyan
                    | Color::Gray
                    | Color::LightRed
                    | Color::LightGreen
                    | Color::LightYellow
                    | Color::LightBlue
                    | Color::LightMagenta
                    | Color::LightCyan => Color::Black,
                    Color::Black
                    | Color::Red
                    | Color::Blue
                    | Color::Magenta
                    | Color::DarkGray => Color::White,
                    _ => Color::Black,
                };
                Style::default().bg(cursor_color).fg(text_color)
            };
            self.textarea.set_cursor_style(cursor_style);
        } else {
            // Same style as the text hides the cursor
            let textarea_style = self.textarea.style();
            self.textarea.set_cursor_style(textarea_style);
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the content; cursor moves to the end
    pub fn set_value(&mut self, value: String) {
        self.cursor = value.chars().count();
        self.value = value;
        self.sync_to_textarea();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.sync_to_textarea();
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => return TextInputEvent::Submit,
            KeyCode::Esc => return TextInputEvent::Cancel,
            _ => {}
        }
        let input = key_event_to_input(event);
        if matches!(input.key, Key::Null | Key::Char('\n') | Key::Char('\r')) {
            return TextInputEvent::None;
        }
        self.textarea.input(input);
        self.sync_from_textarea();
        TextInputEvent::None
    }
}

fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        // Vertical movement and everything else means nothing on a single line
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        // tui-textarea may leave underlines behind; the cursor is drawn via cursor style
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_text_input_new() {
        let input = TextInput::new();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
        assert!(!input.focused);
    }

    #[test]
    fn test_set_value_moves_cursor_to_end() {
        let mut input = TextInput::new();
        input.set_value("Février".to_string());
        assert_eq!(input.value(), "Février");
        assert_eq!(input.cursor, 7);
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        for c in "652".chars() {
            assert_eq!(input.handle_key(&key(KeyCode::Char(c))), TextInputEvent::None);
        }
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "65");
    }

    #[test]
    fn test_enter_and_esc() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), TextInputEvent::Submit);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), TextInputEvent::Cancel);
    }

    #[test]
    fn test_clear() {
        let mut input = TextInput::new();
        input.set_value("hello".to_string());
        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor, 0);
    }
}
