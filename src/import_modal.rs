//! Import prompt: path of a JSON document to load.

use crate::config::Theme;
use crate::widgets::text_input::TextInput;
use std::path::PathBuf;

pub struct ImportModal {
    pub active: bool,
    pub path_input: TextInput,
}

impl ImportModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, theme: &Theme) {
        self.active = true;
        self.path_input = TextInput::new()
            .with_theme(theme)
            .with_placeholder("graphique-1700000000000.json");
        self.path_input.set_focused(true);
    }

    pub fn close(&mut self) {
        self.active = false;
        self.path_input.clear();
    }

    /// Entered path with `~/` expanded; `None` when blank.
    pub fn path(&self) -> Option<PathBuf> {
        let raw = self.path_input.value().trim();
        if raw.is_empty() {
            return None;
        }
        match (raw.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => Some(home.join(rest)),
            _ => Some(PathBuf::from(raw)),
        }
    }
}

impl Default for ImportModal {
    fn default() -> Self {
        Self {
            active: false,
            path_input: TextInput::new(),
        }
    }
}
