//! Chart export modal: format (PNG/EPS) and path. Opened from the main view.

use crate::chart_data::ChartKind;
use crate::chart_export::ChartExportFormat;
use crate::config::Theme;
use crate::widgets::text_input::TextInput;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFocus {
    #[default]
    FormatSelector,
    PathInput,
    ExportButton,
    CancelButton,
}

pub struct ChartExportModal {
    pub active: bool,
    pub focus: ChartExportFocus,
    pub selected_format: ChartExportFormat,
    pub path_input: TextInput,
}

impl ChartExportModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open with a suggested file name for the current chart kind.
    pub fn open(&mut self, theme: &Theme, kind: ChartKind) {
        self.active = true;
        self.focus = ChartExportFocus::PathInput;
        self.path_input = TextInput::new().with_theme(theme);
        self.path_input.set_value(format!(
            "chart-{}.{}",
            kind.key(),
            self.selected_format.extension()
        ));
    }

    pub fn close(&mut self) {
        self.active = false;
        self.focus = ChartExportFocus::FormatSelector;
        self.path_input.clear();
    }

    /// Switch format; a path ending in the old extension follows the new one.
    pub fn select_next_format(&mut self) {
        let current = self.selected_format;
        let idx = ChartExportFormat::ALL
            .iter()
            .position(|f| *f == current)
            .unwrap_or(0);
        let next = ChartExportFormat::ALL[(idx + 1) % ChartExportFormat::ALL.len()];
        self.selected_format = next;

        let old_suffix = format!(".{}", current.extension());
        if let Some(stem) = self.path_input.value().strip_suffix(&old_suffix) {
            let renamed = format!("{}.{}", stem, next.extension());
            self.path_input.set_value(renamed);
        }
    }

    /// Target path; the selected format's extension is appended when missing.
    pub fn target_path(&self) -> Option<PathBuf> {
        let raw = self.path_input.value().trim();
        if raw.is_empty() {
            return None;
        }
        let mut path = PathBuf::from(raw);
        if ChartExportFormat::from_path(&path) != Some(self.selected_format) {
            let with_ext = format!("{}.{}", raw, self.selected_format.extension());
            path = PathBuf::from(with_ext);
        }
        Some(path)
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            ChartExportFocus::FormatSelector => ChartExportFocus::PathInput,
            ChartExportFocus::PathInput => ChartExportFocus::ExportButton,
            ChartExportFocus::ExportButton => ChartExportFocus::CancelButton,
            ChartExportFocus::CancelButton => ChartExportFocus::FormatSelector,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            ChartExportFocus::FormatSelector => ChartExportFocus::CancelButton,
            ChartExportFocus::PathInput => ChartExportFocus::FormatSelector,
            ChartExportFocus::ExportButton => ChartExportFocus::PathInput,
            ChartExportFocus::CancelButton => ChartExportFocus::ExportButton,
        };
    }
}

impl Default for ChartExportModal {
    fn default() -> Self {
        Self {
            active: false,
            focus: ChartExportFocus::FormatSelector,
            selected_format: ChartExportFormat::Png,
            path_input: TextInput::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_appends_extension() {
        let mut modal = ChartExportModal::new();
        modal.path_input.set_value("out/chart".to_string());
        assert_eq!(modal.target_path(), Some(PathBuf::from("out/chart.png")));
        modal.path_input.set_value("chart.png".to_string());
        assert_eq!(modal.target_path(), Some(PathBuf::from("chart.png")));
        modal.path_input.set_value("   ".to_string());
        assert_eq!(modal.target_path(), None);
    }

    #[test]
    fn switching_format_renames_suggestion() {
        let mut modal = ChartExportModal::new();
        modal.path_input.set_value("chart-pie.png".to_string());
        modal.select_next_format();
        assert_eq!(modal.selected_format, ChartExportFormat::Eps);
        assert_eq!(modal.path_input.value(), "chart-pie.eps");
        modal.select_next_format();
        assert_eq!(modal.selected_format, ChartExportFormat::Png);
    }

    #[test]
    fn focus_cycles() {
        let mut modal = ChartExportModal::new();
        modal.next_focus();
        assert_eq!(modal.focus, ChartExportFocus::PathInput);
        modal.prev_focus();
        modal.prev_focus();
        assert_eq!(modal.focus, ChartExportFocus::CancelButton);
    }
}
