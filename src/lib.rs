use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, TableState, Wrap};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod chart_export_modal;
pub mod config;
pub mod document;
pub mod editor;
pub mod error_display;
mod help_strings;
pub mod import_modal;
pub mod record;
pub mod widgets;

pub use cache::CacheManager;
pub use chart_data::ChartKind;
pub use chart_export::ChartExportFormat;
pub use chartui_cli::Args;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use record::{Record, RecordStore};

use chart_export::ChartImageStyle;
use chart_export_modal::{ChartExportFocus, ChartExportModal};
use config::ThemeConfig;
use editor::{EditController, FormFocus};
use import_modal::ImportModal;
use widgets::controls::{Controls, FORM_CONTROLS, MAIN_CONTROLS, PROMPT_CONTROLS};
use widgets::debug::DebugState;
use widgets::form::FORM_HEIGHT;
use widgets::record_table::RecordTable;
use widgets::text_input::TextInputEvent;

/// Application name used for config and cache directories
pub const APP_NAME: &str = "chartui";

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Show "Reading ..." then import on the following event
    Import(PathBuf),
    DoImport(PathBuf),
    /// Write the JSON document to the export directory
    Export,
    ExportImage(PathBuf, ChartExportFormat),
    Exit,
    Resize(u16, u16),
}

/// Which part of the UI receives keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Form,
    ImportPrompt,
    ChartExport,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

pub struct App {
    pub store: RecordStore,
    pub editor: EditController,
    pub chart_kind: ChartKind,
    pub input_mode: InputMode,
    pub table_state: TableState,
    pub import_modal: ImportModal,
    pub chart_export_modal: ChartExportModal,
    pub error_modal: ErrorModal,
    pub show_help: bool,
    help_scroll: usize,
    status: Option<String>,
    /// Kind given on the command line; wins over the startup document's chartType only
    kind_override: Option<ChartKind>,
    config: AppConfig,
    theme: Theme,
    export_dir: PathBuf,
    debug: DebugState,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> App {
        Self::new_with_config(AppConfig::default())
    }

    pub fn new_with_config(mut app_config: AppConfig) -> App {
        let dark = app_config.display.dark_mode;
        let theme = Theme::from_config(&app_config.theme, dark)
            .or_else(|e| {
                warn!(error = %e, "invalid theme, using the built-in colors");
                app_config.theme = ThemeConfig::default();
                Theme::from_config(&app_config.theme, dark)
            })
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to terminal colors");
                Theme {
                    colors: std::collections::HashMap::new(),
                    palette: Vec::new(),
                    dark,
                }
            });
        let store = RecordStore::with_samples();
        let table_state = TableState::default().with_selected(Some(0));

        App {
            store,
            editor: EditController::new().with_theme(&theme),
            chart_kind: ChartKind::default(),
            input_mode: InputMode::Normal,
            table_state,
            import_modal: ImportModal::new(),
            chart_export_modal: ChartExportModal::new(),
            error_modal: ErrorModal::new(),
            show_help: false,
            help_scroll: 0,
            status: None,
            kind_override: None,
            export_dir: app_config.export.directory_path(),
            debug: DebugState {
                enabled: app_config.debug.enabled,
                ..DebugState::default()
            },
            config: app_config,
            theme,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Apply the command-line chart kind and file. The kind wins over the
    /// `chartType` of `path` only; later imports follow their documents.
    /// Returns the event that loads `path`.
    pub fn startup(
        &mut self,
        path: Option<PathBuf>,
        kind: Option<ChartKind>,
    ) -> Option<AppEvent> {
        if let Some(kind) = kind {
            self.chart_kind = kind;
        }
        let path = path?;
        self.kind_override = kind;
        Some(AppEvent::Import(path))
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme.dark
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Selected record index, if it exists.
    pub fn selected(&self) -> Option<usize> {
        self.table_state
            .selected()
            .filter(|i| *i < self.store.len())
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Keep the selection on an existing row (or none when the list is empty).
    fn clamp_selection(&mut self) {
        if self.store.is_empty() {
            self.table_state.select(None);
        } else {
            let last = self.store.len() - 1;
            let current = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(current.min(last)));
        }
    }

    fn select_next(&mut self) {
        if self.store.is_empty() {
            return;
        }
        let next = match self.selected() {
            Some(i) if i + 1 < self.store.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.store.is_empty() {
            return;
        }
        let prev = self.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(prev));
    }

    fn set_chart_kind(&mut self, kind: ChartKind) {
        if self.chart_kind != kind {
            debug!(kind = kind.key(), "chart kind changed");
        }
        self.chart_kind = kind;
    }

    fn toggle_dark_mode(&mut self) {
        let dark = !self.theme.dark;
        match Theme::from_config(&self.config.theme, dark) {
            Ok(theme) => {
                self.theme = theme;
                self.editor.set_theme(&self.theme);
                self.set_status(if dark { "Mode sombre" } else { "Mode clair" });
            }
            Err(e) => self.error_modal.show(format!("Invalid theme: {}", e)),
        }
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.selected() else {
            return;
        };
        if let Some(removed) = self.store.remove(index) {
            self.editor.on_removed(index);
            self.clamp_selection();
            self.set_status(format!("Supprimé : {}", removed.name));
        }
    }

    fn begin_edit_selected(&mut self) {
        let Some(index) = self.selected() else {
            return;
        };
        self.editor.begin_edit(index, &self.store);
        self.input_mode = InputMode::Form;
    }

    fn focus_form(&mut self) {
        self.input_mode = InputMode::Form;
        self.editor.set_focus(FormFocus::Name);
    }

    fn leave_form(&mut self) {
        self.editor.blur();
        self.input_mode = InputMode::Normal;
    }

    /// Submit the form: save the record being edited or append a new one.
    /// Invalid input is ignored and the fields are kept as typed.
    fn submit_form(&mut self) {
        if let Some(index) = self.editor.editing_index() {
            match self.editor.save(&mut self.store) {
                Ok(()) => {
                    self.table_state.select(Some(index));
                    self.set_status("Donnée modifiée");
                    self.leave_form();
                }
                Err(e) => debug!(error = %e, "save ignored"),
            }
        } else {
            match self.editor.submit_add(&mut self.store) {
                Ok(()) => {
                    self.table_state.select(Some(self.store.len() - 1));
                    self.set_status("Donnée ajoutée");
                }
                Err(e) => debug!(error = %e, "add ignored"),
            }
        }
    }

    fn export_json(&mut self) {
        match document::write_export(
            &self.export_dir,
            self.chart_kind,
            self.store.records(),
            Utc::now(),
        ) {
            Ok(path) => self.set_status(format!("Exporté : {}", path.display())),
            Err(e) => self.error_modal.show(format!("Export failed: {:#}", e)),
        }
    }

    fn export_image(&mut self, path: &Path, format: ChartExportFormat) {
        let style = ChartImageStyle::from_config(&self.config);
        match chart_export::write_chart(path, format, self.store.records(), self.chart_kind, &style)
        {
            Ok(()) => self.set_status(format!("Graphique exporté : {}", path.display())),
            Err(e) => self.error_modal.show(format!("Chart export failed: {:#}", e)),
        }
    }

    fn import(&mut self, path: &Path) {
        // Consumed by the startup import whether or not it succeeds
        let kind_override = self.kind_override.take();
        let result = document::read_import_file(path).and_then(|raw| {
            document::apply_import(
                &raw,
                &mut self.store,
                &mut self.editor,
                &mut self.chart_kind,
            )
        });
        match result {
            Ok(count) => {
                if let Some(kind) = kind_override {
                    self.chart_kind = kind;
                }
                if self.input_mode == InputMode::Form {
                    self.leave_form();
                }
                self.table_state.select(if count > 0 { Some(0) } else { None });
                self.set_status(format!("Importé : {} données ({})", count, path.display()));
            }
            Err(e) => {
                self.status = None;
                self.error_modal
                    .show(error_display::user_message_from_import(&e));
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        // Error modal has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        let ctrl_h =
            event.code == KeyCode::Char('h') && event.modifiers.contains(KeyModifiers::CONTROL);

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') => self.close_help(),
                _ if ctrl_h => self.close_help(),
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                KeyCode::Home => self.help_scroll = 0,
                _ => {}
            }
            return None;
        }

        if ctrl_h {
            self.show_help = true;
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.normal_key(event),
            InputMode::Form => {
                self.form_key(event);
                None
            }
            InputMode::ImportPrompt => self.import_key(event),
            InputMode::ChartExport => self.chart_export_key(event),
        }
    }

    fn close_help(&mut self) {
        self.show_help = false;
        self.help_scroll = 0;
    }

    fn normal_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Home => self.clamp_selection_to(0),
            KeyCode::End => self.clamp_selection_to(usize::MAX),
            KeyCode::Char('e') | KeyCode::Enter => {
                self.debug.action("edit");
                self.begin_edit_selected();
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                self.debug.action("delete");
                self.delete_selected();
            }
            KeyCode::Char('a') | KeyCode::Tab => self.focus_form(),
            KeyCode::Char('1') => self.set_chart_kind(ChartKind::Line),
            KeyCode::Char('2') => self.set_chart_kind(ChartKind::Bar),
            KeyCode::Char('3') => self.set_chart_kind(ChartKind::Pie),
            KeyCode::Char('c') => self.set_chart_kind(self.chart_kind.next()),
            KeyCode::Char('s') => {
                self.debug.action("export");
                return Some(AppEvent::Export);
            }
            KeyCode::Char('o') => {
                self.import_modal.open(&self.theme);
                self.input_mode = InputMode::ImportPrompt;
            }
            KeyCode::Char('p') => {
                self.chart_export_modal.open(&self.theme, self.chart_kind);
                self.input_mode = InputMode::ChartExport;
            }
            KeyCode::Char('d') => self.toggle_dark_mode(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc if self.editor.is_editing() => self.editor.cancel(),
            KeyCode::Esc => self.status = None,
            _ => {}
        }
        None
    }

    fn clamp_selection_to(&mut self, index: usize) {
        self.table_state.select(Some(index));
        self.clamp_selection();
    }

    fn form_key(&mut self, event: &KeyEvent) {
        match event.code {
            // Back to the table; an edit in progress stays open
            KeyCode::Esc => self.leave_form(),
            KeyCode::Tab => self.editor.next_focus(),
            KeyCode::BackTab => self.editor.prev_focus(),
            KeyCode::Enter if self.editor.focus == FormFocus::Cancel => {
                self.editor.cancel();
                self.leave_form();
            }
            KeyCode::Enter => self.submit_form(),
            _ => {
                let input = match self.editor.focus {
                    FormFocus::Name => &mut self.editor.name_input,
                    FormFocus::Value => &mut self.editor.value_input,
                    FormFocus::Submit | FormFocus::Cancel => return,
                };
                input.handle_key(event);
            }
        }
    }

    fn import_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Esc => {
                self.import_modal.close();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let path = self.import_modal.path()?;
                self.import_modal.close();
                self.input_mode = InputMode::Normal;
                return Some(AppEvent::Import(path));
            }
            _ => {
                self.import_modal.path_input.handle_key(event);
            }
        }
        None
    }

    fn chart_export_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let modal = &mut self.chart_export_modal;
        match event.code {
            KeyCode::Esc => {
                modal.close();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Tab => modal.next_focus(),
            KeyCode::BackTab => modal.prev_focus(),
            KeyCode::Enter if modal.focus == ChartExportFocus::CancelButton => {
                modal.close();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                let path = modal.target_path()?;
                let format = modal.selected_format;
                modal.close();
                self.input_mode = InputMode::Normal;
                return Some(AppEvent::ExportImage(path, format));
            }
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Char(' ')
            | KeyCode::Char('h')
            | KeyCode::Char('l')
                if modal.focus == ChartExportFocus::FormatSelector =>
            {
                modal.select_next_format();
            }
            _ if modal.focus == ChartExportFocus::PathInput => {
                if modal.path_input.handle_key(event) == TextInputEvent::Cancel {
                    modal.close();
                    self.input_mode = InputMode::Normal;
                }
            }
            _ => {}
        }
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Import(path) => {
                // Render the status before the blocking read
                self.set_status(format!("Lecture de {}…", path.display()));
                Some(AppEvent::DoImport(path.clone()))
            }
            AppEvent::DoImport(path) => {
                self.import(path);
                None
            }
            AppEvent::Export => {
                self.export_json();
                None
            }
            AppEvent::ExportImage(path, format) => {
                self.export_image(path, *format);
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn get_help_info(&self) -> (&'static str, &'static str) {
        match self.input_mode {
            InputMode::Normal => (" Aide ", help_strings::main_view()),
            InputMode::Form => (" Aide : formulaire ", help_strings::form()),
            InputMode::ImportPrompt => (" Aide : import ", help_strings::import()),
            InputMode::ChartExport => (" Aide : export image ", help_strings::chart_export()),
        }
    }

    fn render_error_modal(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 70, 40);
        Clear.render(popup_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Erreur ")
            .border_style(Style::default().fg(self.color("modal_border_error")));
        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner_area);

        Paragraph::new(self.error_modal.message.as_str())
            .style(Style::default().fg(self.color("error")))
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        let ok_style = Style::default().fg(self.color("modal_border_active"));
        Paragraph::new("[ OK ]")
            .centered()
            .block(Block::default().borders(Borders::ALL).border_style(ok_style))
            .render(chunks[1], buf);
    }

    fn render_help(&mut self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_rect(area, 60, 70);
        Clear.render(popup_area, buf);
        let (title, text) = self.get_help_info();
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.color("modal_border_active")));
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let total = text.lines().count();
        let max_scroll = total.saturating_sub(inner.height as usize);
        self.help_scroll = self.help_scroll.min(max_scroll);

        Paragraph::new(text)
            .style(Style::default().fg(self.color("text_primary")))
            .scroll((self.help_scroll as u16, 0))
            .render(inner, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(self.config.display.table_width),
            ])
            .split(layout[0]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(FORM_HEIGHT)])
            .split(main[1]);

        let selected = self.selected();
        widgets::chart::render_chart_view(
            main[0],
            buf,
            self.store.records(),
            self.chart_kind,
            selected,
            &self.theme,
        );

        let table = RecordTable::new(self.store.records(), &self.theme)
            .with_editing(self.editor.editing_index())
            .with_focused(self.input_mode == InputMode::Normal);
        StatefulWidget::render(table, side[0], buf, &mut self.table_state);

        widgets::form::render_record_form(
            side[1],
            buf,
            &self.editor,
            self.input_mode == InputMode::Form,
            &self.theme,
        );

        match self.input_mode {
            InputMode::ImportPrompt => {
                let popup = centered_fixed(area, 70, 6);
                widgets::import_modal::render_import_modal(
                    popup,
                    buf,
                    &self.import_modal,
                    &self.theme,
                );
            }
            InputMode::ChartExport => {
                let popup = centered_fixed(area, 60, 11);
                widgets::chart_export_modal::render_chart_export_modal(
                    popup,
                    buf,
                    &mut self.chart_export_modal,
                    &self.theme,
                );
            }
            InputMode::Normal | InputMode::Form => {}
        }

        if self.error_modal.active {
            self.render_error_modal(area, buf);
        }
        if self.show_help {
            self.render_help(area, buf);
        }

        let hints: &[(&str, &str)] = match self.input_mode {
            InputMode::Normal => &MAIN_CONTROLS,
            InputMode::Form => &FORM_CONTROLS,
            InputMode::ImportPrompt | InputMode::ChartExport => &PROMPT_CONTROLS,
        };
        let controls = Controls::new(hints)
            .with_record_count(self.store.len())
            .with_status(self.status.as_deref())
            .with_dimmed(self.error_modal.active || self.show_help)
            .with_colors(
                self.color("controls_bg"),
                self.color("primary"),
                self.color("text_primary"),
            );
        controls.render(layout[1], buf);

        if self.debug.enabled {
            self.debug.render(layout[2], buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Rect of at most `width` x `height`, centered in `r`.
fn centered_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new()
    }

    #[test]
    fn starts_with_samples_and_first_row_selected() {
        let app = app();
        assert_eq!(app.store.len(), 4);
        assert_eq!(app.selected(), Some(0));
        assert_eq!(app.chart_kind, ChartKind::Line);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn clamp_selection_handles_empty_store() {
        let mut app = app();
        app.store.replace_all(Vec::new());
        app.clamp_selection();
        assert_eq!(app.selected(), None);
        app.select_next();
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn centered_fixed_fits_small_areas() {
        let r = centered_fixed(Rect::new(0, 0, 40, 5), 60, 11);
        assert_eq!(r, Rect::new(0, 0, 40, 5));
        let r = centered_fixed(Rect::new(0, 0, 100, 30), 60, 10);
        assert_eq!(r, Rect::new(20, 10, 60, 10));
    }

    #[test]
    fn renders_table_form_and_controls() {
        let mut app = app();
        let area = Rect::new(0, 0, 120, 30);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Données actuelles (4)"));
        assert!(text.contains("Ajouter une donnée"));
        assert!(text.contains("Records: 4"));
    }
}
