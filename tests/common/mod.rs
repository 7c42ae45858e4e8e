use chartui::{App, AppEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn new_app() -> App {
    App::new()
}

/// Send one key press and run any follow-up events the app asks for.
pub fn press(app: &mut App, code: KeyCode) {
    press_with(app, code, KeyModifiers::NONE);
}

pub fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let mut next = app.event(&AppEvent::Key(KeyEvent::new(code, modifiers)));
    while let Some(event) = next {
        next = app.event(&event);
    }
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Run an event and its follow-ups (e.g. `Import` then `DoImport`).
pub fn run_event(app: &mut App, event: AppEvent) {
    let mut next = Some(event);
    while let Some(event) = next {
        next = app.event(&event);
    }
}
