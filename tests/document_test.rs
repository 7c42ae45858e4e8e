use chartui::document::{self, ImportError};
use chartui::editor::EditMode;
use chartui::{AppEvent, ChartKind, InputMode, Record};
use crossterm::event::KeyCode;
use std::fs;
use tempfile::TempDir;

mod common;
use common::{new_app, press, run_event, type_text};

fn only_json_file(dir: &std::path::Path) -> std::path::PathBuf {
    let files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    assert_eq!(files.len(), 1, "{:?}", files);
    files.into_iter().next().unwrap()
}

#[test]
fn test_export_key_writes_document() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.set_export_dir(dir.path().to_path_buf());
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('s'));

    let path = only_json_file(dir.path());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("graphique-"));
    assert!(app.status().unwrap().contains(&name));

    let raw = fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["chartType"], "bar");
    assert_eq!(v["data"].as_array().unwrap().len(), 4);
    assert_eq!(v["data"][1]["name"], "Février");
    assert!(v["exportDate"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_export_then_import_round_trips() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.set_export_dir(dir.path().to_path_buf());
    app.store.replace_all(vec![
        Record::new("a", 1.25),
        Record::new("a", -3.0),
        Record::new("Ünïcode", 1e6),
    ]);
    press(&mut app, KeyCode::Char('3'));
    press(&mut app, KeyCode::Char('s'));
    let exported = app.store.clone();
    let path = only_json_file(dir.path());

    let mut other = new_app();
    run_event(&mut other, AppEvent::Import(path));
    assert_eq!(other.store, exported);
    assert_eq!(other.chart_kind, ChartKind::Pie);
    assert!(!other.error_modal.active);
}

#[test]
fn test_import_through_prompt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("in.json");
    fs::write(
        &path,
        r#"{"chartType": "bar", "data": [{"name": "Lundi", "value": 3}, {"name": "Mardi", "value": 4.5}]}"#,
    )
    .unwrap();

    let mut app = new_app();
    press(&mut app, KeyCode::Char('o'));
    assert_eq!(app.input_mode, InputMode::ImportPrompt);
    type_text(&mut app, &path.to_string_lossy());
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(
        app.store.records(),
        &[Record::new("Lundi", 3.0), Record::new("Mardi", 4.5)]
    );
    assert_eq!(app.chart_kind, ChartKind::Bar);
    assert_eq!(app.selected(), Some(0));
}

#[test]
fn test_import_shows_reading_status_first() {
    let mut app = new_app();
    let path = std::path::PathBuf::from("whatever.json");
    let next = app.event(&AppEvent::Import(path.clone()));
    assert!(matches!(next, Some(AppEvent::DoImport(p)) if p == path));
    assert!(app.status().unwrap().contains("whatever.json"));
}

#[test]
fn test_malformed_import_leaves_state_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"chartType": "pie", "data": [{"name": "a", "va"#).unwrap();

    let mut app = new_app();
    press(&mut app, KeyCode::Char('2'));
    let before = app.store.clone();
    run_event(&mut app, AppEvent::Import(path));

    assert_eq!(app.store, before);
    assert_eq!(app.chart_kind, ChartKind::Bar);
    assert!(app.error_modal.active);
    assert!(app.error_modal.message.contains("JSON"));

    // Enter dismisses the modal
    press(&mut app, KeyCode::Enter);
    assert!(!app.error_modal.active);
}

#[test]
fn test_invalid_record_import_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad-record.json");
    fs::write(&path, r#"{"data": [{"name": "a", "value": 1}, {"name": "b", "value": "2"}]}"#)
        .unwrap();

    let mut app = new_app();
    run_event(&mut app, AppEvent::Import(path));
    assert_eq!(app.store.len(), 4);
    assert!(app.error_modal.message.contains("record 2"));
}

#[test]
fn test_missing_file_import_shows_error() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    run_event(&mut app, AppEvent::Import(dir.path().join("nope.json")));
    assert!(app.error_modal.active);
    assert_eq!(app.store.len(), 4);
}

#[test]
fn test_import_resets_edit_and_keeps_kind_without_chart_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-kind.json");
    fs::write(&path, r#"{"data": [{"name": "x", "value": 7}]}"#).unwrap();

    let mut app = new_app();
    press(&mut app, KeyCode::Char('3'));
    press(&mut app, KeyCode::Char('e'));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.editor.mode(), EditMode::Editing(0));

    run_event(&mut app, AppEvent::Import(path));
    assert_eq!(app.editor.mode(), EditMode::Adding);
    assert_eq!(app.chart_kind, ChartKind::Pie);
    assert_eq!(app.store.records(), &[Record::new("x", 7.0)]);
}

#[test]
fn test_chart_kind_override_wins_over_startup_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("line.json");
    fs::write(&path, r#"{"chartType": "line", "data": []}"#).unwrap();

    let mut app = new_app();
    let startup = app.startup(Some(path.clone()), Some(ChartKind::Pie));
    assert!(matches!(&startup, Some(AppEvent::Import(p)) if *p == path));
    assert_eq!(app.chart_kind, ChartKind::Pie);
    run_event(&mut app, startup.unwrap());
    assert_eq!(app.chart_kind, ChartKind::Pie);
    assert!(app.store.is_empty());
    assert_eq!(app.selected(), None);

    // Later imports follow their documents
    run_event(&mut app, AppEvent::Import(path));
    assert_eq!(app.chart_kind, ChartKind::Line);
}

#[test]
fn test_chart_kind_without_startup_file_does_not_stick() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-kind.json");
    fs::write(&path, r#"{"data": [{"name": "x", "value": 1}]}"#).unwrap();

    let mut app = new_app();
    assert!(app.startup(None, Some(ChartKind::Line)).is_none());
    assert_eq!(app.chart_kind, ChartKind::Line);

    press(&mut app, KeyCode::Char('3'));
    run_event(&mut app, AppEvent::Import(path));
    assert_eq!(app.chart_kind, ChartKind::Pie);
    assert_eq!(app.store.len(), 1);
}

#[test]
fn test_failed_startup_import_drops_chart_kind() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("no-kind.json");
    fs::write(&good, r#"{"data": [{"name": "x", "value": 1}]}"#).unwrap();

    let mut app = new_app();
    let startup = app.startup(Some(dir.path().join("missing.json")), Some(ChartKind::Bar));
    run_event(&mut app, startup.unwrap());
    assert!(app.error_modal.active);
    press(&mut app, KeyCode::Esc);

    press(&mut app, KeyCode::Char('3'));
    run_event(&mut app, AppEvent::Import(good));
    assert_eq!(app.chart_kind, ChartKind::Pie);
}

#[test]
fn test_export_import_keeps_full_precision() {
    let dir = TempDir::new().unwrap();
    let values = [
        9.037977425313861e16,
        1.0715660391465826e-75,
        0.1 + 0.2,
        f64::MAX,
        f64::MIN_POSITIVE,
        5e-324,
        -123456.78901234567,
    ];
    let mut app = new_app();
    app.set_export_dir(dir.path().to_path_buf());
    app.store.replace_all(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Record::new(format!("r{}", i), *v))
            .collect(),
    );
    press(&mut app, KeyCode::Char('s'));

    let mut other = new_app();
    run_event(&mut other, AppEvent::Import(only_json_file(dir.path())));
    let bits: Vec<u64> = other.store.iter().map(|r| r.value.to_bits()).collect();
    let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, expected);
}

#[test]
fn test_import_error_variants() {
    assert!(matches!(
        document::import("not json"),
        Err(ImportError::Parse(_))
    ));
    assert!(matches!(
        document::import(r#"{"chartType": "bar"}"#),
        Err(ImportError::MissingData)
    ));
}

#[test]
fn test_chart_image_export_modal() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("chart");

    let mut app = new_app();
    press(&mut app, KeyCode::Char('2'));
    press(&mut app, KeyCode::Char('p'));
    assert_eq!(app.input_mode, InputMode::ChartExport);
    assert_eq!(app.chart_export_modal.path_input.value(), "chart-bar.png");

    // Switch to EPS on the format selector, then replace the path
    press(&mut app, KeyCode::BackTab);
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.chart_export_modal.path_input.value(), "chart-bar.eps");
    for _ in 0.."chart-bar.eps".len() {
        press(&mut app, KeyCode::Backspace);
    }
    type_text(&mut app, &out.to_string_lossy());
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(!app.error_modal.active, "{}", app.error_modal.message);
    let written = dir.path().join("chart.eps");
    let eps = fs::read_to_string(&written).unwrap();
    assert!(eps.starts_with("%!PS-Adobe"));
}

#[test]
fn test_chart_image_export_cancel() {
    let mut app = new_app();
    press(&mut app, KeyCode::Char('p'));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(!app.chart_export_modal.active);
}
