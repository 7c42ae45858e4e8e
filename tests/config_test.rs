use chartui::config::{parse_hex, ThemeConfig};
use chartui::{AppConfig, ConfigManager};
use std::fs;
use tempfile::TempDir;

fn manager() -> (TempDir, ConfigManager) {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(dir.path().join("chartui"));
    (dir, manager)
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.version, "0.1");
    assert!(!config.display.dark_mode);
    assert_eq!(config.display.table_width, 40);
    assert_eq!(config.performance.event_poll_interval_ms, 25);
    assert_eq!(config.export.image_width, 800);
    assert_eq!(config.export.image_height, 400);
    assert_eq!(config.export.directory, None);
    assert_eq!(config.theme.palette.len(), 8);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_loads_defaults() {
    let (_dir, manager) = manager();
    let config = AppConfig::load_from(&manager).unwrap();
    assert_eq!(config.display.table_width, 40);
}

#[test]
fn test_write_default_config_respects_force() {
    let (_dir, manager) = manager();
    let path = manager.write_default_config(false).unwrap();
    assert!(path.ends_with("config.toml"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        manager.generate_default_config()
    );

    assert!(manager.write_default_config(false).is_err());
    fs::write(&path, "garbage").unwrap();
    manager.write_default_config(true).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("[theme.light]"));
}

#[test]
fn test_generated_template_parses_to_defaults() {
    let (_dir, manager) = manager();
    manager.write_default_config(false).unwrap();
    let config = AppConfig::load_from(&manager).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(config.display.table_width, defaults.display.table_width);
    assert_eq!(config.theme.palette, defaults.theme.palette);
    assert_eq!(config.theme.light.line_series, defaults.theme.light.line_series);
    assert_eq!(config.theme.dark.primary, defaults.theme.dark.primary);
}

#[test]
fn test_partial_user_config_merges() {
    let (_dir, manager) = manager();
    manager.ensure_config_dir().unwrap();
    fs::write(
        manager.config_path("config.toml"),
        r##"
[display]
dark_mode = true
table_width = 50

[export]
directory = "/tmp/charts"
image_width = 1024

[theme.light]
line_series = "#ff0000"
"##,
    )
    .unwrap();

    let config = AppConfig::load_from(&manager).unwrap();
    assert!(config.display.dark_mode);
    assert_eq!(config.display.table_width, 50);
    assert_eq!(config.export.image_width, 1024);
    assert_eq!(config.export.image_height, 400);
    assert_eq!(
        config.export.directory_path(),
        std::path::PathBuf::from("/tmp/charts")
    );
    assert_eq!(config.theme.light.line_series, "#ff0000");
    // Untouched fields keep their defaults
    assert_eq!(
        config.theme.light.bar_series,
        AppConfig::default().theme.light.bar_series
    );
    assert_eq!(config.performance.event_poll_interval_ms, 25);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let cases = [
        "version = \"2.0\"",
        "[performance]\nevent_poll_interval_ms = 0",
        "[export]\nimage_height = 0",
        "[display]\ntable_width = 5",
        "[theme.dark]\nprimary = \"not-a-color\"",
        "[theme]\npalette = [\"#000000\"]",
        "[display]\ntable_width = \"wide\"",
    ];
    for case in cases {
        let (_dir, manager) = manager();
        manager.ensure_config_dir().unwrap();
        fs::write(manager.config_path("config.toml"), case).unwrap();
        assert!(
            AppConfig::load_from(&manager).is_err(),
            "accepted invalid config: {}",
            case
        );
    }
}

#[test]
fn test_palette_rgb_falls_back_to_defaults() {
    let mut theme = ThemeConfig::default();
    assert_eq!(theme.palette_rgb()[0], parse_hex("#3b82f6").unwrap());

    theme.palette = vec!["red".to_string(); 8];
    let rgb = theme.palette_rgb();
    assert_eq!(rgb.len(), 8);
    assert_eq!(rgb, ThemeConfig::default().palette_rgb());
}
