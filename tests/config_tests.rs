use std::path::PathBuf;
use std::time::Duration;

use supplygrid::config::{ConfigError, Settings, DATA_ENV_VAR};

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.debounce_ms, 500);
    assert_eq!(settings.status_reset_ms, 2000);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "debounce_ms = 250\nlog_level = \"debug\"\n").unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.debounce_ms, 250);
    assert_eq!(settings.focus_grace_ms, 500);
    assert_eq!(settings.log_level(), tracing::Level::DEBUG);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "debounce_ms = \"soon\"").unwrap();

    assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("settings.toml");
    let settings = Settings {
        refresh_interval_ms: 0,
        data_file: Some(PathBuf::from("/srv/suppliers.json")),
        ..Settings::default()
    };

    settings.save_to(&path).unwrap();
    assert_eq!(Settings::load_from(&path).unwrap(), settings);
}

#[test]
fn test_grid_config_uses_configured_timings() {
    let settings = Settings {
        debounce_ms: 300,
        focus_grace_ms: 800,
        status_reset_ms: 1500,
        ..Settings::default()
    };

    let config = settings.grid_config();
    assert_eq!(config.timings.debounce, Duration::from_millis(300));
    assert_eq!(config.timings.status_reset, Duration::from_millis(1500));
    assert_eq!(config.focus_grace, Duration::from_millis(800));
    assert_eq!(config.columns, vec![0, 1, 2, 3]);
}

#[test]
fn test_zero_refresh_interval_disables_polling() {
    let settings = Settings {
        refresh_interval_ms: 0,
        ..Settings::default()
    };
    assert_eq!(settings.refresh_interval(), None);
    assert_eq!(
        Settings::default().refresh_interval(),
        Some(Duration::from_secs(5))
    );
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let settings = Settings {
        log_level: "chatty".to_string(),
        ..Settings::default()
    };
    assert_eq!(settings.log_level(), tracing::Level::INFO);
}

#[test]
fn test_configured_data_file_is_used() {
    if std::env::var_os(DATA_ENV_VAR).is_some() {
        return;
    }
    let settings = Settings {
        data_file: Some(PathBuf::from("/srv/suppliers.json")),
        ..Settings::default()
    };
    assert_eq!(settings.resolve_data_file(), PathBuf::from("/srv/suppliers.json"));
    assert!(Settings::default()
        .resolve_data_file()
        .ends_with("supplygrid/suppliers.json"));
}
