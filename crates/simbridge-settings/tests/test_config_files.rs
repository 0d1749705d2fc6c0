use simbridge_settings::{BridgeConfig, ConfigError, SettingsError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = BridgeConfig::new();
    config.serial.port = "/dev/ttyUSB1".to_string();
    config.reconnect.cooldown_ms = 250;
    config.save_to_file(&path).unwrap();

    assert_eq!(BridgeConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"serial": {"baud_rate": 115200}, "relay": {"uppercase_hex": false}}"#,
    )
    .unwrap();

    let config = BridgeConfig::load_from_file(&path).unwrap();
    assert_eq!(config.serial.baud_rate, 115200);
    assert_eq!(config.serial.port, "Auto");
    assert!(!config.relay.uppercase_hex);
    assert_eq!(config.relay.event_capacity, 1024);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[reconnect]\ncooldown_ms = 0\n").unwrap();

    match BridgeConfig::load_from_file(&path) {
        Err(SettingsError::Config(ConfigError::ValueOutOfRange { key, .. })) => {
            assert_eq!(key, "reconnect.cooldown_ms")
        }
        other => panic!("expected range error, got {:?}", other),
    }
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "serial: {}\n").unwrap();

    assert!(matches!(
        BridgeConfig::load_from_file(&path),
        Err(SettingsError::Config(ConfigError::UnsupportedFormat(ext))) if ext == "yaml"
    ));
    assert!(BridgeConfig::new().save_to_file(&path).is_err());
}

#[test]
fn test_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[serial\nport = 3\n").unwrap();

    assert!(matches!(
        BridgeConfig::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_means_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert_eq!(
        BridgeConfig::load_or_default(&path).unwrap(),
        BridgeConfig::default()
    );
    assert!(matches!(
        BridgeConfig::load_from_file(&path),
        Err(SettingsError::IoError(_))
    ));
}
