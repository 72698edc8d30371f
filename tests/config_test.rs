/*!
 * Host Configuration Tests
 * Environment and JSON file loading
 */

use mcu_remote::core::ConfigError;
use mcu_remote::HostConfig;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;

const VARS: [&str; 5] = [
    "MCU_INTERRUPT_LINES",
    "MCU_EVENT_CAPACITY",
    "MCU_LOOPBACK_RAM_BASE",
    "MCU_LOOPBACK_RAM_SIZE",
    "MCU_TRACE_JSON",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    assert_eq!(HostConfig::from_env().unwrap(), HostConfig::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("MCU_INTERRUPT_LINES", "40");
    std::env::set_var("MCU_LOOPBACK_RAM_BASE", "0x2007C000");
    std::env::set_var("MCU_LOOPBACK_RAM_SIZE", "16384");
    std::env::set_var("MCU_TRACE_JSON", "true");

    let config = HostConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.interrupt_lines, 40);
    assert_eq!(config.loopback_ram_base, 0x2007_C000);
    assert_eq!(config.loopback_ram_size, 16384);
    assert!(config.trace_json);
    assert_eq!(config.event_capacity, HostConfig::default().event_capacity);
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_env();
    std::env::set_var("MCU_EVENT_CAPACITY", "lots");
    let err = HostConfig::from_env().unwrap_err();
    clear_env();

    assert!(matches!(
        err,
        ConfigError::InvalidVar { name: "MCU_EVENT_CAPACITY", .. }
    ));
}

#[test]
#[serial]
fn test_from_env_validates_window() {
    clear_env();
    std::env::set_var("MCU_LOOPBACK_RAM_BASE", "0xFFFFFF00");
    std::env::set_var("MCU_LOOPBACK_RAM_SIZE", "4096");
    let err = HostConfig::from_env().unwrap_err();
    clear_env();

    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_from_json_file_partial() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "loopback_ram_size": 2048, "event_capacity": 8 }}"#).unwrap();

    let config = HostConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.loopback_ram_size, 2048);
    assert_eq!(config.event_capacity, 8);
    assert_eq!(config.interrupt_lines, HostConfig::default().interrupt_lines);
}

#[test]
fn test_from_json_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(
        HostConfig::from_json_file(&missing),
        Err(ConfigError::Io(_))
    ));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(
        HostConfig::from_json_file(&bad),
        Err(ConfigError::Parse(_))
    ));

    let zero = dir.path().join("zero.json");
    std::fs::write(&zero, r#"{ "event_capacity": 0 }"#).unwrap();
    assert!(matches!(
        HostConfig::from_json_file(&zero),
        Err(ConfigError::Invalid(_))
    ));
}
