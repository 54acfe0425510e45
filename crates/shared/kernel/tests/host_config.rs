use optbind_kernel::config::{ConfigError, load_config, load_host_config, load_host_config_from};
use optbind_kernel::domain::config::AuthLevel;
use serde::Deserialize;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

#[test]
#[serial]
fn missing_host_file_yields_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let cfg = load_host_config(Some(dir.path().join("absent")))?;

    assert_eq!(cfg.function.auth_level, AuthLevel::Function);
    assert!(cfg.settings.environment);
    Ok(())
}

#[test]
#[serial]
fn host_file_is_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("function.toml");
    fs::write(
        &path,
        r#"
[server]
address = "127.0.0.1"

[function]
auth_level = "anonymous"

[settings]
environment = false
"#,
    )?;

    let cfg = load_host_config(Some(&path))?;
    assert_eq!(cfg.server.address.to_string(), "127.0.0.1");
    assert_eq!(cfg.function.auth_level, AuthLevel::Anonymous);
    assert!(!cfg.settings.environment);
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct Custom {
    name: String,
}

#[test]
#[serial]
fn load_config_reads_arbitrary_types() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("custom.json");
    fs::write(&path, r#"{ "name": "sample" }"#)?;

    let cfg: Custom = load_config(Some(&path))?;
    assert_eq!(cfg.name, "sample");
    Ok(())
}

const NO_VARS: [(&str, &str); 0] = [];

#[test]
fn assigned_port_overrides_file_and_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("function.toml");
    fs::write(&path, "[server]\nport = 9000\n")?;

    let cfg = load_host_config_from(Some(&path), [("FUNCTIONS_CUSTOMHANDLER_PORT", "8123")])?;
    assert_eq!(cfg.server.port, 8123);

    let cfg = load_host_config_from(Some(&path), NO_VARS)?;
    assert_eq!(cfg.server.port, 9000);
    Ok(())
}

#[test]
fn prefixed_variables_fill_typed_fields() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let cfg = load_host_config_from(
        Some(dir.path().join("absent")),
        [
            ("OPTBIND__SERVER__PORT", "9000"),
            ("OPTBIND__SETTINGS__ENVIRONMENT", "false"),
            ("OPTBIND__FUNCTION__AUTH_LEVEL", "admin"),
            ("OPTBIND__FUNCTION__KEYS__MASTER", "m"),
        ],
    )?;

    assert_eq!(cfg.server.port, 9000);
    assert!(!cfg.settings.environment);
    assert_eq!(cfg.function.auth_level, AuthLevel::Admin);
    assert_eq!(cfg.function.keys.master.as_deref(), Some("m"));
    Ok(())
}

#[test]
fn host_port_wins_over_prefixed_variable() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let cfg = load_host_config_from(
        Some(dir.path().join("absent")),
        [("OPTBIND__SERVER__PORT", "9000"), ("FUNCTIONS_CUSTOMHANDLER_PORT", "8123")],
    )?;
    assert_eq!(cfg.server.port, 8123);
    Ok(())
}

#[test]
fn invalid_assigned_port_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let err = load_host_config_from(
        Some(dir.path().join("absent")),
        [("FUNCTIONS_CUSTOMHANDLER_PORT", "70000")],
    )
    .expect_err("port out of range");
    assert!(matches!(err, ConfigError::Port { .. }));
    Ok(())
}
