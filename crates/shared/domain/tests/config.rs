use optbind_domain::config::{AuthLevel, HostConfig, LogRotation, ServerConfig, SettingsConfig};
use optbind_domain::settings::{ConfigSection, ConfigurationSettings};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 7071);
    assert!(server.ssl.is_none());

    let settings = SettingsConfig::default();
    assert_eq!(settings.file, Some(std::path::PathBuf::from("local.settings.json")));
    assert!(settings.environment);

    let host = HostConfig::default();
    assert_eq!(host.function.auth_level, AuthLevel::Function);
    assert!(host.function.keys.function.is_none());
}

#[test]
fn host_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "function": { "auth_level": "admin", "keys": { "master": "m" } },
        "settings": { "file": null, "environment": false }
    });

    let cfg: HostConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.function.auth_level, AuthLevel::Admin);
    assert_eq!(cfg.function.keys.master.as_deref(), Some("m"));
    assert!(cfg.settings.file.is_none());
    assert!(!cfg.settings.environment);
}

#[test]
fn function_keys_are_masked_in_debug_output() {
    let raw = json!({ "function": { "keys": { "function": "secret-key" } } });
    let cfg: HostConfig = serde_json::from_value(raw).expect("config deserialize");

    let rendered = format!("{:?}", cfg.function.keys);
    assert!(!rendered.contains("secret-key"));
    assert!(rendered.contains("***"));
}

#[test]
fn configuration_settings_use_pascal_case_keys() {
    let raw = json!({ "ConfigSetting1": "A", "ConfigSetting3": "C" });
    let settings: ConfigurationSettings = serde_json::from_value(raw).expect("settings deserialize");

    assert_eq!(settings.config_setting1.as_deref(), Some("A"));
    assert_eq!(settings.config_setting2, None);
    assert_eq!(settings.config_setting3.as_deref(), Some("C"));
    assert_eq!(ConfigurationSettings::SECTION, "MyConfigSectionPrefix");
}

#[test]
fn logging_section_defaults_and_overrides() {
    let cfg = HostConfig::default();
    assert_eq!(cfg.logging.level, "info");
    assert_eq!(cfg.logging.rotation, LogRotation::Daily);
    assert!(cfg.logging.directory.is_none());

    let raw = json!({ "logging": { "json": true, "directory": "logs", "rotation": "hourly" } });
    let cfg: HostConfig = serde_json::from_value(raw).expect("config deserialize");
    assert!(cfg.logging.json);
    assert_eq!(cfg.logging.rotation, LogRotation::Hourly);
    assert_eq!(cfg.logging.max_files, 7);
}

#[test]
fn host_config_is_built_from_its_sections() {
    let raw = json!({ "server": { "port": 9000 } });
    let cfg: HostConfig = serde_json::from_value(raw).expect("config deserialize");
    let copy = cfg.clone();

    assert_eq!(copy.server.port, 9000);
    assert_eq!(copy.settings.file, Some(std::path::PathBuf::from("local.settings.json")));
}
