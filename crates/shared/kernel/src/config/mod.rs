mod binder;
mod source;

pub use binder::{BindError, Section};
pub use source::{SettingsSource, SettingsSourceBuilder};

use config::{Config, Environment, File, Map};
use optbind_domain::config::HostConfig;
use optbind_domain::constants::CUSTOM_HANDLER_PORT_ENV;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Errors raised while loading host config or binding application settings.
#[optbind_derive::optbind_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Invalid port{}: {source}", format_context(.context))]
    Port { source: ParseIntError, context: Option<Cow<'static, str>> },
    #[error("Section binding error{}: {source}", format_context(.context))]
    Bind { source: BindError, context: Option<Cow<'static, str>> },
}

/// Loads a layered configuration: an optional file overlaid by `OPTBIND__` environment variables.
///
/// 1. **Base File**: `path` (default `function`) in any format the `config` crate
///    recognises. A missing file is skipped, so a host can be configured from the
///    environment alone.
/// 2. **Environment Overrides**: variables prefixed with `OPTBIND__`; nested keys are
///    joined with double underscores (`OPTBIND__SERVER__PORT` maps to `server.port`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if a source is malformed or its content does not
/// match the structure of `T`.
///
/// # Example
/// ```rust
/// use optbind_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = effective_path(path);
    info!("Loading config from {}", effective_path.display());

    base_builder(&effective_path, None)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

/// Loads the [`HostConfig`] from `path` and the process environment.
///
/// # Errors
/// See [`load_host_config_from`].
pub fn load_host_config(path: Option<impl AsRef<Path>>) -> Result<HostConfig, ConfigError> {
    let vars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    load_host_config_from(path, vars)
}

/// Loads the [`HostConfig`] from `path` and an environment snapshot.
///
/// `OPTBIND__*` variables override the file and `FUNCTIONS_CUSTOMHANDLER_PORT`, set by a
/// custom-handler host, overrides both for `server.port`.
///
/// # Errors
/// Returns [`ConfigError::Port`] if the assigned port is not a valid `u16`, and
/// [`ConfigError::Config`] if a source is malformed.
pub fn load_host_config_from<I, K, V>(
    path: Option<impl AsRef<Path>>,
    vars: I,
) -> Result<HostConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let effective_path = effective_path(path);
    info!("Loading host config from {}", effective_path.display());

    let vars: Map<String, String> = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    let port = assigned_port(vars.get(CUSTOM_HANDLER_PORT_ENV).map(String::as_str))?;

    base_builder(&effective_path, Some(vars))
        .set_override_option("server.port", port.map(i64::from))
        .context("Failed to apply host port override")?
        .build()
        .context("Failed to build host config")?
        .try_deserialize::<HostConfig>()
        .context("Failed to deserialize host config")
}

fn assigned_port(raw: Option<&str>) -> Result<Option<u16>, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let port = raw.parse::<u16>().context(format!("{CUSTOM_HANDLER_PORT_ENV}='{raw}'"))?;
    debug!(port, "Port assigned by the function host");
    Ok(Some(port))
}

fn effective_path(path: Option<impl AsRef<Path>>) -> PathBuf {
    path.map_or_else(|| PathBuf::from("function"), |p| p.as_ref().to_path_buf())
}

fn base_builder(
    path: &Path,
    vars: Option<Map<String, String>>,
) -> config::ConfigBuilder<config::builder::DefaultState> {
    Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("OPTBIND").separator("__").source(vars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assigned_port() {
        assert_eq!(assigned_port(None).ok(), Some(None));
        assert_eq!(assigned_port(Some(" ")).ok(), Some(None));
        assert_eq!(assigned_port(Some("8123")).ok(), Some(Some(8123)));

        let err = assigned_port(Some("http")).expect_err("not a port");
        assert!(matches!(err, ConfigError::Port { .. }));
        assert!(err.to_string().contains("FUNCTIONS_CUSTOMHANDLER_PORT='http'"));
    }
}
