use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level host configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfigInner {
    pub server: ServerConfig,
    pub function: FunctionConfig,
    pub settings: SettingsConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into extractors.
///
/// Deserialized through [`HostConfigInner`] so that loaders which only produce
/// strings (environment variables, overrides) can still fill numeric and boolean fields.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(from = "HostConfigInner")]
pub struct HostConfig {
    inner: Arc<HostConfigInner>,
}

impl From<HostConfigInner> for HostConfig {
    fn from(inner: HostConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for HostConfig {
    type Target = HostConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for HostConfig {
    fn deref_mut(&mut self) -> &mut HostConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Access level a trigger declares for its callers.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    /// No key required.
    Anonymous,
    /// Function key or master key required.
    #[default]
    Function,
    /// Master key required.
    Admin,
}

/// Per-function host settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    pub auth_level: AuthLevel,
    pub keys: FunctionKeys,
}

/// Keys accepted by key-protected triggers. Absent keys disable the check.
#[derive(Default, Clone, Deserialize)]
#[serde(default)]
pub struct FunctionKeys {
    pub function: Option<String>,
    pub master: Option<String>,
}

impl std::fmt::Debug for FunctionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |key: &Option<String>| key.as_ref().map(|_| "***");
        f.debug_struct("FunctionKeys")
            .field("function", &mask(&self.function))
            .field("master", &mask(&self.master))
            .finish()
    }
}

/// Where application settings are read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// JSON settings file (`local.settings.json` layout). Missing files are skipped.
    pub file: Option<PathBuf>,
    /// Overlay process environment variables on top of the file.
    pub environment: bool,
}

/// Worker log output. Console output always goes to stdout for the functions host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (`error`, `warn`, `info`, `debug`, `trace`). `RUST_LOG` still applies.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
    /// Also write rolling log files here.
    pub directory: Option<PathBuf>,
    pub rotation: LogRotation,
    pub max_files: usize,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 7071, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self { file: Some(PathBuf::from("local.settings.json")), environment: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
            directory: None,
            rotation: LogRotation::Daily,
            max_files: 7,
        }
    }
}
