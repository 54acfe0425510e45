pub use crate::config::{ConfigError, SettingsSource};
pub use crate::domain::config::HostConfig;
pub use crate::domain::settings::{ConfigSection, ConfigurationSettings};
pub use crate::server::{AppState, AppStateBuilder, Authorized, Options};
