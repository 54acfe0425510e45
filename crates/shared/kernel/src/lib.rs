//! Kernel utilities shared across function slices.
//! Keep this crate lightweight: it owns settings binding, host config loading and the
//! HTTP state (options registry, key checks, health) every slice builds on.
//!
//! ## Binding a section
//! ```rust
//! use optbind_kernel::config::SettingsSource;
//! use optbind_kernel::domain::settings::ConfigurationSettings;
//!
//! let source = SettingsSource::from_pairs([("MyConfigSectionPrefix:ConfigSetting1", "A")]);
//! let settings: ConfigurationSettings = source.bind().unwrap();
//! assert_eq!(settings.config_setting1.as_deref(), Some("A"));
//! ```
//!
//! ## Host config loading
//! ```rust,ignore
//! use optbind_kernel::config::load_host_config;
//! let cfg = load_host_config(Some("function")).unwrap();
//! ```
pub mod config;
pub mod prelude;
pub mod server;

pub use optbind_domain as domain;
