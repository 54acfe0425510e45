//! Typed settings bound from named configuration sections.

use crate::constants::SAMPLE_SECTION;
use serde::Deserialize;

/// A strongly-typed view over one configuration section.
///
/// Implementors name the section prefix they are bound from; the kernel binder
/// copies every key under `SECTION:` into the matching field.
pub trait ConfigSection: Default + Send + Sync + 'static {
    /// Section prefix, e.g. `MyConfigSectionPrefix`.
    const SECTION: &'static str;
}

/// Settings consumed by the `SampleHttpTrigger` function.
///
/// Values are opaque strings owned by the deployment. A field is `None` when
/// its key is absent from the section.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ConfigurationSettings {
    pub config_setting1: Option<String>,
    pub config_setting2: Option<String>,
    pub config_setting3: Option<String>,
}

impl ConfigSection for ConfigurationSettings {
    const SECTION: &'static str = SAMPLE_SECTION;
}
