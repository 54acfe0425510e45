//! `SampleHttpTrigger`: answers GET and POST with the three values bound from the
//! `MyConfigSectionPrefix` settings section.

mod error;
mod handler;

pub use crate::error::{SampleError, SampleErrorExt};

use optbind_kernel::config::SettingsSource;
use optbind_kernel::domain::settings::ConfigurationSettings;
use optbind_kernel::server::{AppState, AppStateBuilder};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Binds [`ConfigurationSettings`] from `source` and registers it with the state.
///
/// # Errors
/// Returns [`SampleError::State`] if a setting cannot be bound.
pub fn init(builder: AppStateBuilder, source: &SettingsSource) -> Result<AppStateBuilder, SampleError> {
    let builder = builder
        .bind::<ConfigurationSettings>(source)
        .context("Failed to register sample trigger settings")?;
    tracing::info!("Sample trigger initialized");
    Ok(builder)
}

/// Routes served by this trigger.
pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handler::sample_http_trigger))
}

/// Formats the response body. Absent values render as empty text.
#[must_use]
pub fn render(settings: &ConfigurationSettings) -> String {
    format!(
        "ConfigValue1 = {}, ConfigValue2 = {}, ConfigValue3 = {}",
        settings.config_setting1.as_deref().unwrap_or_default(),
        settings.config_setting2.as_deref().unwrap_or_default(),
        settings.config_setting3.as_deref().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_reports_unbindable_section_as_state_error() {
        let source = SettingsSource::from_pairs([("MyConfigSectionPrefix:ConfigSetting1:Nested", "x")]);

        let err = init(AppState::builder(), &source).expect_err("a section is not a string");
        assert!(matches!(err, SampleError::State { .. }));
        let message = err.to_string();
        assert!(message.starts_with("Sample trigger state error (Failed to register sample trigger settings)"));
        assert!(message.to_ascii_lowercase().contains("configsetting1"));
    }

    #[test]
    fn test_render_all_values() {
        let settings = ConfigurationSettings {
            config_setting1: Some("A".into()),
            config_setting2: Some("B".into()),
            config_setting3: Some("C".into()),
        };
        assert_eq!(render(&settings), "ConfigValue1 = A, ConfigValue2 = B, ConfigValue3 = C");
    }

    #[test]
    fn test_render_absent_values_as_empty() {
        assert_eq!(
            render(&ConfigurationSettings::default()),
            "ConfigValue1 = , ConfigValue2 = , ConfigValue3 = "
        );
    }

    #[test]
    fn test_render_keeps_values_verbatim() {
        let settings = ConfigurationSettings {
            config_setting1: Some(String::new()),
            config_setting2: Some("a, b = c".into()),
            config_setting3: None,
        };
        assert_eq!(render(&settings), "ConfigValue1 = , ConfigValue2 = a, b = c, ConfigValue3 = ");
    }
}
