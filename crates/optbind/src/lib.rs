//! Facade crate for the function host.
//! Re-exports domain/kernel primitives and wires every enabled function slice into
//! one [`AppState`] and one router. Keep it thin: slices own their logic.
//!
//! ## Usage
//! - Build a [`SettingsSource`] and a [`HostConfig`] at startup.
//! - Call [`init`] once, then serve [`server::router`] with the returned state.

pub use optbind_domain as domain;
pub use optbind_kernel as kernel;

use optbind_kernel::config::SettingsSource;
use optbind_kernel::domain::config::HostConfig;
use optbind_kernel::server::{AppState, is_enforced};
use std::sync::Once;

pub mod server {
    use optbind_kernel::server::AppState;
    use utoipa_axum::router::OpenApiRouter;

    pub use optbind_kernel::server::router::system_router;

    /// System routes merged with every enabled function slice.
    pub fn router() -> OpenApiRouter<AppState> {
        let router = system_router();
        #[cfg(feature = "sample")]
        let router = router.merge(optbind_sample::router());
        router
    }
}

/// Function slices compiled into this build.
pub mod features {
    #[cfg(feature = "sample")]
    pub use optbind_sample as sample;

    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "sample")]
        "sample",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

static OPEN_ACCESS_WARNING: Once = Once::new();

/// Binds the settings of every enabled slice and freezes the state.
///
/// # Errors
/// Returns an error if a slice cannot bind its settings section.
pub fn init(
    config: &HostConfig,
    source: &SettingsSource,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let function = &config.function;
    if !is_enforced(function.auth_level, &function.keys) {
        OPEN_ACCESS_WARNING.call_once(|| {
            tracing::warn!(
                level = ?function.auth_level,
                "No function key configured; triggers accept unauthenticated requests"
            );
        });
    }

    let builder = AppState::builder().config(config.clone());

    #[cfg(feature = "sample")]
    let builder = features::sample::init(builder, source)?;
    #[cfg(not(feature = "sample"))]
    let _ = source;

    let state = builder.build()?;
    tracing::info!(features = ?features::ENABLED, "Function slices initialized");
    Ok(state)
}
