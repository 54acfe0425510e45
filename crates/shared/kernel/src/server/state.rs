use crate::config::{ConfigError, SettingsSource};
use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fxhash::FxHashMap;
use optbind_domain::config::HostConfig;
use optbind_domain::settings::ConfigSection;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{error, info};

use super::Options;

#[optbind_derive::optbind_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing options{}: {message}", format_context(.context))]
    MissingOptions { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },
}

impl IntoResponse for ApiStateError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request rejected by application state");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

#[derive(Debug)]
pub struct AppStateInner {
    pub config: HostConfig,
    options: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// Process-wide state handed to every handler.
///
/// Holds the host config and the options registry: values bound once at startup,
/// immutable afterwards and retrieved by type.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Returns the registered value of type `T`, if any.
    #[must_use]
    pub fn options<T>(&self) -> Option<Options<T>>
    where
        T: Send + Sync + 'static,
    {
        self.inner
            .options
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
            .map(Options::from)
    }

    /// Returns the registered value of type `T`.
    ///
    /// # Errors
    /// Returns [`ApiStateError::MissingOptions`] if nothing of type `T` was registered.
    pub fn try_options<T>(&self) -> Result<Options<T>, ApiStateError>
    where
        T: Send + Sync + 'static,
    {
        self.options::<T>().ok_or_else(|| ApiStateError::MissingOptions {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Iterates over registered option type IDs (for diagnostics).
    pub fn option_ids(&self) -> impl Iterator<Item = &TypeId> {
        self.inner.options.keys()
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<AppState> for HostConfig {
    fn from_ref(state: &AppState) -> Self {
        state.inner.config.clone()
    }
}

#[derive(Debug, Default)]
pub struct AppStateBuilder {
    config: Option<HostConfig>,
    options: FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Registers an already constructed value. A later value of the same type replaces it.
    #[must_use]
    pub fn register<T>(mut self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.options.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Binds `T` from its settings section and registers the result.
    ///
    /// # Errors
    /// Returns [`ApiStateError::Config`] if the section cannot be bound into `T`.
    pub fn bind<T>(self, source: &SettingsSource) -> Result<Self, ApiStateError>
    where
        T: ConfigSection + DeserializeOwned,
    {
        let value = source.bind::<T>().context(format!("Failed to bind {}", T::SECTION))?;
        info!(section = T::SECTION, ty = std::any::type_name::<T>(), "Settings section bound");
        Ok(self.register(value))
    }

    pub fn build(self) -> Result<AppState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "HostConfig not provided".into(),
            context: None,
        })?;

        Ok(AppState { inner: Arc::new(AppStateInner { config, options: self.options }) })
    }
}
