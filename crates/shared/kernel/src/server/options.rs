use super::{ApiStateError, AppState};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared, read-only handle to a value registered in [`AppState`].
///
/// Used as an extractor it retrieves the value by type; a type that was never
/// registered rejects the request with [`ApiStateError::MissingOptions`].
pub struct Options<T>(pub Arc<T>);

impl<T> Options<T> {
    /// Returns the shared value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T> From<Arc<T>> for Options<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

impl<T> Clone for Options<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Options<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Options").field(&self.0).finish()
    }
}

impl<T> FromRequestParts<AppState> for Options<T>
where
    T: Send + Sync + 'static,
{
    type Rejection = ApiStateError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.try_options::<T>()
    }
}
