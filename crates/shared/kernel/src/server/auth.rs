//! Access-level checks for key-protected triggers.
//!
//! A key is presented in the `x-functions-key` header or the `code` query parameter.
//! `function` level admits the function key or the master key, `admin` only the master key.
//! When no key is configured for the declared level the check is off (local development).

use super::AppState;
use axum::extract::{FromRequestParts, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use optbind_domain::config::{AuthLevel, FunctionKeys};
use optbind_domain::constants::{FUNCTION_KEY_HEADER, FUNCTION_KEY_QUERY};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

#[optbind_derive::optbind_error]
pub enum AuthError {
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(error = %self, "Request rejected by access level");
        (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

fn accepted_keys(level: AuthLevel, keys: &FunctionKeys) -> Vec<&str> {
    let accepted = match level {
        AuthLevel::Anonymous => vec![],
        AuthLevel::Function => vec![keys.function.as_deref(), keys.master.as_deref()],
        AuthLevel::Admin => vec![keys.master.as_deref()],
    };
    accepted.into_iter().flatten().filter(|key| !key.is_empty()).collect()
}

/// Returns `true` if requests at `level` must present a key.
#[must_use]
pub fn is_enforced(level: AuthLevel, keys: &FunctionKeys) -> bool {
    !accepted_keys(level, keys).is_empty()
}

/// Checks a presented key against the keys accepted at `level`.
///
/// # Errors
/// Returns [`AuthError::Unauthorized`] if a key is required and missing or not accepted.
pub fn authorize(
    level: AuthLevel,
    keys: &FunctionKeys,
    presented: Option<&str>,
) -> Result<(), AuthError> {
    let accepted = accepted_keys(level, keys);
    if accepted.is_empty() {
        return Ok(());
    }

    match presented {
        Some(key) if accepted.contains(&key) => Ok(()),
        Some(_) => Err(AuthError::Unauthorized { message: "key not accepted".into(), context: None }),
        None => Err(AuthError::Unauthorized { message: "key missing".into(), context: None }),
    }
}

fn presented_key(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(FUNCTION_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| {
            Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(mut params)| params.remove(FUNCTION_KEY_QUERY))
        })
}

/// Extractor admitting requests that satisfy the trigger's declared access level.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let function = &state.config.function;
        authorize(function.auth_level, &function.keys, presented_key(parts).as_deref())?;
        Ok(Self)
    }
}
