//! HTTP building blocks shared by function slices.

mod auth;
mod health;
mod options;
pub mod router;
mod state;

pub use auth::{AuthError, AuthErrorExt, Authorized, authorize, is_enforced};
pub use options::Options;
pub use state::{ApiStateError, ApiStateErrorExt, AppState, AppStateBuilder, AppStateInner};
