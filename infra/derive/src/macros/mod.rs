pub mod api;
pub mod error;
pub mod runtime;
mod util;
