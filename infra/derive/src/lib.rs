#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! Procedural macros of the function host.
//!
//! * [`macro@optbind_error`]: error enums with `.context()` and `From` wiring.
//! * [`macro@api_handler`]: `OpenAPI`-documented axum handlers.
//! * [`macro@main`]: the profiled Tokio entry point, re-exported as `optbind_runtime::main`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Runs an `async fn` returning a `Result` on an `optbind_runtime` profile.
///
/// Profiles: `default`, `high_performance`, `memory_efficient`.
///
/// ```rust,ignore
/// #[optbind_runtime::main(memory_efficient)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Documents an async handler with `utoipa::path`; arguments are passed through.
///
/// ```rust,ignore
/// #[api_handler(method(get, post), path = "/api/SampleHttpTrigger", tag = "Functions")]
/// async fn sample_http_trigger() -> String {
///     String::new()
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a `thiserror` error with a companion `<Name>Ext` trait.
///
/// Rules:
/// * every variant has named fields;
/// * a variant wrapping an upstream error names the field `source` (or marks it
///   `#[source]`) and also has `context: Option<Cow<'static, str>>`;
/// * an `Internal { message, context }` variant accepts `&'static str` and `String`.
///
/// Generated: `Debug`/`Error` derives when missing, `From<Source>`, `<Name>Ext::context`
/// on `Result<T, Name>` and on `Result<T, Source>`, and a module-level
/// `format_context` helper for `#[error(...)]` strings.
///
/// ```rust,ignore
/// #[optbind_error]
/// pub enum SettingsError {
///     #[error("Settings file error{}: {source}", format_context(.context))]
///     File { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, SettingsError> {
///     std::fs::read_to_string(path).context("reading local.settings.json")
/// }
/// ```
#[proc_macro_attribute]
pub fn optbind_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
