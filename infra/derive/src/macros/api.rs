use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, ItemFn};

/// Expands `#[api_handler(...)]`: documents an async axum handler with `utoipa::path`.
///
/// The arguments are handed to `utoipa::path` untouched.
pub fn expand_api_handler(args: TokenStream, handler: ItemFn) -> TokenStream {
    if handler.sig.asyncness.is_none() {
        return Error::new_spanned(&handler.sig.fn_token, "api_handler expects an async fn")
            .to_compile_error();
    }
    if args.is_empty() {
        return Error::new_spanned(
            &handler.sig.ident,
            "api_handler needs at least a method and a `path = \"...\"`",
        )
        .to_compile_error();
    }

    quote! {
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #handler
    }
}
