use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::parse::{Parse, ParseStream};
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Runtime preset named in `#[main(...)]`.
enum Profile {
    Default,
    HighPerformance,
    MemoryEfficient,
}

impl Parse for Profile {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(Self::Default);
        }
        let ident: Ident = input.parse()?;
        match ident.to_string().as_str() {
            "default" => Ok(Self::Default),
            "high_performance" => Ok(Self::HighPerformance),
            "memory_efficient" => Ok(Self::MemoryEfficient),
            _ => Err(Error::new_spanned(
                ident,
                "unknown runtime profile, expected one of: default, high_performance, memory_efficient",
            )),
        }
    }
}

impl ToTokens for Profile {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let preset = match self {
            Self::Default => quote!(default),
            Self::HighPerformance => quote!(high_performance),
            Self::MemoryEfficient => quote!(memory_efficient),
        };
        tokens.extend(quote!(::optbind_runtime::RuntimeConfig::#preset()));
    }
}

/// Expands `#[optbind_runtime::main]`: turns an `async fn` returning a `Result`
/// into a plain fn that blocks on the profiled runtime.
pub fn expand_main(args: TokenStream, entry: ItemFn) -> TokenStream {
    let profile = match syn::parse2::<Profile>(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };
    if let Err(err) = check_signature(&entry) {
        return err.to_compile_error();
    }

    let ItemFn { attrs, vis, sig, block } = entry;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let runtime = ::optbind_runtime::build_runtime_with_config(&#profile)?;
            runtime.block_on(async move #block)
        }
    }
}

fn check_signature(entry: &ItemFn) -> syn::Result<()> {
    if entry.sig.asyncness.is_none() {
        return Err(Error::new_spanned(&entry.sig.fn_token, "#[main] requires an async fn"));
    }
    if !entry.sig.inputs.is_empty() {
        return Err(Error::new_spanned(&entry.sig.inputs, "#[main] fn takes no arguments"));
    }

    let returns_result = match &entry.sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path.path.segments.last().is_some_and(|s| s.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if returns_result {
        Ok(())
    } else {
        Err(Error::new_spanned(&entry.sig, "#[main] fn must return a Result"))
    }
}
