use super::util::derived_trait_names;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, PathArguments, Result, Type,
    Variant,
};

/// Name of the variant that absorbs plain string messages.
const INTERNAL_VARIANT: &str = "Internal";

/// What the expansion needs to know about one variant.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    /// Wrapped upstream error: field name and type.
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a Variant) -> Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(Error::new_spanned(
                variant,
                "optbind_error variants must use named fields",
            ));
        };

        let mut source = None;
        let mut has_context = false;

        for field in &fields.named {
            let Some(name) = &field.ident else { continue };
            if name == "context" {
                if !is_optional_cow_str(&field.ty) {
                    return Err(Error::new_spanned(
                        &field.ty,
                        "`context` must be Option<Cow<'static, str>>",
                    ));
                }
                has_context = true;
            } else if name == "source" || is_marked_source(field) {
                source = Some((name, &field.ty));
            }
        }

        if source.is_some() && !has_context {
            return Err(Error::new_spanned(
                &variant.ident,
                "a variant wrapping a source error also needs `context: Option<Cow<'static, str>>`",
            ));
        }

        Ok(Self { ident: &variant.ident, source, has_context })
    }

    fn is_internal(&self) -> bool {
        self.ident == INTERNAL_VARIANT
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(&input.ident, "optbind_error only applies to enums"));
    };
    let variants = data.variants.iter().map(ErrorVariant::parse).collect::<Result<Vec<_>>>()?;

    let name = &input.ident;
    let ext = format_ident!("{name}Ext");

    let derives = missing_derives(input);
    let ext_trait = ext_trait(name, &ext, &variants);
    let source_impls = variants
        .iter()
        .filter(|v| !v.is_internal())
        .filter_map(|v| v.source.map(|source| source_conversion(name, &ext, v.ident, source)));
    let message_impls = variants.iter().find(|v| v.is_internal()).map(|v| message_conversion(name, v));

    Ok(quote! {
        #derives
        #input

        #ext_trait
        #(#source_impls)*
        #message_impls

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> String {
            context.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
        }
    })
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let present = derived_trait_names(&input.attrs);
    let debug = (!present.contains("Debug")).then(|| quote!(Debug));
    let error = (!present.contains("Error")).then(|| quote!(::thiserror::Error));
    let missing = debug.into_iter().chain(error).collect::<Vec<_>>();

    if missing.is_empty() { quote!() } else { quote!(#[derive(#(#missing),*)]) }
}

/// `<Name>Ext::context` for results that already carry this error.
fn ext_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        quote!(#name::#ident { context, .. } => *context = Some(new_context.into()),)
    });

    quote! {
        pub trait #ext<T> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        impl<T> #ext<T> for Result<T, #name> {
            fn context(self, new_context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    #[allow(unreachable_patterns)]
                    match &mut err {
                        #(#arms)*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

/// `From<Source>` plus `.context()` directly on `Result<T, Source>`.
fn source_conversion(
    name: &Ident,
    ext: &Ident,
    variant: &Ident,
    (field, ty): (&Ident, &Type),
) -> TokenStream {
    quote! {
        impl From<#ty> for #name {
            fn from(#field: #ty) -> Self {
                Self::#variant { #field, context: None }
            }
        }

        impl<T> #ext<T> for Result<T, #ty> {
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name> {
                self.map_err(|#field| #name::#variant { #field, context: Some(context.into()) })
            }
        }
    }
}

/// Lets `"message".into()` and `format!(..).into()` build the `Internal` variant.
fn message_conversion(name: &Ident, internal: &ErrorVariant<'_>) -> TokenStream {
    let ident = internal.ident;
    let context = internal.has_context.then(|| quote!(context: None,));

    quote! {
        impl From<&'static str> for #name {
            fn from(message: &'static str) -> Self {
                Self::#ident { message: std::borrow::Cow::Borrowed(message), #context }
            }
        }

        impl From<String> for #name {
            fn from(message: String) -> Self {
                Self::#ident { message: std::borrow::Cow::Owned(message), #context }
            }
        }
    }
}

fn is_marked_source(field: &Field) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident("source") || attr.path().is_ident("from"))
}

/// Matches `Option<Cow<'static, str>>`, by last path segment.
fn is_optional_cow_str(ty: &Type) -> bool {
    let Some(inner) = single_type_argument(ty, "Option") else {
        return false;
    };
    let Type::Path(cow) = inner else {
        return false;
    };
    let Some(segment) = cow.path.segments.last().filter(|s| s.ident == "Cow") else {
        return false;
    };
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    matches!(
        (args.next(), args.next()),
        (Some(GenericArgument::Lifetime(lt)), Some(GenericArgument::Type(Type::Path(s))))
            if lt.ident == "static" && s.path.is_ident("str")
    )
}

fn single_type_argument<'t>(ty: &'t Type, wrapper: &str) -> Option<&'t Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last().filter(|s| s.ident == wrapper)?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else { return None };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
