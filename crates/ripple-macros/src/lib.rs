use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, Result, Type, parse_macro_input};

/// Derive macro that generates a `Default` implementation for configuration
/// structs from inline `#[default(...)]` values.
///
/// Fields of type `String` accept string literals directly. Fields without a
/// `#[default(...)]` attribute fall back to their own `Default` value, which
/// keeps optional overrides (`Option<T>`) free of boilerplate.
///
/// # Example
/// ```
/// use ripple_macros::ConfigDefaults;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(ConfigDefaults, Serialize, Deserialize)]
/// #[serde(default)]
/// pub struct MotionConfig {
///     #[default(10)]
///     pub tick_interval_ms: u64,
///
///     #[default("semi_implicit_euler")]
///     pub integrator: String,
///
///     pub seed: Option<u64>,
/// }
///
/// let config = MotionConfig::default();
/// assert_eq!(config.tick_interval_ms, 10);
/// assert_eq!(config.integrator, "semi_implicit_euler");
/// assert_eq!(config.seed, None);
/// ```
///
/// # Errors
///
/// Compilation fails if the macro is applied to anything other than a struct
/// with named fields, or if a `#[default()]` attribute is present but empty.
#[proc_macro_derive(ConfigDefaults, attributes(default))]
pub fn config_defaults(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    &input,
                    "ConfigDefaults only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input,
                "ConfigDefaults can only be derived for structs",
            ));
        }
    };

    let initializers = fields
        .iter()
        .map(field_initializer)
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::core::default::Default for #name #ty_generics #where_clause {
            fn default() -> Self {
                Self {
                    #(#initializers),*
                }
            }
        }
    })
}

fn field_initializer(field: &Field) -> Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;

    let Some(value) = default_value(field)? else {
        return Ok(quote! { #ident: ::core::default::Default::default() });
    };

    if is_string(&field.ty) {
        Ok(quote! { #ident: ::std::convert::Into::into(#value) })
    } else {
        Ok(quote! { #ident: #value })
    }
}

/// Tokens inside `#[default(...)]`, or `None` when the field has no such attribute.
fn default_value(field: &Field) -> Result<Option<TokenStream2>> {
    let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("default")) else {
        return Ok(None);
    };

    let tokens: TokenStream2 = attr.parse_args().map_err(|e| {
        Error::new_spanned(attr, format!("invalid #[default(...)] attribute: {e}"))
    })?;

    if tokens.is_empty() {
        return Err(Error::new_spanned(
            attr,
            "#[default()] is empty; provide a value or remove the attribute",
        ));
    }

    Ok(Some(tokens))
}

fn is_string(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Path(path) if path.path.segments.last().is_some_and(|s| s.ident == "String")
    )
}
