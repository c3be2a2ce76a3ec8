use heck::ToSnekCase;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Lit, Meta, parse_macro_input, spanned::Spanned};

const SUPPORTED_STRUCT_ATTRIBUTES: &[&str] = &[r#"prefix = "<PREFIX>""#, "prefix"];
const SUPPORTED_FIELD_ATTRIBUTES: &[&str] = &["skip", "flatten", r#"rename = "<NAME>""#];

#[derive(Debug, Clone)]
enum PrefixConfig {
    /// No prefix unless the caller sets one (default behavior)
    None,
    /// Use struct name as prefix
    StructName(String),
    /// Use custom prefix
    Custom(String),
}

impl PrefixConfig {
    fn default_prefix_fn(&self) -> Option<proc_macro2::TokenStream> {
        let prefix = match self {
            PrefixConfig::None => return None,
            PrefixConfig::StructName(prefix) | PrefixConfig::Custom(prefix) => prefix,
        };
        Some(quote! {
            fn default_prefix() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#prefix)
            }
        })
    }
}

#[derive(Debug, Default)]
struct FieldConfig {
    skip: bool,
    flatten: bool,
    rename: Option<String>,
}

/// Derive macro for EnvBind trait
///
/// Describes the struct's shape and binds every field under its name, converted by
/// the load's formatters (UPPER_SNAKE_CASE by default).
///
/// Supports struct-level attributes:
/// - `#[env_bind(prefix = "PREFIX")]` - default prefix for every derived name
/// - `#[env_bind(prefix)]` - use the struct name in snake_case as default prefix
///
/// Supports field-level attributes:
/// - `#[env_bind(skip)]` - never bind this field (keeps its current value)
/// - `#[env_bind(flatten)]` - bind the field's members with and without the field name
/// - `#[env_bind(rename = "name")]` - use `name` as this field's path segment
///
#[proc_macro_derive(EnvBind, attributes(env_bind))]
pub fn derive_env_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    // Parse struct-level attributes for prefix configuration
    let prefix_config = match parse_struct_prefix_config(&input).map_err(|e| e.into_compile_error())
    {
        Ok(config) => config,
        Err(e) => return e.into(),
    };

    expand_env_bind(input, &prefix_config)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_env_bind(
    input: DeriveInput,
    prefix_config: &PrefixConfig,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            o => {
                return Err(syn::Error::new(
                    o.span(),
                    "EnvBind can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "EnvBind can only be derived for structs",
            ));
        }
    };

    let mut shapes = Vec::new();
    let mut bindings = Vec::new();
    let mut bounds = Vec::new();

    for field in fields {
        let config = parse_field_config(field)?;
        if config.skip {
            continue;
        }

        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new(field.span(), "EnvBind fields must be named")
        })?;
        let ty = &field.ty;
        let segment = config
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
        let flatten = config.flatten;

        shapes.push(quote! {
            ::env_bind::FieldShape::new(#segment, <#ty as ::env_bind::EnvBind>::shape(), #flatten)
        });
        bindings.push(quote! {
            walker.field::<Self, #ty>(#segment, #flatten, |target: &mut Self| &mut target.#ident, emit);
        });
        bounds.push(quote! { #ty: ::env_bind::EnvBind });
    }

    let default_prefix = prefix_config.default_prefix_fn();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let predicates = where_clause.map(|clause| &clause.predicates);

    let expanded = quote! {
        impl #impl_generics ::env_bind::EnvBind for #name #ty_generics
        where
            Self: ::core::default::Default + 'static,
            #(#bounds,)*
            #predicates
        {
            fn shape() -> ::env_bind::Shape {
                ::env_bind::Shape::Struct {
                    name: #name_str,
                    fields: ::std::vec![#(#shapes),*],
                }
            }

            #[allow(unused_variables)]
            fn analyze(
                walker: &::env_bind::Walker,
                emit: &mut dyn FnMut(::env_bind::Leaf<Self>),
            ) {
                #(#bindings)*
            }

            #default_prefix
        }
    };
    Ok(expanded)
}

fn parse_struct_prefix_config(input: &DeriveInput) -> syn::Result<PrefixConfig> {
    let struct_name = input.ident.to_string();

    // Default behavior: no prefix
    let mut prefix_config = PrefixConfig::None;

    // Check for struct-level attributes
    for attr in &input.attrs {
        if attr.path().is_ident("env_bind") {
            if let Meta::List(meta_list) = &attr.meta {
                let nested_metas = meta_list.parse_args_with(
                    syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
                )?;

                for nested in nested_metas {
                    match nested {
                        Meta::Path(path) if path.is_ident("prefix") => {
                            // Convert PascalCase struct name to snake_case for the prefix
                            prefix_config = PrefixConfig::StructName(struct_name.to_snek_case());
                        }
                        Meta::NameValue(name_value) if name_value.path.is_ident("prefix") => {
                            if let syn::Expr::Lit(syn::ExprLit {
                                lit: Lit::Str(lit_str),
                                ..
                            }) = &name_value.value
                            {
                                prefix_config = PrefixConfig::Custom(lit_str.value());
                            } else {
                                return Err(syn::Error::new(
                                    name_value.value.span(),
                                    "prefix must be a string literal",
                                ));
                            }
                        }
                        o => {
                            return Err(syn::Error::new(
                                o.span(),
                                format!(
                                    "Unsupported struct attribute. Supported attributes include: {SUPPORTED_STRUCT_ATTRIBUTES:?}"
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }

    Ok(prefix_config)
}

fn parse_field_config(field: &Field) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in &field.attrs {
        if attr.path().is_ident("env_bind") {
            if let Meta::List(meta_list) = &attr.meta {
                let nested_metas = meta_list.parse_args_with(
                    syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
                )?;

                for nested in nested_metas {
                    match nested {
                        Meta::Path(path) if path.is_ident("skip") => {
                            config.skip = true;
                        }
                        Meta::Path(path) if path.is_ident("flatten") => {
                            config.flatten = true;
                        }
                        Meta::NameValue(name_value) if name_value.path.is_ident("rename") => {
                            if let syn::Expr::Lit(syn::ExprLit {
                                lit: Lit::Str(lit_str),
                                ..
                            }) = &name_value.value
                            {
                                config.rename = Some(lit_str.value());
                            } else {
                                return Err(syn::Error::new(
                                    name_value.value.span(),
                                    "rename must be a string literal",
                                ));
                            }
                        }
                        other => {
                            return Err(syn::Error::new(
                                other.span(),
                                format!(
                                    "Unsupported field attribute. Supported attributes: {SUPPORTED_FIELD_ATTRIBUTES:?}"
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }

    // Validate attribute combinations
    if config.skip && (config.flatten || config.rename.is_some()) {
        return Err(syn::Error::new(
            field.span(),
            "Cannot use 'skip' with other attributes",
        ));
    }

    Ok(config)
}
