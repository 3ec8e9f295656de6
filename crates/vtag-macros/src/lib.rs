//! Procedural macros for vtag
//!
//! This crate provides `#[derive(Validate)]`, which builds a `vtag::Schema`
//! from `#[validate(...)]` field attributes:
//!
//! - `rules = "required,min=3"` - rule expression for the field
//! - `title = "Name"` - display name used in messages
//! - `title_<locale> = "..."` - display name for one locale, e.g. `title_fa`
//! - `format` - render numeric rule params with locale digit grouping
//! - `nested` - validate the field against its own type's schema
//! - `skip` - leave the field out of validation
//! - `name = "..."` - serialized key, when it differs from the field name
//!
//! On the struct itself, `#[validate(name = "...")]` sets the schema name used
//! for struct-scoped translations.
//!
//! Field keys follow serde: `#[serde(rename = "...")]` on a field and
//! `#[serde(rename_all = "...")]` on the struct change the key a field is
//! looked up by, and `#[serde(skip)]` / `#[serde(skip_serializing)]` fields are
//! skipped. An explicit `#[validate(name = "...")]` wins over both.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, GenericArgument, LitStr,
    PathArguments, Token, Type,
};

/// Derive `vtag::Validate`.
///
/// # Example
///
/// ```rust,ignore
/// use vtag::Validate;
///
/// #[derive(serde::Serialize, Validate)]
/// struct Signup {
///     #[validate(rules = "required,username", title = "Username", title_fa = "نام کاربری")]
///     username: String,
///
///     #[validate(rules = "omitempty,mobile")]
///     mobile: Option<String>,
///
///     #[validate(nested)]
///     address: Option<Address>,
/// }
/// ```
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    rules: Option<String>,
    title: Option<String>,
    titles: Vec<(String, String)>,
    format: bool,
    nested: bool,
    skip: bool,
}

/// What serde says about a field's serialized form.
#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    skipped: bool,
}

/// serde `rename_all` rules, applied to snake_case field names.
#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        let rule = match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!("unknown rename_all rule `{other}`"),
                ));
            }
        };
        Ok(rule)
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

/// Consume the value of a serde attribute we do not interpret.
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.input.parse::<proc_macro2::TokenTree>()?;
    }
    Ok(())
}

/// Read `rename = "..."` or `rename(serialize = "...")`.
fn parse_serialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?));
    }

    let mut name = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            name = Some(inner.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            skip_meta_value(&inner)
        }
    })?;
    Ok(name)
}

fn parse_serde_rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if let Some(lit) = parse_serialize_name(&meta)? {
                    rule = Some(RenameRule::from_lit(&lit)?);
                }
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        })?;
    }
    Ok(rule)
}

fn parse_serde_field(field: &Field) -> syn::Result<SerdeField> {
    let mut serde = SerdeField::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if let Some(lit) = parse_serialize_name(&meta)? {
                    serde.rename = Some(lit.value());
                }
                Ok(())
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde.skipped = true;
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        })?;
    }
    Ok(serde)
}

fn parse_struct_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
    }
    Ok(name)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("validate") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let Some(ident) = meta.path.get_ident() else {
                return Err(meta.error("expected an identifier"));
            };
            let key = ident.to_string();

            match key.as_str() {
                "rules" => {
                    let rules = meta.value()?.parse::<LitStr>()?.value();
                    attrs.rules = Some(match attrs.rules.take() {
                        Some(existing) if !existing.is_empty() => format!("{existing},{rules}"),
                        _ => rules,
                    });
                }
                "title" => attrs.title = Some(meta.value()?.parse::<LitStr>()?.value()),
                "name" => attrs.name = Some(meta.value()?.parse::<LitStr>()?.value()),
                "format" => attrs.format = true,
                "nested" => attrs.nested = true,
                "skip" => attrs.skip = true,
                other => match other.strip_prefix("title_") {
                    Some(locale) if !locale.is_empty() => {
                        let title = meta.value()?.parse::<LitStr>()?.value();
                        attrs.titles.push((locale.to_string(), title));
                    }
                    _ => {
                        return Err(meta.error(format!("unknown validate attribute `{other}`")));
                    }
                },
            }
            Ok(())
        })?;
    }

    Ok(attrs)
}

/// `T` for `Option<T>`, `Box<T>` and `Vec<T>`, recursively.
fn inner_type(ty: &Type) -> &Type {
    let Type::Path(path) = ty else {
        return ty;
    };
    let Some(segment) = path.path.segments.last() else {
        return ty;
    };
    if !matches!(segment.ident.to_string().as_str(), "Option" | "Box" | "Vec") {
        return ty;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return ty;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => inner_type(inner),
        _ => ty,
    }
}

fn field_schema(field: &Field, rename_all: Option<RenameRule>) -> syn::Result<TokenStream2> {
    let attrs = parse_field_attrs(field)?;
    let serde = parse_serde_field(field)?;
    let name = match (&attrs.name, serde.rename, &field.ident) {
        (Some(name), _, _) => name.clone(),
        (None, Some(rename), _) => rename,
        (None, None, Some(ident)) => {
            let ident = ident.unraw().to_string();
            match rename_all {
                Some(rule) => rule.apply(&ident),
                None => ident,
            }
        }
        (None, None, None) => {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        }
    };

    let mut tokens = quote! { ::vtag::FieldSchema::new(#name) };
    if let Some(rules) = &attrs.rules {
        tokens.extend(quote! { .rules(#rules) });
    }
    if let Some(title) = &attrs.title {
        tokens.extend(quote! { .title(#title) });
    }
    for (locale, title) in &attrs.titles {
        tokens.extend(quote! { .title_in(#locale, #title) });
    }
    if attrs.format {
        tokens.extend(quote! { .format() });
    }
    if attrs.nested {
        let inner = inner_type(&field.ty);
        tokens.extend(quote! { .nested::<#inner>() });
    }
    if attrs.skip || serde.skipped {
        tokens.extend(quote! { .skip() });
    }

    Ok(tokens)
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "Validate can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "Validate can only be derived for structs with named fields",
        ));
    };

    let schema_name = parse_struct_name(&input.attrs)?.unwrap_or_else(|| ident.to_string());
    let rename_all = parse_serde_rename_all(&input.attrs)?;
    let fields = named
        .named
        .iter()
        .map(|field| field_schema(field, rename_all))
        .collect::<syn::Result<Vec<_>>>()?;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::vtag::Validate for #ident #ty_generics #where_clause {
            fn schema() -> ::vtag::Schema {
                ::vtag::Schema::new(#schema_name)
                    #(.field(#fields))*
            }
        }
    })
}
