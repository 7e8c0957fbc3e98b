//! Parsing utilities for the section derive.
//!
//! This module parses `#[section(...)]` and `#[setting(...)]` attributes and
//! the struct they decorate.

use proc_macro2::Span;
use syn::{
    ext::IdentExt, punctuated::Punctuated, spanned::Spanned, Attribute, Data, DeriveInput, Expr,
    ExprLit, Fields, Ident, Lit, Meta, Token,
};

/// Content type named in a `#[setting]` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Plain string content.
    String,
    /// JSON content.
    Json,
    /// Secret-reference content.
    SecretRef,
}

impl ContentKind {
    fn parse(value: &str, span: Span) -> syn::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(Self::String),
            "json" | "application/json" => Ok(Self::Json),
            "secret_ref" | "secret" | "keyvault" => Ok(Self::SecretRef),
            _ => Err(syn::Error::new(
                span,
                format!("unknown content_type: {value} (expected string, json or secret_ref)"),
            )),
        }
    }

    /// The `ContentType` variant this kind maps to.
    pub fn variant(self) -> Ident {
        let name = match self {
            Self::String => "String",
            Self::Json => "Json",
            Self::SecretRef => "SecretRef",
        };
        Ident::new(name, Span::call_site())
    }
}

/// Parsed `#[setting(...)]` attribute.
#[derive(Debug)]
pub struct SettingAttrs {
    /// Store key.
    pub key: String,
    /// Declared content type.
    pub content_type: ContentKind,
    /// Whether the key is watched for changes.
    pub notify: bool,
}

impl SettingAttrs {
    fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
        let mut key = None;
        let mut content_type = ContentKind::String;
        let mut notify = true;

        let meta_list: Punctuated<Meta, Token![,]> =
            attr.parse_args_with(Punctuated::parse_terminated)?;

        for meta in meta_list {
            let Meta::NameValue(nv) = meta else {
                return Err(syn::Error::new(meta.span(), "expected name = value"));
            };
            let ident = nv
                .path
                .get_ident()
                .ok_or_else(|| syn::Error::new(nv.path.span(), "expected identifier"))?
                .to_string();

            match (ident.as_str(), &nv.value) {
                (
                    "key",
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }),
                ) => key = Some(s.value()),
                (
                    "content_type",
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }),
                ) => content_type = ContentKind::parse(&s.value(), s.span())?,
                (
                    "notify",
                    Expr::Lit(ExprLit {
                        lit: Lit::Bool(b), ..
                    }),
                ) => notify = b.value,
                ("key" | "content_type", _) => {
                    return Err(syn::Error::new(nv.value.span(), "expected string literal"))
                }
                ("notify", _) => {
                    return Err(syn::Error::new(nv.value.span(), "expected boolean literal"))
                }
                _ => {
                    return Err(syn::Error::new(
                        nv.path.span(),
                        format!("unknown attribute: {ident}"),
                    ))
                }
            }
        }

        let key = key.ok_or_else(|| {
            syn::Error::new(attr.span(), "missing required attribute: key")
        })?;

        Ok(Self {
            key,
            content_type,
            notify,
        })
    }
}

/// A struct field carrying a `#[setting]` attribute.
#[derive(Debug)]
pub struct SettingField {
    /// The field identifier.
    pub ident: Ident,
    /// The field name as recorded in the descriptor.
    pub name: String,
    /// The parsed attribute.
    pub attrs: SettingAttrs,
}

/// Parsed derive input.
#[derive(Debug)]
pub struct SectionInput {
    /// Section name from `#[section(name = ...)]`.
    pub section: Option<String>,
    /// Struct-level whole-object marker.
    pub whole_object: Option<SettingAttrs>,
    /// Fields carrying markers, in declaration order.
    pub fields: Vec<SettingField>,
}

impl SectionInput {
    /// Parses a derive input.
    pub fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(syn::Error::new(
                input.ident.span(),
                "ConfigSection can only be derived for structs",
            ));
        };

        let section = find_attr(&input.attrs, "section")
            .map(parse_section_name)
            .transpose()?;
        let whole_object = find_attr(&input.attrs, "setting")
            .map(SettingAttrs::from_attribute)
            .transpose()?;

        let mut fields = Vec::new();
        match &data.fields {
            Fields::Named(named) => {
                for field in &named.named {
                    let Some(attr) = find_attr(&field.attrs, "setting") else {
                        continue;
                    };
                    let ident = field
                        .ident
                        .clone()
                        .ok_or_else(|| syn::Error::new(field.span(), "expected named field"))?;
                    fields.push(SettingField {
                        name: ident.unraw().to_string(),
                        ident,
                        attrs: SettingAttrs::from_attribute(attr)?,
                    });
                }
            }
            Fields::Unit => {}
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "ConfigSection requires named fields",
                ))
            }
        }

        Ok(Self {
            section,
            whole_object,
            fields,
        })
    }
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}

fn parse_section_name(attr: &Attribute) -> syn::Result<String> {
    let meta_list: Punctuated<Meta, Token![,]> =
        attr.parse_args_with(Punctuated::parse_terminated)?;

    match meta_list.into_iter().next() {
        Some(Meta::NameValue(nv)) if nv.path.is_ident("name") => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Ok(s.value()),
            _ => Err(syn::Error::new(nv.value.span(), "expected string literal")),
        },
        Some(other) => Err(syn::Error::new(other.span(), "expected name = \"...\"")),
        None => Err(syn::Error::new(attr.span(), "missing required attribute: name")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_field_settings() {
        let input: DeriveInput = parse_quote! {
            #[section(name = "Cosmos")]
            struct Cosmos {
                #[setting(key = "Cosmos:Enabled")]
                enabled: bool,
                #[setting(
                    key = "Cosmos:ConnectionString",
                    content_type = "secret_ref",
                    notify = false
                )]
                connection_string: String,
                untouched: u32,
            }
        };

        let parsed = SectionInput::parse(&input).unwrap();
        assert_eq!(parsed.section.as_deref(), Some("Cosmos"));
        assert!(parsed.whole_object.is_none());
        assert_eq!(parsed.fields.len(), 2);
        assert_eq!(parsed.fields[0].name, "enabled");
        assert_eq!(parsed.fields[0].attrs.content_type, ContentKind::String);
        assert!(parsed.fields[0].attrs.notify);
        assert_eq!(parsed.fields[1].attrs.content_type, ContentKind::SecretRef);
        assert!(!parsed.fields[1].attrs.notify);
    }

    #[test]
    fn test_parse_whole_object() {
        let input: DeriveInput = parse_quote! {
            #[section(name = "SingleProp:Data")]
            #[setting(key = "SingleProp:Data", content_type = "json")]
            struct Single {
                name: String,
            }
        };

        let parsed = SectionInput::parse(&input).unwrap();
        let whole = parsed.whole_object.unwrap();
        assert_eq!(whole.key, "SingleProp:Data");
        assert_eq!(whole.content_type, ContentKind::Json);
    }

    #[test]
    fn test_missing_section_is_allowed() {
        let input: DeriveInput = parse_quote! {
            struct Plain {
                #[setting(key = "A:B")]
                value: String,
            }
        };
        let parsed = SectionInput::parse(&input).unwrap();
        assert!(parsed.section.is_none());
    }

    #[test]
    fn test_section_name_errors() {
        let wrong_key: DeriveInput = parse_quote! {
            #[section(title = "S")]
            struct Bad {}
        };
        let err = SectionInput::parse(&wrong_key).unwrap_err();
        assert!(err.to_string().contains("expected name"));

        let empty: DeriveInput = parse_quote! {
            #[section()]
            struct Bad {}
        };
        let err = SectionInput::parse(&empty).unwrap_err();
        assert!(err.to_string().contains("missing required attribute: name"));
    }

    #[test]
    fn test_unknown_content_type() {
        let input: DeriveInput = parse_quote! {
            #[section(name = "S")]
            struct Bad {
                #[setting(key = "S:X", content_type = "xml")]
                value: String,
            }
        };
        let err = SectionInput::parse(&input).unwrap_err();
        assert!(err.to_string().contains("unknown content_type"));
    }

    #[test]
    fn test_missing_key() {
        let input: DeriveInput = parse_quote! {
            #[section(name = "S")]
            struct Bad {
                #[setting(notify = false)]
                value: String,
            }
        };
        let err = SectionInput::parse(&input).unwrap_err();
        assert!(err.to_string().contains("missing required attribute: key"));
    }

    #[test]
    fn test_enum_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Nope { A }
        };
        assert!(SectionInput::parse(&input).is_err());
    }
}
