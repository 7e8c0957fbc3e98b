//! Section derive implementation.
//!
//! This module contains the code generation for `#[derive(ConfigSection)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{SectionInput, SettingAttrs};

/// Expands `#[derive(ConfigSection)]`.
///
/// The generated impl carries:
/// 1. The descriptor table (section, whole-object marker, field markers)
/// 2. Per-field encode/decode arms routed through `confmap_core::codec`
/// 3. Whole-object encode/decode when the struct itself carries `#[setting]`
pub fn expand_section(input: TokenStream) -> syn::Result<TokenStream> {
    let derive_input: DeriveInput = syn::parse2(input)?;
    let parsed = SectionInput::parse(&derive_input)?;

    let name = &derive_input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = derive_input.generics.split_for_impl();

    let section_call = parsed.section.as_ref().map(|section| {
        quote! { .section(#section) }
    });
    let whole_object_call = parsed.whole_object.as_ref().map(|attrs| {
        let marker = marker_tokens(attrs);
        quote! { .whole_object(#marker) }
    });

    let field_calls = parsed.fields.iter().map(|field| {
        let field_name = &field.name;
        let marker = marker_tokens(&field.attrs);
        quote! { .field(#field_name, #marker) }
    });

    let encode_arms = parsed.fields.iter().map(|field| {
        let field_name = &field.name;
        let ident = &field.ident;
        quote! {
            #field_name => ::confmap_core::codec::encode(&self.#ident, content_type).map(Some),
        }
    });

    let decode_arms = parsed.fields.iter().map(|field| {
        let field_name = &field.name;
        let ident = &field.ident;
        quote! {
            #field_name => match ::confmap_core::codec::decode(raw, content_type)? {
                Some(value) => {
                    self.#ident = value;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    });

    let whole_object_fns = parsed.whole_object.as_ref().map(|_| {
        quote! {
            fn encode_object(
                &self,
            ) -> ::std::result::Result<Option<String>, ::confmap_core::CodecError> {
                ::confmap_core::codec::encode(self, ::confmap_core::ContentType::Json).map(Some)
            }

            fn decode_object(
                raw: &str,
            ) -> ::std::result::Result<Option<Self>, ::confmap_core::CodecError> {
                ::confmap_core::codec::decode(raw, ::confmap_core::ContentType::Json)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::confmap_core::ConfigSection for #name #ty_generics #where_clause {
            fn descriptor() -> ::confmap_core::SectionDescriptor {
                ::confmap_core::SectionDescriptor::new(#type_name)
                    #section_call
                    #whole_object_call
                    #(#field_calls)*
            }

            #[allow(unused_variables)]
            fn encode_field(
                &self,
                field: &str,
                content_type: ::confmap_core::ContentType,
            ) -> ::std::result::Result<Option<String>, ::confmap_core::CodecError> {
                match field {
                    #(#encode_arms)*
                    _ => Ok(None),
                }
            }

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                field: &str,
                raw: &str,
                content_type: ::confmap_core::ContentType,
            ) -> ::std::result::Result<bool, ::confmap_core::CodecError> {
                match field {
                    #(#decode_arms)*
                    _ => Ok(false),
                }
            }

            #whole_object_fns
        }
    })
}

fn marker_tokens(attrs: &SettingAttrs) -> TokenStream {
    let key = &attrs.key;
    let variant = attrs.content_type.variant();
    let notify = attrs.notify;
    quote! {
        ::confmap_core::FieldMarker::new(#key)
            .content_type(::confmap_core::ContentType::#variant)
            .notify(#notify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_field_section() {
        let input = quote! {
            #[section(name = "InAssembly")]
            struct InAssemblyObject {
                #[setting(key = "InAssembly:Property1")]
                property1: String,
            }
        };

        let result = expand_section(input);
        assert!(result.is_ok(), "expansion failed: {:?}", result.err());
        let output = result.unwrap().to_string();
        assert!(output.contains("InAssembly:Property1"));
        assert!(!output.contains("encode_object"));
    }

    #[test]
    fn test_expand_whole_object_section() {
        let input = quote! {
            #[section(name = "SingleProp:Data")]
            #[setting(key = "SingleProp:Data", content_type = "json")]
            struct SinglePropConfiguration {
                name: String,
            }
        };

        let output = expand_section(input).unwrap().to_string();
        assert!(output.contains("encode_object"));
        assert!(output.contains("decode_object"));
    }

    #[test]
    fn test_expand_rejects_tuple_struct() {
        let input = quote! {
            #[section(name = "S")]
            struct Tuple(String);
        };
        assert!(expand_section(input).is_err());
    }
}
