//! QueryRecord derive implementation
//!
//! Turns each field into a `FieldDescriptor` whose accessor is a plain
//! function pointer writing straight into the field, so decoding never
//! inspects types at runtime.

use crate::attrs::{parse_field_attr, QpAttr};
use crate::types::{forced_record_type, record_type, RecordType};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{parse2, Data, DeriveInput, Error, Field, Fields, Generics, Ident, Result, Type, Visibility};

/// How one field takes part in decoding
enum FieldPlan<'a> {
    Key { ident: &'a Ident, key: String, ty: &'a Type },
    Nested { ident: &'a Ident, record: RecordType<'a> },
}

struct RecordPlan<'a> {
    fields: Vec<FieldPlan<'a>>,
    has_hidden_annotated_field: bool,
}

pub fn derive_query_record(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let name = &input.ident;
    let type_name = name.unraw().to_string();

    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "QueryRecord can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &input.ident,
            "QueryRecord can only be derived for structs with named fields",
        ));
    };

    let plan = plan_fields(named.named.iter(), &input.generics)?;

    let descriptors = plan.fields.iter().map(descriptor_tokens);
    let zero_checks = plan.fields.iter().map(zero_check_tokens);
    let hidden = plan.has_hidden_annotated_field;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::qparam_core::QueryRecord for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            fn describe() -> ::qparam_core::StructSchema<Self> {
                ::qparam_core::StructSchema::new(
                    #type_name,
                    ::std::vec![#(#descriptors),*],
                    #hidden,
                )
            }

            fn is_zero(&self) -> bool {
                true #(&& #zero_checks)*
            }
        }
    })
}

fn is_visible(field: &Field) -> bool {
    !matches!(field.vis, Visibility::Inherited)
}

/// A bare generic parameter of the struct is never a nested record
fn is_type_param(ty: &Type, generics: &Generics) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && generics
            .type_params()
            .any(|param| path.path.is_ident(&param.ident))
}

fn plan_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
    generics: &Generics,
) -> Result<RecordPlan<'a>> {
    let mut plan = RecordPlan { fields: Vec::new(), has_hidden_annotated_field: false };
    let mut seen_keys: HashMap<String, Span> = HashMap::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attr = parse_field_attr(&field.attrs)?;

        if !is_visible(field) {
            if matches!(attr, QpAttr::Key { .. }) {
                plan.has_hidden_annotated_field = true;
            }
            continue;
        }

        match attr {
            QpAttr::Skip => {}
            QpAttr::Key { key, span } => {
                if seen_keys.insert(key.clone(), span).is_some() {
                    return Err(Error::new(span, format!("duplicate qp key `{}`", key)));
                }
                plan.fields.push(FieldPlan::Key { ident, key, ty: &field.ty });
            }
            QpAttr::Nested => {
                plan.fields.push(FieldPlan::Nested { ident, record: forced_record_type(&field.ty) });
            }
            QpAttr::Unannotated => {
                if let Some(record) = record_type(&field.ty) {
                    if !is_type_param(record.ty, generics) {
                        plan.fields.push(FieldPlan::Nested { ident, record });
                    }
                }
            }
        }
    }

    Ok(plan)
}

fn descriptor_tokens(plan: &FieldPlan<'_>) -> TokenStream {
    match plan {
        FieldPlan::Key { ident, key, ty } => {
            let path = ident.unraw().to_string();
            quote! {
                ::qparam_core::FieldDescriptor::<Self>::value(
                    #key,
                    #path,
                    <#ty as ::qparam_core::FromQuery>::shape(),
                    |record: &mut Self,
                     raw: &[::std::string::String],
                     config: &::qparam_core::DecodeConfig|
                     -> ::qparam_core::DecodeResult<bool> {
                        record.#ident = <#ty as ::qparam_core::FromQuery>::from_query(raw, config)?;
                        ::std::result::Result::Ok(!<#ty as ::qparam_core::FromQuery>::is_zero(&record.#ident))
                    },
                )
            }
        }
        FieldPlan::Nested { ident, record } => {
            let path = ident.unraw().to_string();
            let ty = record.ty;
            let (shape, helper) = if record.optional {
                (
                    quote! {
                        ::qparam_core::TypeShape::optional(
                            ::qparam_core::TypeShape::Nested(<#ty as ::qparam_core::QueryRecord>::TYPE_NAME),
                        )
                    },
                    quote! { ::qparam_core::decode_optional_nested },
                )
            } else {
                (
                    quote! {
                        ::qparam_core::TypeShape::Nested(<#ty as ::qparam_core::QueryRecord>::TYPE_NAME)
                    },
                    quote! { ::qparam_core::decode_nested },
                )
            };
            quote! {
                ::qparam_core::FieldDescriptor::<Self>::nested(
                    #path,
                    #shape,
                    |record: &mut Self,
                     values: &::qparam_core::RawValues,
                     config: &::qparam_core::DecodeConfig|
                     -> ::qparam_core::DecodeResult<bool> {
                        #helper(&mut record.#ident, values, config)
                    },
                )
            }
        }
    }
}

fn zero_check_tokens(plan: &FieldPlan<'_>) -> TokenStream {
    match plan {
        FieldPlan::Key { ident, ty, .. } => {
            quote! { <#ty as ::qparam_core::FromQuery>::is_zero(&self.#ident) }
        }
        FieldPlan::Nested { ident, record } if record.optional => {
            quote! { self.#ident.is_none() }
        }
        FieldPlan::Nested { ident, record } => {
            let ty = record.ty;
            quote! { <#ty as ::qparam_core::QueryRecord>::is_zero(&self.#ident) }
        }
    }
}
