// Record derive implementation
//
// Generates the static column table, the field descriptor list and the row
// decoder for a struct with named fields.

use proc_macro2::TokenStream;
use quote::quote;
use std::collections::{HashMap, HashSet};
use syn::ext::IdentExt;
use syn::{parse2, Data, DeriveInput, Error, Fields, Ident, Result};

use crate::attributes::{parse_field_attributes, parse_model_attributes};

/// A field mapped to a column
struct TaggedField<'a> {
    ident: &'a Ident,
    column: String,
    pk_order: Option<u32>,
}

pub fn derive_record(input: TokenStream) -> TokenStream {
    match expand(input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(input: TokenStream) -> Result<TokenStream> {
    let input = parse2::<DeriveInput>(input)?;
    let name = &input.ident;
    let name_str = name.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => &fields_named.named,
            _ => {
                return Err(Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(Error::new_spanned(name, "Record can only be derived for structs")),
    };

    let model = parse_model_attributes(&input.attrs)?;

    let mut tagged = Vec::new();
    let mut untagged = Vec::new();
    let mut seen_columns = HashSet::new();
    let mut seen_orders = HashMap::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attributes(field)?;
        let Some(column) = attrs.column else {
            untagged.push(ident);
            continue;
        };

        if !seen_columns.insert(column.to_lowercase()) {
            return Err(Error::new_spanned(
                field,
                format!("column `{column}` is mapped more than once"),
            ));
        }
        if let Some(order) = attrs.pk_order {
            if let Some(previous) = seen_orders.insert(order, column.clone()) {
                return Err(Error::new_spanned(
                    field,
                    format!(
                        "primary key ordinal {order} is used by both `{previous}` and `{column}`"
                    ),
                ));
            }
        }

        tagged.push(TaggedField { ident, column, pk_order: attrs.pk_order });
    }

    // Key columns bind their WHERE value as `w_<column>`
    for key in tagged.iter().filter(|field| field.pk_order.is_some()) {
        let where_param = format!("w_{}", key.column);
        let clash = tagged.iter().find(|field| field.column.eq_ignore_ascii_case(&where_param));
        if let Some(clash) = clash {
            return Err(Error::new_spanned(
                clash.ident,
                format!(
                    "column `{}` clashes with the WHERE parameter of key column `{}`",
                    clash.column, key.column
                ),
            ));
        }
    }

    if tagged.is_empty() {
        return Err(Error::new_spanned(
            name,
            "Record needs at least one field annotated with #[db(column ...)]",
        ));
    }

    let table_name = match &model.table {
        Some(table) => quote! { ::core::option::Option::Some(#table) },
        None => quote! { ::core::option::Option::None },
    };

    let column_count = tagged.len();
    let column_defs = tagged.iter().map(|field| {
        let column = &field.column;
        let pk_order = pk_order_tokens(field.pk_order);
        quote! { ::rowmap_core::Column::new(#column, #pk_order) }
    });

    let field_descriptors = tagged.iter().map(|field| {
        let ident = field.ident;
        let column = &field.column;
        let pk_order = pk_order_tokens(field.pk_order);
        quote! {
            ::rowmap_core::FieldDescriptor::new(
                #column,
                ::rowmap_core::ToValue::to_value(&self.#ident),
                #pk_order,
            )
        }
    });

    let decoded_fields = tagged.iter().map(|field| {
        let ident = field.ident;
        let column = &field.column;
        quote! { #ident: row.get_or_default(#column)?, }
    });
    let defaulted_fields = untagged.iter().map(|ident| {
        quote! { #ident: ::core::default::Default::default(), }
    });

    Ok(quote! {
        impl #impl_generics ::rowmap_core::Record for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #name_str;
            const TABLE_NAME: ::core::option::Option<&'static str> = #table_name;

            fn columns() -> &'static [::rowmap_core::Column] {
                static COLUMNS: [::rowmap_core::Column; #column_count] = [#(#column_defs),*];
                &COLUMNS
            }

            fn to_fields(&self) -> ::std::vec::Vec<::rowmap_core::FieldDescriptor> {
                ::std::vec![#(#field_descriptors),*]
            }
        }

        impl #impl_generics ::rowmap_core::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::rowmap_core::Row) -> ::rowmap_core::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#decoded_fields)*
                    #(#defaulted_fields)*
                })
            }
        }
    })
}

fn pk_order_tokens(pk_order: Option<u32>) -> TokenStream {
    match pk_order {
        Some(order) => quote! { ::core::option::Option::Some(#order) },
        None => quote! { ::core::option::Option::None },
    }
}
