//! Parsing of `#[db(...)]` annotations
//!
//! Struct level: `#[db(table = "...")]`.
//! Field level: `#[db(column = "...", pk = N)]` or `#[db(column)]`.

use syn::ext::IdentExt;
use syn::{Attribute, Error, Field, Lit, LitStr, Result};

/// Struct-level attributes
#[derive(Debug, Default)]
pub(crate) struct ModelAttributes {
    pub table: Option<String>,
}

/// Field-level attributes; `column` is `None` for untagged fields
#[derive(Debug, Default)]
pub(crate) struct FieldAttributes {
    pub column: Option<String>,
    pub pk_order: Option<u32>,
}

/// Parse #[db(...)] attributes on the struct itself
pub(crate) fn parse_model_attributes(attrs: &[Attribute]) -> Result<ModelAttributes> {
    let mut model = ModelAttributes::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("db")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                let table = value.value();
                if table.trim().is_empty() {
                    return Err(Error::new_spanned(&value, "table name must not be empty"));
                }
                model.table = Some(table);
                Ok(())
            } else {
                Err(meta.error("unsupported db attribute on struct, expected `table`"))
            }
        })?;
    }

    Ok(model)
}

/// Parse #[db(...)] attributes on a field
pub(crate) fn parse_field_attributes(field: &Field) -> Result<FieldAttributes> {
    let mut attrs = FieldAttributes::default();

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("db")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let column = if meta.input.peek(syn::Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().trim().is_empty() {
                        return Err(Error::new_spanned(&value, "column name must not be empty"));
                    }
                    value.value()
                } else {
                    match &field.ident {
                        Some(ident) => ident.unraw().to_string(),
                        None => {
                            return Err(meta.error("`column` without a name needs a named field"))
                        }
                    }
                };
                attrs.column = Some(column);
                Ok(())
            } else if meta.path.is_ident("pk") {
                let lit: Lit = meta.value()?.parse()?;
                let raw = match &lit {
                    Lit::Int(int) => int.base10_digits().to_string(),
                    Lit::Str(s) => s.value(),
                    _ => {
                        return Err(Error::new_spanned(
                            &lit,
                            "primary key ordinal must be an integer literal",
                        ))
                    }
                };
                let order = parse_pk_order(&raw).map_err(|msg| Error::new_spanned(&lit, msg))?;
                attrs.pk_order = Some(order);
                Ok(())
            } else {
                Err(meta.error("unsupported db attribute on field, expected `column` or `pk`"))
            }
        })?;
    }

    if attrs.pk_order.is_some() && attrs.column.is_none() {
        return Err(Error::new_spanned(field, "`pk` requires the field to be mapped with `column`"));
    }

    Ok(attrs)
}

/// Parse a primary-key ordinal. Zero and anything that is not an unsigned
/// integer are schema-definition defects.
pub(crate) fn parse_pk_order(raw: &str) -> std::result::Result<u32, String> {
    let trimmed = raw.trim();
    match trimmed.parse::<u32>() {
        Ok(0) => Err(format!("primary key ordinal must be a positive integer, got `{trimmed}`")),
        Ok(order) => Ok(order),
        Err(err) => Err(format!("invalid primary key ordinal `{trimmed}`: {err}")),
    }
}
