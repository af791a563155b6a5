//! Field introspection
//!
//! Every record type carries a static column table, normally generated by
//! `#[derive(Record)]`. Descriptors pairing those columns with live field
//! values are produced fresh on every call from the caller's record.

use crate::error::{Result, ValidationError};
use crate::row::FromRow;
use crate::value::Value;

/// Static metadata of one tagged field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    name: &'static str,
    pk_order: Option<u32>,
}

impl Column {
    pub const fn new(name: &'static str, pk_order: Option<u32>) -> Self {
        Self { name, pk_order }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Position within the composite primary key, `None` for ordinary columns
    pub const fn pk_order(&self) -> Option<u32> {
        self.pk_order
    }

    pub const fn is_pk(&self) -> bool {
        self.pk_order.is_some()
    }
}

/// A tagged field together with its current value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub value: Value,
    pub pk_order: Option<u32>,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, value: Value, pk_order: Option<u32>) -> Self {
        Self { name, value, pk_order }
    }

    pub fn is_pk(&self) -> bool {
        self.pk_order.is_some()
    }
}

/// A struct mapped to a table row
///
/// Implementations list their tagged fields in declaration order. Fields
/// without a tag do not appear in [`Record::columns`] or [`Record::to_fields`]
/// and are never written or decoded.
pub trait Record: FromRow {
    /// Rust type name, the source of the derived table name
    const TYPE_NAME: &'static str;
    /// Table name declared on the type, if any
    const TABLE_NAME: Option<&'static str> = None;

    /// Tagged columns in declaration order
    fn columns() -> &'static [Column];

    /// Tagged fields with their current values, in declaration order
    fn to_fields(&self) -> Vec<FieldDescriptor>;

    /// Primary-key fields, sorted by key ordinal
    fn primary_key(&self) -> Vec<FieldDescriptor> {
        pk_fields(self.to_fields())
    }

    /// Non-key fields, in declaration order
    fn non_key_fields(&self) -> Vec<FieldDescriptor> {
        non_pk_fields(self.to_fields())
    }
}

/// Keep only the key fields, ordered by their own ordinal ascending.
///
/// The sort is stable, so declaration order breaks ties.
pub fn pk_fields(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    let mut keys: Vec<FieldDescriptor> =
        fields.into_iter().filter(FieldDescriptor::is_pk).collect();
    keys.sort_by_key(|field| field.pk_order);
    keys
}

/// Keep only the non-key fields, in declaration order
pub fn non_pk_fields(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    fields.into_iter().filter(|field| !field.is_pk()).collect()
}

/// Key columns of `T`, ordered by key ordinal
pub fn pk_columns<T: Record>() -> Vec<&'static Column> {
    let mut keys: Vec<&'static Column> = T::columns().iter().filter(|c| c.is_pk()).collect();
    keys.sort_by_key(|column| column.pk_order());
    keys
}

/// Names of every tagged column of `T`, in declaration order
pub fn column_names<T: Record>() -> Vec<&'static str> {
    T::columns().iter().map(Column::name).collect()
}

/// Comma-joined tagged column names, for explicit `SELECT` lists
pub fn all_column_names<T: Record>() -> String {
    column_names::<T>().join(", ")
}

/// Resolve requested column names against `T`'s tagged columns.
///
/// Matching is case-insensitive; the declared spelling is returned, in request
/// order, without duplicates. A name that matches no tagged column is an error.
pub fn resolve_columns<T: Record>(requested: &[&str]) -> Result<Vec<&'static str>> {
    let mut resolved: Vec<&'static str> = Vec::with_capacity(requested.len());
    for name in requested {
        let column = T::columns()
            .iter()
            .find(|column| column.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValidationError::UnknownColumn {
                type_name: T::TYPE_NAME,
                column: (*name).to_string(),
            })?;
        if !resolved.contains(&column.name()) {
            resolved.push(column.name());
        }
    }
    Ok(resolved)
}
