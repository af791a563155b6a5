//! Procedural macros for Rowmap
//!
//! This crate provides the `Record` derive, which turns a plain struct into a
//! row-mappable record: a static column table, field descriptors for the
//! statement and mutation builders, and row decoding for the reader.

use proc_macro::TokenStream;

mod attributes;
mod record;

/// Derive macro for the `Record` and `FromRow` traits
///
/// Only fields carrying `#[db(column ...)]` take part in mapping; every other
/// field is left out of generated statements and filled with
/// `Default::default()` when a row is decoded.
///
/// # Attributes
///
/// - `#[db(table = "Singers")]` on the struct overrides the derived table name
/// - `#[db(column = "SingerId")]` maps the field to the named column
/// - `#[db(column)]` maps the field to a column named after the field
/// - `pk = 1` (or `pk = "1"`) marks the field as part of the primary key, at
///   the given position of a composite key
///
/// # Example
///
/// ```rust,ignore
/// use rowmap_core::Record;
///
/// #[derive(Record, Debug, Default, Clone, PartialEq)]
/// struct Album {
///     #[db(column = "SingerId", pk = 1)]
///     singer_id: String,
///     #[db(column = "AlbumId", pk = 2)]
///     album_id: i64,
///     #[db(column = "Title")]
///     title: Option<String>,
///     // not persisted
///     cached_label: String,
/// }
/// ```
///
/// A primary-key ordinal that is not a positive integer is rejected at compile
/// time, as are duplicate column names and duplicate ordinals.
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
