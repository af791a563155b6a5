//! Rowmap - Core
//!
//! Struct-to-row mapping for key-addressed relational databases.
//!
//! # Overview
//!
//! Tag the fields of a struct that map to columns and Rowmap derives the
//! column and primary-key metadata at compile time. From there it renders
//! parameterized SQL (`INSERT`, `UPDATE`, `DELETE`, single-row and batched),
//! builds the equivalent native mutations, and decodes result rows back into
//! typed records with strict cardinality checks.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rowmap_core::prelude::*;
//!
//! #[derive(Record, Debug, Default, Clone, PartialEq)]
//! #[db(table = "Singers")]
//! struct Singer {
//!     #[db(column = "SingerId", pk = 1)]
//!     singer_id: String,
//!     #[db(column = "Name")]
//!     name: String,
//!     #[db(column = "BirthYear")]
//!     birth_year: Option<i64>,
//! }
//!
//! async fn rename(tx: &impl ReadWriteTransaction, singer: &Singer) -> rowmap_core::Result<()> {
//!     let dml = Dml::<Singer>::new();
//!     dml.update_columns(tx, singer, &["Name"]).await?;
//!
//!     let stored = dml.reader(tx).find_one(&key![singer.singer_id.as_str()]).await?;
//!     assert_eq!(stored.name, singer.name);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`field`] - Column tables and field descriptors (`Record`)
//! - [`dml`] - SQL statement builder (`Dml`)
//! - [`mutation`] - Native mutation builder (`Mutations`)
//! - [`reader`] - Row decoding by key, key set or query (`Reader`)
//! - [`transaction`] - Capabilities the database client supplies
//! - [`error`] - Error taxonomy and transport error classification
//! - [`memory`] - In-memory database for tests

// Lets `::rowmap_core` paths emitted by the derive resolve inside this crate
extern crate self as rowmap_core;

pub mod config;
pub mod dml;
pub mod error;
pub mod field;
pub mod key;
pub mod logging;
pub mod memory;
pub mod mutation;
pub mod naming;
pub mod options;
pub mod param;
pub mod reader;
pub mod row;
pub mod statement;
pub mod transaction;
pub mod value;

pub mod prelude;

#[cfg(test)]
mod test_fixtures;

// Re-export the derive so users only need one crate
#[cfg(feature = "macros")]
pub use rowmap_macros::Record;

pub use config::RowmapConfig;
pub use dml::Dml;
pub use error::{Error, Result, ValidationError};
pub use field::{all_column_names, Column, FieldDescriptor, Record};
pub use key::{Key, KeySet};
pub use logging::{CapturedLog, LogCrateLogger, Logger};
pub use mutation::{Mutation, Mutations};
pub use options::Options;
pub use reader::Reader;
pub use row::{FromRow, Row};
pub use statement::Statement;
pub use transaction::{
    Client, Code, ReadTransaction, ReadWriteTransaction, RowStream, TransportError,
};
pub use value::{FromValue, Numeric, ToValue, Value, ValueError};
