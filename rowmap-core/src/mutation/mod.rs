//! Native mutation builder
//!
//! [`Mutations`] turns records into [`Mutation`] operations. Each record of a
//! batch becomes its own operation and the whole list is submitted in one
//! call, either buffered into a read-write transaction (applied at commit) or
//! applied immediately through a [`Client`], which returns the commit
//! timestamp.

mod delete;
mod update;
mod upsert;

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result, ValidationError};
use crate::field::{pk_columns, resolve_columns, FieldDescriptor, Record};
use crate::key::KeySet;
use crate::logging::LogSink;
use crate::naming::table_name;
use crate::options::Options;
use crate::reader::Reader;
use crate::transaction::{Client, ReadTransaction, ReadWriteTransaction};
use crate::value::Value;

/// A single native write operation
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert the row, or overwrite the listed columns if it exists
    InsertOrUpdate { table: String, columns: Vec<String>, values: Vec<Value> },
    /// Overwrite the listed columns of an existing row
    Update { table: String, columns: Vec<String>, values: Vec<Value> },
    /// Remove the rows at the given keys
    Delete { table: String, keys: KeySet },
}

impl Mutation {
    pub fn insert_or_update(
        table: impl Into<String>,
        columns: Vec<String>,
        values: Vec<Value>,
    ) -> Self {
        Mutation::InsertOrUpdate { table: table.into(), columns, values }
    }

    pub fn update(table: impl Into<String>, columns: Vec<String>, values: Vec<Value>) -> Self {
        Mutation::Update { table: table.into(), columns, values }
    }

    pub fn delete(table: impl Into<String>, keys: impl Into<KeySet>) -> Self {
        Mutation::Delete { table: table.into(), keys: keys.into() }
    }

    pub fn table(&self) -> &str {
        match self {
            Mutation::InsertOrUpdate { table, .. }
            | Mutation::Update { table, .. }
            | Mutation::Delete { table, .. } => table,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::InsertOrUpdate { table, columns, values } => {
                write!(f, "InsertOrUpdate into {table}, columns={columns:?}, values=")?;
                write_values(f, values)
            }
            Mutation::Update { table, columns, values } => {
                write!(f, "Update {table}, columns={columns:?}, values=")?;
                write_values(f, values)
            }
            Mutation::Delete { table, keys } => write!(f, "Deleting from {table}, key={keys}"),
        }
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

/// Mutation builder for records of type `T`
///
/// Holds only the resolved table name and logging configuration, so one
/// instance can be shared freely.
pub struct Mutations<T> {
    table: String,
    log: LogSink,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Mutations<T> {
    fn clone(&self) -> Self {
        Self { table: self.table.clone(), log: self.log.clone(), _record: PhantomData }
    }
}

impl<T> fmt::Debug for Mutations<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutations").field("table", &self.table).field("log", &self.log).finish()
    }
}

impl<T: Record> Default for Mutations<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Mutations<T> {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_table(table: impl Into<String>) -> Self {
        Self::with_options(Options::new().with_table_name(table))
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            table: table_name::<T>(options.table_name()),
            log: options.log_sink(),
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Reader over `tx` sharing this builder's table and logging
    pub fn reader<'a, Tx>(&self, tx: &'a Tx) -> Reader<'a, T, Tx>
    where
        Tx: ReadTransaction + ?Sized,
    {
        Reader::from_parts(tx, self.table.clone(), self.log.clone())
    }

    /// Build one mutation per record, failing before any is built for an
    /// empty batch
    fn build_each<R, F>(&self, records: &[R], mut build: F) -> Result<Vec<Mutation>>
    where
        R: Borrow<T>,
        F: FnMut(&T) -> Result<Mutation>,
    {
        if records.is_empty() {
            return Err(ValidationError::EmptyBatch { type_name: T::TYPE_NAME }.into());
        }
        records.iter().map(|record| build(record.borrow())).collect()
    }

    fn buffer<Tx>(&self, tx: &Tx, mutations: Vec<Mutation>) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.log_all(&mutations);
        tx.buffer_write(mutations)
            .map_err(|e| Error::execution(format!("buffer mutations for `{}`", self.table), e))
    }

    async fn apply<C>(&self, client: &C, mutations: Vec<Mutation>) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
    {
        self.log_all(&mutations);
        client
            .apply(mutations)
            .await
            .map_err(|e| Error::execution(format!("apply mutations for `{}`", self.table), e))
    }

    fn log_all(&self, mutations: &[Mutation]) {
        for mutation in mutations {
            self.log.emit(format_args!("{mutation}"));
        }
    }

    /// Ensure the type has a primary key
    fn require_key(&self) -> Result<()> {
        if pk_columns::<T>().is_empty() {
            return Err(ValidationError::MissingPrimaryKey { type_name: T::TYPE_NAME }.into());
        }
        Ok(())
    }

    /// Resolve a caller's column subset to written columns: key columns
    /// first (in key order) unless requested explicitly, then the requested
    /// columns in request order with their declared spelling.
    fn write_columns(&self, requested: &[&str]) -> Result<Vec<&'static str>> {
        let resolved = resolve_columns::<T>(requested)?;
        let keys: Vec<&'static str> = pk_columns::<T>().iter().map(|c| c.name()).collect();
        if resolved.iter().all(|name| keys.contains(name)) {
            return Err(ValidationError::NoColumns { type_name: T::TYPE_NAME }.into());
        }

        let mut columns: Vec<&'static str> =
            keys.into_iter().filter(|key| !resolved.contains(key)).collect();
        columns.extend(resolved);
        Ok(columns)
    }
}

/// Split descriptors into parallel column and value lists
fn columns_and_values(fields: Vec<FieldDescriptor>) -> (Vec<String>, Vec<Value>) {
    fields.into_iter().map(|field| (field.name.to_string(), field.value)).unzip()
}

/// Pick the named descriptors, in the given order
fn select_fields(fields: Vec<FieldDescriptor>, columns: &[&'static str]) -> Vec<FieldDescriptor> {
    let mut selected = Vec::with_capacity(columns.len());
    for column in columns {
        if let Some(field) = fields.iter().find(|field| field.name == *column) {
            selected.push(field.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::test_fixtures::{Album, Singer};

    #[test]
    fn test_display_matches_log_lines() {
        let upsert = Mutation::insert_or_update(
            "Singers",
            vec!["SingerId".into(), "Name".into()],
            vec![Value::String("s1".into()), Value::Null],
        );
        assert_eq!(
            upsert.to_string(),
            "InsertOrUpdate into Singers, columns=[\"SingerId\", \"Name\"], values=[\"s1\", NULL]"
        );

        let delete = Mutation::delete("Singers", Key::single("s1"));
        assert_eq!(delete.to_string(), "Deleting from Singers, key=[(\"s1\")]");
        assert_eq!(delete.table(), "Singers");
    }

    #[test]
    fn test_table_resolution() {
        assert_eq!(Mutations::<Singer>::new().table(), "Singers");
        assert_eq!(Mutations::<Album>::new().table(), "AlbumCatalog");
        assert_eq!(Mutations::<Album>::with_table("Albums").table(), "Albums");
    }

    #[test]
    fn test_write_columns_carry_keys() {
        let mutations = Mutations::<Album>::new();
        assert_eq!(mutations.write_columns(&["title"]).unwrap(), vec![
            "SingerId", "AlbumId", "Title"
        ]);
        assert_eq!(mutations.write_columns(&["Title", "albumid"]).unwrap(), vec![
            "SingerId", "Title", "AlbumId"
        ]);
        assert!(mutations.write_columns(&["AlbumId"]).unwrap_err().is_validation());
        assert!(mutations.write_columns(&[]).unwrap_err().is_validation());
        assert!(mutations.write_columns(&["Genre"]).unwrap_err().is_validation());
    }

    #[test]
    fn test_select_fields_keeps_requested_order() {
        let album = Album::new("s1", 7, "Total Junk");
        let (columns, values) =
            columns_and_values(select_fields(album.to_fields(), &["Title", "SingerId"]));
        assert_eq!(columns, vec!["Title".to_string(), "SingerId".to_string()]);
        assert_eq!(values, vec![Value::String("Total Junk".into()), Value::String("s1".into())]);
    }
}
