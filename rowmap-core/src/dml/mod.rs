//! SQL statement builder
//!
//! [`Dml`] renders records into parameterized `INSERT`, `UPDATE` and `DELETE`
//! statements and runs them through a [`ReadWriteTransaction`]. The
//! `build_*` methods are pure and return the [`Statement`] without executing
//! it.
//!
//! ```text
//! INSERT INTO `T` (`c1`, `c2`) VALUES (@c1, @c2)
//! INSERT INTO `T` (`c1`, `c2`) VALUES (@c1_0, @c2_0), (@c1_1, @c2_1)
//! UPDATE `T` SET `c2`=@c2 WHERE `c1`=@w_c1
//! DELETE FROM `T` WHERE `c1`=@w_c1
//! DELETE FROM `T` WHERE (`c1`=@w_c1_0) OR (`c1`=@w_c1_1)
//! ```

mod delete;
mod insert;
mod update;

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result, ValidationError};
use crate::field::{pk_fields, FieldDescriptor, Record};
use crate::logging::LogSink;
use crate::naming::table_name;
use crate::options::Options;
use crate::param::{indexed, placeholder, quote, where_param};
use crate::reader::Reader;
use crate::statement::Statement;
use crate::transaction::{ReadTransaction, ReadWriteTransaction};

/// SQL statement builder for records of type `T`
pub struct Dml<T> {
    table: String,
    log: LogSink,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Dml<T> {
    fn clone(&self) -> Self {
        Self { table: self.table.clone(), log: self.log.clone(), _record: PhantomData }
    }
}

impl<T> fmt::Debug for Dml<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dml").field("table", &self.table).field("log", &self.log).finish()
    }
}

impl<T: Record> Default for Dml<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Dml<T> {
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

    fn quoted_table(&self) -> String {
        quote(&self.table)
    }

    /// Run one statement, logging it first
    async fn execute<Tx>(&self, tx: &Tx, statement: Statement) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.log.emit(format_args!(
            "executing dml... sql:{}, params:{}",
            statement.sql,
            statement.flat_params()
        ));
        tx.execute_update(statement)
            .await
            .map_err(|e| Error::execution(format!("execute dml on `{}`", self.table), e))
    }

    fn non_empty<'r, R: Borrow<T>>(&self, records: &'r [R]) -> Result<&'r [R]> {
        if records.is_empty() {
            return Err(ValidationError::EmptyBatch { type_name: T::TYPE_NAME }.into());
        }
        Ok(records)
    }

    /// Key fields of `record`, failing for types without a primary key
    fn key_fields(&self, record: &T) -> Result<Vec<FieldDescriptor>> {
        let keys = pk_fields(record.to_fields());
        if keys.is_empty() {
            return Err(ValidationError::MissingPrimaryKey { type_name: T::TYPE_NAME }.into());
        }
        Ok(keys)
    }
}

/// `` `k1`=@w_k1 AND `k2`=@w_k2 ``, binding the key values into `statement`.
/// Batch rows pass their index so every row gets its own parameters. A key
/// parameter must not replace a value already bound under the same name.
fn key_predicate(
    type_name: &'static str,
    keys: Vec<FieldDescriptor>,
    index: Option<usize>,
    statement: &mut Statement,
) -> Result<String> {
    let mut terms = Vec::with_capacity(keys.len());
    for key in keys {
        let param = match index {
            Some(i) => indexed(&where_param(key.name), i),
            None => where_param(key.name),
        };
        if statement.params.contains_key(&param) {
            return Err(ValidationError::ParamCollision { type_name, param }.into());
        }
        terms.push(format!("{}={}", quote(key.name), placeholder(&param)));
        statement.params.insert(param, key.value);
    }
    Ok(terms.join(" AND "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{Album, Singer, Test};
    use crate::value::Value;

    #[test]
    fn test_table_resolution() {
        assert_eq!(Dml::<Test>::new().table(), "Tests");
        assert_eq!(Dml::<Singer>::new().table(), "Singers");
        assert_eq!(Dml::<Album>::new().table(), "AlbumCatalog");
        assert_eq!(Dml::<Singer>::with_table("SingersV2").table(), "SingersV2");
    }

    #[test]
    fn test_key_predicate() {
        let album = Album::new("s1", 7, "Total Junk");
        let mut statement = Statement::default();
        let keys = pk_fields(album.to_fields());
        let single = key_predicate("Album", keys, None, &mut statement).unwrap();
        assert_eq!(single, "`SingerId`=@w_SingerId AND `AlbumId`=@w_AlbumId");
        assert_eq!(statement.param("w_AlbumId"), Some(&Value::Int64(7)));

        let keys = pk_fields(album.to_fields());
        let batch = key_predicate("Album", keys, Some(3), &mut statement).unwrap();
        assert_eq!(batch, "`SingerId`=@w_SingerId_3 AND `AlbumId`=@w_AlbumId_3");
        assert_eq!(statement.params.len(), 4);
    }

    #[test]
    fn test_key_predicate_keeps_bound_values() {
        // a non-key column literally named `w_SingerId` is already bound
        let album = Album::new("s1", 7, "Total Junk");
        let mut statement = Statement::default().with_param("w_SingerId", "payload");
        let keys = pk_fields(album.to_fields());
        let err = key_predicate("Album", keys, None, &mut statement).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::ParamCollision { ref param, .. })
                if param == "w_SingerId"
        ));
        assert_eq!(statement.param("w_SingerId"), Some(&Value::String("payload".into())));
    }

    #[test]
    fn test_builders_are_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Dml<Singer>>();
    }
}
