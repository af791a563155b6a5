//! Row decoding
//!
//! A [`Reader`] is bound to one transaction and decodes what it returns into
//! records or scalars. Key-addressed reads live in `key.rs`, SQL reads in
//! `query.rs`.
//!
//! Only a key lookup (`read_row`) classifies the transport's "row absent"
//! signal into [`Error::NotFound`](crate::Error::NotFound); stream failures
//! are always wrapped as execution errors.

mod key;
mod query;

use std::fmt;
use std::marker::PhantomData;

use futures::StreamExt;

use crate::error::{Error, Result};
use crate::field::Record;
use crate::logging::LogSink;
use crate::naming::table_name;
use crate::options::Options;
use crate::row::Row;
use crate::transaction::{ReadTransaction, RowStream};

/// Typed reader for records of type `T` over a transaction
pub struct Reader<'a, T, Tx: ?Sized> {
    tx: &'a Tx,
    table: String,
    log: LogSink,
    _record: PhantomData<fn() -> T>,
}

impl<T, Tx: ?Sized> fmt::Debug for Reader<'_, T, Tx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader").field("table", &self.table).field("log", &self.log).finish()
    }
}

impl<'a, T, Tx> Reader<'a, T, Tx>
where
    T: Record,
    Tx: ReadTransaction + ?Sized,
{
    pub fn new(tx: &'a Tx) -> Self {
        Self::with_options(tx, Options::default())
    }

    pub fn with_options(tx: &'a Tx, options: Options) -> Self {
        Self::from_parts(tx, table_name::<T>(options.table_name()), options.log_sink())
    }

    pub(crate) fn from_parts(tx: &'a Tx, table: String, log: LogSink) -> Self {
        Self { tx, table, log, _record: PhantomData }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn log_read(&self, what: fmt::Arguments<'_>, detail: &dyn fmt::Display) {
        self.log.emit(format_args!("executing read... {what}, {detail}"));
    }

    fn read_context(&self) -> String {
        format!("read `{}`", self.table)
    }
}

/// Drain a row stream, decoding each row; the first failure stops the read
async fn collect<U, F>(mut rows: RowStream<'_>, context: &str, mut decode: F) -> Result<Vec<U>>
where
    F: FnMut(&Row) -> Result<U>,
{
    let mut decoded = Vec::new();
    while let Some(row) = rows.next().await {
        let row = row.map_err(|e| Error::execution(context, e))?;
        decoded.push(decode(&row)?);
    }
    Ok(decoded)
}

/// The only row of a stream: [`Error::NotFound`] when empty and
/// [`Error::MultipleFound`] when a second row follows
async fn exactly_one(mut rows: RowStream<'_>, context: &str) -> Result<Row> {
    let first = match rows.next().await {
        Some(row) => row.map_err(|e| Error::execution(context, e))?,
        None => return Err(Error::NotFound),
    };
    match rows.next().await {
        None => Ok(first),
        Some(Ok(_)) => Err(Error::MultipleFound),
        Some(Err(e)) => Err(Error::execution(context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Code, TransportError};
    use crate::value::Value;
    use futures::stream;

    fn rows(n: i64) -> RowStream<'static> {
        stream::iter((0..n).map(|i| Ok(Row::from_pairs([("N", Value::Int64(i))])))).boxed()
    }

    #[tokio::test]
    async fn test_exactly_one_enforces_cardinality() {
        assert!(exactly_one(rows(0), "q").await.unwrap_err().is_not_found());
        assert!(exactly_one(rows(2), "q").await.unwrap_err().is_multiple_found());
        assert_eq!(exactly_one(rows(1), "q").await.unwrap().get::<i64>("N").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stream_failure_is_not_classified() {
        let failing: RowStream<'static> =
            stream::iter([Err(TransportError::not_found("table missing"))]).boxed();
        let err = exactly_one(failing, "query").await.unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.transport_error().map(TransportError::code), Some(Code::NotFound));
    }

    #[tokio::test]
    async fn test_collect_decodes_in_order() {
        let values = collect(rows(3), "q", |row| row.get::<i64>("N")).await.unwrap();
        assert_eq!(values, vec![0, 1, 2]);
    }
}
