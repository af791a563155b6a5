use super::{collect, exactly_one, Reader};
use crate::error::Result;
use crate::field::Record;
use crate::row::FromRow;
use crate::statement::Statement;
use crate::transaction::ReadTransaction;
use crate::value::FromValue;

impl<T, Tx> Reader<'_, T, Tx>
where
    T: Record,
    Tx: ReadTransaction + ?Sized,
{
    /// The single row produced by `statement`.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) for zero rows and
    /// [`Error::MultipleFound`](crate::Error::MultipleFound) when a second row
    /// exists. `U` can be any row shape, not only `T`.
    ///
    /// ```rust,ignore
    /// let by_name = Statement::new("SELECT * FROM Singers WHERE Name = @name");
    /// let singer: Singer = reader
    ///     .query_one(by_name.with_param("name", "Marc"))
    ///     .await?;
    /// ```
    pub async fn query_one<U: FromRow>(&self, statement: impl Into<Statement>) -> Result<U> {
        let statement = self.log_query(statement.into());
        let row = exactly_one(self.tx.query(statement), "query").await?;
        U::from_row(&row)
    }

    /// Every row produced by `statement`
    pub async fn query<U: FromRow>(&self, statement: impl Into<Statement>) -> Result<Vec<U>> {
        let statement = self.log_query(statement.into());
        collect(self.tx.query(statement), "query", U::from_row).await
    }

    /// The first column of the single row produced by `statement`, with the
    /// same cardinality rules as [`query_one`](Self::query_one)
    ///
    /// ```rust,ignore
    /// let count: i64 = reader.query_value("SELECT COUNT(*) AS cnt FROM Singers").await?;
    /// ```
    pub async fn query_value<V: FromValue>(&self, statement: impl Into<Statement>) -> Result<V> {
        let statement = self.log_query(statement.into());
        let row = exactly_one(self.tx.query(statement), "query").await?;
        row.get_at(0)
    }

    /// The first column of every row produced by `statement`
    pub async fn query_values<V: FromValue>(
        &self,
        statement: impl Into<Statement>,
    ) -> Result<Vec<V>> {
        let statement = self.log_query(statement.into());
        collect(self.tx.query(statement), "query", |row| row.get_at(0)).await
    }

    fn log_query(&self, statement: Statement) -> Statement {
        if self.log.enabled() {
            let params = format!("{{{}}}", statement.flat_params());
            self.log_read(format_args!("sql:{}", statement.sql), &params);
        }
        statement
    }
}
