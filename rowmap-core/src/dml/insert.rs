use std::borrow::Borrow;

use super::Dml;
use crate::error::Result;
use crate::field::Record;
use crate::param::{indexed, placeholder, quote};
use crate::statement::Statement;
use crate::transaction::ReadWriteTransaction;

impl<T: Record> Dml<T> {
    /// `INSERT` of one row, one placeholder per tagged field
    pub fn build_insert(&self, record: &T) -> Statement {
        let fields = record.to_fields();
        let columns: Vec<String> = fields.iter().map(|f| quote(f.name)).collect();
        let placeholders: Vec<String> = fields.iter().map(|f| placeholder(f.name)).collect();

        let mut statement = Statement::new(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quoted_table(),
            columns.join(", "),
            placeholders.join(", ")
        ));
        for field in fields {
            statement.params.insert(field.name.to_string(), field.value);
        }
        statement
    }

    /// Multi-row `INSERT`; row `i` binds its values as `<column>_<i>`
    pub fn build_insert_all<R: Borrow<T>>(&self, records: &[R]) -> Result<Statement> {
        let records = self.non_empty(records)?;
        let columns: Vec<String> =
            records[0].borrow().to_fields().iter().map(|f| quote(f.name)).collect();

        let mut statement = Statement::default();
        let mut tuples = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let mut placeholders = Vec::with_capacity(columns.len());
            for field in record.borrow().to_fields() {
                let param = indexed(field.name, i);
                placeholders.push(placeholder(&param));
                statement.params.insert(param, field.value);
            }
            tuples.push(format!("({})", placeholders.join(", ")));
        }

        statement.sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.quoted_table(),
            columns.join(", "),
            tuples.join(", ")
        );
        Ok(statement)
    }

    pub async fn insert<Tx>(&self, tx: &Tx, record: &T) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.execute(tx, self.build_insert(record)).await
    }

    pub async fn insert_all<Tx, R>(&self, tx: &Tx, records: &[R]) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let statement = self.build_insert_all(records)?;
        self.execute(tx, statement).await
    }
}
