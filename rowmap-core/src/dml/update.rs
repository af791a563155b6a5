use std::borrow::Borrow;

use super::{key_predicate, Dml};
use crate::error::{Result, ValidationError};
use crate::field::{non_pk_fields, resolve_columns, FieldDescriptor, Record};
use crate::param::{placeholder, quote};
use crate::statement::Statement;
use crate::transaction::ReadWriteTransaction;

impl<T: Record> Dml<T> {
    /// `UPDATE` of every non-key column, addressed by the primary key
    pub fn build_update(&self, record: &T) -> Result<Statement> {
        let keys = self.key_fields(record)?;
        let set = non_pk_fields(record.to_fields());
        self.render_update(set, keys)
    }

    /// `UPDATE` of the requested columns only.
    ///
    /// Names match tagged columns case-insensitively. Key columns in the list
    /// are ignored for `SET`, since they address the row.
    pub fn build_update_columns(&self, record: &T, columns: &[&str]) -> Result<Statement> {
        let keys = self.key_fields(record)?;
        let requested = resolve_columns::<T>(columns)?;
        let fields = non_pk_fields(record.to_fields());
        let set: Vec<FieldDescriptor> = requested
            .iter()
            .filter_map(|name| fields.iter().find(|field| field.name == *name).cloned())
            .collect();
        self.render_update(set, keys)
    }

    fn render_update(
        &self,
        set: Vec<FieldDescriptor>,
        keys: Vec<FieldDescriptor>,
    ) -> Result<Statement> {
        if set.is_empty() {
            return Err(ValidationError::NoColumns { type_name: T::TYPE_NAME }.into());
        }

        let mut statement = Statement::default();
        let mut assignments = Vec::with_capacity(set.len());
        for field in set {
            assignments.push(format!("{}={}", quote(field.name), placeholder(field.name)));
            statement.params.insert(field.name.to_string(), field.value);
        }
        let predicate = key_predicate(T::TYPE_NAME, keys, None, &mut statement)?;

        statement.sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.quoted_table(),
            assignments.join(", "),
            predicate
        );
        Ok(statement)
    }

    pub async fn update<Tx>(&self, tx: &Tx, record: &T) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        let statement = self.build_update(record)?;
        self.execute(tx, statement).await
    }

    /// One `UPDATE` per record, run in order inside `tx`; returns the total
    /// affected row count. Every statement is built before the first runs.
    pub async fn update_all<Tx, R>(&self, tx: &Tx, records: &[R]) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let statements = self
            .non_empty(records)?
            .iter()
            .map(|record| self.build_update(record.borrow()))
            .collect::<Result<Vec<_>>>()?;
        self.execute_each(tx, statements).await
    }

    pub async fn update_columns<Tx>(&self, tx: &Tx, record: &T, columns: &[&str]) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        let statement = self.build_update_columns(record, columns)?;
        self.execute(tx, statement).await
    }

    pub async fn update_columns_all<Tx, R>(
        &self,
        tx: &Tx,
        records: &[R],
        columns: &[&str],
    ) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let statements = self
            .non_empty(records)?
            .iter()
            .map(|record| self.build_update_columns(record.borrow(), columns))
            .collect::<Result<Vec<_>>>()?;
        self.execute_each(tx, statements).await
    }

    async fn execute_each<Tx>(&self, tx: &Tx, statements: Vec<Statement>) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        let mut total = 0;
        for statement in statements {
            total += self.execute(tx, statement).await?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::MemoryDatabase;
    use crate::test_fixtures::{Album, Keyless, Scattered, Singer};
    use crate::transaction::{Code, TransportError};
    use crate::value::Value;

    #[test]
    fn test_update_set_and_where() {
        let album = Album::new("s1", 7, "Total Junk");
        let statement = Dml::<Album>::new().build_update(&album).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE `AlbumCatalog` SET `Title`=@Title \
             WHERE `SingerId`=@w_SingerId AND `AlbumId`=@w_AlbumId"
        );
        assert_eq!(statement.param("Title"), Some(&Value::String("Total Junk".into())));
        assert_eq!(statement.param("w_SingerId"), Some(&Value::String("s1".into())));
        assert_eq!(statement.param("w_AlbumId"), Some(&Value::Int64(7)));
        assert_eq!(statement.params.len(), 3);
    }

    #[test]
    fn test_update_non_contiguous_keys() {
        let statement = Dml::<Scattered>::new().build_update(&Scattered::sample()).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE `Scattereds` SET `Note`=@Note, `Label`=@Label \
             WHERE `Id`=@w_Id AND `Shard`=@w_Shard AND `Region`=@w_Region"
        );
    }

    #[test]
    fn test_update_columns() {
        let singer = Singer::new("s1", "Marc", 1970);
        let dml = Dml::<Singer>::new();

        let statement = dml.build_update_columns(&singer, &["birthyear", "SINGERID"]).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE `Singers` SET `BirthYear`=@BirthYear WHERE `SingerId`=@w_SingerId"
        );

        let err = dml.build_update_columns(&singer, &["Name", "Nickname"]).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::UnknownColumn { .. })));

        let err = dml.build_update_columns(&singer, &["SingerId"]).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NoColumns { .. })));
        assert!(dml.build_update_columns(&singer, &[]).is_err());
    }

    #[test]
    fn test_update_without_key_is_rejected() {
        let err = Dml::<Keyless>::new().build_update(&Keyless::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingPrimaryKey { .. })));
    }

    #[tokio::test]
    async fn test_update_all_runs_one_statement_per_row() {
        let db = MemoryDatabase::new();
        db.push_update_counts([1, 1, 0]);
        let tx = db.transaction();
        let singers = [
            Singer::new("s1", "Marc", 1970),
            Singer::new("s2", "Catalina", 1990),
            Singer::new("s3", "Alice", 1980),
        ];

        let count = Dml::<Singer>::new().update_all(&tx, &singers).await.unwrap();
        assert_eq!(count, 2);

        let executed = tx.executed();
        assert_eq!(executed.len(), 3);
        assert_eq!(executed[1].param("w_SingerId"), Some(&Value::String("s2".into())));
        assert!(executed.iter().all(|s| s.sql.starts_with("UPDATE `Singers` SET")));
    }

    #[tokio::test]
    async fn test_update_all_validates_before_executing() {
        let db = MemoryDatabase::new();
        let tx = db.transaction();
        let singers = [Singer::new("s1", "Marc", 1970)];

        let err = Dml::<Singer>::new()
            .update_columns_all(&tx, &singers, &["Genre"])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(tx.executed().is_empty());
    }

    #[tokio::test]
    async fn test_update_columns_all_sets_only_requested_columns() {
        let db = MemoryDatabase::new();
        db.create_table("Singers", &["SingerId"]);
        let stored = [Singer::new("s1", "Marc", 1970), Singer::new("s2", "Catalina", 1990)];
        crate::mutation::Mutations::<Singer>::new()
            .apply_insert_or_update_all(&db, &stored)
            .await
            .unwrap();

        let tx = db.transaction();
        let renamed = [Singer::new("s1", "Marcus", 2001), Singer::new("s2", "Cat", 2002)];
        let dml = Dml::<Singer>::new();
        assert_eq!(dml.update_columns_all(&tx, &renamed, &["Name"]).await.unwrap(), 2);

        let executed = tx.executed();
        assert_eq!(executed.len(), 2);
        for (statement, singer) in executed.iter().zip(&renamed) {
            assert_eq!(
                statement.sql,
                "UPDATE `Singers` SET `Name`=@Name WHERE `SingerId`=@w_SingerId"
            );
            assert_eq!(statement.params.len(), 2);
            assert_eq!(statement.param("Name"), Some(&Value::String(singer.name.clone())));
        }

        let found = dml.reader(&tx).find_all(&crate::key::KeySet::all()).await.unwrap();
        let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
        let years: Vec<Option<i64>> = found.iter().map(|s| s.birth_year).collect();
        assert_eq!(names, vec!["Marcus", "Cat"]);
        assert_eq!(years, vec![Some(1970), Some(1990)]);
    }

    #[tokio::test]
    async fn test_update_all_stops_at_first_failure() {
        let db = MemoryDatabase::new();
        db.fail_next(TransportError::new(Code::FailedPrecondition, "constraint violated"));
        let tx = db.transaction();
        let singers = [Singer::new("s1", "Marc", 1970), Singer::new("s2", "Catalina", 1990)];

        let err = Dml::<Singer>::new().update_all(&tx, &singers).await.unwrap_err();
        assert_eq!(err.transport_error().map(TransportError::code), Some(Code::FailedPrecondition));
        assert_eq!(tx.executed().len(), 1);
    }
}
