use std::borrow::Borrow;

use super::{key_predicate, Dml};
use crate::error::Result;
use crate::field::Record;
use crate::statement::Statement;
use crate::transaction::ReadWriteTransaction;

impl<T: Record> Dml<T> {
    /// `DELETE` of the row addressed by `record`'s primary key
    pub fn build_delete(&self, record: &T) -> Result<Statement> {
        let keys = self.key_fields(record)?;
        let mut statement = Statement::default();
        let predicate = key_predicate(T::TYPE_NAME, keys, None, &mut statement)?;
        statement.sql = format!("DELETE FROM {} WHERE {}", self.quoted_table(), predicate);
        Ok(statement)
    }

    /// Single `DELETE` whose predicate ORs one key group per record
    pub fn build_delete_all<R: Borrow<T>>(&self, records: &[R]) -> Result<Statement> {
        let records = self.non_empty(records)?;
        let mut statement = Statement::default();
        let mut groups = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let keys = self.key_fields(record.borrow())?;
            let predicate = key_predicate(T::TYPE_NAME, keys, Some(i), &mut statement)?;
            groups.push(format!("({predicate})"));
        }
        statement.sql =
            format!("DELETE FROM {} WHERE {}", self.quoted_table(), groups.join(" OR "));
        Ok(statement)
    }

    pub async fn delete<Tx>(&self, tx: &Tx, record: &T) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        let statement = self.build_delete(record)?;
        self.execute(tx, statement).await
    }

    pub async fn delete_all<Tx, R>(&self, tx: &Tx, records: &[R]) -> Result<i64>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let statement = self.build_delete_all(records)?;
        self.execute(tx, statement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CapturedLog;
    use crate::memory::MemoryDatabase;
    use crate::options::Options;
    use crate::test_fixtures::{Album, Keyless, Test};
    use crate::value::Value;

    #[test]
    fn test_delete_single() {
        let statement = Dml::<Album>::new().build_delete(&Album::new("s1", 7, "x")).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM `AlbumCatalog` WHERE `SingerId`=@w_SingerId AND `AlbumId`=@w_AlbumId"
        );
        assert_eq!(statement.params.len(), 2);
    }

    #[test]
    fn test_delete_batch_or_of_and_groups() {
        let records = [Test::sample("testId1", 10), Test::sample("testId2", 20)];
        let statement = Dml::<Test>::new().build_delete_all(&records).unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM `Tests` WHERE (`String`=@w_String_0 AND `Int64`=@w_Int64_0) \
             OR (`String`=@w_String_1 AND `Int64`=@w_Int64_1)"
        );
        assert_eq!(statement.param("w_String_1"), Some(&Value::String("testId2".into())));
        assert_eq!(statement.param("w_Int64_0"), Some(&Value::Int64(10)));
        assert_eq!(statement.params.len(), 4);
    }

    #[test]
    fn test_delete_without_key_is_rejected() {
        assert!(Dml::<Keyless>::new().build_delete(&Keyless::default()).is_err());
        assert!(Dml::<Keyless>::new().build_delete_all(&[Keyless::default()]).is_err());
    }

    #[tokio::test]
    async fn test_delete_logs_statement() {
        let capture = CapturedLog::new();
        let options = Options::new().with_logger(capture.clone()).with_log_enabled(true);
        let dml = Dml::<Album>::with_options(options);
        let db = MemoryDatabase::new();
        db.push_update_counts([2]);
        let tx = db.transaction();

        let albums = [Album::new("s1", 1, "A"), Album::new("s1", 2, "B")];
        assert_eq!(dml.delete_all(&tx, &albums).await.unwrap(), 2);
        assert_eq!(capture.lines(), vec![
            "executing dml... sql:DELETE FROM `AlbumCatalog` \
             WHERE (`SingerId`=@w_SingerId_0 AND `AlbumId`=@w_AlbumId_0) \
             OR (`SingerId`=@w_SingerId_1 AND `AlbumId`=@w_AlbumId_1), \
             params:w_AlbumId_0=1, w_AlbumId_1=2, w_SingerId_0=\"s1\", w_SingerId_1=\"s1\""
                .to_string()
        ]);
    }
}
