use super::{collect, Reader};
use crate::error::{Error, Result};
use crate::field::{column_names, resolve_columns, Record};
use crate::key::{Key, KeySet};
use crate::row::FromRow;
use crate::transaction::ReadTransaction;
use crate::value::FromValue;

impl<T, Tx> Reader<'_, T, Tx>
where
    T: Record,
    Tx: ReadTransaction + ?Sized,
{
    /// The record at `key`, or [`Error::NotFound`]
    pub async fn find_one(&self, key: &Key) -> Result<T> {
        self.find_one_as(key, &column_names::<T>()).await
    }

    /// Records at `keys`; keys without a row are skipped
    pub async fn find_all(&self, keys: &KeySet) -> Result<Vec<T>> {
        self.find_all_as(keys, &column_names::<T>()).await
    }

    /// Like [`find_one`](Self::find_one) but fetching only `columns`; the
    /// other fields keep their default value
    pub async fn find_one_columns(&self, key: &Key, columns: &[&str]) -> Result<T> {
        let columns = resolve_columns::<T>(columns)?;
        self.find_one_as(key, &columns).await
    }

    pub async fn find_all_columns(&self, keys: &KeySet, columns: &[&str]) -> Result<Vec<T>> {
        let columns = resolve_columns::<T>(columns)?;
        self.find_all_as(keys, &columns).await
    }

    /// A single column of the row at `key`
    pub async fn get_column<V: FromValue>(&self, key: &Key, column: &str) -> Result<V> {
        let columns = resolve_columns::<T>(&[column])?;
        self.log_read(format_args!("table:{}", self.table), key);
        let row = self
            .tx
            .read_row(&self.table, key, &columns)
            .await
            .map_err(|e| Error::classify(self.read_context(), e))?;
        row.get_at(0)
    }

    /// A single column of every row at `keys`
    pub async fn get_column_all<V: FromValue>(
        &self,
        keys: &KeySet,
        column: &str,
    ) -> Result<Vec<V>> {
        let columns = resolve_columns::<T>(&[column])?;
        self.log_read(format_args!("table:{}", self.table), keys);
        let rows = self.tx.read(&self.table, keys, &columns);
        collect(rows, &self.read_context(), |row| row.get_at(0)).await
    }

    async fn find_one_as(&self, key: &Key, columns: &[&str]) -> Result<T> {
        self.log_read(format_args!("table:{}", self.table), key);
        let row = self
            .tx
            .read_row(&self.table, key, columns)
            .await
            .map_err(|e| Error::classify(self.read_context(), e))?;
        T::from_row(&row)
    }

    async fn find_all_as(&self, keys: &KeySet, columns: &[&str]) -> Result<Vec<T>> {
        self.log_read(format_args!("table:{}", self.table), keys);
        let rows = self.tx.read(&self.table, keys, columns);
        collect(rows, &self.read_context(), T::from_row).await
    }
}
