use std::borrow::Borrow;

use chrono::{DateTime, Utc};

use super::{Mutation, Mutations};
use crate::error::Result;
use crate::field::Record;
use crate::key::Key;
use crate::transaction::{Client, ReadWriteTransaction};

impl<T: Record> Mutations<T> {
    /// Delete of the row addressed by `record`'s primary key
    pub fn build_delete(&self, record: &T) -> Result<Mutation> {
        self.require_key()?;
        Ok(Mutation::delete(self.table.clone(), Key::of(record)))
    }

    pub fn build_delete_all<R: Borrow<T>>(&self, records: &[R]) -> Result<Vec<Mutation>> {
        self.build_each(records, |record| self.build_delete(record))
    }

    pub fn delete<Tx>(&self, tx: &Tx, record: &T) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.delete_all(tx, std::slice::from_ref(record))
    }

    pub fn delete_all<Tx, R>(&self, tx: &Tx, records: &[R]) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_delete_all(records)?;
        self.buffer(tx, mutations)
    }

    pub async fn apply_delete<C>(&self, client: &C, record: &T) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
    {
        self.apply_delete_all(client, std::slice::from_ref(record)).await
    }

    pub async fn apply_delete_all<C, R>(&self, client: &C, records: &[R]) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_delete_all(records)?;
        self.apply(client, mutations).await
    }
}
