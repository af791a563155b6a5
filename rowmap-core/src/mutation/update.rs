use std::borrow::Borrow;

use chrono::{DateTime, Utc};

use super::{columns_and_values, select_fields, Mutation, Mutations};
use crate::error::Result;
use crate::field::Record;
use crate::transaction::{Client, ReadWriteTransaction};

impl<T: Record> Mutations<T> {
    /// Update writing every tagged column; the row must already exist
    pub fn build_update(&self, record: &T) -> Result<Mutation> {
        self.require_key()?;
        let (columns, values) = columns_and_values(record.to_fields());
        Ok(Mutation::update(self.table.clone(), columns, values))
    }

    /// Update writing the key columns plus `columns`
    pub fn build_update_columns(&self, record: &T, columns: &[&str]) -> Result<Mutation> {
        self.require_key()?;
        let written = self.write_columns(columns)?;
        let (columns, values) = columns_and_values(select_fields(record.to_fields(), &written));
        Ok(Mutation::update(self.table.clone(), columns, values))
    }

    pub fn build_update_all<R: Borrow<T>>(&self, records: &[R]) -> Result<Vec<Mutation>> {
        self.build_each(records, |record| self.build_update(record))
    }

    pub fn build_update_columns_all<R: Borrow<T>>(
        &self,
        records: &[R],
        columns: &[&str],
    ) -> Result<Vec<Mutation>> {
        self.build_each(records, |record| self.build_update_columns(record, columns))
    }

    pub fn update<Tx>(&self, tx: &Tx, record: &T) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.update_all(tx, std::slice::from_ref(record))
    }

    pub fn update_all<Tx, R>(&self, tx: &Tx, records: &[R]) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_update_all(records)?;
        self.buffer(tx, mutations)
    }

    pub fn update_columns<Tx>(&self, tx: &Tx, record: &T, columns: &[&str]) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
    {
        self.update_columns_all(tx, std::slice::from_ref(record), columns)
    }

    pub fn update_columns_all<Tx, R>(&self, tx: &Tx, records: &[R], columns: &[&str]) -> Result<()>
    where
        Tx: ReadWriteTransaction + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_update_columns_all(records, columns)?;
        self.buffer(tx, mutations)
    }

    pub async fn apply_update<C>(&self, client: &C, record: &T) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
    {
        self.apply_update_all(client, std::slice::from_ref(record)).await
    }

    pub async fn apply_update_all<C, R>(&self, client: &C, records: &[R]) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_update_all(records)?;
        self.apply(client, mutations).await
    }

    pub async fn apply_update_columns<C>(
        &self,
        client: &C,
        record: &T,
        columns: &[&str],
    ) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
    {
        self.apply_update_columns_all(client, std::slice::from_ref(record), columns).await
    }

    pub async fn apply_update_columns_all<C, R>(
        &self,
        client: &C,
        records: &[R],
        columns: &[&str],
    ) -> Result<DateTime<Utc>>
    where
        C: Client + ?Sized,
        R: Borrow<T>,
    {
        let mutations = self.build_update_columns_all(records, columns)?;
        self.apply(client, mutations).await
    }
}
