//! In-memory database for tests
//!
//! [`MemoryDatabase`] implements every transport capability the engine needs:
//! key reads, buffered and immediately applied mutations, and execution of
//! the `INSERT`, `UPDATE` and `DELETE` shapes that [`Dml`](crate::Dml)
//! renders. SQL queries are not interpreted; their results are stubbed per
//! SQL text with [`MemoryDatabase::stub_query`].
//!
//! ```rust,ignore
//! let db = MemoryDatabase::new();
//! db.create_table("Singers", &["SingerId"]);
//!
//! let tx = db.transaction();
//! Dml::<Singer>::new().insert(&tx, &singer).await?;
//! let found = Reader::<Singer, _>::new(&tx).find_one(&Key::single("s1")).await?;
//! ```
//!
//! Statements run against the shared state as soon as they execute, while
//! buffered mutations wait for [`MemoryTransaction::commit`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use crate::key::{Key, KeySet};
use crate::mutation::Mutation;
use crate::row::Row;
use crate::statement::Statement;
use crate::transaction::{
    Client, Code, ReadTransaction, ReadWriteTransaction, RowStream, TransportError,
};
use crate::value::Value;

type TransportResult<T> = std::result::Result<T, TransportError>;

#[derive(Debug, Default)]
struct Table {
    key_columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    fn key_of(&self, row: &Row) -> TransportResult<Key> {
        self.key_columns
            .iter()
            .map(|column| {
                row.value(column).cloned().ok_or_else(|| {
                    let message = format!("missing key column `{column}`");
                    TransportError::new(Code::InvalidArgument, message)
                })
            })
            .collect::<TransportResult<Vec<Value>>>()
            .map(Key::new)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.rows.iter().position(|row| self.key_of(row).is_ok_and(|k| &k == key))
    }

    /// Rows addressed by `keys`, in request order for explicit keys
    fn lookup(&self, keys: &KeySet) -> Vec<&Row> {
        match keys {
            KeySet::All => self.rows.iter().collect(),
            KeySet::Keys(keys) => keys
                .iter()
                .filter_map(|key| self.position(key).map(|i| &self.rows[i]))
                .collect(),
        }
    }

    fn upsert(&mut self, row: Row, must_exist: bool) -> TransportResult<()> {
        let key = self.key_of(&row)?;
        match self.position(&key) {
            Some(i) => {
                self.rows[i] = merge(&self.rows[i], &row);
                Ok(())
            }
            None if must_exist => Err(TransportError::not_found(format!("row {key} not found"))),
            None => {
                self.rows.push(row);
                Ok(())
            }
        }
    }

    fn insert(&mut self, row: Row) -> TransportResult<()> {
        let key = self.key_of(&row)?;
        if self.position(&key).is_some() {
            let message = format!("row {key} already exists");
            return Err(TransportError::new(Code::AlreadyExists, message));
        }
        self.rows.push(row);
        Ok(())
    }
}

/// `base` with every column of `changes` overwritten or appended
fn merge(base: &Row, changes: &Row) -> Row {
    let mut pairs: Vec<(String, Value)> =
        base.columns().iter().cloned().zip(base.values().iter().cloned()).collect();
    for (column, value) in changes.columns().iter().zip(changes.values()) {
        match pairs.iter_mut().find(|(existing, _)| existing == column) {
            Some(pair) => pair.1 = value.clone(),
            None => pairs.push((column.clone(), value.clone())),
        }
    }
    Row::from_pairs(pairs)
}

/// `row` restricted to `columns`; columns the row never stored read as NULL
fn project(row: &Row, columns: &[&str]) -> Row {
    Row::from_pairs(
        columns
            .iter()
            .map(|column| (*column, row.value(column).cloned().unwrap_or(Value::Null))),
    )
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Table>,
    stubbed_queries: BTreeMap<String, Vec<Row>>,
    update_counts: VecDeque<i64>,
    failures: VecDeque<TransportError>,
    applied: Vec<Vec<Mutation>>,
    queries: Vec<Statement>,
}

impl State {
    fn take_failure(&mut self) -> TransportResult<()> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn table(&self, name: &str) -> TransportResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| TransportError::not_found(format!("table `{name}` not found")))
    }

    fn table_mut(&mut self, name: &str) -> TransportResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TransportError::not_found(format!("table `{name}` not found")))
    }

    /// Apply mutations all-or-nothing
    fn apply(&mut self, mutations: &[Mutation]) -> TransportResult<()> {
        let snapshot: BTreeMap<String, Vec<Row>> =
            self.tables.iter().map(|(name, table)| (name.clone(), table.rows.clone())).collect();
        let result = mutations.iter().try_for_each(|mutation| self.apply_one(mutation));
        if result.is_err() {
            for (name, rows) in snapshot {
                if let Some(table) = self.tables.get_mut(&name) {
                    table.rows = rows;
                }
            }
        }
        result
    }

    fn apply_one(&mut self, mutation: &Mutation) -> TransportResult<()> {
        match mutation {
            Mutation::InsertOrUpdate { table, columns, values } => {
                let row = Row::new(columns.clone(), values.clone());
                self.table_mut(table)?.upsert(row, false)
            }
            Mutation::Update { table, columns, values } => {
                let row = Row::new(columns.clone(), values.clone());
                self.table_mut(table)?.upsert(row, true)
            }
            Mutation::Delete { table, keys } => {
                let table = self.table_mut(table)?;
                match keys {
                    KeySet::All => table.rows.clear(),
                    KeySet::Keys(keys) => {
                        for key in keys {
                            if let Some(i) = table.position(key) {
                                table.rows.remove(i);
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn execute(&mut self, statement: &Statement) -> TransportResult<i64> {
        if let Some(count) = self.update_counts.pop_front() {
            return Ok(count);
        }
        match dml::parse(statement)? {
            dml::Command::Insert { table, rows } => {
                let count = rows.len() as i64;
                let table = self.table_mut(&table)?;
                for row in rows {
                    table.insert(row)?;
                }
                Ok(count)
            }
            dml::Command::Update { table, set, groups } => {
                let table = self.table_mut(&table)?;
                let mut count = 0;
                for row in table.rows.iter_mut().filter(|row| dml::matches(row, &groups)) {
                    *row = merge(row, &set);
                    count += 1;
                }
                Ok(count)
            }
            dml::Command::Delete { table, groups } => {
                let table = self.table_mut(&table)?;
                let before = table.rows.len();
                table.rows.retain(|row| !dml::matches(row, &groups));
                Ok((before - table.rows.len()) as i64)
            }
        }
    }
}

/// Shared in-memory database; clones share state
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or reset) a table keyed by `key_columns`, in key order
    pub fn create_table(&self, name: &str, key_columns: &[&str]) {
        let table = Table {
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        };
        self.state().tables.insert(name.to_string(), table);
    }

    pub fn transaction(&self) -> MemoryTransaction {
        MemoryTransaction {
            db: self.clone(),
            buffered: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Rows a query with exactly this SQL text returns; other queries
    /// return nothing
    pub fn stub_query(&self, sql: impl Into<String>, rows: Vec<Row>) {
        self.state().stubbed_queries.insert(sql.into(), rows);
    }

    /// Affected-row counts returned by the next statements instead of
    /// executing them
    pub fn push_update_counts(&self, counts: impl IntoIterator<Item = i64>) {
        self.state().update_counts.extend(counts);
    }

    /// Make the next transport call fail with `err`
    pub fn fail_next(&self, err: TransportError) {
        self.state().failures.push_back(err);
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state().tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.state().tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// Mutation batches applied so far, by `apply` or by a commit
    pub fn applied(&self) -> Vec<Vec<Mutation>> {
        self.state().applied.clone()
    }

    /// Queries run so far, in order
    pub fn queries(&self) -> Vec<Statement> {
        self.state().queries.clone()
    }

    fn apply_now(&self, mutations: Vec<Mutation>) -> TransportResult<DateTime<Utc>> {
        let mut state = self.state();
        state.take_failure()?;
        state.apply(&mutations)?;
        state.applied.push(mutations);
        Ok(Utc::now())
    }

    fn read_rows(&self, table: &str, keys: &KeySet, columns: &[&str]) -> TransportResult<Vec<Row>> {
        let mut state = self.state();
        state.take_failure()?;
        let table = state.table(table)?;
        Ok(table.lookup(keys).into_iter().map(|row| project(row, columns)).collect())
    }
}

#[async_trait]
impl Client for MemoryDatabase {
    async fn apply(&self, mutations: Vec<Mutation>) -> Result<DateTime<Utc>, TransportError> {
        self.apply_now(mutations)
    }
}

/// Transaction over a [`MemoryDatabase`]
#[derive(Debug)]
pub struct MemoryTransaction {
    db: MemoryDatabase,
    buffered: Mutex<Vec<Mutation>>,
    executed: Mutex<Vec<Statement>>,
}

impl MemoryTransaction {
    /// Mutations buffered and not yet committed
    pub fn buffered(&self) -> Vec<Mutation> {
        self.buffered.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Statements executed through this transaction, including failed ones
    pub fn executed(&self) -> Vec<Statement> {
        self.executed.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply the buffered mutations, returning the commit timestamp
    pub fn commit(self) -> Result<DateTime<Utc>, TransportError> {
        let mutations = self.buffered.into_inner().unwrap_or_else(PoisonError::into_inner);
        if mutations.is_empty() {
            return Ok(Utc::now());
        }
        self.db.apply_now(mutations)
    }
}

#[async_trait]
impl ReadTransaction for MemoryTransaction {
    fn read(&self, table: &str, keys: &KeySet, columns: &[&str]) -> RowStream<'_> {
        match self.db.read_rows(table, keys, columns) {
            Ok(rows) => stream::iter(rows.into_iter().map(Ok)).boxed(),
            Err(err) => stream::iter([Err(err)]).boxed(),
        }
    }

    async fn read_row(
        &self,
        table: &str,
        key: &Key,
        columns: &[&str],
    ) -> Result<Row, TransportError> {
        let keys = KeySet::from(key.clone());
        self.db
            .read_rows(table, &keys, columns)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                TransportError::not_found(format!("row {key} not found in table `{table}`"))
            })
    }

    fn query(&self, statement: Statement) -> RowStream<'_> {
        let mut state = self.db.state();
        let result = state.take_failure().map(|()| {
            state.stubbed_queries.get(&statement.sql).cloned().unwrap_or_default()
        });
        state.queries.push(statement);
        match result {
            Ok(rows) => stream::iter(rows.into_iter().map(Ok)).boxed(),
            Err(err) => stream::iter([Err(err)]).boxed(),
        }
    }
}

#[async_trait]
impl ReadWriteTransaction for MemoryTransaction {
    async fn execute_update(&self, statement: Statement) -> Result<i64, TransportError> {
        self.executed.lock().unwrap_or_else(PoisonError::into_inner).push(statement.clone());
        let mut state = self.db.state();
        state.take_failure()?;
        state.execute(&statement)
    }

    fn buffer_write(&self, mutations: Vec<Mutation>) -> Result<(), TransportError> {
        self.db.state().take_failure()?;
        self.buffered.lock().unwrap_or_else(PoisonError::into_inner).extend(mutations);
        Ok(())
    }
}

/// Interpreter for the statement shapes [`Dml`](crate::Dml) renders
mod dml {
    use super::TransportResult;
    use crate::row::Row;
    use crate::statement::Statement;
    use crate::transaction::{Code, TransportError};
    use crate::value::Value;

    pub(super) enum Command {
        Insert { table: String, rows: Vec<Row> },
        Update { table: String, set: Row, groups: Vec<Row> },
        Delete { table: String, groups: Vec<Row> },
    }

    fn unsupported(sql: &str) -> TransportError {
        TransportError::new(Code::InvalidArgument, format!("unsupported statement: {sql}"))
    }

    pub(super) fn parse(statement: &Statement) -> TransportResult<Command> {
        let sql = statement.sql.trim();
        let fail = || unsupported(sql);

        if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
            let (table, rest) = identifier(rest).ok_or_else(fail)?;
            let rest = rest.trim_start().strip_prefix('(').ok_or_else(fail)?;
            let (columns, rest) = rest.split_once(") VALUES ").ok_or_else(fail)?;
            let columns = columns
                .split(", ")
                .map(|c| identifier(c).map(|(name, _)| name))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(fail)?;

            let tuples = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')).ok_or_else(fail)?;
            let mut rows = Vec::new();
            for tuple in tuples.split("), (") {
                let values = tuple
                    .split(", ")
                    .map(|placeholder| bind(statement, placeholder))
                    .collect::<TransportResult<Vec<Value>>>()?;
                rows.push(Row::new(columns.clone(), values));
            }
            return Ok(Command::Insert { table, rows });
        }

        if let Some(rest) = sql.strip_prefix("UPDATE ") {
            let (table, rest) = identifier(rest).ok_or_else(fail)?;
            let rest = rest.trim_start().strip_prefix("SET ").ok_or_else(fail)?;
            let (assignments, predicate) = rest.split_once(" WHERE ").ok_or_else(fail)?;
            let set = conditions(statement, assignments, ", ")?;
            let groups = groups(statement, predicate)?;
            return Ok(Command::Update { table, set, groups });
        }

        if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
            let (table, rest) = identifier(rest).ok_or_else(fail)?;
            let predicate = rest.trim_start().strip_prefix("WHERE ").ok_or_else(fail)?;
            let groups = groups(statement, predicate)?;
            return Ok(Command::Delete { table, groups });
        }

        Err(fail())
    }

    /// Whether `row` satisfies any of the AND-groups
    pub(super) fn matches(row: &Row, groups: &[Row]) -> bool {
        groups.iter().any(|group| {
            group
                .columns()
                .iter()
                .zip(group.values())
                .all(|(column, value)| row.value(column) == Some(value))
        })
    }

    /// Leading backtick-quoted identifier and the remaining text
    fn identifier(text: &str) -> Option<(String, &str)> {
        let rest = text.trim_start().strip_prefix('`')?;
        let end = rest.find('`')?;
        Some((rest[..end].to_string(), &rest[end + 1..]))
    }

    fn bind(statement: &Statement, placeholder: &str) -> TransportResult<Value> {
        let name = placeholder.trim().strip_prefix('@').ok_or_else(|| unsupported(placeholder))?;
        statement
            .params
            .get(name)
            .cloned()
            .ok_or_else(|| {
                TransportError::new(Code::InvalidArgument, format!("no value bound for @{name}"))
            })
    }

    /// `` `a`=@p<sep>`b`=@q `` as a row of column/value pairs
    fn conditions(statement: &Statement, text: &str, separator: &str) -> TransportResult<Row> {
        let mut pairs = Vec::new();
        for term in text.split(separator) {
            let (column, placeholder) = term.split_once('=').ok_or_else(|| unsupported(term))?;
            let (column, _) = identifier(column).ok_or_else(|| unsupported(term))?;
            pairs.push((column, bind(statement, placeholder)?));
        }
        Ok(Row::from_pairs(pairs))
    }

    fn groups(statement: &Statement, predicate: &str) -> TransportResult<Vec<Row>> {
        predicate
            .split(" OR ")
            .map(|group| {
                let group = group.trim().trim_start_matches('(').trim_end_matches(')');
                conditions(statement, group, " AND ")
            })
            .collect()
    }
}
