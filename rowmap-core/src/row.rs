//! Result rows and decoding into typed values

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

/// One row returned by the transport: column names paired with values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from parallel column and value lists.
    ///
    /// Extra entries on the longer side are dropped.
    pub fn new(mut columns: Vec<String>, mut values: Vec<Value>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values) = pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))
    }

    /// Raw value of a column, matched exactly first and then ignoring case
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.position(column).map(|i| &self.values[i])
    }

    /// Decode a column that must be present in the row
    pub fn get<V: FromValue>(&self, column: &str) -> Result<V> {
        let value = self
            .value(column)
            .ok_or_else(|| Error::decode(column, "column is not present in the row"))?;
        V::from_value(value).map_err(|e| Error::decode(column, e.to_string()))
    }

    /// Decode a column, or fall back to `V::default()` when the row does not
    /// carry it (partial projections)
    pub fn get_or_default<V: FromValue + Default>(&self, column: &str) -> Result<V> {
        match self.value(column) {
            Some(value) => V::from_value(value).map_err(|e| Error::decode(column, e.to_string())),
            None => Ok(V::default()),
        }
    }

    /// Decode the value at a position
    pub fn get_at<V: FromValue>(&self, index: usize) -> Result<V> {
        let column = self.columns.get(index).map(String::as_str).unwrap_or("?");
        let value = self
            .values
            .get(index)
            .ok_or_else(|| Error::decode(format!("#{index}"), "row has no such position"))?;
        V::from_value(value).map_err(|e| Error::decode(column, e.to_string()))
    }

    /// Copy of this row restricted to `columns`, in that order.
    ///
    /// Columns the row does not carry are skipped.
    pub fn project(&self, columns: &[&str]) -> Row {
        Row::from_pairs(
            columns
                .iter()
                .filter_map(|c| self.position(c))
                .map(|i| (self.columns[i].clone(), self.values[i].clone())),
        )
    }
}

/// Construction of a value from a whole row
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::Singer;

    fn singer_row() -> Row {
        Row::from_pairs([
            ("SingerId", Value::String("s1".into())),
            ("Name", Value::String("Marc".into())),
            ("BirthYear", Value::Null),
        ])
    }

    #[test]
    fn test_lookup_prefers_exact_then_ignores_case() {
        let row = Row::from_pairs([("name", Value::Int64(1)), ("Name", Value::Int64(2))]);
        assert_eq!(row.value("Name"), Some(&Value::Int64(2)));
        assert_eq!(row.value("NAME"), Some(&Value::Int64(1)));
        assert_eq!(row.value("missing"), None);
    }

    #[test]
    fn test_get_reports_column_on_failure() {
        let row = singer_row();
        assert_eq!(row.get::<String>("Name").unwrap(), "Marc");
        assert_eq!(row.get::<Option<i64>>("BirthYear").unwrap(), None);

        match row.get::<i64>("Name") {
            Err(Error::Decode { column, reason }) => {
                assert_eq!(column, "Name");
                assert_eq!(reason, "expected INT64, found STRING");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(row.get::<String>("Label"), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_get_or_default_for_absent_columns() {
        let row = Row::from_pairs([("Name", Value::String("Marc".into()))]);
        assert_eq!(row.get_or_default::<String>("SingerId").unwrap(), "");
        assert_eq!(row.get_or_default::<String>("Name").unwrap(), "Marc");
    }

    #[test]
    fn test_decode_record() {
        let singer = Singer::from_row(&singer_row()).unwrap();
        assert_eq!(singer.singer_id, "s1");
        assert_eq!(singer.name, "Marc");
        assert_eq!(singer.birth_year, None);
        assert_eq!(singer.nickname, "");
    }

    #[test]
    fn test_project_and_positions() {
        let row = singer_row().project(&["name", "SingerId", "Label"]);
        assert_eq!(row.columns(), &["Name".to_string(), "SingerId".to_string()]);
        assert_eq!(row.get_at::<String>(1).unwrap(), "s1");
        assert!(row.get_at::<String>(5).is_err());
    }

    #[test]
    fn test_new_truncates_to_shorter_side() {
        let row = Row::new(vec!["A".into(), "B".into()], vec![Value::Bool(true)]);
        assert_eq!(row.len(), 1);
        assert!(!row.is_empty());
    }
}
