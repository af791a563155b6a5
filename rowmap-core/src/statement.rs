//! Parameterized SQL statements

use std::collections::BTreeMap;
use std::fmt;

use crate::value::{ToValue, Value};

/// SQL text plus named parameter values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub params: BTreeMap<String, Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), params: BTreeMap::new() }
    }

    /// Bind a parameter, replacing any previous value of the same name
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToValue) -> Self {
        self.params.insert(name.into(), value.to_value());
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Parameters flattened as `name=value` pairs in name order, for logging
    pub fn flat_params(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.sql, self.flat_params())
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::new(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_flattened_in_name_order() {
        let stmt =
            Statement::new("SELECT * FROM `Singers` WHERE `Name`=@Name AND `BirthYear`>@year")
                .with_param("year", 1960i64)
                .with_param("Name", "Marc");
        assert_eq!(stmt.flat_params(), "Name=\"Marc\", year=1960");
        assert_eq!(stmt.param("year"), Some(&Value::Int64(1960)));
    }

    #[test]
    fn test_from_text() {
        let stmt: Statement = "SELECT 1".into();
        assert!(stmt.params.is_empty());
        assert_eq!(stmt.to_string(), "SELECT 1 []");
    }
}
