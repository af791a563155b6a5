//! Identifier quoting and placeholder naming
//!
//! Value positions use the bare column name, predicate positions add a `w_`
//! prefix, and the Nth record of a batch adds an `_N` suffix after any
//! prefix. Two different positions therefore never share a parameter.

const WHERE_PREFIX: &str = "w_";

/// Backtick-quote an identifier
pub fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Parameter name used in a predicate position
pub fn where_param(name: &str) -> String {
    format!("{WHERE_PREFIX}{name}")
}

/// Parameter name for the record at `index` of a batch
pub fn indexed(name: &str, index: usize) -> String {
    format!("{name}_{index}")
}

/// `@name` marker for embedding into SQL text
pub fn placeholder(param: &str) -> String {
    format!("@{param}")
}
