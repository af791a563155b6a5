//! Primary keys and key sets for key-addressed reads and deletes

use std::fmt;

use crate::field::Record;
use crate::value::{ToValue, Value};

/// Primary-key tuple, values in key-ordinal order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Key(Vec<Value>);

impl Key {
    pub fn new(values: Vec<Value>) -> Self {
        Key(values)
    }

    /// Key of a single-column primary key
    pub fn single(value: impl ToValue) -> Self {
        Key(vec![value.to_value()])
    }

    /// Key that addresses `record`
    pub fn of<T: Record>(record: &T) -> Self {
        Key(record.primary_key().into_iter().map(|field| field.value).collect())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

/// Build a [`Key`] from key-ordered values
///
/// ```rust,ignore
/// let key = key!["singer-1", 7i64];
/// ```
#[macro_export]
macro_rules! key {
    ($($value:expr),* $(,)?) => {
        $crate::Key::new(::std::vec![$($crate::ToValue::to_value(&$value)),*])
    };
}

/// A set of keys to read
#[derive(Debug, Clone, PartialEq)]
pub enum KeySet {
    /// Every row of the table
    All,
    Keys(Vec<Key>),
}

impl KeySet {
    pub fn all() -> Self {
        KeySet::All
    }

    pub fn keys(keys: impl IntoIterator<Item = Key>) -> Self {
        KeySet::Keys(keys.into_iter().collect())
    }

    /// Key set for a single-column primary key, one key per value
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToValue,
    {
        KeySet::Keys(values.into_iter().map(Key::single).collect())
    }

    /// Whether `key` belongs to the set
    pub fn contains(&self, key: &Key) -> bool {
        match self {
            KeySet::All => true,
            KeySet::Keys(keys) => keys.contains(key),
        }
    }
}

impl From<Key> for KeySet {
    fn from(key: Key) -> Self {
        KeySet::Keys(vec![key])
    }
}

impl From<Vec<Key>> for KeySet {
    fn from(keys: Vec<Key>) -> Self {
        KeySet::Keys(keys)
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeySet::keys(iter)
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySet::All => f.write_str("all"),
            KeySet::Keys(keys) => {
                f.write_str("[")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{Album, Scattered};

    #[test]
    fn test_key_macro() {
        let key = crate::key!["s1", 7i64];
        assert_eq!(key.values(), &[Value::String("s1".into()), Value::Int64(7)]);
        assert_eq!(key.to_string(), "(\"s1\", 7)");
    }

    #[test]
    fn test_key_of_record_uses_key_order() {
        let album = Album::new("s1", 7, "Total Junk");
        assert_eq!(Key::of(&album), crate::key!["s1", 7i64]);

        let scattered = Scattered::sample();
        assert_eq!(Key::of(&scattered), crate::key!["id-1", 2i64, "eu"]);
    }

    #[test]
    fn test_key_set_from_values() {
        let set = KeySet::from_values(["a", "b"]);
        assert_eq!(set, KeySet::Keys(vec![Key::single("a"), Key::single("b")]));
        assert!(set.contains(&Key::single("b")));
        assert!(!set.contains(&Key::single("c")));
        assert!(KeySet::all().contains(&Key::single("c")));
        assert_eq!(set.to_string(), "[(\"a\"), (\"b\")]");
    }
}
