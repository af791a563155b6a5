//! Database values and conversions between them and Rust types
//!
//! [`Value`] is the type-erased cell that flows through statement parameters,
//! mutation payloads, keys and decoded rows. Record fields cross into it with
//! [`ToValue`] and come back out with [`FromValue`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A single database cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    /// Exact decimal, 96-bit mantissa with up to 28 fractional digits
    Numeric(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    Array(Vec<Value>),
}

impl Value {
    /// Name of the variant, used in decode errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int64(_) => "INT64",
            Value::Float64(_) => "FLOAT64",
            Value::Numeric(_) => "NUMERIC",
            Value::String(_) => "STRING",
            Value::Bytes(_) => "BYTES",
            Value::Date(_) => "DATE",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Json(_) => "JSON",
            Value::Array(_) => "ARRAY",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::Numeric(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{d}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Json(json) => write!(f, "{json}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Decimal column value. Construction from text validates it, so a
/// `Numeric` always holds a real number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Numeric(Decimal);

impl Numeric {
    pub fn new(value: Decimal) -> Self {
        Numeric(value)
    }

    /// Parses decimal text such as `"12.50"` or `"-0.001"`
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        Decimal::from_str(text.trim()).map(Numeric).map_err(|e| ValueError::InvalidNumeric {
            value: text.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Numeric {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Numeric::parse(s)
    }
}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        Numeric(value)
    }
}

impl From<Numeric> for Decimal {
    fn from(value: Numeric) -> Self {
        value.0
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversion failure from a [`Value`] into a Rust type
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: &'static str, found: &'static str },
    #[error("NULL cannot be stored in a non-optional {expected}")]
    UnexpectedNull { expected: &'static str },
    #[error("{value} does not fit in {expected}")]
    OutOfRange { expected: &'static str, value: i64 },
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("`{value}` is not a valid NUMERIC: {reason}")]
    InvalidNumeric { value: String, reason: String },
}

fn mismatch<T>(expected: &'static str, found: &Value) -> Result<T, ValueError> {
    if found.is_null() {
        Err(ValueError::UnexpectedNull { expected })
    } else {
        Err(ValueError::Mismatch { expected, found: found.type_name() })
    }
}

/// Conversion of a record field into a [`Value`]
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Conversion of a [`Value`] back into a record field
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => mismatch("BOOL", other),
        }
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int64(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Int64(i) => Ok(*i),
            other => mismatch("INT64", other),
        }
    }
}

// Narrower integers widen into INT64 and are range checked on the way back.
macro_rules! impl_narrow_int {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Int64(i64::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ValueError> {
                match value {
                    Value::Int64(i) => <$ty>::try_from(*i).map_err(|_| ValueError::OutOfRange {
                        expected: stringify!($ty),
                        value: *i,
                    }),
                    other => mismatch("INT64", other),
                }
            }
        }
    )*};
}

impl_narrow_int!(i16, i32, u16, u32);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float64(x) => Ok(*x),
            other => mismatch("FLOAT64", other),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float64(f64::from(*self))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float64(x) => Ok(*x as f32),
            other => mismatch("FLOAT64", other),
        }
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => mismatch("STRING", other),
        }
    }
}

impl ToValue for Decimal {
    fn to_value(&self) -> Value {
        Value::Numeric(*self)
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Numeric::from_value(value).map(|n| n.decimal())
    }
}

impl ToValue for Numeric {
    fn to_value(&self) -> Value {
        Value::Numeric(self.0)
    }
}

// Some drivers hand NUMERIC back as text; it is validated here.
impl FromValue for Numeric {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Numeric(n) => Ok(Numeric(*n)),
            Value::String(s) => Numeric::parse(s),
            other => mismatch("NUMERIC", other),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => mismatch("BYTES", other),
        }
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Date(d) => Ok(*d),
            other => mismatch("DATE", other),
        }
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            other => mismatch("TIMESTAMP", other),
        }
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Json(json) => Ok(json.clone()),
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| ValueError::Json(e.to_string()))
            }
            other => mismatch("JSON", other),
        }
    }
}

// Array columns. Listed per element type so that `Vec<u8>` stays BYTES.
macro_rules! impl_array {
    ($($ty:ty),*) => {$(
        impl ToValue for Vec<$ty> {
            fn to_value(&self) -> Value {
                Value::Array(self.iter().map(ToValue::to_value).collect())
            }
        }

        impl FromValue for Vec<$ty> {
            fn from_value(value: &Value) -> Result<Self, ValueError> {
                match value {
                    Value::Array(items) => items.iter().map(<$ty>::from_value).collect(),
                    other => mismatch("ARRAY", other),
                }
            }
        }
    )*};
}

impl_array!(
    bool,
    i64,
    f64,
    String,
    Numeric,
    Decimal,
    Vec<u8>,
    NaiveDate,
    DateTime<Utc>,
    Option<bool>,
    Option<i64>,
    Option<f64>,
    Option<String>
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_maps_to_null() {
        let name: Option<String> = None;
        assert_eq!(name.to_value(), Value::Null);
        assert_eq!(Some("a".to_string()).to_value(), Value::String("a".to_string()));
        assert_eq!(Option::<i64>::from_value(&Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int64(3)), Ok(Some(3)));
    }

    #[test]
    fn test_null_into_required_field_fails() {
        assert_eq!(
            String::from_value(&Value::Null),
            Err(ValueError::UnexpectedNull { expected: "STRING" })
        );
    }

    #[test]
    fn test_type_mismatch_names_both_sides() {
        let err = i64::from_value(&Value::String("10".to_string())).unwrap_err();
        assert_eq!(err, ValueError::Mismatch { expected: "INT64", found: "STRING" });
        assert_eq!(err.to_string(), "expected INT64, found STRING");
    }

    #[test]
    fn test_narrow_integers_are_range_checked() {
        assert_eq!(7i32.to_value(), Value::Int64(7));
        assert_eq!(i32::from_value(&Value::Int64(7)), Ok(7));
        assert!(matches!(
            u16::from_value(&Value::Int64(-1)),
            Err(ValueError::OutOfRange { expected: "u16", value: -1 })
        ));
    }

    #[test]
    fn test_bytes_and_arrays_stay_distinct() {
        assert_eq!(vec![1u8, 2].to_value(), Value::Bytes(vec![1, 2]));
        assert_eq!(
            vec![1i64, 2].to_value(),
            Value::Array(vec![Value::Int64(1), Value::Int64(2)])
        );
        let tags = Vec::<String>::from_value(&Value::Array(vec![Value::String("x".into())]));
        assert_eq!(tags, Ok(vec!["x".to_string()]));
    }

    #[test]
    fn test_json_accepts_string_payload() {
        let parsed = serde_json::Value::from_value(&Value::String("{\"a\":1}".into())).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn test_numeric_rejects_text_that_is_not_a_number() {
        let price = Numeric::parse("12.50").unwrap();
        assert_eq!(price.decimal(), Decimal::new(1250, 2));
        assert_eq!(price.to_string(), "12.50");
        assert_eq!(" 3 ".parse::<Numeric>(), Ok(Numeric::new(Decimal::from(3))));

        let err = Numeric::parse("not a number").unwrap_err();
        assert!(matches!(
            err,
            ValueError::InvalidNumeric { ref value, .. } if value == "not a number"
        ));
        assert!("1.2.3".parse::<Numeric>().is_err());
        assert!(Numeric::parse("").is_err());
    }

    #[test]
    fn test_numeric_decodes_from_text_cells() {
        assert_eq!(
            Numeric::from_value(&Value::String("99.99".into())),
            Ok(Numeric::new(Decimal::new(9999, 2)))
        );
        assert!(matches!(
            Numeric::from_value(&Value::String("ninety".into())),
            Err(ValueError::InvalidNumeric { .. })
        ));
        assert_eq!(
            Decimal::from_value(&Value::Numeric(Decimal::new(5, 1))),
            Ok(Decimal::new(5, 1))
        );
        assert_eq!(
            Numeric::from_value(&Value::Float64(1.5)),
            Err(ValueError::Mismatch { expected: "NUMERIC", found: "FLOAT64" })
        );
    }

    #[test]
    fn test_display_for_logging() {
        assert_eq!(Value::String("testId1".into()).to_string(), "\"testId1\"");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(
            Value::Array(vec![Value::Int64(1), Value::Bool(true)]).to_string(),
            "[1, true]"
        );
        assert_eq!(Value::Bytes(vec![0; 3]).to_string(), "<3 bytes>");
        assert_eq!(Value::Numeric(Decimal::new(1250, 2)).to_string(), "12.50");
    }
}
