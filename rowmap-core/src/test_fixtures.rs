//! Record types shared by the unit tests

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::value::Numeric;
use crate::Record;

/// One column per supported type, keyed by (`String`, `Int64`)
#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Test {
    #[db(column = "String", pk = 1)]
    pub string: String,
    #[db(column = "Int64", pk = 2)]
    pub int64: i64,
    #[db(column = "Float64")]
    pub float64: f64,
    #[db(column = "Bool")]
    pub bool: bool,
    #[db(column = "Bytes")]
    pub bytes: Vec<u8>,
    #[db(column = "Date")]
    pub date: Option<NaiveDate>,
    #[db(column = "Timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[db(column = "Numeric")]
    pub numeric: Numeric,
    #[db(column = "NullString")]
    pub null_string: Option<String>,
    #[db(column = "NullInt64")]
    pub null_int64: Option<i64>,
    #[db(column = "StringArray")]
    pub string_array: Vec<String>,
    pub not_tagged: String,
}

impl Test {
    pub fn sample(string: &str, int64: i64) -> Self {
        Self {
            string: string.to_string(),
            int64,
            float64: 0.5,
            bool: true,
            bytes: b"bytes".to_vec(),
            date: NaiveDate::from_ymd_opt(2024, 2, 29),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).single(),
            numeric: Numeric::new(rust_decimal::Decimal::new(1250, 2)),
            null_string: Some("a".to_string()),
            null_int64: None,
            string_array: vec!["x".to_string(), "y".to_string()],
            not_tagged: "ignored".to_string(),
        }
    }
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
#[db(table = "Singers")]
pub struct Singer {
    #[db(column = "SingerId", pk = 1)]
    pub singer_id: String,
    #[db(column = "Name")]
    pub name: String,
    #[db(column = "BirthYear")]
    pub birth_year: Option<i64>,
    pub nickname: String,
}

impl Singer {
    pub fn new(singer_id: &str, name: &str, birth_year: i64) -> Self {
        Self {
            singer_id: singer_id.to_string(),
            name: name.to_string(),
            birth_year: Some(birth_year),
            nickname: String::new(),
        }
    }
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
#[db(table = "AlbumCatalog")]
pub struct Album {
    #[db(column = "SingerId", pk = 1)]
    pub singer_id: String,
    #[db(column = "AlbumId", pk = 2)]
    pub album_id: i64,
    #[db(column = "Title")]
    pub title: String,
}

impl Album {
    pub fn new(singer_id: &str, album_id: i64, title: &str) -> Self {
        Self { singer_id: singer_id.to_string(), album_id, title: title.to_string() }
    }
}

/// Key fields declared out of key order, with ordinary fields between them
#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Scattered {
    #[db(column = "Region", pk = 3)]
    pub region: String,
    #[db(column = "Note")]
    pub note: String,
    #[db(column = "Id", pk = 1)]
    pub id: String,
    #[db(column = "Label")]
    pub label: String,
    #[db(column = "Shard", pk = "2")]
    pub shard: i64,
}

impl Scattered {
    pub fn sample() -> Self {
        Self {
            region: "eu".to_string(),
            note: "n".to_string(),
            id: "id-1".to_string(),
            label: "l".to_string(),
            shard: 2,
        }
    }
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Keyless {
    #[db(column = "Message")]
    pub message: String,
}
