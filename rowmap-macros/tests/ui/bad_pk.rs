#![allow(dead_code)]

use rowmap_core::Record;

#[derive(Record)]
struct Singer {
    #[db(column = "SingerId", pk = 0)]
    singer_id: String,
}

fn main() {}
