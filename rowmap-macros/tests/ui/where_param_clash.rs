#![allow(dead_code)]

use rowmap_core::Record;

#[derive(Record)]
struct Clash {
    #[db(column = "Id", pk = 1)]
    id: String,
    #[db(column = "w_Id")]
    w_id: String,
}

fn main() {}
