//! Prelude module for convenient imports
//!
//! ```rust,ignore
//! use rowmap_core::prelude::*;
//! ```

pub use crate::dml::Dml;
pub use crate::error::{Error, Result};
pub use crate::field::Record;
pub use crate::key;
pub use crate::key::{Key, KeySet};
pub use crate::mutation::{Mutation, Mutations};
pub use crate::options::Options;
pub use crate::reader::Reader;
pub use crate::row::{FromRow, Row};
pub use crate::statement::Statement;
pub use crate::transaction::{Client, ReadTransaction, ReadWriteTransaction};
pub use crate::value::{FromValue, ToValue, Value};

#[cfg(feature = "macros")]
pub use rowmap_macros::Record;
