//! Error types and transport error classification
//!
//! Callers branch on the two sentinels, [`Error::NotFound`] and
//! [`Error::MultipleFound`], by matching on the variant. Every other
//! transport failure is wrapped into [`Error::Execution`] with the call site
//! that produced it; the original [`TransportError`] stays reachable through
//! [`std::error::Error::source`].

use crate::transaction::TransportError;

/// Result type for every fallible operation in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Zero rows for an operation that expects exactly one
    #[error("record not found")]
    NotFound,
    /// More than one row for an operation that expects at most one
    #[error("more than one record found")]
    MultipleFound,
    /// Caller input rejected before anything was built or executed
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A row value that does not fit the target type
    #[error("failed to decode column `{column}`: {reason}")]
    Decode { column: String, reason: String },
    /// Any other failure reported by the transport
    #[error("{context}: {source}")]
    Execution {
        context: String,
        #[source]
        source: TransportError,
    },
}

/// Input rejected before any statement or mutation is built
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("batch of {type_name} records must not be empty")]
    EmptyBatch { type_name: &'static str },
    #[error("{type_name} has no primary key field")]
    MissingPrimaryKey { type_name: &'static str },
    #[error("{type_name} has no mapped column named `{column}`")]
    UnknownColumn { type_name: &'static str, column: String },
    #[error("no columns to write for {type_name}")]
    NoColumns { type_name: &'static str },
    #[error("parameter @{param} of {type_name} is bound twice")]
    ParamCollision { type_name: &'static str, param: String },
}

impl Error {
    /// Wrap a transport failure, keeping the call-site context
    pub fn execution(context: impl Into<String>, source: TransportError) -> Self {
        Error::Execution { context: context.into(), source }
    }

    /// Classify a failure from a key lookup: a transport "row absent" signal
    /// becomes the [`Error::NotFound`] sentinel, anything else is wrapped.
    pub fn classify(context: impl Into<String>, source: TransportError) -> Self {
        if source.is_not_found() {
            Error::NotFound
        } else {
            Error::execution(context, source)
        }
    }

    pub(crate) fn decode(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Decode { column: column.into(), reason: reason.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    pub fn is_multiple_found(&self) -> bool {
        matches!(self, Error::MultipleFound)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The transport error behind an [`Error::Execution`]
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Error::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}
