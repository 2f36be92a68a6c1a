//! Crate-scoped error handling for redb-partition.
//!
//! This module provides a unified error type for public APIs while keeping
//! precise per-layer error information for matching and diagnostics.

use std::fmt;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type exposed to users of the crate.
///
/// Each variant wraps the typed error of one layer; no kind is retried
/// internally and none is swallowed.
#[derive(Debug)]
pub enum Error {
    /// Errors from the record store adapter
    Store(crate::store::StoreError),

    /// Errors from the bulk loader
    Load(crate::loader::LoadError),

    /// Errors from partition materialization
    Partition(crate::partition::PartitionError),

    /// Errors from insert routing
    Route(crate::router::RouteError),
}

impl From<crate::store::StoreError> for Error {
    fn from(err: crate::store::StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<crate::loader::LoadError> for Error {
    fn from(err: crate::loader::LoadError) -> Self {
        Error::Load(err)
    }
}

impl From<crate::partition::PartitionError> for Error {
    fn from(err: crate::partition::PartitionError) -> Self {
        Error::Partition(err)
    }
}

impl From<crate::router::RouteError> for Error {
    fn from(err: crate::router::RouteError) -> Self {
        Error::Route(err)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Load(err) => Some(err),
            Error::Partition(err) => Some(err),
            Error::Route(err) => Some(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Load(err) => write!(f, "Load error: {}", err),
            Error::Partition(err) => write!(f, "Partition error: {}", err),
            Error::Route(err) => write!(f, "Routing error: {}", err),
        }
    }
}
