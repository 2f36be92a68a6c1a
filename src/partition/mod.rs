//! Static partitioning of a base record table.
//!
//! Two schemes are provided: equal-width rating ranges and round-robin by
//! ingestion order. Both materialize their partitions from the current
//! base-table contents and may be re-run idempotently; partitioning is a
//! maintenance operation and must not run concurrently with routing
//! against the same scheme.

pub mod range;
pub mod round_robin;
pub mod scheme;

// Re-export main types for public API
pub use range::range_partition;
pub use round_robin::round_robin_partition;
pub use scheme::{Scheme, MAX_RATING, RANGE_PREFIX, ROUND_ROBIN_PREFIX};

use thiserror::Error;

/// Errors specific to partition materialization.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Partition count outside the supported range.
    #[error("invalid partition count {0}: must be at least 1")]
    InvalidPartitionCount(usize),

    /// Some partition copies failed while others completed.
    ///
    /// Completed partitions are left in place; each entry pairs a failed
    /// partition index with the failure description.
    #[error("partition copies failed: {failures:?}")]
    Partial { failures: Vec<(usize, String)> },
}
