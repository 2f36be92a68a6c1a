//! Routing of single-record inserts under the active scheme.
//!
//! Every insert lands in the base table plus exactly one partition. The
//! caller resolves the active scheme once and passes it in; the prefix
//! count against the store remains both a discovery fallback and the
//! pre-insert guard that partitions were actually materialized.

use crate::partition::scheme::{partition_table_name, rating_partition, MAX_RATING};
use crate::partition::{Scheme, RANGE_PREFIX, ROUND_ROBIN_PREFIX};
use crate::store::{Record, RecordStore, StoreError};
use thiserror::Error;

/// Errors specific to insert routing.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The scheme's partition tables are missing; partition before routing.
    #[error(
        "expected {expected} partition tables with prefix {prefix}, found {found}; \
         partition the base table before routing"
    )]
    NoPartitions {
        prefix: String,
        expected: usize,
        found: usize,
    },

    /// Rating outside the supported domain.
    #[error("rating {0} outside the rating domain [0.0, 5.0]")]
    RatingOutOfRange(f64),

    /// The base-table append succeeded but the partition append failed.
    ///
    /// The record exists in the base table and in no partition; the caller
    /// must reconcile (for example by re-running the partitioner). This
    /// layer never retries the append.
    #[error("record reached the base table but appending to {table} failed: {source}")]
    Inconsistent {
        table: String,
        #[source]
        source: StoreError,
    },
}

/// Resolves a range scheme by counting `range_part`-prefixed tables.
///
/// Fallback for callers interoperating with a store that has no richer
/// metadata than table names.
pub fn discover_range_scheme(store: &RecordStore) -> crate::Result<Scheme> {
    let found = store.count_tables_with_prefix(RANGE_PREFIX)?;
    if found == 0 {
        return Err(RouteError::NoPartitions {
            prefix: RANGE_PREFIX.to_string(),
            expected: 1,
            found: 0,
        }
        .into());
    }
    Ok(Scheme::Range { partitions: found })
}

/// Resolves a round-robin scheme by counting `rrobin_part`-prefixed tables.
pub fn discover_round_robin_scheme(store: &RecordStore) -> crate::Result<Scheme> {
    let found = store.count_tables_with_prefix(ROUND_ROBIN_PREFIX)?;
    if found == 0 {
        return Err(RouteError::NoPartitions {
            prefix: ROUND_ROBIN_PREFIX.to_string(),
            expected: 1,
            found: 0,
        }
        .into());
    }
    Ok(Scheme::RoundRobin { partitions: found })
}

/// Appends one record to the base table and to the scheme's target partition.
///
/// Under range, the target is the rating's bucket per the boundary rule
/// (boundary ratings fall to the lower index, 0 only to partition 0).
/// Under round-robin, the target is the durable cursor modulo the
/// partition count; the cursor read, partition append, and cursor advance
/// commit as one store transaction, so concurrent inserts never route
/// from the same cursor value.
pub fn insert(
    store: &RecordStore,
    base_table: &str,
    user_id: u32,
    item_id: u32,
    rating: f64,
    scheme: &Scheme,
) -> crate::Result<()> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(RouteError::RatingOutOfRange(rating).into());
    }

    let expected = scheme.partitions();
    let found = store.count_tables_with_prefix(scheme.prefix())?;
    if expected == 0 || found < expected {
        return Err(RouteError::NoPartitions {
            prefix: scheme.prefix().to_string(),
            expected: expected.max(1),
            found,
        }
        .into());
    }

    let record = Record::new(user_id, item_id, rating);
    store.insert_row(base_table, &record)?;

    match scheme {
        Scheme::Range { partitions } => {
            let table = partition_table_name(RANGE_PREFIX, rating_partition(rating, *partitions));
            store
                .insert_row(&table, &record)
                .map_err(|source| RouteError::Inconsistent { table, source })?;
        }
        Scheme::RoundRobin { partitions } => {
            let modulus = *partitions as u64;
            let mut chosen = None;
            let routed = store.append_routed(ROUND_ROBIN_PREFIX, &record, |cursor| {
                let name =
                    partition_table_name(ROUND_ROBIN_PREFIX, (cursor % modulus) as usize);
                chosen = Some(name.clone());
                name
            });
            if let Err(source) = routed {
                return Err(RouteError::Inconsistent {
                    table: chosen.unwrap_or_else(|| ROUND_ROBIN_PREFIX.to_string()),
                    source,
                }
                .into());
            }
        }
    }

    Ok(())
}
