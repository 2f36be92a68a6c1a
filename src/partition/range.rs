//! Value-range partitioning of the base table.

use crate::partition::scheme::{bucket_span, partition_table_name, RANGE_PREFIX};
use crate::partition::PartitionError;
use crate::store::RecordStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info};

/// Splits the base table into `partitions` equal-width rating buckets.
///
/// Existing `range_part{i}` tables are dropped and rebuilt, so running the
/// partitioner twice over unchanged data yields identical partitions. The
/// per-bucket copies have disjoint predicates and disjoint destinations,
/// so they run on a bounded pool of worker threads; the call joins all
/// workers before returning.
///
/// A failed copy does not roll back its siblings: completed partitions are
/// left in place and the failed indices are reported in
/// [`PartitionError::Partial`].
pub fn range_partition(
    store: &RecordStore,
    base_table: &str,
    partitions: usize,
) -> crate::Result<()> {
    if partitions == 0 {
        return Err(PartitionError::InvalidPartitionCount(partitions).into());
    }

    for index in 0..partitions {
        store.recreate_table(&partition_table_name(RANGE_PREFIX, index))?;
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(partitions);
    let next_index = AtomicUsize::new(0);
    let failures = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next_index.fetch_add(1, Ordering::Relaxed);
                if index >= partitions {
                    break;
                }

                let table = partition_table_name(RANGE_PREFIX, index);
                let span = bucket_span(index, partitions);
                match store.copy_filtered(&table, base_table, &span) {
                    Ok(copied) => debug!("bucket {} received {} records", index, copied),
                    Err(err) => failures
                        .lock()
                        .expect("copy worker panicked")
                        .push((index, err.to_string())),
                }
            });
        }
    });

    let mut failures = failures.into_inner().expect("copy worker panicked");
    if !failures.is_empty() {
        failures.sort_by_key(|(index, _)| *index);
        return Err(PartitionError::Partial { failures }.into());
    }

    info!(
        "range partitioned {} into {} buckets",
        base_table, partitions
    );
    Ok(())
}
