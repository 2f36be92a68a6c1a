//! Round-robin partitioning of the base table.

use crate::partition::scheme::{partition_table_name, ROUND_ROBIN_PREFIX};
use crate::partition::PartitionError;
use crate::store::{Record, RecordStore};
use tracing::{debug, info};

/// Rows buffered per partition before a flush.
const FLUSH_THRESHOLD: usize = 50_000;

/// Splits the base table into `partitions` tables by ingestion-order rank.
///
/// Every record's rank is its position in the store's sequence-key order,
/// which is unique, so the ranking is reproducible across runs over the
/// same data. The ranking is assigned in a single ordered pass and a
/// record with rank `r` lands in partition `r % partitions`; membership
/// depends on ingestion order alone, never on record content.
///
/// The pass distributes records through per-partition buffers flushed in
/// bounded batches. The routing cursor is reset to 0 before any table is
/// rebuilt, so subsequent round-robin inserts continue the rotation from
/// the first partition. Failure semantics match range partitioning: a
/// failed partition stops receiving data, its siblings complete, and the
/// failed indices surface in [`PartitionError::Partial`].
pub fn round_robin_partition(
    store: &RecordStore,
    base_table: &str,
    partitions: usize,
) -> crate::Result<()> {
    if partitions == 0 {
        return Err(PartitionError::InvalidPartitionCount(partitions).into());
    }

    store.set_cursor(ROUND_ROBIN_PREFIX, 0)?;

    for index in 0..partitions {
        store.recreate_table(&partition_table_name(ROUND_ROBIN_PREFIX, index))?;
    }

    let mut buffers: Vec<Vec<Record>> = vec![Vec::new(); partitions];
    let mut failed: Vec<(usize, String)> = Vec::new();

    store.scan_in_order(base_table, |rank, record| {
        let target = (rank % partitions as u64) as usize;
        if failed.iter().any(|(index, _)| *index == target) {
            return Ok(());
        }

        buffers[target].push(record);
        if buffers[target].len() >= FLUSH_THRESHOLD {
            flush(store, target, &mut buffers[target], &mut failed);
        }
        Ok(())
    })?;

    for (index, buffer) in buffers.iter_mut().enumerate() {
        if !buffer.is_empty() && !failed.iter().any(|(failed_index, _)| *failed_index == index) {
            flush(store, index, buffer, &mut failed);
        }
    }

    if !failed.is_empty() {
        failed.sort_by_key(|(index, _)| *index);
        return Err(PartitionError::Partial { failures: failed }.into());
    }

    info!(
        "round-robin partitioned {} into {} tables",
        base_table, partitions
    );
    Ok(())
}

fn flush(
    store: &RecordStore,
    index: usize,
    buffer: &mut Vec<Record>,
    failed: &mut Vec<(usize, String)>,
) {
    let table = partition_table_name(ROUND_ROBIN_PREFIX, index);
    match store.bulk_append(&table, buffer) {
        Ok(()) => debug!("flushed {} records into {}", buffer.len(), table),
        Err(err) => failed.push((index, err.to_string())),
    }
    buffer.clear();
}
