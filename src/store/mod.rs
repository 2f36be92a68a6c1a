//! Record store adapter over redb.
//!
//! This module exposes the minimal capability set the partitioning and
//! routing layers consume: table lifecycle, order-preserving appends,
//! filtered copies, prefix counting, and the durable routing cursor.
//! Record tables are keyed by a monotonically increasing insertion
//! sequence, so key order is the ingestion order.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition, TableError,
    TableHandle,
};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod record;

pub use record::Record;

/// Table holding the durable routing cursors, keyed by scheme prefix.
const CURSOR_TABLE: TableDefinition<&str, u64> = TableDefinition::new("routing_cursor");

/// Errors returned by record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the backing database.
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),

    /// Failed to begin a transaction.
    #[error("transaction failed: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Failed to open, create, or drop a named table.
    #[error("table {name}: {source}")]
    Table {
        name: String,
        source: redb::TableError,
    },

    /// Failure while reading or writing rows.
    #[error("storage failure: {0}")]
    Storage(#[from] redb::StorageError),

    /// Failed to commit a write transaction.
    #[error("commit failed: {0}")]
    Commit(#[from] redb::CommitError),
}

impl StoreError {
    fn table(name: &str, source: TableError) -> Self {
        StoreError::Table {
            name: name.to_string(),
            source,
        }
    }
}

/// A half-open or closed interval of rating values.
///
/// Used as the filtered-copy predicate over the rating column. The upper
/// bound is always inclusive; the lower bound is inclusive only for
/// `closed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSpan {
    pub lower: f64,
    pub upper: f64,
    pub closed_lower: bool,
}

impl RatingSpan {
    /// Interval closed on both ends: `[lower, upper]`.
    pub fn closed(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            closed_lower: true,
        }
    }

    /// Interval open on the lower end: `(lower, upper]`.
    pub fn left_open(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            closed_lower: false,
        }
    }

    /// Whether a rating falls inside the span.
    pub fn contains(&self, rating: f64) -> bool {
        let above = if self.closed_lower {
            rating >= self.lower
        } else {
            rating > self.lower
        };
        above && rating <= self.upper
    }
}

fn record_table(name: &str) -> TableDefinition<'_, u64, Record> {
    TableDefinition::new(name)
}

fn next_sequence<T: ReadableTable<u64, Record>>(table: &T) -> Result<u64, StoreError> {
    Ok(table
        .last()?
        .map(|(key, _)| key.value() + 1)
        .unwrap_or(0))
}

/// Tabular record store backed by a redb database.
///
/// The store owns no scheme knowledge; it only provides the operations the
/// loader, partitioners, and router are built from. Write operations are
/// serialized by redb's single-writer transaction discipline, which is what
/// makes the cursor read-modify-write in [`RecordStore::append_routed`]
/// atomic with respect to concurrent callers.
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Wraps an already-opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates (or opens) a database file at the given path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        Ok(Self { db })
    }

    /// Creates the named record table if it does not exist yet.
    ///
    /// A second call against an existing table is a no-op; its contents are
    /// untouched.
    pub fn ensure_table(&self, name: &str) -> Result<(), StoreError> {
        let write = self.db.begin_write()?;
        write
            .open_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        write.commit()?;
        Ok(())
    }

    /// Drops the named table if present and recreates it empty.
    ///
    /// This is the primitive behind idempotent re-partitioning: partition
    /// tables are always rebuilt from scratch.
    pub fn recreate_table(&self, name: &str) -> Result<(), StoreError> {
        let write = self.db.begin_write()?;
        write
            .delete_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        write
            .open_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        write.commit()?;
        Ok(())
    }

    /// Drops the named table. Returns whether it existed.
    pub fn drop_table_if_exists(&self, name: &str) -> Result<bool, StoreError> {
        let write = self.db.begin_write()?;
        let existed = write
            .delete_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        write.commit()?;
        Ok(existed)
    }

    /// Whether a table with the given name exists.
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let read = self.db.begin_read()?;
        match read.open_table(record_table(name)) {
            Ok(_) => Ok(true),
            Err(TableError::TableDoesNotExist(_)) => Ok(false),
            Err(err) => Err(StoreError::table(name, err)),
        }
    }

    /// Counts tables whose name starts with the given prefix.
    pub fn count_tables_with_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let read = self.db.begin_read()?;
        let tables = read.list_tables()?;
        Ok(tables
            .filter(|table| table.name().starts_with(prefix))
            .count())
    }

    /// Appends rows to the named table, preserving their order.
    ///
    /// The whole batch commits as one write transaction. No uniqueness
    /// constraint is enforced.
    pub fn bulk_append(&self, name: &str, rows: &[Record]) -> Result<(), StoreError> {
        let write = self.db.begin_write()?;
        {
            let mut table = write
                .open_table(record_table(name))
                .map_err(|err| StoreError::table(name, err))?;
            let mut next = next_sequence(&table)?;
            for row in rows {
                table.insert(next, row)?;
                next += 1;
            }
        }
        write.commit()?;
        Ok(())
    }

    /// Appends a single row to the named table.
    pub fn insert_row(&self, name: &str, row: &Record) -> Result<(), StoreError> {
        self.bulk_append(name, std::slice::from_ref(row))
    }

    /// Copies every source row matching the span into the destination table.
    ///
    /// Relative row order is preserved; the destination receives fresh
    /// sequence keys. Returns the number of rows copied.
    pub fn copy_filtered(
        &self,
        dest: &str,
        src: &str,
        span: &RatingSpan,
    ) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        let source = read
            .open_table(record_table(src))
            .map_err(|err| StoreError::table(src, err))?;

        let write = self.db.begin_write()?;
        let mut copied = 0u64;
        {
            let mut target = write
                .open_table(record_table(dest))
                .map_err(|err| StoreError::table(dest, err))?;
            let mut next = next_sequence(&target)?;
            for entry in source.iter()? {
                let (_, value) = entry?;
                let record = value.value();
                if span.contains(record.rating) {
                    target.insert(next, &record)?;
                    next += 1;
                    copied += 1;
                }
            }
        }
        write.commit()?;

        debug!("copied {} rows from {} into {}", copied, src, dest);
        Ok(copied)
    }

    /// Visits every row of the named table in insertion order.
    ///
    /// The visitor receives the row's stable 0-based ingestion rank. Ranks
    /// are derived from the sequence key order, so they are reproducible
    /// across calls over unchanged data.
    pub fn scan_in_order<F>(&self, name: &str, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(u64, Record) -> Result<(), StoreError>,
    {
        let read = self.db.begin_read()?;
        let table = read
            .open_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        let mut rank = 0u64;
        for entry in table.iter()? {
            let (_, value) = entry?;
            visit(rank, value.value())?;
            rank += 1;
        }
        Ok(())
    }

    /// Reads all rows of the named table in insertion order.
    pub fn records(&self, name: &str) -> Result<Vec<Record>, StoreError> {
        let mut rows = Vec::new();
        self.scan_in_order(name, |_, record| {
            rows.push(record);
            Ok(())
        })?;
        Ok(rows)
    }

    /// Number of rows in the named table.
    pub fn table_len(&self, name: &str) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        let table = read
            .open_table(record_table(name))
            .map_err(|err| StoreError::table(name, err))?;
        Ok(table.len()?)
    }

    /// Reads the routing cursor for the given key. Absent cursors read as 0.
    pub fn cursor(&self, key: &str) -> Result<u64, StoreError> {
        let read = self.db.begin_read()?;
        let table = match read.open_table(CURSOR_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(err) => return Err(StoreError::table(CURSOR_TABLE.name(), err)),
        };
        Ok(table.get(key)?.map(|guard| guard.value()).unwrap_or(0))
    }

    /// Durably sets the routing cursor for the given key.
    pub fn set_cursor(&self, key: &str, value: u64) -> Result<(), StoreError> {
        let write = self.db.begin_write()?;
        {
            let mut table = write
                .open_table(CURSOR_TABLE)
                .map_err(|err| StoreError::table(CURSOR_TABLE.name(), err))?;
            table.insert(key, value)?;
        }
        write.commit()?;
        Ok(())
    }

    /// Appends a row to a cursor-selected table and advances the cursor.
    ///
    /// The cursor read, the append into the table picked by `pick_table`,
    /// and the cursor increment all commit in a single write transaction.
    /// Two concurrent callers can therefore never observe the same cursor
    /// value. Returns the cursor value the pick was made from.
    pub fn append_routed<F>(
        &self,
        cursor_key: &str,
        row: &Record,
        pick_table: F,
    ) -> Result<u64, StoreError>
    where
        F: FnOnce(u64) -> String,
    {
        let write = self.db.begin_write()?;
        let position;
        {
            let mut cursor = write
                .open_table(CURSOR_TABLE)
                .map_err(|err| StoreError::table(CURSOR_TABLE.name(), err))?;
            position = cursor.get(cursor_key)?.map(|guard| guard.value()).unwrap_or(0);

            let name = pick_table(position);
            let mut table = write
                .open_table(record_table(&name))
                .map_err(|err| StoreError::table(&name, err))?;
            let next = next_sequence(&table)?;
            table.insert(next, row)?;
            drop(table);

            cursor.insert(cursor_key, position + 1)?;
        }
        write.commit()?;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_span_includes_both_ends() {
        let span = RatingSpan::closed(0.0, 1.0);
        assert!(span.contains(0.0));
        assert!(span.contains(0.5));
        assert!(span.contains(1.0));
        assert!(!span.contains(1.1));
    }

    #[test]
    fn test_left_open_span_excludes_lower_end() {
        let span = RatingSpan::left_open(1.0, 2.0);
        assert!(!span.contains(1.0));
        assert!(span.contains(1.5));
        assert!(span.contains(2.0));
        assert!(!span.contains(2.5));
    }
}
