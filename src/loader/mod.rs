//! Bulk loading of delimited rating lines into the base table.
//!
//! The loader streams an input source into the store in bounded-size
//! batches, trading per-row overhead for memory. Batches that were already
//! flushed when a later line fails to parse stay in the table; callers
//! wanting all-or-nothing semantics must clear the table and retry.

use crate::store::{Record, RecordStore};
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[cfg(test)]
mod tests;

/// Default rows per flushed batch.
pub const DEFAULT_BATCH_SIZE: usize = 200_000;

/// Default field delimiter of the input lines.
pub const DEFAULT_DELIMITER: &str = "::";

/// Errors specific to bulk loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An input line does not convert into a well-formed record.
    #[error("line {line}: {reason}")]
    MalformedLine { line: u64, reason: String },

    /// Batch size outside the supported range.
    #[error("invalid batch size {0}: must be greater than 0")]
    InvalidBatchSize(usize),

    /// The field delimiter must be non-empty.
    #[error("field delimiter must not be empty")]
    EmptyDelimiter,

    /// Failure reading from the input source.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for a bulk load.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Rows buffered before a flush to the store.
    ///
    /// Larger batches amortize per-batch store overhead at the price of
    /// memory; the final partial batch is always flushed.
    pub batch_size: usize,

    /// Delimiter separating the fields of an input line.
    pub delimiter: String,
}

impl LoadConfig {
    /// Creates a validated load configuration.
    ///
    /// # Arguments
    /// * `batch_size` - Rows per flushed batch (must be > 0)
    /// * `delimiter` - Field delimiter (must be non-empty)
    ///
    /// # Returns
    /// Validated configuration or error
    pub fn new(batch_size: usize, delimiter: impl Into<String>) -> crate::Result<Self> {
        if batch_size == 0 {
            return Err(LoadError::InvalidBatchSize(batch_size).into());
        }

        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(LoadError::EmptyDelimiter.into());
        }

        Ok(Self {
            batch_size,
            delimiter,
        })
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Streams delimited lines from `input` into the named base table.
///
/// The table is created if missing; an existing table keeps its contents
/// and the new records are appended. Each line must carry at least the
/// three record fields (`user_id`, `item_id`, `rating`); fields beyond the
/// third, such as a trailing timestamp, are discarded.
///
/// Any parse or store failure aborts the call. Returns the number of
/// records loaded.
pub fn load_records(
    store: &RecordStore,
    base_table: &str,
    input: impl BufRead,
    config: &LoadConfig,
) -> crate::Result<u64> {
    store.ensure_table(base_table)?;

    let mut buffer: Vec<Record> = Vec::new();
    let mut loaded = 0u64;

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(LoadError::Io)?;
        let record = parse_line(&line, &config.delimiter, index as u64 + 1)?;
        buffer.push(record);

        if buffer.len() >= config.batch_size {
            store.bulk_append(base_table, &buffer)?;
            loaded += buffer.len() as u64;
            debug!("flushed batch of {} records into {}", buffer.len(), base_table);
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        store.bulk_append(base_table, &buffer)?;
        loaded += buffer.len() as u64;
    }

    info!("loaded {} records into {}", loaded, base_table);
    Ok(loaded)
}

fn parse_line(line: &str, delimiter: &str, number: u64) -> Result<Record, LoadError> {
    let mut fields = line.split(delimiter);
    let user_id = parse_field(fields.next(), number, "user id")?;
    let item_id = parse_field(fields.next(), number, "item id")?;
    let rating = parse_field(fields.next(), number, "rating")?;
    Ok(Record::new(user_id, item_id, rating))
}

fn parse_field<T>(field: Option<&str>, number: u64, name: &str) -> Result<T, LoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = field.ok_or_else(|| LoadError::MalformedLine {
        line: number,
        reason: format!("missing {} field", name),
    })?;

    raw.trim().parse().map_err(|err| LoadError::MalformedLine {
        line: number,
        reason: format!("invalid {}: {}", name, err),
    })
}
