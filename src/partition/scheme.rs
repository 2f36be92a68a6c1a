//! Partitioning scheme vocabulary and range-bucket arithmetic.
//!
//! The bucket index function and the copy predicates are built from the
//! same `i * width` comparisons, so the router and the partitioner can
//! never disagree about where a boundary rating belongs.

use crate::store::RatingSpan;

/// Upper end of the rating domain.
pub const MAX_RATING: f64 = 5.0;

/// Name prefix of range partition tables.
pub const RANGE_PREFIX: &str = "range_part";

/// Name prefix of round-robin partition tables.
pub const ROUND_ROBIN_PREFIX: &str = "rrobin_part";

/// The partitioning scheme a router call acts under.
///
/// Callers resolve the active scheme once (explicitly, or via the
/// discovery helpers in the router module) and pass it to every insert,
/// instead of the store being re-queried per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Equal-width rating buckets over `[0, MAX_RATING]`.
    Range { partitions: usize },
    /// Ingestion-order rank modulo the partition count.
    RoundRobin { partitions: usize },
}

impl Scheme {
    /// Number of partitions the scheme was materialized with.
    pub fn partitions(&self) -> usize {
        match self {
            Scheme::Range { partitions } => *partitions,
            Scheme::RoundRobin { partitions } => *partitions,
        }
    }

    /// Table-name prefix of the scheme's partitions.
    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::Range { .. } => RANGE_PREFIX,
            Scheme::RoundRobin { .. } => ROUND_ROBIN_PREFIX,
        }
    }

    /// Name of the scheme's partition table at the given index.
    pub fn partition_table(&self, index: usize) -> String {
        partition_table_name(self.prefix(), index)
    }
}

/// Builds a partition table name from a prefix and index.
pub fn partition_table_name(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index)
}

/// Width of one range bucket.
pub fn bucket_width(partitions: usize) -> f64 {
    MAX_RATING / partitions as f64
}

/// Rating span covered by the bucket at `index`.
///
/// Bucket 0 is closed on both ends, every later bucket is left-open, so a
/// boundary rating always falls into the lower-indexed bucket. The last
/// bucket's upper edge is pinned to the domain maximum so `MAX_RATING` is
/// covered even when `partitions * width` rounds below it.
pub fn bucket_span(index: usize, partitions: usize) -> RatingSpan {
    let width = bucket_width(partitions);
    let upper = if index + 1 == partitions {
        MAX_RATING
    } else {
        ((index + 1) as f64) * width
    };

    if index == 0 {
        RatingSpan::closed(0.0, upper)
    } else {
        RatingSpan::left_open((index as f64) * width, upper)
    }
}

/// Bucket index a rating belongs to, per the boundary rule above.
///
/// Floor division can land one bucket off at the interval edges, so the
/// candidate is corrected with the same comparisons [`bucket_span`] uses.
pub fn rating_partition(rating: f64, partitions: usize) -> usize {
    let width = bucket_width(partitions);
    if rating <= width {
        return 0;
    }

    let mut index = ((rating / width) as usize).min(partitions - 1);
    if rating <= (index as f64) * width {
        index -= 1;
    } else if index + 1 < partitions && rating > ((index + 1) as f64) * width {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rating_lands_in_first_bucket() {
        assert_eq!(rating_partition(0.0, 5), 0);
        assert_eq!(rating_partition(0.0, 1), 0);
    }

    #[test]
    fn test_boundary_ratings_fall_to_lower_bucket() {
        // width = 1.0, boundaries at 1, 2, 3, 4
        assert_eq!(rating_partition(1.0, 5), 0);
        assert_eq!(rating_partition(2.0, 5), 1);
        assert_eq!(rating_partition(3.0, 5), 2);
        assert_eq!(rating_partition(4.0, 5), 3);
        assert_eq!(rating_partition(5.0, 5), 4);
    }

    #[test]
    fn test_interior_ratings() {
        assert_eq!(rating_partition(0.5, 5), 0);
        assert_eq!(rating_partition(2.5, 5), 2);
        assert_eq!(rating_partition(4.1, 5), 4);
    }

    #[test]
    fn test_index_agrees_with_span_for_fractional_widths() {
        for partitions in 1..=7 {
            for tenths in 0..=50 {
                let rating = tenths as f64 / 10.0;
                let index = rating_partition(rating, partitions);
                assert!(
                    bucket_span(index, partitions).contains(rating),
                    "rating {} vs bucket {} of {}",
                    rating,
                    index,
                    partitions
                );
            }
        }
    }

    #[test]
    fn test_last_span_covers_domain_maximum() {
        for partitions in 1..=9 {
            let last = bucket_span(partitions - 1, partitions);
            assert!(last.contains(MAX_RATING));
        }
    }

    #[test]
    fn test_partition_table_names() {
        let scheme = Scheme::Range { partitions: 3 };
        assert_eq!(scheme.partition_table(0), "range_part0");
        assert_eq!(scheme.partition_table(2), "range_part2");

        let scheme = Scheme::RoundRobin { partitions: 2 };
        assert_eq!(scheme.partition_table(1), "rrobin_part1");
    }
}
