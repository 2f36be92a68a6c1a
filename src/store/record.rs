//! Rating record value type for record tables.
//!
//! Provides the fixed-width encoding used to store records as redb values.

use redb::Value as RedbValue;

/// Encoded size of a record: user id (4) + item id (4) + rating (8).
const ENCODED_LEN: usize = 16;

/// A single rating record.
///
/// Records are immutable once stored. The rating domain is the closed
/// interval [0.0, 5.0]; the store itself does not enforce the domain,
/// callers that route records do.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Record {
    pub user_id: u32,
    pub item_id: u32,
    pub rating: f64,
}

impl Record {
    /// Creates a new record.
    pub fn new(user_id: u32, item_id: u32, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
        }
    }

    /// Encodes the record into its fixed-width storage format.
    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut buf = [0u8; ENCODED_LEN];
        buf[0..4].copy_from_slice(&self.user_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.item_id.to_le_bytes());
        buf[8..16].copy_from_slice(&self.rating.to_le_bytes());
        buf
    }

    /// Decodes storage bytes into a record.
    ///
    /// Returns `None` when the slice is not exactly the encoded width.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != ENCODED_LEN {
            return None;
        }

        let user_id = u32::from_le_bytes(data[0..4].try_into().ok()?);
        let item_id = u32::from_le_bytes(data[4..8].try_into().ok()?);
        let rating = f64::from_le_bytes(data[8..16].try_into().ok()?);

        Some(Self {
            user_id,
            item_id,
            rating,
        })
    }
}

impl RedbValue for Record {
    type SelfType<'a>
        = Record
    where
        Self: 'a;
    type AsBytes<'a>
        = [u8; ENCODED_LEN]
    where
        Self: 'a;

    fn fixed_width() -> Option<usize> {
        Some(ENCODED_LEN)
    }

    fn from_bytes<'a>(data: &'a [u8]) -> Self::SelfType<'a>
    where
        Self: 'a,
    {
        Record::decode(data).unwrap_or_default()
    }

    fn as_bytes<'a, 'b: 'a>(value: &'a Self::SelfType<'b>) -> Self::AsBytes<'a>
    where
        Self: 'b,
    {
        value.encode()
    }

    fn type_name() -> redb::TypeName {
        redb::TypeName::new("RatingRecord")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = Record::new(42, 1193, 4.5);

        let encoded = record.encode();
        let decoded = Record::decode(&encoded).unwrap();

        assert_eq!(record, decoded);
    }

    #[test]
    fn test_decode_rejects_wrong_width() {
        assert!(Record::decode(&[0u8; 3]).is_none());
        assert!(Record::decode(&[0u8; 17]).is_none());
    }
}
