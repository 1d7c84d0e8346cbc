use core::fmt;

/// A 64-bit Snowflake ID.
///
/// ```text
///  Bit Index:  63           63 62            22 21            S S-1            0
///              +--------------+----------------+----------------+--------------+
///  Field:      | reserved (1) | timestamp (41) | machine ID (M) | sequence (S) |
///              +--------------+----------------+----------------+--------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ---------->|
/// ```
///
/// `M + S = 22`. The split is not stored in the ID itself, so decoding needs
/// the [`Layout`] the ID was generated with.
///
/// IDs compare as their raw integer, which orders them by timestamp first.
///
/// [`Layout`]: crate::Layout
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Wraps a raw integer. No validation is done.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the ID as an `i64`.
    ///
    /// The reserved top bit is never set by a generator, so the value is
    /// non-negative for every generated ID.
    pub const fn to_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl PartialEq<u64> for SnowflakeId {
    fn eq(&self, other: &u64) -> bool {
        self.id == *other
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SnowflakeId").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_conversions() {
        let id = SnowflakeId::from(1_541_815_603_606_036_480);
        assert_eq!(id.to_raw(), 1_541_815_603_606_036_480);
        assert_eq!(id.to_i64(), 1_541_815_603_606_036_480);
        assert_eq!(u64::from(id), 1_541_815_603_606_036_480);
        assert_eq!(id, 1_541_815_603_606_036_480_u64);
    }

    #[test]
    fn padded_string() {
        assert_eq!(SnowflakeId::from_raw(42).to_padded_string(), "00000000000000000042");
        assert_eq!(SnowflakeId::from_raw(42).to_string(), "42");
    }

    #[test]
    fn orders_by_raw_value() {
        assert!(SnowflakeId::from_raw(1) < SnowflakeId::from_raw(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_integer() {
        let id = SnowflakeId::from_raw(1_541_815_603_606_036_480);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "1541815603606036480");
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
