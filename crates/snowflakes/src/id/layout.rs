use core::fmt;

use crate::{Error, Result, SnowflakeId};

/// Width of the timestamp field.
pub const TIMESTAMP_BITS: u8 = 41;

/// Bits shared between the machine ID and the sequence.
pub const NODE_BITS: u8 = 22;

/// Smallest accepted machine ID width (leaves 21 sequence bits).
pub const MIN_MACHINE_ID_BITS: u8 = 1;

/// Largest accepted machine ID width (leaves 1 sequence bit).
pub const MAX_MACHINE_ID_BITS: u8 = NODE_BITS - 1;

/// Default machine ID width: 10 bits of machine ID and 12 bits of sequence.
pub const DEFAULT_MACHINE_ID_BITS: u8 = 10;

/// The bit split between machine ID and sequence for one generator.
///
/// A `Layout` can only be built through [`Layout::new`], which rejects widths
/// outside `1..=21`, so every method here can assume a valid split.
///
/// # Example
///
/// ```
/// use snowflakes::Layout;
///
/// let layout = Layout::new(10).unwrap();
/// assert_eq!(layout.sequence_bits(), 12);
/// assert_eq!(layout.max_sequence(), 4095);
///
/// let id = layout.encode(367_597_485_448, 378, 0);
/// assert_eq!(id.to_raw(), 1_541_815_603_606_036_480);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    machine_id_bits: u8,
    sequence_bits: u8,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            machine_id_bits: DEFAULT_MACHINE_ID_BITS,
            sequence_bits: NODE_BITS - DEFAULT_MACHINE_ID_BITS,
        }
    }
}

impl Layout {
    /// Bitmask for the 41-bit timestamp field, before shifting.
    pub const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

    /// Number of bits to shift the timestamp to its position (bit 22).
    pub const TIMESTAMP_SHIFT: u8 = NODE_BITS;

    /// Creates a layout with `machine_id_bits` bits of machine ID and the
    /// remaining `22 - machine_id_bits` bits of sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineIdBits`] if the width is outside
    /// `1..=21`.
    pub const fn new(machine_id_bits: u8) -> Result<Self> {
        if machine_id_bits < MIN_MACHINE_ID_BITS || machine_id_bits > MAX_MACHINE_ID_BITS {
            return Err(Error::InvalidMachineIdBits {
                bits: machine_id_bits,
                max: MAX_MACHINE_ID_BITS,
            });
        }
        Ok(Self {
            machine_id_bits,
            sequence_bits: NODE_BITS - machine_id_bits,
        })
    }

    /// Width of the machine ID field.
    pub const fn machine_id_bits(&self) -> u8 {
        self.machine_id_bits
    }

    /// Width of the sequence field.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Number of bits to shift the machine ID to its position.
    pub const fn machine_id_shift(&self) -> u8 {
        self.sequence_bits
    }

    /// Largest encodable machine ID, `2^M - 1`.
    pub const fn max_machine_id(&self) -> u64 {
        (1 << self.machine_id_bits) - 1
    }

    /// The sequence mask, `2^S - 1`: the last sequence value of a millisecond.
    pub const fn max_sequence(&self) -> u64 {
        (1 << self.sequence_bits) - 1
    }

    /// Largest encodable timestamp, in milliseconds since the epoch.
    pub const fn max_timestamp(&self) -> u64 {
        Self::TIMESTAMP_MASK
    }

    /// Number of IDs one generator can issue per millisecond, `2^S`.
    pub const fn capacity_per_millis(&self) -> u64 {
        1 << self.sequence_bits
    }

    /// Returns `true` if `machine_id` fits in this layout.
    pub const fn accepts_machine_id(&self, machine_id: u64) -> bool {
        machine_id <= self.max_machine_id()
    }

    /// Packs the three fields into an ID.
    ///
    /// Values wider than their field are masked; the generator never passes
    /// such values.
    pub const fn encode(&self, timestamp: u64, machine_id: u64, sequence: u64) -> SnowflakeId {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_id = (machine_id & self.max_machine_id()) << self.machine_id_shift();
        let sequence = sequence & self.max_sequence();
        SnowflakeId::from_raw(timestamp | machine_id | sequence)
    }

    /// Unpacks an ID into its fields. Pure inverse of [`Layout::encode`].
    pub const fn decode(&self, id: SnowflakeId) -> Components {
        let raw = id.to_raw();
        Components {
            timestamp: (raw >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK,
            machine_id: (raw >> self.machine_id_shift()) & self.max_machine_id(),
            sequence: raw & self.max_sequence(),
        }
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Components {
    /// Milliseconds since the generator's epoch.
    pub timestamp: u64,
    /// The issuing machine.
    pub machine_id: u64,
    /// Position within the millisecond.
    pub sequence: u64,
}

impl Components {
    /// Converts the timestamp back to milliseconds since the Unix epoch, given
    /// the epoch the ID was generated with.
    pub const fn unix_millis(&self, epoch: core::time::Duration) -> u128 {
        epoch.as_millis() + self.timestamp as u128
    }
}

impl fmt::Display for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp={} machine_id={} sequence={}",
            self.timestamp, self.machine_id, self.sequence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ten_twelve() {
        let layout = Layout::default();
        assert_eq!(layout, Layout::new(DEFAULT_MACHINE_ID_BITS).unwrap());
        assert_eq!(layout.machine_id_bits(), 10);
        assert_eq!(layout.sequence_bits(), 12);
        assert_eq!(layout.max_machine_id(), 1023);
        assert_eq!(layout.max_sequence(), 4095);
        assert_eq!(layout.capacity_per_millis(), 4096);
    }

    #[test]
    fn rejects_widths_outside_range() {
        assert_eq!(
            Layout::new(0),
            Err(Error::InvalidMachineIdBits { bits: 0, max: 21 })
        );
        assert_eq!(
            Layout::new(22),
            Err(Error::InvalidMachineIdBits { bits: 22, max: 21 })
        );
        assert!(Layout::new(1).is_ok());
        assert!(Layout::new(21).is_ok());
    }

    #[test]
    fn split_always_sums_to_node_bits() {
        for bits in MIN_MACHINE_ID_BITS..=MAX_MACHINE_ID_BITS {
            let layout = Layout::new(bits).unwrap();
            assert_eq!(layout.machine_id_bits() + layout.sequence_bits(), NODE_BITS);
            assert_eq!(
                layout.max_machine_id() << layout.machine_id_shift() | layout.max_sequence(),
                (1 << NODE_BITS) - 1
            );
        }
    }

    #[test]
    fn encodes_known_vector() {
        let id = Layout::default().encode(367_597_485_448, 378, 0);
        assert_eq!(id.to_raw(), 1_541_815_603_606_036_480);
    }

    #[test]
    fn decodes_known_vector() {
        let parts = Layout::default().decode(SnowflakeId::from_raw(1_541_815_603_606_036_480));
        assert_eq!(
            parts,
            Components {
                timestamp: 367_597_485_448,
                machine_id: 378,
                sequence: 0,
            }
        );
    }

    #[test]
    fn decode_inverts_encode_at_field_edges() {
        for bits in MIN_MACHINE_ID_BITS..=MAX_MACHINE_ID_BITS {
            let layout = Layout::new(bits).unwrap();
            for (ts, machine_id, seq) in [
                (0, 0, 0),
                (layout.max_timestamp(), layout.max_machine_id(), layout.max_sequence()),
                (1, layout.max_machine_id(), 0),
                (layout.max_timestamp(), 0, layout.max_sequence()),
            ] {
                let id = layout.encode(ts, machine_id, seq);
                assert_eq!(id.to_raw() >> 63, 0, "reserved bit must stay clear");
                assert_eq!(
                    layout.decode(id),
                    Components {
                        timestamp: ts,
                        machine_id,
                        sequence: seq,
                    }
                );
            }
        }
    }

    #[test]
    fn ids_order_by_timestamp_then_sequence() {
        let layout = Layout::default();
        let a = layout.encode(10, 1023, 4095);
        let b = layout.encode(11, 0, 0);
        let c = layout.encode(11, 0, 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn components_display_and_unix_millis() {
        let parts = Components {
            timestamp: 367_597_485_448,
            machine_id: 378,
            sequence: 3,
        };
        assert_eq!(
            parts.to_string(),
            "timestamp=367597485448 machine_id=378 sequence=3"
        );
        assert_eq!(
            parts.unix_millis(crate::TWITTER_EPOCH),
            1_656_432_460_105
        );
    }
}
