use alloc::string::String;
use core::fmt;

use crate::bits::ByteOrder;

/// Definition of one bit-field inside a message.
///
/// Follows the DBC `SG_` line: position, width, byte order, signedness, the
/// affine transform `physical = offset + scale * raw`, the physical range and
/// unit, and the receiving node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalDef {
    /// Signal name, unique within its message
    pub name: String,
    /// Start bit within the byte-order-normalized payload
    pub start_bit: u16,
    /// Number of bits (1-64)
    pub bit_length: u16,
    /// Byte order of the signal
    pub byte_order: ByteOrder,
    /// Whether the top bit of the field is a sign bit
    pub signed: bool,
    /// Scale factor
    pub scale: f64,
    /// Offset
    pub offset: f64,
    /// Physical minimum; the range is disabled when `min >= max`
    pub min: f64,
    /// Physical maximum
    pub max: f64,
    /// Unit string, possibly empty
    pub unit: String,
    /// Receiving node
    pub destination: String,
    /// Byte length of the owning message, stamped when the signal is attached.
    ///
    /// Informational only: decoding bounds-checks against the length of the
    /// frame actually received, never against this value.
    pub message_len: u16,
}

impl SignalDef {
    /// Create an unsigned little-endian signal with identity scaling and no range.
    pub fn new(name: &str, start_bit: u16, bit_length: u16) -> Self {
        Self {
            name: String::from(name),
            start_bit,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            signed: false,
            scale: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: String::new(),
            destination: String::new(),
            message_len: 0,
        }
    }

    /// Set the scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the offset.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the physical range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Mark the signal as signed.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Set the byte order to big-endian (Motorola).
    pub fn big_endian(mut self) -> Self {
        self.byte_order = ByteOrder::BigEndian;
        self
    }

    /// Set the unit string.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = String::from(unit);
        self
    }

    /// Set the receiving node.
    pub fn with_destination(mut self, destination: &str) -> Self {
        self.destination = String::from(destination);
        self
    }

    /// Whether `min`/`max` clamp decoded values.
    #[inline]
    pub fn has_range(&self) -> bool {
        self.min < self.max
    }

    /// Last bit covered by the field.
    #[inline]
    pub fn end_bit(&self) -> u16 {
        self.start_bit.saturating_add(self.bit_length).saturating_sub(1)
    }

    /// Apply the affine transform to a field magnitude.
    #[inline]
    pub fn raw_to_physical(&self, magnitude: u64) -> f64 {
        self.offset + self.scale * (magnitude as f64)
    }

    /// Clamp a physical value into `[min, max]` when the range is enabled.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        let mut value = value;
        if self.min < self.max && value < self.min {
            value = self.min;
        }
        if self.max > self.min && value > self.max {
            value = self.max;
        }
        value
    }
}

/// Compact summary in DBC notation, e.g. `0|16@1+ (1,0) [255|257] "MPH" XYZ`.
impl fmt::Display for SignalDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}@{}{} ({},{}) [{}|{}] \"{}\" {}",
            self.start_bit,
            self.bit_length,
            self.byte_order.digit(),
            if self.signed { '-' } else { '+' },
            self.scale,
            self.offset,
            self.min,
            self.max,
            self.unit,
            self.destination
        )
    }
}
