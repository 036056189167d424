//! Bit-field codec over byte payloads.
//!
//! A payload is read as one unsigned integer, most-significant byte first, so
//! bit 0 is the lowest bit of the last byte. Big-endian (Motorola) fields are
//! handled by reversing the byte sequence before extraction, which puts the
//! register's bit numbering on the same footing as little-endian fields.
//!
//! Nothing here knows about schemas; [`crate::decoder`] builds on these
//! functions.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::DecodeError;

/// Byte order of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Little-endian (Intel), DBC digit `1`
    #[default]
    LittleEndian,
    /// Big-endian (Motorola), DBC digit `0`
    BigEndian,
}

impl ByteOrder {
    /// Map the DBC byte-order digit to a byte order.
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(ByteOrder::LittleEndian),
            '0' => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// The DBC digit for this byte order.
    pub fn digit(self) -> char {
        match self {
            ByteOrder::LittleEndian => '1',
            ByteOrder::BigEndian => '0',
        }
    }
}

/// Arrange payload bytes for extraction.
///
/// Little-endian payloads are used as received; big-endian payloads are
/// reversed.
pub fn ordered_payload(data: &[u8], order: ByteOrder) -> Cow<'_, [u8]> {
    match order {
        ByteOrder::LittleEndian => Cow::Borrowed(data),
        ByteOrder::BigEndian => Cow::Owned(data.iter().rev().copied().collect::<Vec<u8>>()),
    }
}

#[inline]
fn check_range(payload: &[u8], start_bit: u16, bit_length: u16) -> Result<(), DecodeError> {
    if bit_length == 0 || bit_length > 64 {
        return Err(DecodeError::InvalidBitLength { bit_length });
    }
    let available_bits = payload.len() * 8;
    if start_bit as usize + bit_length as usize > available_bits {
        return Err(DecodeError::BitRangeExceedsPayload {
            start_bit,
            bit_length,
            available_bits,
        });
    }
    Ok(())
}

#[inline]
fn field_mask(bit_length: u16) -> u64 {
    if bit_length >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_length) - 1
    }
}

/// Extract `bit_length` bits starting at `start_bit` from the payload integer.
///
/// Equivalent to `(int(payload) >> start_bit) & ((1 << bit_length) - 1)` where
/// `int(payload)` concatenates the bytes most-significant first.
pub fn extract_bits(payload: &[u8], start_bit: u16, bit_length: u16) -> Result<u64, DecodeError> {
    check_range(payload, start_bit, bit_length)?;

    let last = payload.len() - 1;
    let first_byte = start_bit as usize / 8;
    let last_byte = (start_bit as usize + bit_length as usize - 1) / 8;

    // At most nine bytes are touched, so the window fits in 72 bits.
    let mut window: u128 = 0;
    for i in first_byte..=last_byte {
        window |= (payload[last - i] as u128) << ((i - first_byte) * 8);
    }
    window >>= start_bit % 8;

    Ok(window as u64 & field_mask(bit_length))
}

/// Write the low `bit_length` bits of `value` into the payload integer at
/// `start_bit`, leaving all other bits untouched.
pub fn deposit_bits(
    payload: &mut [u8],
    start_bit: u16,
    bit_length: u16,
    value: u64,
) -> Result<(), DecodeError> {
    check_range(payload, start_bit, bit_length)?;

    let last = payload.len() - 1;
    let first_byte = start_bit as usize / 8;
    let last_byte = (start_bit as usize + bit_length as usize - 1) / 8;
    let shift = start_bit % 8;

    let mask = (field_mask(bit_length) as u128) << shift;
    let bits = ((value & field_mask(bit_length)) as u128) << shift;

    for i in first_byte..=last_byte {
        let at = (i - first_byte) * 8;
        let byte_mask = (mask >> at) as u8;
        let byte_bits = (bits >> at) as u8;
        payload[last - i] = (payload[last - i] & !byte_mask) | byte_bits;
    }
    Ok(())
}

/// Split a raw field into magnitude and sign.
///
/// If the field's top bit is set it is cleared and the field is reported as
/// negative. The caller negates the transformed value.
#[inline]
pub fn split_sign(raw: u64, bit_length: u16) -> (u64, bool) {
    if bit_length == 0 || bit_length > 64 {
        return (raw, false);
    }
    let top = 1u64 << (bit_length - 1);
    if raw & top != 0 {
        (raw ^ top, true)
    } else {
        (raw, false)
    }
}
