//! Signal decoding.
//!
//! Turns a payload and a [`SignalDef`] into a physical value:
//!
//! 1. order the payload bytes by the signal's byte order;
//! 2. extract the raw field;
//! 3. for signed signals, clear the top bit and remember the sign;
//! 4. `value = offset + scale * magnitude`, negated if the sign was set;
//! 5. clamp into `[min, max]` when `min < max`.
//!
//! [`format_value`] renders the result the way annotations display it.

use alloc::format;
use alloc::string::{String, ToString};

use crate::bits::{extract_bits, ordered_payload, split_sign};
use crate::error::DecodeError;
use crate::schema::SignalDef;

/// Result of decoding one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedSignal {
    /// Field bits as extracted, before sign handling
    pub raw: u64,
    /// Physical value after scaling, sign and clamping
    pub physical: f64,
}

impl DecodedSignal {
    /// Raw value as a signed integer in the same sign convention as the decoder.
    ///
    /// Used to look up value descriptions.
    pub fn raw_index(&self, signal: &SignalDef) -> i64 {
        if signal.signed {
            let (magnitude, negative) = split_sign(self.raw, signal.bit_length);
            let magnitude = magnitude as i64;
            if negative { -magnitude } else { magnitude }
        } else {
            self.raw as i64
        }
    }
}

/// Extract the raw field bits of a signal.
#[inline]
pub fn extract_raw(data: &[u8], signal: &SignalDef) -> Result<u64, DecodeError> {
    let payload = ordered_payload(data, signal.byte_order);
    extract_bits(&payload, signal.start_bit, signal.bit_length)
}

/// Convert raw field bits into a clamped physical value.
#[inline]
pub fn raw_to_physical(raw: u64, signal: &SignalDef) -> f64 {
    let (magnitude, negative) = if signal.signed {
        split_sign(raw, signal.bit_length)
    } else {
        (raw, false)
    };

    let mut value = signal.raw_to_physical(magnitude);
    if negative {
        value = -value;
    }
    signal.clamp(value)
}

/// Decode a signal from a frame payload.
pub fn decode_signal(data: &[u8], signal: &SignalDef) -> Result<DecodedSignal, DecodeError> {
    let raw = extract_raw(data, signal)?;
    Ok(DecodedSignal {
        raw,
        physical: raw_to_physical(raw, signal),
    })
}

/// Decode a signal and format it for display, e.g. `"256 MPH"`.
pub fn decode(data: &[u8], signal: &SignalDef) -> Result<String, DecodeError> {
    let decoded = decode_signal(data, signal)?;
    Ok(format_value(decoded.physical, &signal.unit))
}

/// Render a physical value, followed by the unit when there is one.
///
/// Integral values print without a decimal point.
pub fn format_value(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        value.to_string()
    } else {
        format!("{value} {unit}")
    }
}
