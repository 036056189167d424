//! CAN frames as handed to the annotator.
//!
//! A [`Frame`] is an identifier plus payload bytes. Frames can be built
//! directly, parsed from a candump log line
//! (`<interface> <hex-id> [<byte_count>] <hex byte> ...`), or converted from
//! any [`embedded_can::Frame`] with the `can` feature.
//!
//! Identifiers follow the DBC convention: a 29-bit extended identifier is
//! stored with bit 31 set ([`EXTENDED_ID_FLAG`]), which is how `BO_` lines
//! declare extended messages.
//!
//! # Example
//!
//! ```
//! use dbc_annotate::Frame;
//!
//! let frame: Frame = " can0 3E8 [6] FF FF FF FF 01 00".parse()?;
//! assert_eq!(frame.id, 1000);
//! assert_eq!(frame.data, [0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x00]);
//! # Ok::<(), dbc_annotate::Error>(())
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::Error;

/// Bit 31, set on extended (29-bit) identifiers in DBC files.
pub const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Candump prints extended identifiers with this many hex digits.
const EXTENDED_ID_DIGITS: usize = 8;

/// One observed bus frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Bus interface the frame was captured on, when known
    pub interface: Option<String>,
    /// Frame identifier
    pub id: u32,
    /// Byte count declared by the source
    pub declared_len: u8,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame whose declared length is the payload length.
    pub fn new(id: u32, data: &[u8]) -> Self {
        Self {
            interface: None,
            id,
            declared_len: data.len().min(u8::MAX as usize) as u8,
            data: data.to_vec(),
        }
    }

    /// Set the capture interface.
    pub fn with_interface(mut self, interface: &str) -> Self {
        self.interface = Some(String::from(interface));
        self
    }

    /// Whether the identifier carries the extended flag.
    pub fn is_extended(&self) -> bool {
        self.id & EXTENDED_ID_FLAG != 0
    }

    /// Identifier as sent on the bus, without the extended flag.
    pub fn raw_id(&self) -> u32 {
        self.id & !EXTENDED_ID_FLAG
    }

    /// Whether the declared byte count matches the payload.
    pub fn is_consistent(&self) -> bool {
        self.declared_len as usize == self.data.len()
    }

    /// Payload bytes as space-separated uppercase hex.
    pub fn hex_string(&self) -> String {
        let mut out = String::with_capacity(self.data.len() * 3);
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }

    /// Payload bits, most significant first, 8 characters per byte.
    pub fn bit_string(&self) -> String {
        self.data.iter().map(|byte| format!("{byte:08b}")).collect()
    }

    /// Build a frame from an `embedded-can` frame.
    ///
    /// Extended identifiers get [`EXTENDED_ID_FLAG`] so they match DBC `BO_` ids.
    ///
    /// Requires the `can` feature.
    #[cfg(feature = "can")]
    pub fn from_can_frame<F: embedded_can::Frame>(frame: &F) -> Self {
        let id = match frame.id() {
            embedded_can::Id::Standard(id) => id.as_raw() as u32,
            embedded_can::Id::Extended(id) => id.as_raw() | EXTENDED_ID_FLAG,
        };
        let mut out = Self::new(id, frame.data());
        out.declared_len = frame.dlc() as u8;
        out
    }
}

impl FromStr for Frame {
    type Err = Error;

    /// Parse a candump line: `<interface> <hex-id> [<byte_count>] <hex byte> ...`.
    ///
    /// An eight-digit identifier is extended and gets [`EXTENDED_ID_FLAG`].
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let (Some(interface), Some(id), Some(count)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(Error::InvalidFrame(format!(
                "expected '<interface> <id> [<len>] <bytes>', got '{}'",
                line.trim()
            )));
        };

        let extended = id.len() == EXTENDED_ID_DIGITS;
        let id = u32::from_str_radix(id, 16)
            .ok()
            .filter(|raw| !extended || *raw < 1 << 29)
            .map(|raw| if extended { raw | EXTENDED_ID_FLAG } else { raw })
            .ok_or_else(|| Error::InvalidFrame(format!("invalid hex identifier '{id}'")))?;
        let declared_len = count
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<u8>()
            .map_err(|_| Error::InvalidFrame(format!("invalid byte count '{count}'")))?;
        let data = tokens
            .map(|byte| {
                u8::from_str_radix(byte, 16)
                    .map_err(|_| Error::InvalidFrame(format!("invalid data byte '{byte}'")))
            })
            .collect::<Result<Vec<u8>, Error>>()?;

        Ok(Self {
            interface: Some(String::from(interface)),
            id,
            declared_len,
            data,
        })
    }
}

/// Candump-style rendering with a decimal identifier, e.g. `can0 1000 [6] FF FF FF FF 01 00`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(interface) = &self.interface {
            write!(f, "{interface} ")?;
        }
        write!(f, "{} [{}] {}", self.id, self.declared_len, self.hex_string())
    }
}
