//! Error types for schema parsing and signal decoding.
//!
//! Three kinds of failure exist:
//!
//! - [`ParseError`]: a schema line could not be classified or a record's grammar
//!   was not satisfied. Always fatal to the parse that produced it.
//! - [`DecodeError`]: one signal could not be extracted from one payload. The
//!   annotator keeps these per signal so the rest of a message still decodes.
//! - [`Error`]: the crate-level error wrapping both, plus frame-reader, I/O and
//!   serialization failures.
//!
//! An unknown frame identifier is not an error; it is reported as `None` by the
//! annotator.
//!
//! # Example
//!
//! ```
//! use dbc_annotate::{Error, SchemaDocument};
//!
//! match SchemaDocument::parse("BO_ 100 Engine: 8\n") {
//!     Err(Error::Parse(e)) => assert_eq!(e.line, 1),
//!     _ => unreachable!(),
//! }
//! ```

use core::fmt;

use alloc::string::String;

/// A schema line that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number within the schema text
    pub line: usize,
    /// The offending line as read (before whitespace normalization)
    pub text: String,
    /// Record keyword being parsed, when the line was classified
    pub record: Option<String>,
    /// What went wrong
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, text: &str, record: Option<&str>, reason: String) -> Self {
        Self {
            line,
            text: String::from(text),
            record: record.map(String::from),
            reason,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => write!(
                f,
                "line {}: invalid {record} record ({}): >{}<",
                self.line, self.reason, self.text
            ),
            None => write!(f, "line {}: {}: >{}<", self.line, self.reason, self.text),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// A signal that could not be extracted from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    /// The bit length is zero or wider than 64 bits.
    InvalidBitLength {
        /// Declared bit length
        bit_length: u16,
    },

    /// The signal reaches past the end of the payload.
    BitRangeExceedsPayload {
        /// First bit of the field
        start_bit: u16,
        /// Width of the field
        bit_length: u16,
        /// Bits available in the payload (8 per byte)
        available_bits: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidBitLength { bit_length } => {
                write!(f, "Invalid bit length {bit_length}: expected 1 to 64")
            }
            DecodeError::BitRangeExceedsPayload {
                start_bit,
                bit_length,
                available_bits,
            } => write!(
                f,
                "Bit range {start_bit}+{bit_length} exceeds payload of {available_bits} bits"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Errors returned by the crate's fallible operations.
#[derive(Debug)]
pub enum Error {
    /// The schema text could not be parsed.
    Parse(ParseError),

    /// A signal could not be decoded.
    Decode(DecodeError),

    /// A candump line could not be turned into a frame.
    InvalidFrame(String),

    /// An I/O error occurred while reading a schema.
    ///
    /// Only available with the `std` feature.
    #[cfg(feature = "std")]
    IOError(std::io::Error),

    /// A value could not be serialized.
    SerializationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Schema parse error: {e}"),
            Error::Decode(e) => write!(f, "Signal decode error: {e}"),
            Error::InvalidFrame(s) => write!(f, "Invalid frame: {s}"),
            #[cfg(feature = "std")]
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            Error::SerializationError(s) => write!(f, "Serialization error: {s}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;
