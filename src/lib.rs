#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

//! # dbc-annotate
//!
//! A Rust library for decoding raw CAN frames into engineering values using a
//! DBC signal database.
//!
//! A DBC file describes every message on a bus: its identifier, length and
//! transmitter, and the signals packed into its payload. Each signal is a
//! bit-field with a byte order, a sign, an affine transform
//! (`physical = offset + scale * raw`), a physical range and a unit.
//!
//! ## Features
//!
//! - **Parsing**: Line-oriented DBC parser producing an immutable [`SchemaDocument`]
//! - **Decoding**: Bit-field extraction for little- and big-endian, signed and unsigned signals
//! - **Annotation**: Look up the message for a frame and decode all of its signals
//! - **Frames**: candump log lines and [`embedded-can`](https://crates.io/crates/embedded-can) frames
//!
//! ## Quick Start
//!
//! ```
//! use dbc_annotate::{Frame, Registry, Result, SchemaDocument};
//!
//! fn main() -> Result<()> {
//!     let dbc = SchemaDocument::parse(
//!         "VERSION \"1.0\"\n\
//!          BU_: ABC XYZ\n\
//!          BO_ 1001 XYZ_message: 6 ABC\n\
//!          \x20SG_ Speed : 2|15@1- (2.5,150) [-3000|4] \"MPH\" XYZ\n",
//!     )?;
//!     let registry = Registry::new(dbc);
//!
//!     let frame: Frame = "can0 3E9 [6] FF FF FF FF 04 03".parse()?;
//!     if let Some(annotation) = registry.annotate(&frame) {
//!         assert_eq!(annotation.value("Speed"), Some("-790 MPH"));
//!         print!("{annotation}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bits`] | Bit-field extraction over byte payloads |
//! | [`decoder`] | Signal decoding: sign, scale, offset, clamping, formatting |
//! | [`schema`] | Record model of a parsed DBC file |
//! | [`parsing`] | The line-oriented DBC parser |
//! | [`frame`] | CAN frames and the candump line reader |
//! | [`annotate`] | Message lookup and frame annotation |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` impls, file loading, JSON export, `tracing/std`
//! - `serde`: `Serialize`/`Deserialize` for the record model and annotations
//! - `can` (default): conversions from `embedded_can::Frame`
//!
//! Without `std` the crate is `no_std` and needs `alloc`.
//!
//! ## Error Handling
//!
//! Schema parsing is fail-fast: the first malformed line aborts with a
//! [`ParseError`] naming the line. Decoding problems are per signal
//! ([`DecodeError`]) and do not stop the rest of a message from decoding. A
//! frame with no matching message is not an error; the annotator returns `None`.

extern crate alloc;

pub mod annotate;
pub mod bits;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod parsing;
pub mod schema;

// Re-export commonly used types at the crate root
pub use annotate::{Annotation, DecodedField, Registry, annotate};
pub use bits::ByteOrder;
pub use decoder::{DecodedSignal, decode, decode_signal};
pub use error::{DecodeError, Error, ParseError, Result};
pub use frame::{EXTENDED_ID_FLAG, Frame};
pub use parsing::SchemaParser;
pub use schema::{MessageDef, Record, SchemaDocument, SignalDef, Subrecord};
