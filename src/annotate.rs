//! Message lookup and frame annotation.
//!
//! [`annotate`] finds the message for a frame in a [`SchemaDocument`] and
//! decodes every signal it owns. [`Registry`] does the same with an id index
//! built once up front, which is what you want when annotating a whole log.
//!
//! A frame without a matching message yields `None`. A signal that cannot be
//! decoded keeps its slot in the annotation with the [`DecodeError`], so the
//! other signals of the message are still reported.
//!
//! # Example
//!
//! ```
//! use dbc_annotate::{Frame, Registry, SchemaDocument};
//!
//! let doc = SchemaDocument::parse(
//!     "BO_ 1000 XYZ_message: 6 ABC\n\
//!      \x20SG_ Speed : 0|16@1+ (1,0) [255|257] \"MPH\" XYZ\n",
//! )?;
//! let registry = Registry::new(doc);
//!
//! let frame: Frame = "can0 3E8 [6] FF FF FF FF 01 00".parse()?;
//! let annotation = registry.annotate(&frame).expect("known message");
//! assert_eq!(annotation.to_string(), "[1000] XYZ_message:Speed = 256 MPH (ABC => XYZ)\n");
//!
//! assert!(registry.annotate(&Frame::new(42, &[0; 8])).is_none());
//! # Ok::<(), dbc_annotate::Error>(())
//! ```

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::decoder::{decode_signal, format_value};
use crate::error::DecodeError;
use crate::frame::Frame;
use crate::schema::{MessageDef, SchemaDocument, SignalDef};

/// One decoded signal of an annotated frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedField {
    /// Physical value with unit, e.g. `"790 MPH"`
    pub value: String,
    /// Physical value after scaling and clamping
    pub physical: f64,
    /// Field bits as extracted
    pub raw: u64,
    /// Value description for the raw value, if the schema declares one
    pub label: Option<String>,
    /// Receiving node
    pub to: String,
    /// Signal definition in DBC notation
    pub signal: String,
}

/// Decoded view of one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    /// Frame identifier
    pub code: u32,
    /// Message name
    pub name: String,
    /// Declared message length in bytes
    pub byte_len: u16,
    /// Transmitting node
    pub from: String,
    /// Signal name and decode outcome, in schema order
    pub fields: Vec<(String, Result<DecodedField, DecodeError>)>,
}

impl Annotation {
    /// Look up a field by signal name.
    pub fn field(&self, name: &str) -> Option<&Result<DecodedField, DecodeError>> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Formatted value of a field, if it decoded.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self.field(name)? {
            Ok(field) => Some(field.value.as_str()),
            Err(_) => None,
        }
    }

    /// Signal names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Fields that failed to decode.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &DecodeError)> {
        self.fields.iter().filter_map(|(name, field)| match field {
            Err(e) => Some((name.as_str(), e)),
            Ok(_) => None,
        })
    }

    /// Serialize the annotation to JSON.
    ///
    /// Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::Error::SerializationError(alloc::format!("Failed to serialize annotation: {e}"))
        })
    }
}

/// One line per field: `[<code>] <message>:<signal> = <value> (<from> => <to>)`.
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, field) in &self.fields {
            match field {
                Ok(field) => writeln!(
                    f,
                    "[{}] {}:{} = {} ({} => {})",
                    self.code, self.name, name, field.value, self.from, field.to
                )?,
                Err(e) => writeln!(f, "[{}] {}:{} = <{}>", self.code, self.name, name, e)?,
            }
        }
        Ok(())
    }
}

fn decode_field(
    document: &SchemaDocument,
    message: &MessageDef,
    signal: &SignalDef,
    frame: &Frame,
) -> Result<DecodedField, DecodeError> {
    let decoded = decode_signal(&frame.data, signal).inspect_err(|e| {
        tracing::warn!(
            id = message.id,
            signal = signal.name.as_str(),
            message_len = signal.message_len,
            frame_len = frame.data.len(),
            error = %e,
            "signal could not be decoded"
        );
    })?;

    let label = document
        .value_descriptions(message.id, &signal.name)
        .and_then(|val| val.label_for(decoded.raw_index(signal)))
        .map(String::from);

    Ok(DecodedField {
        value: format_value(decoded.physical, &signal.unit),
        physical: decoded.physical,
        raw: decoded.raw,
        label,
        to: signal.destination.clone(),
        signal: signal.to_string(),
    })
}

fn annotate_message(document: &SchemaDocument, message: &MessageDef, frame: &Frame) -> Annotation {
    Annotation {
        code: frame.id,
        name: message.name.clone(),
        byte_len: message.byte_len,
        from: message.origin.clone(),
        fields: message
            .signals()
            .iter()
            .map(|signal| {
                (
                    signal.name.clone(),
                    decode_field(document, message, signal, frame),
                )
            })
            .collect(),
    }
}

/// Annotate a frame with a linear scan of the document's messages.
///
/// Returns `None` when no message has the frame's identifier. With duplicate
/// identifiers the first declared message is used.
pub fn annotate(document: &SchemaDocument, frame: &Frame) -> Option<Annotation> {
    let message = document.message(frame.id)?;
    Some(annotate_message(document, message, frame))
}

/// A parsed schema with its messages indexed by identifier.
///
/// Immutable once built; share it by reference across threads to annotate
/// frames in parallel.
#[derive(Debug, Clone)]
pub struct Registry {
    document: SchemaDocument,
    /// Message id to record index; the first declaration wins
    index: BTreeMap<u32, usize>,
}

impl Registry {
    /// Index the messages of a parsed document.
    pub fn new(document: SchemaDocument) -> Self {
        let mut index = BTreeMap::new();
        for (position, record) in document.records().iter().enumerate() {
            let Some(message) = record.as_message() else {
                continue;
            };
            if index.contains_key(&message.id) {
                tracing::warn!(
                    id = message.id,
                    name = message.name.as_str(),
                    "duplicate message id; keeping the first definition"
                );
                continue;
            }
            index.insert(message.id, position);
        }
        tracing::debug!(messages = index.len(), "registry built");
        Self { document, index }
    }

    /// The underlying document.
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// Give back the document.
    pub fn into_document(self) -> SchemaDocument {
        self.document
    }

    /// Message registered for an identifier.
    pub fn message(&self, id: u32) -> Option<&MessageDef> {
        let position = *self.index.get(&id)?;
        self.document.records().get(position)?.as_message()
    }

    /// Check if a message is registered for an identifier.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Registered identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.index.keys().copied()
    }

    /// Annotate one frame.
    pub fn annotate(&self, frame: &Frame) -> Option<Annotation> {
        let Some(message) = self.message(frame.id) else {
            tracing::trace!(id = frame.id, "no message for frame");
            return None;
        };
        Some(annotate_message(&self.document, message, frame))
    }

    /// Annotate one frame from an `embedded-can` driver.
    ///
    /// Requires the `can` feature.
    #[cfg(feature = "can")]
    pub fn annotate_can_frame<F: embedded_can::Frame>(&self, frame: &F) -> Option<Annotation> {
        self.annotate(&Frame::from_can_frame(frame))
    }
}

impl From<SchemaDocument> for Registry {
    fn from(document: SchemaDocument) -> Self {
        Self::new(document)
    }
}
