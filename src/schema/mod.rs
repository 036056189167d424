//! In-memory model of a parsed DBC file.
//!
//! A [`SchemaDocument`] holds the version string and every top-level
//! [`Record`] in source order. Records are a closed set of kinds; queries match
//! on the kind instead of checking types at runtime.
//!
//! The document is built once by [`crate::parsing::SchemaParser`] and is only
//! read afterwards, so it can be shared freely between threads.

mod message;
mod records;
mod signal;

use alloc::string::String;
use alloc::vec::Vec;

pub use message::MessageDef;
pub use records::{
    AttributeDefault, AttributeDefinition, AttributeValue, Comment, CommentTarget, NamedList,
    SignalGroup, Subrecord, TransmitterList, ValueAssignment, ValueDescription, ValueTable,
};
pub use signal::SignalDef;

/// One top-level DBC record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Record {
    /// `BO_`
    Message(MessageDef),
    /// `BO_TX_BU_`
    TransmitterList(TransmitterList),
    /// `BA_DEF_`
    AttributeDefinition(AttributeDefinition),
    /// `BA_DEF_DEF_`
    AttributeDefault(AttributeDefault),
    /// `VAL_TABLE_`
    ValueTable(ValueTable),
    /// `VAL_`
    ValueAssignment(ValueAssignment),
    /// `BA_`
    AttributeValue(AttributeValue),
    /// `CM_`
    Comment(Comment),
    /// `SIG_GROUP_`
    SignalGroup(SignalGroup),
    /// Any other `KEYWORD:` line
    List(NamedList),
}

impl Record {
    /// DBC keyword of this record; named lists report their own name.
    pub fn keyword(&self) -> &str {
        match self {
            Record::Message(_) => "BO_",
            Record::TransmitterList(_) => "BO_TX_BU_",
            Record::AttributeDefinition(_) => "BA_DEF_",
            Record::AttributeDefault(_) => "BA_DEF_DEF_",
            Record::ValueTable(_) => "VAL_TABLE_",
            Record::ValueAssignment(_) => "VAL_",
            Record::AttributeValue(_) => "BA_",
            Record::Comment(_) => "CM_",
            Record::SignalGroup(_) => "SIG_GROUP_",
            Record::List(list) => &list.name,
        }
    }

    /// Attach an indented subrecord line to this record.
    ///
    /// Messages take signals; lists, transmitter lists and attribute
    /// definitions take bare tokens; value tables, value assignments and
    /// attribute values take attribute lines. Anything else is rejected with
    /// a reason.
    pub fn append(&mut self, subrecord: Subrecord) -> core::result::Result<(), &'static str> {
        match (self, subrecord) {
            (Record::Message(message), Subrecord::Signal(signal)) => {
                message.push_signal(signal);
                Ok(())
            }
            (Record::Message(_), _) => Err("messages only accept signal subrecords"),
            (_, Subrecord::Signal(_)) => Err("signals can only follow a message"),
            (Record::List(list), Subrecord::Bare(item)) => {
                list.items.push(item);
                Ok(())
            }
            (Record::TransmitterList(tx), Subrecord::Bare(node)) => {
                tx.transmitters.push(node);
                Ok(())
            }
            (Record::AttributeDefinition(def), Subrecord::Bare(value)) => {
                def.values.push(String::from(value.trim_matches('"')));
                Ok(())
            }
            (Record::ValueTable(table), sub @ Subrecord::Attribute { .. }) => {
                table.attached.push(sub);
                Ok(())
            }
            (Record::ValueAssignment(val), sub @ Subrecord::Attribute { .. }) => {
                val.attached.push(sub);
                Ok(())
            }
            (Record::AttributeValue(attr), sub @ Subrecord::Attribute { .. }) => {
                attr.attached.push(sub);
                Ok(())
            }
            (Record::List(_) | Record::TransmitterList(_) | Record::AttributeDefinition(_), _) => {
                Err("only bare items can be appended")
            }
            (Record::ValueTable(_) | Record::ValueAssignment(_) | Record::AttributeValue(_), _) => {
                Err("only attribute rows can be appended")
            }
            (Record::AttributeDefault(_) | Record::Comment(_) | Record::SignalGroup(_), _) => {
                Err("record does not accept subrecords")
            }
        }
    }

    /// The message payload of this record, if it is one.
    pub fn as_message(&self) -> Option<&MessageDef> {
        match self {
            Record::Message(message) => Some(message),
            _ => None,
        }
    }
}

/// A fully parsed DBC file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaDocument {
    /// `VERSION` string, empty when the file has none
    pub version: String,
    records: Vec<Record>,
}

impl SchemaDocument {
    /// Add a record and return its index.
    pub(crate) fn push_record(&mut self, record: Record) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Every top-level record in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Every message in source order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDef> {
        self.records.iter().filter_map(Record::as_message)
    }

    /// First message declared with the given identifier.
    ///
    /// Later messages reusing an identifier are never returned.
    pub fn message(&self, id: u32) -> Option<&MessageDef> {
        self.messages().find(|m| m.id == id)
    }

    /// Value descriptions declared for a signal of a message.
    pub fn value_descriptions(&self, message_id: u32, signal: &str) -> Option<&ValueAssignment> {
        self.records.iter().find_map(|record| match record {
            Record::ValueAssignment(val)
                if val.message_id() == Some(message_id) && val.signal_name() == Some(signal) =>
            {
                Some(val)
            }
            _ => None,
        })
    }

    /// Comments attached to a message or any of its signals.
    pub fn comments_for(&self, message_id: u32) -> impl Iterator<Item = &Comment> {
        self.records.iter().filter_map(move |record| match record {
            Record::Comment(comment) if comment.message_id() == Some(message_id) => Some(comment),
            _ => None,
        })
    }

    /// Identifiers declared by more than one message, each listed once.
    pub fn duplicate_message_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages().map(|m| m.id).collect();
        ids.sort_unstable();
        let mut duplicates: Vec<u32> = ids
            .windows(2)
            .filter(|w| w[0] == w[1])
            .map(|w| w[0])
            .collect();
        duplicates.dedup();
        duplicates
    }

    /// Serialize the document to pretty JSON.
    ///
    /// Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::Error::SerializationError(alloc::format!("Failed to serialize schema: {e}"))
        })
    }
}
