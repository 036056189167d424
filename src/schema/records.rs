//! Auxiliary DBC records.
//!
//! None of these take part in decoding except [`ValueAssignment`], whose labels
//! are attached to decoded fields. They are kept so the whole file is consumed
//! and can be inspected after parsing.

use alloc::string::String;
use alloc::vec::Vec;

use super::signal::SignalDef;

/// An indented line attached to the most recent top-level record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subrecord {
    /// `SG_` line
    Signal(SignalDef),
    /// Any other keyword followed by text
    Attribute {
        /// Leading keyword
        kind: String,
        /// Rest of the line
        text: String,
    },
    /// A keyword on its own
    Bare(String),
}

/// `BO_TX_BU_`: additional transmitters of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransmitterList {
    pub message_id: u32,
    pub transmitters: Vec<String>,
}

/// `BA_DEF_`: declaration of a user attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDefinition {
    /// Object kind the attribute applies to (`BU_`, `BO_`, `SG_`, `EV_`), if given
    pub object_type: Option<String>,
    pub name: String,
    /// `INT`, `HEX`, `FLOAT`, `STRING` or `ENUM`
    pub data_type: String,
    /// Bounds or enumeration members
    pub values: Vec<String>,
}

/// `BA_DEF_DEF_`: default value of a user attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDefault {
    pub name: String,
    pub value: String,
}

/// One `<index> <label>` pair of a value table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueDescription {
    pub index: i64,
    pub label: String,
}

fn label_for(rows: &[ValueDescription], raw: i64) -> Option<&str> {
    rows.iter()
        .find(|row| row.index == raw)
        .map(|row| row.label.as_str())
}

/// `VAL_TABLE_`: a named, reusable value table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueTable {
    pub name: String,
    pub rows: Vec<ValueDescription>,
    pub attached: Vec<Subrecord>,
}

impl ValueTable {
    /// Label for a raw value.
    pub fn label_for(&self, raw: i64) -> Option<&str> {
        label_for(&self.rows, raw)
    }
}

/// `VAL_`: value descriptions for one signal of one message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueAssignment {
    /// `<message_id> <signal>` as written
    pub name: String,
    pub rows: Vec<ValueDescription>,
    pub attached: Vec<Subrecord>,
}

impl ValueAssignment {
    /// Message id part of the name, if numeric.
    pub fn message_id(&self) -> Option<u32> {
        self.name.split(' ').next()?.parse().ok()
    }

    /// Signal part of the name.
    pub fn signal_name(&self) -> Option<&str> {
        self.name.split_once(' ').map(|(_, signal)| signal)
    }

    /// Label for a raw value.
    pub fn label_for(&self, raw: i64) -> Option<&str> {
        label_for(&self.rows, raw)
    }
}

/// `BA_`: value of a user attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    /// Every token before the value, e.g. `"GenMsgCycleTime" BO_ 1000`
    pub name: String,
    pub values: Vec<String>,
    pub attached: Vec<Subrecord>,
}

/// What a `CM_` comment is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentTarget {
    /// The database itself
    Global,
    /// `BU_ <node>`
    Node(String),
    /// `BO_ <id>`
    Message(u32),
    /// `SG_ <id> <signal>`
    Signal(u32, String),
    /// `EV_ <name>`
    EnvironmentVariable(String),
}

/// `CM_`: free-text comment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    pub target: CommentTarget,
    pub text: String,
}

impl Comment {
    /// Id of the message the comment refers to, directly or through a signal.
    pub fn message_id(&self) -> Option<u32> {
        match self.target {
            CommentTarget::Message(id) | CommentTarget::Signal(id, _) => Some(id),
            _ => None,
        }
    }
}

/// `SIG_GROUP_`: a named group of signals within one message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalGroup {
    pub message_id: u32,
    pub name: String,
    pub members: Vec<String>,
}

/// Any other `KEYWORD:` line, such as `BU_:` or `NS_ :`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedList {
    pub name: String,
    pub items: Vec<String>,
}
