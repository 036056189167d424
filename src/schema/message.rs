use alloc::string::String;
use alloc::vec::Vec;

use super::signal::SignalDef;

/// A DBC `BO_` message: one decodable frame type and its ordered signals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageDef {
    /// Frame identifier
    pub id: u32,
    /// Message name
    pub name: String,
    /// Declared payload length in bytes
    pub byte_len: u16,
    /// Transmitting node
    pub origin: String,
    signals: Vec<SignalDef>,
}

impl MessageDef {
    pub fn new(id: u32, name: &str, byte_len: u16, origin: &str) -> Self {
        Self {
            id,
            name: String::from(name),
            byte_len,
            origin: String::from(origin),
            signals: Vec::new(),
        }
    }

    /// Attach a signal, stamping this message's byte length onto it.
    pub fn push_signal(&mut self, mut signal: SignalDef) {
        signal.message_len = self.byte_len;
        self.signals.push(signal);
    }

    /// Builder form of [`MessageDef::push_signal`].
    pub fn with_signal(mut self, signal: SignalDef) -> Self {
        self.push_signal(signal);
        self
    }

    /// Signals in schema order.
    pub fn signals(&self) -> &[SignalDef] {
        &self.signals
    }

    /// Find a signal by name.
    pub fn signal(&self, name: &str) -> Option<&SignalDef> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Get the number of signals in this message.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Sorted, deduplicated bit positions where signals start or end.
    ///
    /// Handy for drawing field boundaries over a payload's bit string.
    pub fn field_boundaries(&self) -> Vec<u16> {
        let mut bits: Vec<u16> = self
            .signals
            .iter()
            .flat_map(|s| [s.start_bit, s.end_bit()])
            .collect();
        bits.sort_unstable();
        bits.dedup();
        bits
    }
}
