use bytes::Bytes;

use crate::protocol::ProtocolFault;

/// One event delivered by a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Open,
    Text(String),
    /// A binary frame; slice the received buffer with `Bytes::slice` to pass a sub-range.
    Binary(Bytes),
    Error(ProtocolFault),
    Close,
}

impl ConnectionEvent {
    /// Returns true for text and binary frames.
    #[inline]
    pub fn is_frame(&self) -> bool {
        matches!(self, ConnectionEvent::Text(_) | ConnectionEvent::Binary(_))
    }
}

impl From<String> for ConnectionEvent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ConnectionEvent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Bytes> for ConnectionEvent {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<ProtocolFault> for ConnectionEvent {
    fn from(fault: ProtocolFault) -> Self {
        Self::Error(fault)
    }
}
