//! Broadcast frames.
//!
//! A [`Frame`] is the unit the hub routes. The hub never looks inside it;
//! only the inbound pump decodes frame contents, and only the outbound pump
//! turns a frame back into a transport message.

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};

/// Raw frame payload, tagged with the transport message kind it arrived as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(Utf8Bytes),
    /// Binary frame.
    Binary(Bytes),
}

impl Frame {
    /// Creates a text frame.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Utf8Bytes::from(text.into()))
    }

    /// Creates a binary frame.
    #[must_use]
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Extracts a frame from a transport message.
    ///
    /// Returns `None` for control messages (ping, pong, close), which are
    /// never broadcast.
    #[must_use]
    pub fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(text) => Some(Self::Text(text)),
            Message::Binary(bytes) => Some(Self::Binary(bytes)),
            Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
        }
    }

    /// Converts the frame into the transport message it is written as.
    #[must_use]
    pub fn into_message(self) -> Message {
        match self {
            Self::Text(text) => Message::Text(text),
            Self::Binary(bytes) => Message::Binary(bytes),
        }
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_str().as_bytes(),
            Self::Binary(bytes) => bytes.as_ref(),
        }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
