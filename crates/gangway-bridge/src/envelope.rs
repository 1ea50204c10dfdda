//! The message envelope crossing the bridge.
//!
//! Messages flow in both directions:
//! - **View -> Host**: page script emits through the view endpoint, the
//!   host's inbound handler receives the decoded `Message`.
//! - **Host -> View**: host logic emits through the host endpoint, the view
//!   endpoint dispatches to the page script's handler.
//!
//! The bridge enforces no payload schema; `kind` is a free
//! application-defined discriminator and `payload` is arbitrary JSON.

use serde::{Deserialize, Serialize};

/// Direction a message travels across the bridge.
///
/// Implicit in which endpoint emitted the message. Used in structured log
/// fields, never carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HostToView,
    ViewToHost,
}

impl Direction {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::HostToView => Direction::ViewToHost,
            Direction::ViewToHost => Direction::HostToView,
        }
    }

    /// Static label for structured log fields.
    pub fn label(self) -> &'static str {
        match self {
            Direction::HostToView => "host_to_view",
            Direction::ViewToHost => "view_to_host",
        }
    }
}

/// A typed bridge message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message type / command name.
    pub kind: String,
    /// The message payload (arbitrary JSON). A body with no `payload` field
    /// decodes as [`Payload::None`].
    #[serde(default)]
    pub payload: Payload,
}

/// Payload of a bridge message: a simple string, nothing, or structured JSON.
///
/// `None` (`null` on the wire) is a deliverable value, not an absence:
/// endpoints hand it to handlers like any other payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    #[default]
    None,
    Json(serde_json::Value),
}

impl Message {
    /// Create a message with an explicit payload.
    pub fn new(kind: impl Into<String>, payload: Payload) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Create a simple text message.
    pub fn text(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Text(text.into()),
        }
    }

    /// Create a JSON message.
    pub fn json(kind: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::Json(value),
        }
    }

    /// Create a payload-less message (kind only).
    pub fn signal(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::None,
        }
    }
}

impl Payload {
    /// Borrow the text payload, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the structured JSON payload, if this is one.
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is the empty payload.
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::None)
    }
}
