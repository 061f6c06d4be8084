//! Message types published to the central exchange.

use serde::{Deserialize, Serialize};

use crate::error::SendError;

/// Content type of every published body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Action code carried by a notification.
pub const NOTIFY_ACTION: u8 = 1;

/// Event envelope published as the message body.
///
/// Serializes as `{"event": "<name>", "action": 1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, taken verbatim from the command line
    pub event: String,
    /// Action code
    pub action: u8,
}

impl EventEnvelope {
    /// Create a notification envelope for the given event.
    pub fn notify(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            action: NOTIFY_ACTION,
        }
    }

    /// Encode the envelope as a JSON body.
    pub fn to_body(&self) -> Result<Vec<u8>, SendError> {
        Ok(serde_json::to_vec(self)?)
    }
}
