//! Wire schema for the recovery flow.
//!
//! Frames are JSON method envelopes:
//!
//! ```text
//! Coordinator                                   UI client
//!   |                                               |
//!   |  -- { method: DISPLAY_CORRUPTION, params } -->|
//!   |                                               |
//!   |  <-- { method: REPAIR_DATABASE } -------------|   (at most one admitted)
//!   |                                               |
//!   |  -- { method: RELOAD_WINDOW } --------------->|
//!   |                                               |
//! ```
//!
//! The only inbound frame the coordinator acts on is the repair request;
//! any other method discriminator is ignored by contract, not treated as an
//! error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::CorruptionReport;

/// Method discriminator for the outbound corruption notification.
pub const METHOD_DISPLAY_CORRUPTION: &str = "DISPLAY_CORRUPTION";

/// Method discriminator for the inbound repair request.
pub const METHOD_REPAIR_DATABASE: &str = "REPAIR_DATABASE";

/// Method discriminator for the outbound reload instruction.
pub const METHOD_RELOAD_WINDOW: &str = "RELOAD_WINDOW";

/// Outbound frame from the coordinator to a UI client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum OutboundMessage {
    /// Show the corruption screen with the attached report.
    #[serde(rename = "DISPLAY_CORRUPTION")]
    DisplayCorruption(CorruptionReport),

    /// Tell the client to tear itself down and start over.
    #[serde(rename = "RELOAD_WINDOW")]
    ReloadWindow,
}

impl From<CorruptionReport> for OutboundMessage {
    fn from(report: CorruptionReport) -> Self {
        Self::DisplayCorruption(report)
    }
}

/// Inbound frame from a UI client.
///
/// Only the method discriminator is inspected; unknown methods are carried
/// through so callers can log them, but the coordinator treats them as
/// inert. Extra fields on the wire are ignored during decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Method discriminator.
    pub method: String,
}

impl InboundMessage {
    /// Creates a repair request frame.
    #[must_use]
    pub fn repair_request() -> Self {
        Self {
            method: METHOD_REPAIR_DATABASE.to_owned(),
        }
    }

    /// Creates a frame with an arbitrary method discriminator.
    #[must_use]
    pub fn with_method(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }

    /// `true` iff this frame asks the coordinator to repair the database.
    #[must_use]
    pub fn is_repair_request(&self) -> bool {
        self.method == METHOD_REPAIR_DATABASE
    }
}

/// Wire encode/decode failures.
#[derive(Debug, Error)]
pub enum WireError {
    /// Frame is not a valid JSON envelope.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Encodes an outbound frame as JSON bytes.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] if serialization fails, which for these
/// types only happens on resource exhaustion.
pub fn encode_outbound(message: &OutboundMessage) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(message)?)
}

/// Decodes an inbound frame, keeping only the method discriminator.
///
/// # Errors
///
/// Returns [`WireError::Malformed`] if the frame is not a JSON object with a
/// string `method` field.
pub fn decode_inbound(frame: &[u8]) -> Result<InboundMessage, WireError> {
    Ok(serde_json::from_slice(frame)?)
}
