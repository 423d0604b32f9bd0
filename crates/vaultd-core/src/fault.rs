//! The triggering fault handed to the recovery coordinator.
//!
//! Corruption is detected by external code; by the time the coordinator sees
//! a [`CorruptionFault`] the persisted state is already known to be broken.
//! Some detection sites manage to capture a best-effort state snapshot and
//! attach it to the fault; when present and non-null it takes precedence
//! over querying the persistence layer again.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User-facing view of the triggering error.
///
/// Embedded verbatim in the corruption report sent to every UI client so
/// the recovery screen can show what actually went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error message from the detection site.
    pub message: String,

    /// Error class name, e.g. `"Error"` or `"DataIntegrityError"`.
    pub name: String,

    /// Captured stack trace, if the detection site recorded one.
    #[serde(default)]
    pub stack: Option<String>,
}

/// The fault that triggered the recovery flow.
#[derive(Debug, Clone)]
pub struct CorruptionFault {
    /// What went wrong, as reported by the detection site.
    pub error: ErrorInfo,

    /// State snapshot attached at the detection site, if any.
    pub backup: Option<Value>,
}

impl CorruptionFault {
    /// Creates a fault with no attached backup.
    #[must_use]
    pub fn new(message: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            error: ErrorInfo {
                message: message.into(),
                name: name.into(),
                stack: None,
            },
            backup: None,
        }
    }

    /// Attaches a captured stack trace.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.error.stack = Some(stack.into());
        self
    }

    /// Attaches a state snapshot captured at the detection site.
    #[must_use]
    pub fn with_backup(mut self, backup: Value) -> Self {
        self.backup = Some(backup);
        self
    }

    /// The attached backup, treating JSON `null` as absent.
    #[must_use]
    pub fn attached_backup(&self) -> Option<&Value> {
        self.backup.as_ref().filter(|backup| !backup.is_null())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn attached_backup_skips_null() {
        let fault = CorruptionFault::new("corrupted", "Error").with_backup(Value::Null);
        assert!(fault.attached_backup().is_none());
    }

    #[test]
    fn attached_backup_returns_payload() {
        let snapshot = json!({"KeyringController": {"vault": "abc"}});
        let fault = CorruptionFault::new("corrupted", "Error").with_backup(snapshot.clone());
        assert_eq!(fault.attached_backup(), Some(&snapshot));
    }

    #[test]
    fn builder_records_stack() {
        let fault = CorruptionFault::new("corrupted", "Error").with_stack("at detect()");
        assert_eq!(fault.error.stack.as_deref(), Some("at detect()"));
        assert_eq!(fault.error.message, "corrupted");
        assert_eq!(fault.error.name, "Error");
    }
}
