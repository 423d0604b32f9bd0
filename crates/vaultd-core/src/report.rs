//! Corruption report derivation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backup;
use crate::fault::{CorruptionFault, ErrorInfo};

/// Diagnostic payload shown by every UI client when corruption is detected.
///
/// Computed once per recovery session from the fault and the resolved
/// backup; every channel in the session receives the identical payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionReport {
    /// The triggering error, forwarded verbatim.
    pub error: ErrorInfo,

    /// Whether the resolved backup looks restorable (it carries a vault).
    pub has_backup: bool,

    /// Locale to render the recovery screen in, when the backup preserved
    /// one.
    pub current_locale: Option<String>,
}

impl CorruptionReport {
    /// Derives the report from the fault and the resolved backup.
    ///
    /// Total over malformed snapshots: any unrecognizable shape degrades to
    /// `has_backup = false` and `current_locale = None`.
    #[must_use]
    pub fn derive(fault: &CorruptionFault, backup: Option<&Value>) -> Self {
        Self {
            error: fault.error.clone(),
            has_backup: backup::has_vault(backup),
            current_locale: backup::current_locale(backup).map(str::to_owned),
        }
    }
}
