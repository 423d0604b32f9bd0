//! Field access over an untrusted backup snapshot.
//!
//! A backup is whatever the persistence layer (or the detection site)
//! managed to save before things went wrong: possibly absent, possibly
//! truncated or of the wrong shape entirely. Every accessor here is
//! total; a malformed snapshot yields the conservative default, never an
//! error.

use serde_json::Value;

/// Snapshot section that carries the encrypted vault.
pub const VAULT_SECTION: &str = "KeyringController";

/// Field inside [`VAULT_SECTION`] holding the vault payload.
pub const VAULT_FIELD: &str = "vault";

/// Snapshot section that carries user preferences.
pub const PREFERENCES_SECTION: &str = "PreferencesController";

/// Field inside [`PREFERENCES_SECTION`] holding the active locale.
pub const LOCALE_FIELD: &str = "currentLocale";

/// Returns `true` iff the snapshot has a vault section whose vault value is
/// truthy.
///
/// Any other shape (no snapshot, a missing or non-object vault section, a
/// vault field holding `null`, `false`, zero, or an empty string) reads as
/// "nothing restorable here".
#[must_use]
pub fn has_vault(backup: Option<&Value>) -> bool {
    backup
        .and_then(|snapshot| snapshot.get(VAULT_SECTION))
        .and_then(|section| section.get(VAULT_FIELD))
        .is_some_and(is_truthy)
}

/// Extracts the stored locale, when the preferences section holds a string
/// there.
#[must_use]
pub fn current_locale(backup: Option<&Value>) -> Option<&str> {
    backup
        .and_then(|snapshot| snapshot.get(PREFERENCES_SECTION))
        .and_then(|section| section.get(LOCALE_FIELD))
        .and_then(Value::as_str)
}

/// Loose boolean coercion over an untrusted JSON value.
///
/// `null`, `false`, numeric zero, and the empty string are falsy; arrays and
/// objects are truthy even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
