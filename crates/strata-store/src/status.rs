//! Result of a batch read: values plus non-fatal warnings.

use std::collections::HashMap;

use serde::Serialize;

/// Message key used for every batch warning.
pub const INTERNAL_ERROR_MESSAGE: &str = "internalerror";

/// Appended to each batch warning.
pub const REMEDY_HINT: &str = "Use find-bad-blobs to remedy.";

/// Severity of a [`StatusMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Warning,
    Error,
}

/// One problem recorded during a batch operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub message: String,
    pub params: Vec<String>,
}

impl StatusMessage {
    /// An `internalerror` warning carrying `detail` followed by the remedy hint.
    pub fn internal_warning(detail: impl std::fmt::Display) -> Self {
        Self {
            kind: MessageKind::Warning,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            params: vec![format!("{detail}. {REMEDY_HINT}")],
        }
    }
}

/// Outcome of [`BlobStore::get_blob_batch`](crate::BlobStore::get_blob_batch).
///
/// Every requested address is a key of [`values`](Self::values); addresses
/// that could not be resolved map to `None` and have a matching entry in
/// [`errors`](Self::errors), in request order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    values: HashMap<String, Option<String>>,
    errors: Vec<StatusMessage>,
}

impl BatchResult {
    pub(crate) fn new(values: HashMap<String, Option<String>>, errors: Vec<StatusMessage>) -> Self {
        Self { values, errors }
    }

    pub fn values(&self) -> &HashMap<String, Option<String>> {
        &self.values
    }

    /// Text of `address`: `None` if it was not requested, `Some(None)` if it
    /// could not be resolved.
    pub fn get(&self, address: &str) -> Option<Option<&str>> {
        self.values.get(address).map(Option::as_deref)
    }

    pub fn errors(&self) -> &[StatusMessage] {
        &self.errors
    }

    /// Returns `true` if every address resolved.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (HashMap<String, Option<String>>, Vec<StatusMessage>) {
        (self.values, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_warning_text() {
        let msg = StatusMessage::internal_warning("Bad blob address: tt:0");
        assert_eq!(msg.kind, MessageKind::Warning);
        assert_eq!(msg.message, "internalerror");
        assert_eq!(msg.params, vec!["Bad blob address: tt:0. Use find-bad-blobs to remedy."]);
    }

    #[test]
    fn get_distinguishes_absent_from_unrequested() {
        let mut values = HashMap::new();
        values.insert("tt:1".to_string(), Some("A".to_string()));
        values.insert("tt:0".to_string(), None);
        let result = BatchResult::new(values, vec![StatusMessage::internal_warning("x")]);

        assert_eq!(result.get("tt:1"), Some(Some("A")));
        assert_eq!(result.get("tt:0"), Some(None));
        assert_eq!(result.get("tt:2"), None);
        assert!(!result.is_ok());
    }

    #[test]
    fn serializes_errors_like_status_records() {
        let result = BatchResult::new(
            HashMap::new(),
            vec![StatusMessage::internal_warning("Unable to fetch blob at tt:9")],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errors"][0]["type"], "warning");
        assert_eq!(json["errors"][0]["message"], "internalerror");
        assert_eq!(
            json["errors"][0]["params"][0],
            "Unable to fetch blob at tt:9. Use find-bad-blobs to remedy."
        );
    }
}
