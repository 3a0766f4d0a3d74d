use balcao_persist::PersistError;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One reported error in a `messages`/`details` mapping.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
    /// `None` leaves the key out, `Some(None)` renders `"line": null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Option<u32>>,
}

/// Ordered error report rendered as `{"message-01": {...}, "message-02": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMessages(Vec<ErrorEntry>);

impl ErrorMessages {
    /// A single line-less entry, used for validation failures.
    pub fn single(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![ErrorEntry {
            code: code.into(),
            message: message.into(),
            line: None,
        }])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.0.len()).map(message_key)
    }
}

fn message_key(index: usize) -> String {
    format!("message-{:02}", index)
}

impl Serialize for ErrorMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, entry) in self.keys().zip(&self.0) {
            map.serialize_entry(&key, entry)?;
        }
        map.end()
    }
}

/// Flatten a database error into numbered entries: every preceding cause in
/// reported order, then the error itself when it carries a message.
pub fn normalize(error: &PersistError) -> ErrorMessages {
    let mut entries: Vec<ErrorEntry> = error
        .preceding_errors()
        .iter()
        .map(|cause| ErrorEntry {
            code: cause.code.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
            message: cause.message.clone(),
            line: Some(cause.line),
        })
        .collect();

    let message = error.message();
    if !message.is_empty() {
        entries.push(ErrorEntry {
            code: error.code().unwrap_or("UNKNOWN").to_string(),
            message,
            line: Some(error.line()),
        });
    }

    ErrorMessages(entries)
}

/// Normalize a database error and log the result
pub fn log_sql_error(error: &PersistError) -> ErrorMessages {
    let messages = normalize(error);
    let rendered = serde_json::to_string(&messages).unwrap_or_default();
    tracing::error!(errors = %rendered, "SQL error");
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use balcao_persist::SqlErrorDetail;
    use serde_json::json;

    #[test]
    fn test_preceding_errors_come_first() {
        let error = PersistError::Request {
            error: SqlErrorDetail::new("EREQUEST", "The transaction ended in the trigger.").with_line(12),
            preceding: vec![
                SqlErrorDetail::new("EREQUEST", "Violation of PRIMARY KEY constraint").with_line(4),
                SqlErrorDetail {
                    code: None,
                    message: "The statement has been terminated.".to_string(),
                    line: None,
                    number: None,
                },
            ],
        };

        let messages = normalize(&error);

        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages.keys().collect::<Vec<_>>(),
            vec!["message-01", "message-02", "message-03"]
        );
        assert_eq!(
            serde_json::to_value(&messages).unwrap(),
            json!({
                "message-01": {"code": "EREQUEST", "message": "Violation of PRIMARY KEY constraint", "line": 4},
                "message-02": {"code": "UNKNOWN", "message": "The statement has been terminated.", "line": null},
                "message-03": {"code": "EREQUEST", "message": "The transaction ended in the trigger.", "line": 12}
            })
        );
    }

    #[test]
    fn test_no_causes_and_no_message_is_empty() {
        let error = PersistError::request(SqlErrorDetail::new("EREQUEST", ""));

        let messages = normalize(&error);

        assert!(messages.is_empty());
        assert_eq!(serde_json::to_value(&messages).unwrap(), json!({}));
    }

    #[test]
    fn test_non_request_errors_use_their_code() {
        let error = PersistError::Timeout("pool exhausted".to_string());

        let messages = normalize(&error);

        assert_eq!(messages.entries()[0].code, "ETIMEOUT");
        assert_eq!(messages.entries()[0].line, Some(None));
    }

    #[test]
    fn test_keys_keep_counting_past_two_digits() {
        let preceding = (0..10)
            .map(|i| SqlErrorDetail::new("EREQUEST", format!("cause {}", i)))
            .collect();
        let error = PersistError::Request {
            error: SqlErrorDetail::new("EREQUEST", "top"),
            preceding,
        };

        let keys: Vec<String> = normalize(&error).keys().collect();
        assert_eq!(keys.first().map(String::as_str), Some("message-01"));
        assert_eq!(keys.last().map(String::as_str), Some("message-11"));
    }

    #[test]
    fn test_single_entry_omits_line() {
        let messages = ErrorMessages::single("MISSING_PARAM", "celular is required");

        assert_eq!(
            serde_json::to_value(&messages).unwrap(),
            json!({"message-01": {"code": "MISSING_PARAM", "message": "celular is required"}})
        );
    }
}
