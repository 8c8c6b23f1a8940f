//! Response envelopes shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Simple acknowledgement body, e.g. for deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single failed field in a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body: `{"message": ...}` for most failures, `{"errors": [...]}`
/// for per-field validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self {
            message: None,
            errors: Some(errors),
        }
    }

    /// Convenience for "these required fields were empty".
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::validation(
            fields
                .iter()
                .map(|field| FieldError {
                    field: (*field).to_string(),
                    message: "must not be empty".to_string(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_body_has_no_errors_key() {
        let body = serde_json::to_value(ErrorResponse::message("Post not found")).unwrap();
        assert_eq!(body["message"], "Post not found");
        assert!(body.get("errors").is_none());
    }

    #[test]
    fn validation_body_lists_fields() {
        let body = serde_json::to_value(ErrorResponse::missing_fields(&["title", "slug"])).unwrap();
        assert!(body.get("message").is_none());
        assert_eq!(body["errors"][0]["field"], "title");
        assert_eq!(body["errors"][1]["field"], "slug");
    }
}
