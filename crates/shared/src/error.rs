use serde::{Deserialize, Serialize};

/// Error body returned by the `/emails` endpoints on a non-success status.
///
/// Servers in the wild use `{"error": ...}`, `{"message": ...}` or a list
/// under `messages`; all three are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Single human-readable line, or `None` when the body carried nothing usable.
    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.error.as_deref());
        parts.extend(self.message.as_deref());
        parts.extend(self.messages.iter().map(String::as_str));
        let parts: Vec<&str> = parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
