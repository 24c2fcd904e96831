use std::time::Duration;

use shared::domain::EmailId;
use thiserror::Error;

use crate::view::ViewState;

/// Normalized failure of a single `MailStore` call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailStoreError {
    #[error("mail store unreachable: {0}")]
    Transport(String),
    #[error("mail store returned HTTP {status}{}", detail_suffix(.message))]
    Status { status: u16, message: Option<String> },
    #[error("malformed mail store payload: {0}")]
    Malformed(String),
    #[error("{0}")]
    Validation(String),
    #[error("mail store did not answer within {}ms", millis(.0))]
    Timeout(Duration),
    #[error("invalid mail store url: {0}")]
    InvalidUrl(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

fn millis(timeout: &Duration) -> u128 {
    timeout.as_millis()
}

impl From<reqwest::Error> for MailStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MailStoreError::Malformed(err.to_string())
        } else {
            MailStoreError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MailStoreError {
    fn from(err: serde_json::Error) -> Self {
        MailStoreError::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error(transparent)]
    Store(#[from] MailStoreError),
    #[error("email {email_id} is not open in the detail view (current view: {current:?})")]
    NotViewing {
        email_id: EmailId,
        current: ViewState,
    },
    #[error("no list is on screen to open email {email_id} from (current view: {current:?})")]
    NotListing {
        email_id: EmailId,
        current: ViewState,
    },
    #[error("compose form is not open (current view: {current:?})")]
    NotComposing { current: ViewState },
}

impl ControllerError {
    pub fn store_error(&self) -> Option<&MailStoreError> {
        match self {
            ControllerError::Store(err) => Some(err),
            _ => None,
        }
    }
}
