use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::EmailId;

/// Row returned by `GET /emails/{mailbox}`. Body and recipients may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: EmailId,
    pub sender: String,
    pub subject: String,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
}

/// Full record returned by `GET /emails/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub sender: String,
    #[serde(deserialize_with = "recipients_from_wire")]
    pub recipients: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
}

impl Email {
    pub fn recipients_line(&self) -> String {
        self.recipients.join(", ")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipientsWire {
    One(String),
    Many(Vec<String>),
}

fn recipients_from_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RecipientsWire::deserialize(deserializer)? {
        RecipientsWire::One(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect(),
        RecipientsWire::Many(list) => list,
    })
}

/// Body of `PUT /emails/{id}`. Fields left as `None` are not sent and stay unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl EmailUpdate {
    pub fn mark_read() -> Self {
        Self {
            read: Some(true),
            archived: None,
        }
    }

    pub fn set_archived(archived: bool) -> Self {
        Self {
            read: None,
            archived: Some(archived),
        }
    }
}

/// Body of `POST /emails`. Recipients are relayed exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub recipients: String,
    pub subject: String,
    pub body: String,
}

/// Success payload of `POST /emails`: either the new id or a confirmation message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmailId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_without_body_or_recipients_decodes() {
        let summary: EmailSummary = serde_json::from_str(
            r#"{"id":1,"sender":"a@x.com","subject":"Hi","timestamp":"t","read":false}"#,
        )
        .expect("decode");
        assert_eq!(summary.id, EmailId(1));
        assert!(!summary.read);
        assert!(!summary.archived);
    }

    #[test]
    fn recipients_accept_string_or_list() {
        let single: Email = serde_json::from_str(
            r#"{"id":1,"sender":"a@x.com","recipients":"b@x.com, c@x.com","subject":"Hi","timestamp":"t","body":"hello"}"#,
        )
        .expect("decode string recipients");
        assert_eq!(single.recipients, vec!["b@x.com", "c@x.com"]);

        let list: Email = serde_json::from_str(
            r#"{"id":2,"sender":"a@x.com","recipients":["b@x.com"],"subject":"Hi","timestamp":"t","body":"","read":true,"archived":true}"#,
        )
        .expect("decode list recipients");
        assert_eq!(list.recipients_line(), "b@x.com");
        assert!(list.read && list.archived);
    }

    #[test]
    fn email_missing_sender_is_rejected() {
        let result: Result<Email, _> =
            serde_json::from_str(r#"{"id":1,"recipients":[],"subject":"Hi","timestamp":"t"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_only_serializes_present_fields() {
        assert_eq!(
            serde_json::to_string(&EmailUpdate::mark_read()).expect("encode"),
            r#"{"read":true}"#
        );
        assert_eq!(
            serde_json::to_string(&EmailUpdate::set_archived(false)).expect("encode"),
            r#"{"archived":false}"#
        );
    }
}
