use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EmailId, Mailbox},
    error::ApiError,
    protocol::{ComposeRequest, ComposeResponse, Email, EmailSummary, EmailUpdate},
};
use tracing::debug;
use url::Url;

use crate::error::MailStoreError;

/// Remote email store behind the `/emails` REST surface.
#[async_trait]
pub trait MailStore: Send + Sync {
    async fn list_mailbox(&self, mailbox: Mailbox) -> Result<Vec<EmailSummary>, MailStoreError>;
    async fn get_email(&self, email_id: EmailId) -> Result<Email, MailStoreError>;
    async fn update_email(
        &self,
        email_id: EmailId,
        update: EmailUpdate,
    ) -> Result<(), MailStoreError>;
    async fn create_email(
        &self,
        request: &ComposeRequest,
    ) -> Result<ComposeResponse, MailStoreError>;
}

pub struct HttpMailStore {
    http: Client,
    base_url: Url,
}

impl HttpMailStore {
    pub fn new(base_url: Url) -> Result<Self, MailStoreError> {
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(MailStoreError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .user_agent(concat!("mailview/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn emails_url(&self, tail: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("emails");
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        url
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, MailStoreError> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: Response) -> Result<Response, MailStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let bytes = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ApiError>(&bytes)
            .ok()
            .and_then(|body| body.summary());
        Err(MailStoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MailStore for HttpMailStore {
    async fn list_mailbox(&self, mailbox: Mailbox) -> Result<Vec<EmailSummary>, MailStoreError> {
        let url = self.emails_url(Some(mailbox.as_str()));
        debug!(%url, "listing mailbox");
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn get_email(&self, email_id: EmailId) -> Result<Email, MailStoreError> {
        let url = self.emails_url(Some(&email_id.to_string()));
        debug!(%url, "fetching email");
        let response = self.http.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn update_email(
        &self,
        email_id: EmailId,
        update: EmailUpdate,
    ) -> Result<(), MailStoreError> {
        let url = self.emails_url(Some(&email_id.to_string()));
        debug!(%url, ?update, "updating email");
        let response = self.http.put(url).json(&update).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn create_email(
        &self,
        request: &ComposeRequest,
    ) -> Result<ComposeResponse, MailStoreError> {
        let url = self.emails_url(None);
        debug!(%url, recipients = %request.recipients, "creating email");
        let response = self.http.post(url).json(request).send().await?;
        let response = match Self::check_status(response).await {
            Err(MailStoreError::Status {
                status,
                message: Some(message),
            }) if status == StatusCode::BAD_REQUEST.as_u16() => {
                return Err(MailStoreError::Validation(message));
            }
            other => other?,
        };
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ComposeResponse::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
