use std::{future::Future, sync::Arc, time::Duration};

use shared::{
    domain::{EmailId, Mailbox},
    protocol::{Email, EmailUpdate},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, MailStoreError},
    store::MailStore,
    view::{
        ComposeDraft, DetailActions, Diagnostic, DiagnosticContext, ListRow, Renderer, ViewState,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Upper bound on every mail store call.
    pub request_timeout: Duration,
    /// Show the sent mailbox even when the create request failed.
    pub navigate_on_failed_send: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            navigate_on_failed_send: false,
        }
    }
}

/// What happened to the result of an asynchronous transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result was rendered.
    Applied,
    /// Another transition started while the request was in flight; the result was dropped.
    Discarded,
}

struct ControllerState {
    view: ViewState,
    generation: u64,
    open_email: Option<Email>,
}

impl ControllerState {
    /// Starts a transition; results carrying an older generation are stale.
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn enter(&mut self, view: ViewState) -> u64 {
        self.view = view;
        self.open_email = None;
        self.bump()
    }
}

/// Owns the on-screen view and is the only caller of the mail store.
pub struct ViewController {
    store: Arc<dyn MailStore>,
    renderer: Arc<dyn Renderer>,
    settings: ControllerSettings,
    inner: Mutex<ControllerState>,
}

impl ViewController {
    pub fn new(
        store: Arc<dyn MailStore>,
        renderer: Arc<dyn Renderer>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            store,
            renderer,
            settings,
            inner: Mutex::new(ControllerState {
                view: ViewState::default(),
                generation: 0,
                open_email: None,
            }),
        }
    }

    /// Loads the initial inbox view.
    pub async fn start(&self) -> Result<Outcome, ControllerError> {
        self.navigate(Mailbox::Inbox).await
    }

    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view
    }

    pub async fn navigate(&self, mailbox: Mailbox) -> Result<Outcome, ControllerError> {
        let token = self.inner.lock().await.enter(ViewState::List(mailbox));
        info!(%mailbox, "loading mailbox");

        let result = self.call(self.store.list_mailbox(mailbox)).await;

        let guard = self.inner.lock().await;
        if guard.generation != token {
            debug!(%mailbox, "discarding stale mailbox listing");
            return Ok(Outcome::Discarded);
        }
        match result {
            Ok(emails) => {
                let rows: Vec<ListRow> = emails.into_iter().map(ListRow::from).collect();
                debug!(%mailbox, count = rows.len(), "rendering mailbox");
                self.renderer.render_list(mailbox, &rows);
                Ok(Outcome::Applied)
            }
            Err(err) => {
                self.renderer.render_list(mailbox, &[]);
                drop(guard);
                Err(self.report(DiagnosticContext::LoadMailbox(mailbox), err.into()))
            }
        }
    }

    pub async fn open_compose(&self) {
        let draft = ComposeDraft::default();
        let mut guard = self.inner.lock().await;
        guard.enter(ViewState::Compose);
        self.renderer.render_compose(&draft);
    }

    /// Marks the email read, then fetches and shows it. The update is awaited
    /// first so the fetched record already carries `read = true`.
    pub async fn open_detail(&self, email_id: EmailId) -> Result<Outcome, ControllerError> {
        let context = DiagnosticContext::OpenEmail(email_id);
        let (mailbox, token) = {
            let mut guard = self.inner.lock().await;
            let view = guard.view;
            match view {
                ViewState::List(mailbox) => (mailbox, guard.bump()),
                current => {
                    drop(guard);
                    return Err(
                        self.report(context, ControllerError::NotListing { email_id, current })
                    );
                }
            }
        };

        if let Err(err) = self
            .call(self.store.update_email(email_id, EmailUpdate::mark_read()))
            .await
        {
            warn!(%email_id, error = %err, "failed to mark email as read");
        }

        if self.inner.lock().await.generation != token {
            debug!(%email_id, "view changed before email fetch; skipping");
            return Ok(Outcome::Discarded);
        }

        let result = self
            .call(self.store.get_email(email_id))
            .await
            .and_then(|email| {
                if email.id == email_id {
                    Ok(email)
                } else {
                    Err(MailStoreError::Malformed(format!(
                        "requested email {email_id} but received {}",
                        email.id
                    )))
                }
            });

        let mut guard = self.inner.lock().await;
        if guard.generation != token {
            debug!(%email_id, "discarding stale email fetch");
            return Ok(Outcome::Discarded);
        }
        match result {
            Ok(email) => {
                guard.view = ViewState::Detail { email_id, mailbox };
                let actions = DetailActions::for_mailbox(mailbox);
                self.renderer.render_detail(&email, &actions);
                guard.open_email = Some(email);
                Ok(Outcome::Applied)
            }
            Err(err) => {
                drop(guard);
                Err(self.report(context, err.into()))
            }
        }
    }

    /// Sends the draft and shows the sent mailbox once the store accepted it.
    pub async fn submit_compose(&self, draft: ComposeDraft) -> Result<Outcome, ControllerError> {
        let context = DiagnosticContext::SendEmail;
        let token = {
            let mut guard = self.inner.lock().await;
            if guard.view != ViewState::Compose {
                let current = guard.view;
                drop(guard);
                return Err(self.report(context, ControllerError::NotComposing { current }));
            }
            guard.bump()
        };

        let result = self.call(self.store.create_email(&draft.to_request())).await;
        let current = self.inner.lock().await.generation == token;

        match result {
            Ok(response) => {
                info!(
                    id = ?response.id,
                    message = response.message.as_deref().unwrap_or(""),
                    "email sent"
                );
                if !current {
                    debug!("view changed while sending; not showing sent mailbox");
                    return Ok(Outcome::Discarded);
                }
                self.navigate(Mailbox::Sent).await
            }
            Err(err) if !current => {
                warn!(error = %err, "send failed after the compose view was left");
                Ok(Outcome::Discarded)
            }
            Err(err) => {
                let err = self.report(context, err.into());
                if self.settings.navigate_on_failed_send {
                    if let Err(nav_err) = self.navigate(Mailbox::Sent).await {
                        debug!(error = %nav_err, "sent mailbox unavailable after failed send");
                    }
                }
                Err(err)
            }
        }
    }

    /// Flips the archived flag of the open email and returns to the inbox.
    pub async fn toggle_archive(
        &self,
        email_id: EmailId,
        currently_archived: bool,
    ) -> Result<Outcome, ControllerError> {
        let context = DiagnosticContext::ToggleArchive(email_id);
        let token = {
            let mut guard = self.inner.lock().await;
            let view = guard.view;
            match view {
                ViewState::Detail { email_id: open, .. } if open == email_id => guard.bump(),
                current => {
                    drop(guard);
                    return Err(
                        self.report(context, ControllerError::NotViewing { email_id, current })
                    );
                }
            }
        };

        let archived = !currently_archived;
        let result = self
            .call(
                self.store
                    .update_email(email_id, EmailUpdate::set_archived(archived)),
            )
            .await;

        if self.inner.lock().await.generation != token {
            debug!(%email_id, "discarding stale archive update result");
            return Ok(Outcome::Discarded);
        }
        match result {
            Ok(()) => {
                info!(%email_id, archived, "archive flag updated");
                self.navigate(Mailbox::Inbox).await
            }
            Err(err) => Err(self.report(context, err.into())),
        }
    }

    /// Opens the compose form prefilled as a reply to the email on screen.
    pub async fn reply(&self, email_id: EmailId) -> Result<(), ControllerError> {
        let mut guard = self.inner.lock().await;
        let current = guard.view;
        let draft = match current {
            ViewState::Detail { email_id: open, .. } if open == email_id => {
                guard.open_email.as_ref().map(ComposeDraft::reply_to)
            }
            _ => None,
        };
        let Some(draft) = draft else {
            drop(guard);
            return Err(self.report(
                DiagnosticContext::Reply(email_id),
                ControllerError::NotViewing { email_id, current },
            ));
        };
        guard.enter(ViewState::Compose);
        self.renderer.render_compose(&draft);
        Ok(())
    }

    async fn call<T, F>(&self, request: F) -> Result<T, MailStoreError>
    where
        F: Future<Output = Result<T, MailStoreError>>,
    {
        let timeout = self.settings.request_timeout;
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(MailStoreError::Timeout(timeout)),
        }
    }

    fn report(&self, context: DiagnosticContext, err: ControllerError) -> ControllerError {
        let diagnostic = Diagnostic::from_error(context, &err);
        if diagnostic.is_user_facing() {
            info!(?context, error = %err, "mail store rejected request");
        } else {
            warn!(?context, kind = ?diagnostic.kind(), error = %err, "mail action failed");
        }
        self.renderer.report(&diagnostic);
        err
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
