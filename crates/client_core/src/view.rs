//! View model handed to the renderer: which screen is up and what it may offer.

use shared::{
    domain::{EmailId, Mailbox},
    protocol::{ComposeRequest, Email, EmailSummary},
};

use crate::error::{ControllerError, MailStoreError};

const REPLY_SUBJECT_PREFIX: &str = "Re: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    List(Mailbox),
    Detail { email_id: EmailId, mailbox: Mailbox },
    Compose,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::List(Mailbox::Inbox)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Read,
    Unread,
}

impl RowStyle {
    pub fn for_read(read: bool) -> Self {
        if read {
            RowStyle::Read
        } else {
            RowStyle::Unread
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            RowStyle::Read => "read",
            RowStyle::Unread => "unread",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub summary: EmailSummary,
    pub style: RowStyle,
}

impl From<EmailSummary> for ListRow {
    fn from(summary: EmailSummary) -> Self {
        let style = RowStyle::for_read(summary.read);
        Self { summary, style }
    }
}

/// The archive control offered on a detail view and the value it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveAction {
    pub label: &'static str,
    pub target_archived: bool,
}

impl ArchiveAction {
    /// `archived` value the email had before the button was pressed.
    pub fn currently_archived(self) -> bool {
        !self.target_archived
    }
}

const ARCHIVE_ACTIONS: [(Mailbox, Option<ArchiveAction>); 3] = [
    (
        Mailbox::Inbox,
        Some(ArchiveAction {
            label: "archive",
            target_archived: true,
        }),
    ),
    (
        Mailbox::Archive,
        Some(ArchiveAction {
            label: "unarchive",
            target_archived: false,
        }),
    ),
    (Mailbox::Sent, None),
];

pub fn archive_action(mailbox: Mailbox) -> Option<ArchiveAction> {
    ARCHIVE_ACTIONS
        .iter()
        .find(|(candidate, _)| *candidate == mailbox)
        .and_then(|(_, action)| *action)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailActions {
    pub archive: Option<ArchiveAction>,
    pub reply: bool,
}

impl DetailActions {
    pub fn for_mailbox(mailbox: Mailbox) -> Self {
        Self {
            archive: archive_action(mailbox),
            reply: true,
        }
    }
}

/// Contents of the compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeDraft {
    pub recipients: String,
    pub subject: String,
    pub body: String,
}

impl ComposeDraft {
    pub fn new(
        recipients: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipients: recipients.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Draft answering `email`: addressed to its sender, quoting its body.
    pub fn reply_to(email: &Email) -> Self {
        let subject = if email.subject.starts_with(REPLY_SUBJECT_PREFIX) {
            email.subject.clone()
        } else {
            format!("{REPLY_SUBJECT_PREFIX}{}", email.subject)
        };
        Self {
            recipients: email.sender.clone(),
            subject,
            body: format!(
                "On {} {} wrote:\n{}",
                email.timestamp, email.sender, email.body
            ),
        }
    }

    pub fn to_request(&self) -> ComposeRequest {
        ComposeRequest {
            recipients: self.recipients.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Transport,
    Timeout,
    Malformed,
    Validation,
    InvalidAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticContext {
    LoadMailbox(Mailbox),
    OpenEmail(EmailId),
    MarkRead(EmailId),
    ToggleArchive(EmailId),
    SendEmail,
    Reply(EmailId),
}

/// A failure the controller recovered from, passed to the renderer for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    context: DiagnosticContext,
    message: String,
}

impl Diagnostic {
    pub fn from_error(context: DiagnosticContext, err: &ControllerError) -> Self {
        let kind = match err {
            ControllerError::Store(store) => match store {
                MailStoreError::Transport(_)
                | MailStoreError::Status { .. }
                | MailStoreError::InvalidUrl(_) => DiagnosticKind::Transport,
                MailStoreError::Timeout(_) => DiagnosticKind::Timeout,
                MailStoreError::Malformed(_) => DiagnosticKind::Malformed,
                MailStoreError::Validation(_) => DiagnosticKind::Validation,
            },
            ControllerError::NotViewing { .. }
            | ControllerError::NotListing { .. }
            | ControllerError::NotComposing { .. } => DiagnosticKind::InvalidAction,
        };
        Self {
            kind,
            context,
            message: err.to_string(),
        }
    }

    /// Validation failures are the user's to fix, everything else is an operator concern.
    pub fn is_user_facing(&self) -> bool {
        self.kind == DiagnosticKind::Validation
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn context(&self) -> DiagnosticContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Presentation side of the controller. Implementations bind row clicks to
/// `ViewController::open_detail`, the archive control to `toggle_archive`,
/// reply to `reply` and form submission to `submit_compose`.
pub trait Renderer: Send + Sync {
    fn render_list(&self, mailbox: Mailbox, rows: &[ListRow]);
    fn render_detail(&self, email: &Email, actions: &DetailActions);
    fn render_compose(&self, draft: &ComposeDraft);
    fn report(&self, diagnostic: &Diagnostic);
}
