//! Plain-text renderer: prints views to a writer and remembers what is on
//! screen so typed commands can refer to rows and controls.

use std::{
    fmt::Write as _,
    io::Write,
    sync::{Mutex, MutexGuard},
};

use client_core::{ComposeDraft, DetailActions, Diagnostic, ListRow, Renderer};
use shared::{
    domain::{EmailId, Mailbox},
    protocol::Email,
};
use tracing::warn;

use crate::commands::DraftField;

#[derive(Default)]
struct Screen {
    rows: Vec<EmailId>,
    open_email: Option<(EmailId, DetailActions)>,
    draft: Option<ComposeDraft>,
}

pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
    screen: Mutex<Screen>,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            screen: Mutex::new(Screen::default()),
        }
    }

    /// Email shown on row `row` (1-based) of the current list.
    pub fn row(&self, row: usize) -> Option<EmailId> {
        self.screen().rows.get(row.checked_sub(1)?).copied()
    }

    pub fn open_email(&self) -> Option<(EmailId, DetailActions)> {
        self.screen().open_email
    }

    pub fn draft(&self) -> Option<ComposeDraft> {
        self.screen().draft.clone()
    }

    /// Returns `false` when no compose form is on screen.
    pub fn edit_draft(&self, field: DraftField, value: String) -> bool {
        let mut screen = self.screen();
        let Some(draft) = screen.draft.as_mut() else {
            return false;
        };
        match field {
            DraftField::Recipients => draft.recipients = value,
            DraftField::Subject => draft.subject = value,
            DraftField::Body => draft.body = value,
        }
        true
    }

    pub fn notice(&self, text: &str) {
        self.emit(&format!("! {text}\n"));
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn screen(&self) -> MutexGuard<'_, Screen> {
        match self.screen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn reset_screen(&self) -> MutexGuard<'_, Screen> {
        let mut screen = self.screen();
        *screen = Screen::default();
        screen
    }

    fn emit(&self, text: &str) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render_list(&self, mailbox: Mailbox, rows: &[ListRow]) {
        self.reset_screen().rows = rows.iter().map(|row| row.summary.id).collect();

        let mut text = format!("\n== {} ==\n", mailbox.title());
        if rows.is_empty() {
            text.push_str("(no emails)\n");
        }
        for (index, row) in rows.iter().enumerate() {
            let _ = writeln!(
                text,
                "{:>3}. [{:<6}] {:<40} {}\n       {}",
                index + 1,
                row.style.class_name(),
                row.summary.subject,
                row.summary.timestamp,
                row.summary.sender
            );
        }
        self.emit(&text);
    }

    fn render_detail(&self, email: &Email, actions: &DetailActions) {
        self.reset_screen().open_email = Some((email.id, *actions));

        let mut text = String::new();
        let _ = writeln!(text, "\nFrom: {}", email.sender);
        let _ = writeln!(text, "To: {}", email.recipients_line());
        let _ = writeln!(text, "Subject: {}", email.subject);
        let _ = writeln!(text, "Timestamp: {}", email.timestamp);
        let _ = writeln!(text, "\n{}\n", email.body);

        let mut controls = Vec::new();
        if actions.reply {
            controls.push("[reply]".to_string());
        }
        if let Some(action) = actions.archive {
            controls.push(format!("[{}]", action.label));
        }
        let _ = writeln!(text, "{}", controls.join(" "));
        self.emit(&text);
    }

    fn render_compose(&self, draft: &ComposeDraft) {
        self.reset_screen().draft = Some(draft.clone());

        let mut text = String::from("\n== New Email ==\n");
        let _ = writeln!(text, "To: {}", draft.recipients);
        let _ = writeln!(text, "Subject: {}", draft.subject);
        let _ = writeln!(text, "Body:\n{}", draft.body);
        text.push_str("(edit with `to`, `subject`, `body`; `send` to submit)\n");
        self.emit(&text);
    }

    fn report(&self, diagnostic: &Diagnostic) {
        if diagnostic.is_user_facing() {
            self.notice(diagnostic.message());
        } else {
            self.notice(&format!("request failed: {}", diagnostic.message()));
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::{archive_action, RowStyle};
    use shared::protocol::EmailSummary;

    use super::*;

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).expect("utf8")
    }

    fn row(id: i64, read: bool) -> ListRow {
        ListRow {
            summary: EmailSummary {
                id: EmailId(id),
                sender: "a@x.com".to_string(),
                subject: format!("Subject {id}"),
                timestamp: "t".to_string(),
                read,
                archived: false,
            },
            style: RowStyle::for_read(read),
        }
    }

    #[test]
    fn list_rows_are_numbered_from_one() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.render_list(Mailbox::Inbox, &[row(10, false), row(11, true)]);

        assert_eq!(renderer.row(1), Some(EmailId(10)));
        assert_eq!(renderer.row(2), Some(EmailId(11)));
        assert_eq!(renderer.row(0), None);
        assert_eq!(renderer.row(3), None);

        let text = output(renderer);
        assert!(text.contains("== Inbox =="));
        assert!(text.contains("[unread]"));
        assert!(text.contains("[read  ]"));
    }

    #[test]
    fn detail_lists_headers_and_controls() {
        let renderer = TerminalRenderer::new(Vec::new());
        let email = Email {
            id: EmailId(1),
            sender: "a@x.com".to_string(),
            recipients: vec!["b@x.com".to_string(), "c@x.com".to_string()],
            subject: "Hi".to_string(),
            body: "hello".to_string(),
            timestamp: "t".to_string(),
            read: true,
            archived: true,
        };
        let actions = DetailActions {
            archive: archive_action(Mailbox::Archive),
            reply: true,
        };
        renderer.render_detail(&email, &actions);

        assert_eq!(renderer.open_email(), Some((EmailId(1), actions)));
        assert_eq!(renderer.row(1), None);
        let text = output(renderer);
        assert!(text.contains("To: b@x.com, c@x.com"));
        assert!(text.contains("[reply] [unarchive]"));
    }

    #[test]
    fn draft_edits_apply_only_while_composing() {
        let renderer = TerminalRenderer::new(Vec::new());
        assert!(!renderer.edit_draft(DraftField::Subject, "Hi".to_string()));

        renderer.render_compose(&ComposeDraft::default());
        assert!(renderer.edit_draft(DraftField::Recipients, "c@x.com".to_string()));
        assert!(renderer.edit_draft(DraftField::Body, "hello".to_string()));
        assert_eq!(
            renderer.draft(),
            Some(ComposeDraft::new("c@x.com", "", "hello"))
        );

        renderer.render_list(Mailbox::Sent, &[]);
        assert_eq!(renderer.draft(), None);
        assert!(output(renderer).contains("(no emails)"));
    }
}
