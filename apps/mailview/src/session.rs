//! Reads commands and turns them into controller calls, the way a page's
//! click handlers would. Controller calls run as background tasks so input is
//! still read while a request is outstanding.

use std::{io::Write, sync::Arc};

use client_core::{ComposeDraft, ViewController};
use shared::domain::{EmailId, Mailbox};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::{JoinError, JoinSet},
};
use tracing::{debug, warn};

use crate::{
    commands::{parse_command, Command, HELP},
    terminal::TerminalRenderer,
};

/// A controller call resolved against what was on screen when it was typed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Navigate(Mailbox),
    Compose,
    Open(EmailId),
    Reply(EmailId),
    ToggleArchive {
        email_id: EmailId,
        currently_archived: bool,
    },
    Send(ComposeDraft),
}

pub async fn run<R, W>(
    controller: Arc<ViewController>,
    renderer: &TerminalRenderer<W>,
    input: R,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    let mut pending = JoinSet::new();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => {
                        pending.abort_all();
                        break;
                    }
                    Ok(Some(command)) => {
                        if let Some(action) = resolve(renderer, command) {
                            pending.spawn(perform(controller.clone(), action));
                        }
                    }
                    Err(err) => renderer.notice(&err.to_string()),
                }
            }
            Some(joined) = pending.join_next(), if !pending.is_empty() => reap(joined),
        }
    }

    // End of input: let outstanding requests land on screen.
    while let Some(joined) = pending.join_next().await {
        reap(joined);
    }
    Ok(())
}

/// Maps a command onto the control it refers to. Commands that only touch the
/// screen are handled here and yield `None`.
fn resolve<W: Write + Send>(
    renderer: &TerminalRenderer<W>,
    command: Command,
) -> Option<Action> {
    match command {
        Command::Mailbox(mailbox) => Some(Action::Navigate(mailbox)),
        Command::Open(row) => {
            let email_id = renderer.row(row);
            if email_id.is_none() {
                renderer.notice(&format!("no row {row} on screen"));
            }
            email_id.map(Action::Open)
        }
        Command::Compose => Some(Action::Compose),
        Command::Reply => match renderer.open_email() {
            Some((email_id, actions)) if actions.reply => Some(Action::Reply(email_id)),
            _ => {
                renderer.notice("no email is open");
                None
            }
        },
        Command::Archive | Command::Unarchive => {
            let wanted = if command == Command::Archive {
                "archive"
            } else {
                "unarchive"
            };
            let control = renderer.open_email().and_then(|(email_id, actions)| {
                actions
                    .archive
                    .filter(|action| action.label == wanted)
                    .map(|action| Action::ToggleArchive {
                        email_id,
                        currently_archived: action.currently_archived(),
                    })
            });
            if control.is_none() {
                renderer.notice(&format!("no {wanted} control on this view"));
            }
            control
        }
        Command::Edit(field, value) => {
            if !renderer.edit_draft(field, value) {
                renderer.notice("compose form is not open");
            }
            None
        }
        Command::Send => {
            let draft = renderer.draft();
            if draft.is_none() {
                renderer.notice("compose form is not open");
            }
            draft.map(Action::Send)
        }
        Command::Help => {
            renderer.notice(HELP);
            None
        }
        Command::Quit => None,
    }
}

async fn perform(controller: Arc<ViewController>, action: Action) {
    let result = match action {
        Action::Navigate(mailbox) => controller.navigate(mailbox).await.map(drop),
        Action::Compose => {
            controller.open_compose().await;
            Ok(())
        }
        Action::Open(email_id) => controller.open_detail(email_id).await.map(drop),
        Action::Reply(email_id) => controller.reply(email_id).await,
        Action::ToggleArchive {
            email_id,
            currently_archived,
        } => controller
            .toggle_archive(email_id, currently_archived)
            .await
            .map(drop),
        Action::Send(draft) => controller.submit_compose(draft).await.map(drop),
    };

    // The controller has already logged and rendered the failure.
    if let Err(err) = result {
        debug!(error = %err, "command did not complete");
    }
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        if !err.is_cancelled() {
            warn!(error = %err, "command task failed");
        }
    }
}
