//! Line commands typed at the mailview prompt.

use shared::domain::Mailbox;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  inbox | sent | archived     show a mailbox
  open N                      open row N of the current list
  compose                     start a new email
  reply                       reply to the open email
  archive | unarchive         archive control of the open email
  to V | subject V | body V   edit the compose form (\\n in body is a newline)
  send                        submit the compose form
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Recipients,
    Subject,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mailbox(Mailbox),
    Open(usize),
    Compose,
    Reply,
    Archive,
    Unarchive,
    Edit(DraftField, String),
    Send,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a row number")]
    InvalidRow(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "open" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("open"));
            }
            match rest.parse::<usize>() {
                Ok(row) if row > 0 => Command::Open(row),
                _ => return Err(CommandError::InvalidRow(rest.to_string())),
            }
        }
        "compose" => Command::Compose,
        "reply" => Command::Reply,
        "archive" => Command::Archive,
        "unarchive" => Command::Unarchive,
        "to" => Command::Edit(DraftField::Recipients, rest.to_string()),
        "subject" => Command::Edit(DraftField::Subject, rest.to_string()),
        "body" => Command::Edit(DraftField::Body, rest.replace("\\n", "\n")),
        "send" => Command::Send,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        // `archive` is the control above; mailbox names cover the rest.
        _ => match word.parse::<Mailbox>() {
            Ok(mailbox) => Command::Mailbox(mailbox),
            Err(_) => return Err(CommandError::Unknown(word.to_string())),
        },
    };
    Ok(Some(command))
}
