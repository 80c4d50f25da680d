//! Line-oriented command grammar for the organizer CLI.
//!
//! Event fields are separated by `|` so titles and descriptions may contain
//! spaces: `create Standup | daily sync | 2024-01-05`.

use organizer_core::{EventFields, EventId};
use std::fmt::{Display, Formatter};

pub const HELP: &str = "\
commands:
  signup <email> <password>
  signin <email> <password>
  signout
  whoami
  create <title> | <description> | <date>
  edit <event_id> <title> | <description> | <date>
  delete <event_id>
  list
  dashboard
  fav <event_id>
  favorites
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp { email: String, password: String },
    SignIn { email: String, password: String },
    SignOut,
    WhoAmI,
    Create(EventFields),
    Edit { event_id: EventId, fields: EventFields },
    Delete(EventId),
    List,
    Dashboard,
    Favorite(EventId),
    Favorites,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    Usage(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty input"),
            Self::UnknownCommand(name) => write!(f, "unknown command `{name}`; try `help`"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

impl std::error::Error for ParseError {}

pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "signup" => {
            let (email, password) =
                credentials(rest).ok_or(ParseError::Usage("signup <email> <password>"))?;
            Ok(Command::SignUp { email, password })
        }
        "signin" => {
            let (email, password) =
                credentials(rest).ok_or(ParseError::Usage("signin <email> <password>"))?;
            Ok(Command::SignIn { email, password })
        }
        "signout" => Ok(Command::SignOut),
        "whoami" => Ok(Command::WhoAmI),
        "create" => event_fields(rest)
            .map(Command::Create)
            .ok_or(ParseError::Usage("create <title> | <description> | <date>")),
        "edit" => {
            const USAGE: &str = "edit <event_id> <title> | <description> | <date>";
            let (event_id, fields) = rest
                .split_once(char::is_whitespace)
                .ok_or(ParseError::Usage(USAGE))?;
            let fields = event_fields(fields).ok_or(ParseError::Usage(USAGE))?;
            Ok(Command::Edit {
                event_id: EventId::from(event_id),
                fields,
            })
        }
        "delete" => single_id(rest)
            .map(Command::Delete)
            .ok_or(ParseError::Usage("delete <event_id>")),
        "list" => Ok(Command::List),
        "dashboard" => Ok(Command::Dashboard),
        "fav" => single_id(rest)
            .map(Command::Favorite)
            .ok_or(ParseError::Usage("fav <event_id>")),
        "favorites" => Ok(Command::Favorites),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn credentials(rest: &str) -> Option<(String, String)> {
    let mut parts = rest.split_whitespace();
    let email = parts.next()?;
    let password = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((email.to_string(), password.to_string()))
}

/// Splits `title | description | date`. Blank parts are kept so the core
/// validator reports them.
fn event_fields(rest: &str) -> Option<EventFields> {
    let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [title, description, date] => Some(EventFields::new(*title, *description, *date)),
        _ => None,
    }
}

fn single_id(rest: &str) -> Option<EventId> {
    let mut parts = rest.split_whitespace();
    let id = parts.next()?;
    parts.next().is_none().then(|| EventId::from(id))
}
