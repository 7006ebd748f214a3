use std::str::FromStr;

use thiserror::Error;

use crate::prefs::{PreferenceError, Theme};
use crate::state::Controller;
use crate::transform::SortKey;

pub const HELP: &str = "\
commands:
  sort <date|institution|title>  re-sort the certificates
  toggle                         expand or collapse every category
  theme [dark|light]             switch or set the color theme
  show                           render the gallery again
  help                           show this message
  quit                           leave the session";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Sort(SortKey),
    ToggleAll,
    ToggleTheme,
    SetTheme(Theme),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("{0}")]
    InvalidArgument(String),
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(SessionError::Empty)?;
        let arg = parts.next();
        match (name.to_lowercase().as_str(), arg) {
            ("sort", Some(key)) => key
                .parse::<SortKey>()
                .map(Command::Sort)
                .map_err(SessionError::InvalidArgument),
            ("sort", None) => Err(SessionError::InvalidArgument(
                "sort requires a key: date, institution or title".to_string(),
            )),
            ("toggle" | "expand" | "collapse", _) => Ok(Command::ToggleAll),
            ("theme", None) => Ok(Command::ToggleTheme),
            ("theme", Some(value)) => Theme::parse(value).map(Command::SetTheme).ok_or_else(|| {
                SessionError::InvalidArgument(format!(
                    "invalid theme '{value}', expected dark or light"
                ))
            }),
            ("show" | "render", _) => Ok(Command::Show),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", _) => Ok(Command::Quit),
            (other, _) => Err(SessionError::Unknown(other.to_string())),
        }
    }
}

/// What the host should do after a command ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Rerender,
    Unchanged,
    Help,
    Quit,
}

/// Applies one command to the controller.
///
/// A preference write failure is returned after the in-session theme has
/// already changed.
pub fn apply(controller: &mut Controller, command: Command) -> Result<Outcome, PreferenceError> {
    Ok(match command {
        Command::Sort(key) => {
            if controller.select_sort(key) {
                Outcome::Rerender
            } else {
                Outcome::Unchanged
            }
        }
        Command::ToggleAll => {
            controller.toggle_expansion();
            Outcome::Rerender
        }
        Command::ToggleTheme => {
            controller.toggle_theme()?;
            Outcome::Rerender
        }
        Command::SetTheme(theme) => {
            if controller.state().theme == theme {
                Outcome::Unchanged
            } else {
                controller.set_theme(theme)?;
                Outcome::Rerender
            }
        }
        Command::Show => Outcome::Rerender,
        Command::Help => Outcome::Help,
        Command::Quit => Outcome::Quit,
    })
}
