use std::fmt::{Display, Formatter};

use chrono::{DateTime, TimeZone};

pub const USERNAME_PROMPT: &str = "Please enter a username: ";
pub const EXIT_COMMAND: &str = "-exit";
pub const RENAME_COMMAND: &str = "-cu";

/// Label format for broadcast lines, e.g. `Mon, Jan 2 2006 - 15:04pm`.
const TIMESTAMP_FORMAT: &str = "%a, %b %-d %Y - %H:%M%P";

/// What a named client asked for with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    Rename,
    Chat(&'a str),
}

impl<'a> Command<'a> {
    /// Interprets an already-trimmed line. Commands only match the whole line.
    pub fn parse(line: &'a str) -> Self {
        match line {
            "" => Command::Empty,
            EXIT_COMMAND => Command::Exit,
            RENAME_COMMAND => Command::Rename,
            text => Command::Chat(text),
        }
    }
}

/// Text that gets broadcast to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice<'a> {
    Entered { name: &'a str },
    Renamed { old: &'a str, new: &'a str },
    Left { name: &'a str },
    Chat { name: &'a str, text: &'a str },
}

impl Display for Notice<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Entered { name } => write!(f, "{} has entered.", name),
            Notice::Renamed { old, new } => write!(f, "{} changed username to {}", old, new),
            Notice::Left { name } => write!(f, "{} has left.", name),
            Notice::Chat { name, text } => write!(f, "{}: {}", name, text),
        }
    }
}

/// Wraps a message the way every client sees it: a blank line, the timestamp
/// label, the message, then a blank line.
pub fn stamp<Tz>(time: &DateTime<Tz>, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("\n({}) {}\n\n", time.format(TIMESTAMP_FORMAT), message)
}
