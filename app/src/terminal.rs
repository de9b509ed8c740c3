//! Line-oriented terminal front end.
//!
//! Each input line parses into a [`Command`]; todos are addressed by their
//! 1-based position in the currently rendered list.

use crate::view::{ViewModel, Visibility};
use std::fmt::Write as _;
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
commands:
  add <title>                  add a todo
  toggle <n>                   flip todo n between active and completed
  rm <n>                       delete todo n
  edit <n> <title>             rename todo n
  clear                        delete every completed todo
  show [all|active|completed]  change the visible todos
  #/<route>                    same as show
  reload                       reload from the server
  help                         show this text
  quit                         exit";

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit a new todo
    Add(String),
    /// Toggle the n-th shown todo
    Toggle(usize),
    /// Remove the n-th shown todo
    Remove(usize),
    /// Rename the n-th shown todo
    Edit(usize, String),
    /// Remove every completed todo
    ClearCompleted,
    /// Follow a route
    Show(Visibility),
    /// Reload from the server
    Reload,
    /// Print the command list
    Help,
    /// Exit
    Quit,
    /// Blank line; redraw
    Redraw,
}

/// Why an input line is not a command
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The first word is not a command
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    /// A required argument is absent
    #[error("usage: {0}")]
    MissingArgument(&'static str),

    /// The todo position is not a positive number
    #[error("not a todo number: {0}")]
    InvalidIndex(String),
}

impl Command {
    /// Parses one line of input
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for unknown commands, absent arguments and
    /// positions that are not positive integers.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Redraw);
        }
        if line.starts_with('#') {
            return Ok(Self::Show(Visibility::from_hash(line)));
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word {
            "add" | "a" => {
                if rest.is_empty() {
                    Err(ParseError::MissingArgument("add <title>"))
                } else {
                    Ok(Self::Add(rest.to_string()))
                }
            },
            "toggle" | "t" => parse_index(rest, "toggle <n>").map(Self::Toggle),
            "rm" | "remove" => parse_index(rest, "rm <n>").map(Self::Remove),
            "edit" | "e" => {
                let (n, title) = rest
                    .split_once(char::is_whitespace)
                    .map_or((rest, ""), |(n, t)| (n, t.trim()));
                let n = parse_index(n, "edit <n> <title>")?;
                if title.is_empty() {
                    return Err(ParseError::MissingArgument("edit <n> <title>"));
                }
                Ok(Self::Edit(n, title.to_string()))
            },
            "clear" => Ok(Self::ClearCompleted),
            "show" => Ok(Self::Show(Visibility::from_hash(rest))),
            "reload" => Ok(Self::Reload),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_index(arg: &str, usage: &'static str) -> Result<usize, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::MissingArgument(usage));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidIndex(arg.to_string())),
    }
}

/// Draws the list, footer and filters as plain text
#[must_use]
pub fn render(view: &ViewModel) -> String {
    let mut out = String::from("todos\n");

    if view.loading {
        out.push_str("  (loading)\n");
    }

    if view.list_visible {
        for (n, todo) in view.items.iter().enumerate() {
            let mark = if todo.completed { 'x' } else { ' ' };
            let _ = writeln!(out, "  {:>2}. [{mark}] {}", n + 1, todo.title);
        }
    }

    if view.footer_visible {
        let filters: Vec<String> = Visibility::ALL
            .iter()
            .map(|v| {
                if *v == view.visibility {
                    format!("[{v}]")
                } else {
                    v.to_string()
                }
            })
            .collect();
        let _ = write!(out, "  {}  |  {}", view.remaining_label, filters.join(" "));
        if view.clear_completed_visible {
            out.push_str("  |  clear completed");
        }
        out.push('\n');
    }

    out
}
