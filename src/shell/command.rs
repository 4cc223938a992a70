use std::{collections::BTreeSet, str::FromStr};

use database::{
    consts::consts::PersonId,
    model::{
        age::AgeCategory,
        form::{parse_id_selection, parse_person_form, FormError},
        person::NewPerson,
    },
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List(Option<AgeCategory>),
    Backup,
    Add(NewPerson),
    Delete(BTreeSet<PersonId>),
    Restore,
    Reload,
    Stats,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),

    #[error("Unknown age category `{0}`, expected one of baby, child, teen, adult, senior, unknown")]
    InvalidCategory(String),

    #[error(transparent)]
    Form(#[from] FormError),
}

pub const HELP: &str = "\
Commands:
  list [baby|child|teen|adult|senior|unknown]   show people, optionally by age category
  backup                                        show the snapshot used by restore
  add <first>|<last>|[yyyy-mm-dd]               add a person
  delete <id>[,<id>...]                         delete the selected people
  restore                                       go back to the snapshot
  reload                                        load again from storage, resets the snapshot
  stats                                         show database statistics
  help                                          show this message
  quit                                          exit";

/// Parses one input line, `None` for a blank line
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, CommandError> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "list" | "ls" => match rest {
            "" => ShellCommand::List(None),
            category => ShellCommand::List(Some(
                AgeCategory::from_str(category)
                    .map_err(|_| CommandError::InvalidCategory(category.to_string()))?,
            )),
        },
        "backup" => ShellCommand::Backup,
        "add" => ShellCommand::Add(parse_person_form(rest)?),
        "delete" | "rm" => ShellCommand::Delete(parse_id_selection(rest)?),
        "restore" => ShellCommand::Restore,
        "reload" => ShellCommand::Reload,
        "stats" => ShellCommand::Stats,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        _ => return Err(CommandError::Unknown(name.to_string())),
    };

    Ok(Some(command))
}

/// Question asked before a destructive command, `None` when it needs no confirmation
pub fn confirmation_prompt(command: &ShellCommand) -> Option<String> {
    match command {
        // An empty selection is answered by the database without asking
        ShellCommand::Delete(ids) if ids.len() == 1 => {
            Some("delete the selected record?".to_string())
        }
        ShellCommand::Delete(ids) if ids.len() > 1 => {
            Some(format!("delete {} selected records?", ids.len()))
        }
        ShellCommand::Restore => Some("restore to initial state?".to_string()),
        _ => None,
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
