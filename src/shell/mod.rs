use std::io::{self, BufRead, Write};

use chrono::Local;
use database::{
    database::{
        request_manager::{RequestManager, RequestManagerError},
        store::{query::PersonQuery, store::RemoveOutcome},
    },
    model::person::Person,
};
use thiserror::Error;

use self::{
    command::{confirmation_prompt, is_affirmative, parse_command, ShellCommand, HELP},
    render::{render_json, render_stats, render_table, render_validation_errors},
};

pub mod command;
pub mod render;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Shell io failed: {0}")]
    Io(#[from] io::Error),

    #[error("Unable to render json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database is no longer reachable: {0}")]
    Database(RequestManagerError),
}

#[derive(Debug, PartialEq)]
pub enum ShellAction {
    Continue,
    Quit,
}

/// Line oriented front end over a running database
pub struct Shell<R, W> {
    request_manager: RequestManager,
    input: R,
    output: W,
    assume_yes: bool,
    json: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(request_manager: RequestManager, input: R, output: W) -> Self {
        Self {
            request_manager,
            input,
            output,
            assume_yes: false,
            json: false,
        }
    }

    /// Skip the confirmation asked before delete and restore
    pub fn set_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Print listings as json instead of a table
    pub fn set_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Reads commands until `quit` or end of input
    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(());
            };

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    continue;
                }
            };

            if self.execute(command)? == ShellAction::Quit {
                return Ok(());
            }
        }
    }

    pub fn execute(&mut self, command: ShellCommand) -> Result<ShellAction, ShellError> {
        if let Some(prompt) = confirmation_prompt(&command) {
            if !self.confirm(&prompt)? {
                log::info!("Cancelled: {:?}", command);
                writeln!(self.output, "Cancelled")?;
                return Ok(ShellAction::Continue);
            }
        }

        let message = match command {
            ShellCommand::Quit => return Ok(ShellAction::Quit),
            ShellCommand::Help => Ok(HELP.to_string()),
            ShellCommand::List(category) => {
                match self
                    .request_manager
                    .send_list(category.map(PersonQuery::age_category))
                {
                    Ok(people) => Ok(self.render_people(&people)?),
                    Err(e) => Err(e),
                }
            }
            ShellCommand::Backup => match self.request_manager.send_list_backup() {
                Ok(people) => Ok(self.render_people(&people)?),
                Err(e) => Err(e),
            },
            ShellCommand::Add(person) => self
                .request_manager
                .send_add(person)
                .map(|person| format!("Added {}", person)),
            ShellCommand::Delete(ids) => {
                self.request_manager
                    .send_remove(ids)
                    .map(|outcome| match outcome {
                        RemoveOutcome::NothingSelected => {
                            "No selection, pass the ids of the records to delete".to_string()
                        }
                        RemoveOutcome::Removed(count) => format!("Deleted {} records", count),
                    })
            }
            ShellCommand::Restore => self
                .request_manager
                .send_restore()
                .map(|size| format!("Restored {} records", size)),
            ShellCommand::Reload => self.request_manager.send_reload(),
            ShellCommand::Stats => self
                .request_manager
                .send_stats()
                .map(|info| render_stats(&info)),
        };

        match message {
            Ok(message) => writeln!(self.output, "{}", message)?,
            Err(RequestManagerError::Rejected(errors)) => {
                writeln!(self.output, "{}", render_validation_errors(&errors))?
            }
            Err(RequestManagerError::DatabaseDisconnected) => {
                return Err(ShellError::Database(RequestManagerError::DatabaseDisconnected))
            }
            Err(e) => {
                log::warn!("Request failed: {}", e);
                writeln!(self.output, "Error: {}", e)?
            }
        }

        Ok(ShellAction::Continue)
    }

    fn render_people(&self, people: &[Person]) -> Result<String, serde_json::Error> {
        if self.json {
            render_json(people)
        } else {
            Ok(render_table(people, Local::now().date_naive()))
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, ShellError> {
        if self.assume_yes {
            return Ok(true);
        }

        write!(self.output, "{} [y/N] ", prompt)?;
        self.output.flush()?;

        Ok(self
            .read_line()?
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false))
    }

    fn read_line(&mut self) -> Result<Option<String>, ShellError> {
        let mut line = String::new();

        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}
