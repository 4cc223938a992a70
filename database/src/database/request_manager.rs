use std::{collections::BTreeSet, time::Duration};

use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::{
        person::{NewPerson, Person},
        statement::{Statement, StatementResult},
        validation::{format_errors, ValidationError},
    },
};

use super::{
    commands::{
        Control, DatabaseCommand, DatabaseCommandControlResponse, DatabaseCommandRequest,
        DatabaseCommandResponse,
    },
    store::{query::PersonQuery, store::RemoveOutcome},
};

#[derive(Error, Debug, PartialEq)]
pub enum RequestManagerError {
    /// Only reads and stats time out, so nothing was changed
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,
    #[error("Database worker has stopped")]
    DatabaseDisconnected,
    #[error("Person failed validation:\n{}", format_errors(.0))]
    Rejected(Vec<ValidationError>),
    #[error("Repository failure, nothing was changed: {0}")]
    Repository(String),
    #[error("Control command failed: {0}")]
    Control(String),
    #[error("Unexpected response from database: {0}")]
    UnexpectedResponse(String),
}

/// Goal of the request manager is to provide a simple interface for interacting with the database worker
///
/// The request manager provides the following APIs, sorted by the easiest to use to the most complex
/// 1. Typed operations on the person store (add, remove, restore, list), these are completely type safe
/// 2. Generic statement based API, the caller matches on the `StatementResult`
/// 3. Command based API, used for control commands and anything else not covered above
///
/// Every request carries a oneshot resolver, the worker applies requests one at a time in the order
/// they arrive and answers on the resolver once it is done. Reads give up after the timeout,
/// mutations wait for their outcome
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseCommandRequest>,
    timeout: Duration,
}

impl RequestManager {
    pub fn new(database_sender: flume::Sender<DatabaseCommandRequest>, timeout: Duration) -> Self {
        Self {
            database_sender,
            timeout,
        }
    }

    pub fn send_add(&self, person: NewPerson) -> Result<Person, RequestManagerError> {
        match self.send_statement(Statement::Add(person))? {
            StatementResult::Added(person) => Ok(person),
            StatementResult::Rejected(errors) => Err(RequestManagerError::Rejected(errors)),
            other => Err(unexpected(other)),
        }
    }

    pub fn send_remove(
        &self,
        ids: BTreeSet<PersonId>,
    ) -> Result<RemoveOutcome, RequestManagerError> {
        match self.send_statement(Statement::RemoveSelected(ids))? {
            StatementResult::Removed(count) => Ok(RemoveOutcome::Removed(count)),
            StatementResult::NothingSelected => Ok(RemoveOutcome::NothingSelected),
            other => Err(unexpected(other)),
        }
    }

    pub fn send_restore(&self) -> Result<usize, RequestManagerError> {
        match self.send_statement(Statement::Restore)? {
            StatementResult::Restored(size) => Ok(size),
            other => Err(unexpected(other)),
        }
    }

    pub fn send_list(&self, query: Option<PersonQuery>) -> Result<Vec<Person>, RequestManagerError> {
        match self.send_statement(Statement::List(query))? {
            StatementResult::List(people) => Ok(people),
            other => Err(unexpected(other)),
        }
    }

    pub fn send_list_backup(&self) -> Result<Vec<Person>, RequestManagerError> {
        match self.send_statement(Statement::ListBackup)? {
            StatementResult::List(people) => Ok(people),
            other => Err(unexpected(other)),
        }
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        self.send_control_success(Control::Shutdown)
    }

    pub fn send_reload(&self) -> Result<String, RequestManagerError> {
        self.send_control_success(Control::Reload)
    }

    pub fn send_stats(&self) -> Result<Vec<(String, String)>, RequestManagerError> {
        match self.send_control(Control::Stats)? {
            DatabaseCommandControlResponse::Info(info) => Ok(info),
            other => Err(RequestManagerError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    /// Sends a single statement to the database and returns its result
    pub fn send_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        match self.send_command(DatabaseCommand::Statement(statement))? {
            DatabaseCommandResponse::Statement(result) => Ok(result),
            DatabaseCommandResponse::RepositoryFailure(message) => {
                Err(RequestManagerError::Repository(message))
            }
            other => Err(RequestManagerError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    pub fn send_control(
        &self,
        control: Control,
    ) -> Result<DatabaseCommandControlResponse, RequestManagerError> {
        match self.send_command(DatabaseCommand::Control(control))? {
            DatabaseCommandResponse::Control(DatabaseCommandControlResponse::Error(message)) => {
                Err(RequestManagerError::Control(message))
            }
            DatabaseCommandResponse::Control(response) => Ok(response),
            other => Err(RequestManagerError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    pub fn send_command(
        &self,
        command: DatabaseCommand,
    ) -> Result<DatabaseCommandResponse, RequestManagerError> {
        let (resolver, response_receiver) = oneshot::channel::<DatabaseCommandResponse>();

        let changes_state = command.changes_state();

        let request = DatabaseCommandRequest { resolver, command };

        // Sends the request to the database worker, the worker will respond
        //  on the response_receiver once it's finished processing the request
        self.database_sender
            .send(request)
            .map_err(|_| RequestManagerError::DatabaseDisconnected)?;

        // A mutation is applied whether or not anyone is still waiting, so its outcome is always awaited
        if changes_state {
            return response_receiver
                .recv()
                .map_err(|_| RequestManagerError::DatabaseDisconnected);
        }

        match response_receiver.recv_timeout(self.timeout) {
            Ok(response) => Ok(response),
            Err(oneshot::RecvTimeoutError::Timeout) => Err(RequestManagerError::DatabaseTimeout),
            Err(oneshot::RecvTimeoutError::Disconnected) => {
                Err(RequestManagerError::DatabaseDisconnected)
            }
        }
    }

    fn send_control_success(&self, control: Control) -> Result<String, RequestManagerError> {
        match self.send_control(control)? {
            DatabaseCommandControlResponse::Success(message) => Ok(message),
            other => Err(RequestManagerError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}

fn unexpected(result: StatementResult) -> RequestManagerError {
    RequestManagerError::UnexpectedResponse(format!("{:?}", result))
}
