use crate::model::statement::{Statement, StatementResult};

/// Database commands are how we interact with the worker that owns the person store
///
/// The majority of interactions happen via statements (e.g. add, remove, restore), but there are also commands that are used
/// to control the database (e.g. shutdown, reload, stats).
#[derive(Debug)]
pub enum DatabaseCommand {
    /// Applies a single statement to the store and returns its result
    Statement(Statement),

    /// Commands that control the database
    Control(Control),
}

impl DatabaseCommand {
    /// Whether applying the command can change the store, such commands are never timed out
    /// since the worker would still apply them after the caller gave up
    pub fn changes_state(&self) -> bool {
        match self {
            DatabaseCommand::Statement(statement) => statement.is_mutation(),
            DatabaseCommand::Control(Control::Reload | Control::Shutdown) => true,
            DatabaseCommand::Control(Control::Stats) => false,
        }
    }

    /// Prints complex logs in a more readable format
    pub fn log_format(&self) -> String {
        match self {
            DatabaseCommand::Statement(Statement::RemoveSelected(ids)) if ids.len() > 1 => {
                format!("{:#?}", self)
            }
            _ => format!("{:?}", self),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Control {
    /// Stops the worker, requests queued before the shutdown are processed first
    Shutdown,
    /// Loads the seed or repository listing again, resetting both the active list and the backup
    Reload,
    /// Reports row counts and storage engine details
    Stats,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandControlResponse {
    /// Successfully performed the control
    Success(String),
    /// Key / value pairs describing the database
    Info(Vec<(String, String)>),
    /// Command has failed, returns a message for why it failed
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseCommandResponse {
    Statement(StatementResult),
    /// The repository write failed, the store was left as it was
    RepositoryFailure(String),
    Control(DatabaseCommandControlResponse),
}

impl DatabaseCommandResponse {
    pub fn control_success(message: &str) -> Self {
        DatabaseCommandResponse::Control(DatabaseCommandControlResponse::Success(
            message.to_string(),
        ))
    }

    pub fn control_info(info: Vec<(String, String)>) -> Self {
        DatabaseCommandResponse::Control(DatabaseCommandControlResponse::Info(info))
    }

    pub fn control_error(message: &str) -> Self {
        DatabaseCommandResponse::Control(DatabaseCommandControlResponse::Error(
            message.to_string(),
        ))
    }
}

pub struct DatabaseCommandRequest {
    pub resolver: oneshot::Sender<DatabaseCommandResponse>,
    pub command: DatabaseCommand,
}
