use std::path::PathBuf;

use strum::{Display, EnumString};
use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::person::{NewPerson, Person},
};

use self::{file::FileRepository, memory::InMemoryRepository, postgres::PgRepository};

pub mod file;
pub mod memory;
pub mod network;
pub mod postgres;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Unable to connect to repository: {0}")]
    Connection(String),

    #[error("Repository query failed: {0}")]
    Query(String),

    #[error("Repository io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to serialize repository data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Repository is unavailable: {0}")]
    Unavailable(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence collaborator for person records.
///
/// Implementations assign ids themselves, `insert` takes a person without one
pub trait PersonRepository: Send {
    /// Every stored person, ordered by id
    fn list_all(&mut self) -> RepositoryResult<Vec<Person>>;

    /// Returns whether a row was written
    fn insert(&mut self, person: &NewPerson) -> RepositoryResult<bool>;

    /// Returns whether a row matched
    fn delete_by_id(&mut self, id: PersonId) -> RepositoryResult<bool>;

    /// Removes every row and restarts id assignment at 1
    fn delete_all(&mut self) -> RepositoryResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// No repository, the store is the only copy of the data
    None,
    /// Repository kept in process memory, seeded from the database options
    Memory,
    /// JSON document inside the given directory
    File(PathBuf),
    /// libpq style connection string, e.g. `host=localhost user=postgres`
    Postgres(String),
}

/// Engine names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageEngineKind {
    None,
    Memory,
    File,
    Postgres,
}

impl StorageEngine {
    pub fn from_kind(
        kind: StorageEngineKind,
        data_directory: PathBuf,
        pg_config: Option<String>,
    ) -> RepositoryResult<Self> {
        Ok(match kind {
            StorageEngineKind::None => StorageEngine::None,
            StorageEngineKind::Memory => StorageEngine::Memory,
            StorageEngineKind::File => StorageEngine::File(data_directory),
            StorageEngineKind::Postgres => StorageEngine::Postgres(pg_config.ok_or_else(|| {
                RepositoryError::Unavailable("postgres engine needs a connection config".to_string())
            })?),
        })
    }

    pub fn get_engine(&self, seed: &[NewPerson]) -> RepositoryResult<Option<Box<dyn PersonRepository>>> {
        let repository: Box<dyn PersonRepository> = match self {
            StorageEngine::None => return Ok(None),
            StorageEngine::Memory => Box::new(InMemoryRepository::with_seed(seed)),
            StorageEngine::File(path) => Box::new(FileRepository::new(path.clone())?),
            StorageEngine::Postgres(config) => Box::new(PgRepository::connect(config.clone())?),
        };

        Ok(Some(repository))
    }

    pub fn get_engine_info_stats(&self) -> Vec<(String, String)> {
        match self {
            StorageEngine::None => vec![("StorageEngine".to_string(), "None".to_string())],
            StorageEngine::Memory => vec![("StorageEngine".to_string(), "Memory".to_string())],
            StorageEngine::File(path) => vec![
                ("StorageEngine".to_string(), "File".to_string()),
                ("DataDirectory".to_string(), path.display().to_string()),
            ],
            // Connection strings can carry a password, only the engine is reported
            StorageEngine::Postgres(_) => {
                vec![("StorageEngine".to_string(), "Postgres".to_string())]
            }
        }
    }
}
