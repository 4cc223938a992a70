use std::{collections::BTreeSet, thread, time::Instant};

use num_format::{Locale, ToFormattedString};

use crate::{
    consts::consts::PersonId,
    model::{
        person::{NewPerson, Person},
        statement::{Statement, StatementResult},
        validation::format_errors,
    },
    persistence::storage::{PersonRepository, RepositoryError, RepositoryResult},
};

use super::{
    commands::{DatabaseCommand, DatabaseCommandRequest, DatabaseCommandResponse},
    control::{ControlContext, DatabaseControlAction},
    options::DatabaseOptions,
    request_manager::RequestManager,
    store::{
        query::{filter, PersonQuery},
        store::{PersonStore, RemoveOutcome, StoreError},
    },
};

/// Owns the person store and its optional repository.
///
/// Once `run` is called the database moves onto its own thread, every statement is applied
/// there in arrival order. When a repository is configured it is written first and the store
/// is only mutated after the write succeeded; the repository then owns the id space
pub struct Database {
    pub(crate) store: PersonStore,
    pub(crate) database_options: DatabaseOptions,
    repository: Option<Box<dyn PersonRepository>>,
}

impl Database {
    pub fn new(options: DatabaseOptions) -> RepositoryResult<Self> {
        let repository = options.storage_engine.get_engine(&options.seed)?;

        Ok(Self::with_repository(options, repository))
    }

    pub fn with_repository(
        options: DatabaseOptions,
        repository: Option<Box<dyn PersonRepository>>,
    ) -> Self {
        Self {
            store: PersonStore::new(),
            database_options: options,
            repository,
        }
    }

    pub fn new_test() -> Self {
        Self::with_repository(DatabaseOptions::new_test(), None)
    }

    /// (Re)initializes the store from the repository listing, or the seed when there is none.
    ///
    /// Both the active list and the backup are reset. Returns the number of rows loaded
    pub fn load(&mut self) -> RepositoryResult<usize> {
        match self.repository.as_mut() {
            None => self.store.initialize(self.database_options.seed.clone()),
            Some(repository) => {
                let people = repository.list_all()?;

                self.store
                    .initialize(people.iter().cloned().map(NewPerson::from).collect());

                // Keep the repository's ids so deletes address the right rows
                self.store.replace_active(people);
            }
        }

        Ok(self.store.len())
    }

    /// Loads the initial state and starts the worker thread, returns the handle used to talk to it
    pub fn run(mut self) -> RepositoryResult<RequestManager> {
        let now = Instant::now();

        let row_count = self.load()?;

        log::info!(
            "✅ Successful Load [Duration: {}ms, Rows: {}]",
            now.elapsed().as_millis(),
            row_count.to_formatted_string(&Locale::en)
        );

        let (database_sender, database_receiver) = flume::unbounded::<DatabaseCommandRequest>();

        let request_timeout = self.database_options.request_timeout;

        thread::Builder::new()
            .name("Person Store".to_string())
            .spawn(move || self.process_requests(database_receiver))?;

        Ok(RequestManager::new(database_sender, request_timeout))
    }

    fn process_requests(mut self, database_receiver: flume::Receiver<DatabaseCommandRequest>) {
        // Process incoming requests from the channel
        while let Ok(DatabaseCommandRequest { resolver, command }) = database_receiver.recv() {
            // Reads are frequent, only mutations and controls are logged by default
            match &command {
                DatabaseCommand::Statement(statement) if statement.is_query() => {
                    log::debug!("Received command: {}", command.log_format())
                }
                _ => log::info!("Received command: {}", command.log_format()),
            }

            match command {
                DatabaseCommand::Statement(statement) => {
                    let response = match self.apply_statement(statement) {
                        Ok(result) => DatabaseCommandResponse::Statement(result),
                        Err(e) => {
                            log::error!("⚠️  Repository failure, store unchanged: {}", e);
                            DatabaseCommandResponse::RepositoryFailure(e.to_string())
                        }
                    };

                    // The requester may have timed out and dropped its receiver
                    let _ = resolver.send(response);
                }
                DatabaseCommand::Control(control) => {
                    let context = ControlContext {
                        resolver,
                        database: &mut self,
                    };

                    if let DatabaseControlAction::Exit = context.run(control) {
                        break;
                    }
                }
            }
        }

        log::info!("Person store worker stopped");
    }

    pub fn apply_statement(&mut self, statement: Statement) -> RepositoryResult<StatementResult> {
        match statement {
            Statement::Add(person) => self.add(person),
            Statement::RemoveSelected(ids) => self.remove_selected(ids),
            Statement::Restore => self.restore(),
            Statement::List(query) => Ok(StatementResult::List(self.list(query))),
            Statement::ListBackup => Ok(StatementResult::List(self.store.backup_list())),
        }
    }

    fn add(&mut self, person: NewPerson) -> RepositoryResult<StatementResult> {
        let validator = self.database_options.validator();

        let errors = validator.validate(&person);

        if !errors.is_empty() {
            log::warn!("Rejected person: {}", format_errors(&errors).replace('\n', ", "));
            return Ok(StatementResult::Rejected(errors));
        }

        let added = match self.repository.as_mut() {
            None => match self.store.add(person.clone(), &validator) {
                Ok(id) => Person::from_new(id, person),
                Err(StoreError::InvalidArgument(errors)) => {
                    return Ok(StatementResult::Rejected(errors))
                }
            },
            Some(repository) => {
                if !repository.insert(&person)? {
                    return Err(RepositoryError::Query(
                        "insert did not write a row".to_string(),
                    ));
                }

                let people = repository.list_all()?;

                // Ids come from an increasing sequence, the newest row has the largest id
                let added = people
                    .iter()
                    .max_by_key(|p| p.id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::Query("inserted row is missing from listing".to_string())
                    })?;

                self.store.replace_active(people);

                added
            }
        };

        log::info!("✅ Added: {}", added);

        Ok(StatementResult::Added(added))
    }

    fn remove_selected(&mut self, ids: BTreeSet<PersonId>) -> RepositoryResult<StatementResult> {
        if ids.is_empty() {
            log::info!("Nothing selected to remove");
            return Ok(StatementResult::NothingSelected);
        }

        if let Some(repository) = self.repository.as_mut() {
            for id in ids.iter().filter(|id| self.store.contains(id)) {
                if let Err(e) = repository.delete_by_id(*id) {
                    // Earlier deletes in this selection may already be applied, `Reload` resyncs
                    log::warn!("Delete of {} failed, repository may hold partial deletes", id);
                    return Err(e);
                }
            }
        }

        match self.store.remove_selected(&ids) {
            RemoveOutcome::NothingSelected => Ok(StatementResult::NothingSelected),
            RemoveOutcome::Removed(count) => {
                log::info!("✅ Removed: [Rows: {}]", count);
                Ok(StatementResult::Removed(count))
            }
        }
    }

    fn restore(&mut self) -> RepositoryResult<StatementResult> {
        if let Some(repository) = self.repository.as_mut() {
            repository.delete_all()?;

            for person in self.store.backup_list() {
                if !repository.insert(&NewPerson::from(person))? {
                    return Err(RepositoryError::Query(
                        "insert did not write a row".to_string(),
                    ));
                }
            }
        }

        // Repositories restart ids on `delete_all`, so the renumbered store matches their rows
        let size = self.store.restore();

        log::info!("✅ Restored: [Rows: {}]", size);

        Ok(StatementResult::Restored(size))
    }

    fn list(&self, query: Option<PersonQuery>) -> Vec<Person> {
        let people = self.store.current_list();

        match query {
            Some(query) => filter(people, &query, self.database_options.validator().today()),
            None => people,
        }
    }
}
