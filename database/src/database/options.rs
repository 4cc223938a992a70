use std::time::Duration;

use chrono::NaiveDate;

use crate::{
    consts::consts::DEFAULT_REQUEST_TIMEOUT,
    model::{
        person::{sample_people, NewPerson},
        validation::PersonValidator,
    },
    persistence::storage::StorageEngine,
};

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub storage_engine: StorageEngine,
    pub seed: Vec<NewPerson>,
    pub request_timeout: Duration,
    /// Date used for validation and age filtering, the local date when unset
    pub today: Option<NaiveDate>,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    /// People loaded when there is no repository, and used to fill the memory repository
    pub fn set_seed(mut self, seed: Vec<NewPerson>) -> Self {
        self.seed = seed;
        self
    }

    /// How long a request manager waits for a read or control before giving up.
    /// Mutations always wait for their completion
    pub fn set_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Pins "today" instead of following the local clock
    pub fn set_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn validator(&self) -> PersonValidator {
        match self.today {
            Some(today) => PersonValidator::new(today),
            None => PersonValidator::current(),
        }
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            storage_engine: StorageEngine::None,
            seed: sample_people(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            today: None,
        }
    }
}

impl DatabaseOptions {
    pub fn new_test() -> Self {
        DatabaseOptions::default().set_seed(vec![])
    }
}
