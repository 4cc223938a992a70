use crate::{
    consts::consts::{PersonId, START_AT_ID},
    model::person::{NewPerson, Person},
};

use super::{PersonRepository, RepositoryResult};

/// Auto-increment table held in memory
#[derive(Debug)]
pub struct InMemoryRepository {
    rows: Vec<Person>,
    next_id: PersonId,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            rows: vec![],
            next_id: START_AT_ID,
        }
    }

    pub fn with_seed(seed: &[NewPerson]) -> Self {
        let mut repository = Self::new();

        for person in seed {
            repository.push(person.clone());
        }

        repository
    }

    fn push(&mut self, person: NewPerson) {
        self.rows.push(Person::from_new(self.next_id, person));
        self.next_id = self.next_id.increment();
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonRepository for InMemoryRepository {
    fn list_all(&mut self) -> RepositoryResult<Vec<Person>> {
        Ok(self.rows.clone())
    }

    fn insert(&mut self, person: &NewPerson) -> RepositoryResult<bool> {
        self.push(person.clone());

        Ok(true)
    }

    fn delete_by_id(&mut self, id: PersonId) -> RepositoryResult<bool> {
        let before = self.rows.len();

        self.rows.retain(|person| person.id != id);

        Ok(self.rows.len() < before)
    }

    fn delete_all(&mut self) -> RepositoryResult<()> {
        self.rows.clear();
        self.next_id = START_AT_ID;

        Ok(())
    }
}
