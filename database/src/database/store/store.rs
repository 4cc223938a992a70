use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    consts::consts::{PersonId, START_AT_ID},
    model::{
        person::{NewPerson, Person},
        validation::{PersonValidator, ValidationError},
    },
};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    /// The caller skipped validation, this is a programming error rather than user input
    #[error("Invalid argument, person failed validation: {0:?}")]
    InvalidArgument(Vec<ValidationError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    NothingSelected,
    Removed(usize),
}

/// Ordered list of people plus the snapshot taken when it was loaded.
///
/// Ids are derived from list position on `initialize` / `restore` and from
/// `max(id) + 1` on `add`, unless a repository listing is installed with `replace_active`
#[derive(Debug, Default)]
pub struct PersonStore {
    active: Vec<Person>,
    backup: Vec<Person>,
}

impl PersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both lists with `seed`, numbered 1..N. Any ids carried by the seed are discarded
    pub fn initialize(&mut self, seed: Vec<NewPerson>) {
        self.active = seed
            .into_iter()
            .enumerate()
            .map(|(index, person)| Person::from_new(PersonId::from_position(index), person))
            .collect();

        self.backup = self.active.clone();
    }

    /// Validates against `validator` again, callers are expected to have done so already
    pub fn add(
        &mut self,
        person: NewPerson,
        validator: &PersonValidator,
    ) -> Result<PersonId, StoreError> {
        let errors = validator.validate(&person);

        if !errors.is_empty() {
            return Err(StoreError::InvalidArgument(errors));
        }

        let id = self.next_id();

        self.active.push(Person::from_new(id, person));

        Ok(id)
    }

    /// Unknown ids are ignored, the order of the remaining people is kept
    pub fn remove_selected(&mut self, ids: &BTreeSet<PersonId>) -> RemoveOutcome {
        if ids.is_empty() {
            return RemoveOutcome::NothingSelected;
        }

        let before = self.active.len();

        self.active.retain(|person| !ids.contains(&person.id));

        RemoveOutcome::Removed(before - self.active.len())
    }

    /// Copies the backup over the active list and renumbers it 1..N, returns the new size
    pub fn restore(&mut self) -> usize {
        self.active = self.backup.clone();

        renumber(&mut self.active);

        self.active.len()
    }

    /// Installs a repository listing as-is, the backup is left untouched
    pub fn replace_active(&mut self, people: Vec<Person>) {
        self.active = people;
    }

    pub fn current_list(&self) -> Vec<Person> {
        self.active.clone()
    }

    pub fn backup_list(&self) -> Vec<Person> {
        self.backup.clone()
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.active.iter().any(|person| &person.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn backup_len(&self) -> usize {
        self.backup.len()
    }

    fn next_id(&self) -> PersonId {
        self.active
            .iter()
            .map(|person| person.id)
            .max()
            .map_or(START_AT_ID, |id| id.increment())
    }
}

fn renumber(people: &mut [Person]) {
    for (index, person) in people.iter_mut().enumerate() {
        person.id = PersonId::from_position(index);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ids(people: &[Person]) -> Vec<i32> {
        people.iter().map(|p| p.id.to_number()).collect()
    }

    fn names(people: &[Person]) -> Vec<&str> {
        people.iter().map(|p| p.first_name.as_str()).collect()
    }

    fn selection(ids: &[i32]) -> BTreeSet<PersonId> {
        ids.iter().map(|id| PersonId(*id)).collect()
    }

    fn ashwin() -> NewPerson {
        NewPerson::new("Ashwin", "Sharan", NaiveDate::from_ymd_opt(2012, 10, 11))
    }

    fn babalu() -> NewPerson {
        NewPerson::new("Babalu", "Sharan", NaiveDate::from_ymd_opt(1980, 1, 10))
    }

    fn mason() -> NewPerson {
        NewPerson::new("Mason", "Boyd", NaiveDate::from_ymd_opt(2003, 4, 20))
    }

    fn validator() -> PersonValidator {
        PersonValidator::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn seeded_store() -> PersonStore {
        let mut store = PersonStore::new();
        store.initialize(vec![ashwin(), babalu()]);
        store
    }

    mod initialize {
        use super::*;

        #[test]
        fn assigns_sequential_ids_and_takes_backup() {
            let store = seeded_store();

            assert_eq!(ids(&store.current_list()), vec![1, 2]);
            assert_eq!(store.backup_list(), store.current_list());
        }

        #[test]
        fn reinitializing_resets_both_lists() {
            // Given a store that has been mutated
            let mut store = seeded_store();
            store.add(mason(), &validator()).unwrap();

            // When it is initialized again
            store.initialize(vec![mason()]);

            // Then both lists only contain the new seed
            assert_eq!(names(&store.current_list()), vec!["Mason"]);
            assert_eq!(names(&store.backup_list()), vec!["Mason"]);
            assert_eq!(ids(&store.current_list()), vec![1]);
        }

        #[test]
        fn empty_seed_gives_empty_store() {
            let mut store = PersonStore::new();
            store.initialize(vec![]);

            assert!(store.is_empty());
            assert_eq!(store.backup_len(), 0);
        }
    }

    mod add {
        use super::*;

        #[test]
        fn assigns_max_plus_one() {
            let mut store = seeded_store();

            let id = store.add(mason(), &validator()).unwrap();

            assert_eq!(id, PersonId(3));
            assert_eq!(store.len(), 3);
            assert_eq!(names(&store.current_list()), vec!["Ashwin", "Babalu", "Mason"]);
        }

        #[test]
        fn uses_max_not_length_after_gaps() {
            // Given a store where the first record has been removed
            let mut store = seeded_store();
            store.remove_selected(&selection(&[1]));

            // When a person is added
            let id = store.add(mason(), &validator()).unwrap();

            // Then the id follows the largest remaining id
            assert_eq!(id, PersonId(3));
        }

        #[test]
        fn starts_at_one_after_everyone_is_removed() {
            let mut store = seeded_store();
            store.remove_selected(&selection(&[1, 2]));

            assert_eq!(store.add(mason(), &validator()).unwrap(), PersonId(1));
        }

        #[test]
        fn backup_is_not_touched() {
            let mut store = seeded_store();

            store.add(mason(), &validator()).unwrap();

            assert_eq!(store.backup_len(), 2);
        }

        #[test]
        fn invalid_person_is_a_contract_violation() {
            let mut store = seeded_store();

            let result = store.add(NewPerson::new("", "Boyd", None), &validator());

            assert_eq!(
                result,
                Err(StoreError::InvalidArgument(vec![
                    ValidationError::FirstNameRequired
                ]))
            );
            assert_eq!(store.len(), 2, "Store should not be mutated");
        }

        #[test]
        fn future_is_judged_by_the_given_validator() {
            // Given a validator pinned to the day before Mason's birth
            let mut store = seeded_store();
            let validator = PersonValidator::new(NaiveDate::from_ymd_opt(2003, 4, 19).unwrap());

            // When Mason is added
            let result = store.add(mason(), &validator);

            // Then his birth date is in that validator's future
            assert_eq!(
                result,
                Err(StoreError::InvalidArgument(vec![
                    ValidationError::BirthDateInFuture
                ]))
            );
        }
    }

    mod remove_selected {
        use super::*;

        #[test]
        fn empty_selection_signals_nothing_selected() {
            let mut store = seeded_store();

            let outcome = store.remove_selected(&BTreeSet::new());

            assert_eq!(outcome, RemoveOutcome::NothingSelected);
            assert_eq!(ids(&store.current_list()), vec![1, 2]);
        }

        #[test]
        fn keeps_order_and_ids_of_remaining() {
            let mut store = seeded_store();
            store.add(mason(), &validator()).unwrap();

            let outcome = store.remove_selected(&selection(&[1]));

            assert_eq!(outcome, RemoveOutcome::Removed(1));
            assert_eq!(ids(&store.current_list()), vec![2, 3]);
            assert_eq!(names(&store.current_list()), vec!["Babalu", "Mason"]);
        }

        #[test]
        fn unknown_ids_are_ignored() {
            let mut store = seeded_store();

            let outcome = store.remove_selected(&selection(&[2, 40]));

            assert_eq!(outcome, RemoveOutcome::Removed(1));
            assert_eq!(names(&store.current_list()), vec!["Ashwin"]);
        }
    }

    mod restore {
        use super::*;

        #[test]
        fn returns_backup_in_order() {
            // Given the scenario: add Mason then remove Ashwin
            let mut store = seeded_store();
            store.add(mason(), &validator()).unwrap();
            store.remove_selected(&selection(&[1]));

            // When restoring
            let size = store.restore();

            // Then the active list matches the backup
            assert_eq!(size, 2);
            assert_eq!(names(&store.current_list()), vec!["Ashwin", "Babalu"]);
            assert_eq!(ids(&store.current_list()), vec![1, 2]);
        }

        #[test]
        fn renumbers_even_when_backup_ids_are_not_sequential() {
            // Given a store whose active list came from a repository with gaps
            let mut store = seeded_store();
            store.replace_active(vec![
                Person::from_new(PersonId(10), mason()),
                Person::from_new(PersonId(42), ashwin()),
            ]);

            // When the same list becomes the snapshot and is restored
            store.backup = store.active.clone();
            store.restore();

            // Then ids are 1..N in backup order
            assert_eq!(ids(&store.current_list()), vec![1, 2]);
            assert_eq!(names(&store.current_list()), vec!["Mason", "Ashwin"]);
        }

        #[test]
        fn restore_on_empty_backup_empties_active() {
            let mut store = PersonStore::new();
            store.initialize(vec![]);
            store.add(mason(), &validator()).unwrap();

            assert_eq!(store.restore(), 0);
            assert!(store.is_empty());
        }
    }

    mod views {
        use super::*;

        #[test]
        fn lists_are_copies() {
            let store = seeded_store();

            let mut list = store.current_list();
            list.clear();

            assert_eq!(store.len(), 2);
        }

        #[test]
        fn contains_checks_active_ids() {
            let mut store = seeded_store();
            store.remove_selected(&selection(&[1]));

            assert!(!store.contains(&PersonId(1)));
            assert!(store.contains(&PersonId(2)));
        }
    }
}
