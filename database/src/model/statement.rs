use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{consts::consts::PersonId, database::store::query::PersonQuery};

use super::{person::NewPerson, person::Person, validation::ValidationError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Statement {
    /// Validates then appends a person, returns the stored record
    Add(NewPerson),
    /// Removes every record whose id is selected
    RemoveSelected(BTreeSet<PersonId>),
    /// Replaces the active list with the backup snapshot
    Restore,
    /// Returns the active list, optionally filtered
    List(Option<PersonQuery>),
    /// Returns the backup snapshot
    ListBackup,
}

impl Statement {
    pub fn is_query(&self) -> bool {
        !self.is_mutation()
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::RemoveSelected(_) | Statement::Restore => true,
            Statement::List(_) | Statement::ListBackup => false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StatementResult {
    Added(Person),
    /// The person failed validation, nothing was stored
    Rejected(Vec<ValidationError>),
    Removed(usize),
    /// An empty selection was submitted for removal
    NothingSelected,
    /// Size of the active list after restoring
    Restored(usize),
    List(Vec<Person>),
}
