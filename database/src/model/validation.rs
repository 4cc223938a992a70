use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::person::NewPerson;

/// User facing validation failures. These are returned as data, never raised
#[derive(Error, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("first name required")]
    FirstNameRequired,
    #[error("last name required")]
    LastNameRequired,
    #[error("birth date cannot be in the future")]
    BirthDateInFuture,
}

/// Validates form input against a fixed "today" so that results are reproducible
#[derive(Clone, Debug)]
pub struct PersonValidator {
    today: NaiveDate,
}

impl PersonValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Validator anchored at the local calendar date
    pub fn current() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Collects every rule violation, an empty list means the person is valid
    pub fn validate(&self, person: &NewPerson) -> Vec<ValidationError> {
        let mut errors = vec![];

        if is_blank(&person.first_name) {
            errors.push(ValidationError::FirstNameRequired);
        }

        if is_blank(&person.last_name) {
            errors.push(ValidationError::LastNameRequired);
        }

        if !self.is_valid_birth_date(person.birth_date) {
            errors.push(ValidationError::BirthDateInFuture);
        }

        errors
    }

    pub fn is_valid_birth_date(&self, birth_date: Option<NaiveDate>) -> bool {
        match birth_date {
            Some(date) => date <= self.today,
            None => true,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Joins validation errors into the message shown to the user
pub fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}
