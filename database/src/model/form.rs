use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::consts::consts::{PersonId, PersonIdError};

use super::person::NewPerson;

pub const FIELD_SEPARATOR: char = '|';

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("Invalid birth date, expected yyyy-mm-dd: {0}")]
    InvalidBirthDate(String),

    #[error("Too many fields, expected first|last|birth date: {0}")]
    TooManyFields(String),

    #[error("Invalid id selection: {0}")]
    InvalidSelection(#[from] PersonIdError),
}

/// Reads `first|last|yyyy-mm-dd` form input. Missing trailing fields are left empty
/// so that the validator, not the parser, reports them
pub fn parse_person_form(input: &str) -> Result<NewPerson, FormError> {
    let fields: Vec<&str> = input.split(FIELD_SEPARATOR).collect();

    if fields.len() > 3 {
        return Err(FormError::TooManyFields(input.to_string()));
    }

    let first_name = fields.first().copied().unwrap_or_default();
    let last_name = fields.get(1).copied().unwrap_or_default();

    let birth_date = match fields.get(2).map(|f| f.trim()) {
        None | Some("") => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| FormError::InvalidBirthDate(raw.to_string()))?,
        ),
    };

    Ok(NewPerson::new(first_name.trim(), last_name.trim(), birth_date))
}

/// Reads a comma or whitespace separated id list, e.g. `1, 3 4`
pub fn parse_id_selection(input: &str) -> Result<BTreeSet<PersonId>, FormError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<PersonId>().map_err(FormError::from))
        .collect()
}
