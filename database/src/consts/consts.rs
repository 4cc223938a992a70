use std::{fmt, num::ParseIntError, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(pub i32);

impl PersonId {
    pub fn to_number(self) -> i32 {
        self.0
    }

    pub fn increment(&self) -> PersonId {
        PersonId(self.0 + 1)
    }

    /// Id of the record sitting at `index` once a list is renumbered from [`START_AT_ID`]
    pub fn from_position(index: usize) -> PersonId {
        PersonId(START_AT_ID.0 + index as i32)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum PersonIdError {
    #[error("Person id must be positive, got: {0}")]
    NegativeOrZero(i32),
    #[error("Person id is not a number: {0}")]
    NotANumber(#[from] ParseIntError),
}

impl TryFrom<i32> for PersonId {
    type Error = PersonIdError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(PersonIdError::NegativeOrZero(value));
        }

        Ok(PersonId(value))
    }
}

impl FromStr for PersonId {
    type Err = PersonIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i32 = s.trim().parse()?;

        PersonId::try_from(value)
    }
}

// Values
pub const START_AT_ID: PersonId = PersonId(1);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Name of the table holding person records in relational repositories
pub const PERSON_TABLE: &str = "personas";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        assert_eq!("7".parse::<PersonId>(), Ok(PersonId(7)));
        assert_eq!(" 12 ".parse::<PersonId>(), Ok(PersonId(12)));
    }

    #[test]
    fn rejects_zero_and_negative_ids() {
        assert_eq!("0".parse::<PersonId>(), Err(PersonIdError::NegativeOrZero(0)));
        assert_eq!(PersonId::try_from(-3), Err(PersonIdError::NegativeOrZero(-3)));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(matches!(
            "abc".parse::<PersonId>(),
            Err(PersonIdError::NotANumber(_))
        ));
    }

    #[test]
    fn position_is_one_based() {
        assert_eq!(PersonId::from_position(0), START_AT_ID);
        assert_eq!(PersonId::from_position(4), PersonId(5));
    }
}
