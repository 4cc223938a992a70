use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

use super::age::AgeCategory;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Person {
    pub fn from_new(id: PersonId, person: NewPerson) -> Self {
        Person {
            id,
            first_name: person.first_name,
            last_name: person.last_name,
            birth_date: person.birth_date,
        }
    }

    pub fn age_category(&self, today: NaiveDate) -> AgeCategory {
        AgeCategory::classify(self.birth_date, today)
    }

    pub fn new_test() -> Self {
        Person::from_new(PersonId(1), NewPerson::new_test())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let birth_date = match self.birth_date {
            Some(date) => date.to_string(),
            None => "-".to_string(),
        };

        write!(
            f,
            "[id={}, first_name={}, last_name={}, birth_date={}]",
            self.id, self.first_name, self.last_name, birth_date
        )
    }
}

/// Person as it comes out of a form, before any id has been assigned
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl NewPerson {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        NewPerson {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
        }
    }

    pub fn new_test() -> Self {
        NewPerson::new("First Name", "Last Name", NaiveDate::from_ymd_opt(1990, 1, 1))
    }
}

impl From<Person> for NewPerson {
    fn from(person: Person) -> Self {
        NewPerson {
            first_name: person.first_name,
            last_name: person.last_name,
            birth_date: person.birth_date,
        }
    }
}

/// People the store is seeded with when no repository is configured
pub fn sample_people() -> Vec<NewPerson> {
    vec![
        NewPerson::new("Ashwin", "Sharan", NaiveDate::from_ymd_opt(2012, 10, 11)),
        NewPerson::new("Advik", "Sharan", NaiveDate::from_ymd_opt(2012, 10, 11)),
        NewPerson::new("Layne", "Estes", NaiveDate::from_ymd_opt(2011, 12, 16)),
        NewPerson::new("Mason", "Boyd", NaiveDate::from_ymd_opt(2003, 4, 20)),
        NewPerson::new("Babalu", "Sharan", NaiveDate::from_ymd_opt(1980, 1, 10)),
    ]
}
