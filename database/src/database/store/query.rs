use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{age::AgeCategory, person::Person};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum QueryMatch<T> {
    Value(T),
    Any,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonQuery {
    pub age_category: QueryMatch<AgeCategory>,
}

impl PersonQuery {
    pub fn age_category(age_category: AgeCategory) -> Self {
        Self {
            age_category: QueryMatch::Value(age_category),
        }
    }
}

/// Keeps the people matching `query`, preserving list order. Ages are taken at `today`
pub fn filter(people: Vec<Person>, query: &PersonQuery, today: NaiveDate) -> Vec<Person> {
    people
        .into_iter()
        .filter(|person| match &query.age_category {
            QueryMatch::Value(age_category) => &person.age_category(today) == age_category,
            QueryMatch::Any => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{consts::consts::PersonId, model::person::NewPerson};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn people() -> Vec<Person> {
        vec![
            NewPerson::new("Ashwin", "Sharan", NaiveDate::from_ymd_opt(2012, 10, 11)),
            NewPerson::new("Mason", "Boyd", NaiveDate::from_ymd_opt(2003, 4, 20)),
            NewPerson::new("Layne", "Estes", NaiveDate::from_ymd_opt(2011, 12, 16)),
            NewPerson::new("Nobody", "Known", None),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, p)| Person::from_new(PersonId::from_position(index), p))
        .collect()
    }

    #[test]
    fn filters_by_age_category_in_order() {
        let children = filter(people(), &PersonQuery::age_category(AgeCategory::Child), today());

        assert_eq!(
            children
                .iter()
                .map(|p| p.first_name.as_str())
                .collect::<Vec<&str>>(),
            vec!["Ashwin", "Layne"]
        );
    }

    #[test]
    fn unknown_matches_missing_birth_dates() {
        let unknown = filter(people(), &PersonQuery::age_category(AgeCategory::Unknown), today());

        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].first_name, "Nobody");
    }

    #[test]
    fn any_keeps_everyone() {
        let query = PersonQuery {
            age_category: QueryMatch::Any,
        };

        assert_eq!(filter(people(), &query, today()), people());
    }
}
