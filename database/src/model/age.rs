use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Life-stage bucket derived from a birth date, used for display and filtering
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgeCategory {
    Unknown,
    Baby,
    Child,
    Teen,
    Adult,
    Senior,
}

impl AgeCategory {
    pub fn classify(birth_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(birth_date) = birth_date else {
            return AgeCategory::Unknown;
        };

        match whole_years_between(birth_date, today) {
            years if years < 0 => AgeCategory::Unknown,
            0..=1 => AgeCategory::Baby,
            2..=12 => AgeCategory::Child,
            13..=19 => AgeCategory::Teen,
            20..=50 => AgeCategory::Adult,
            _ => AgeCategory::Senior,
        }
    }
}

/// Whole calendar years from `from` to `to`, floored (negative when `from` is later)
pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let years = to.year() - from.year();

    // The anniversary has not been reached yet this year
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years - 1
    } else {
        years
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2024, 6, 15);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn absent_birth_date_is_unknown() {
        assert_eq!(AgeCategory::classify(None, today()), AgeCategory::Unknown);
    }

    #[rstest]
    #[case::born_today(date(2024, 6, 15), AgeCategory::Baby)]
    #[case::one_year_364_days(date(2022, 6, 16), AgeCategory::Baby)]
    #[case::exactly_two_years(date(2022, 6, 15), AgeCategory::Child)]
    #[case::twelve_years(date(2011, 6, 16), AgeCategory::Child)]
    #[case::exactly_thirteen_years(date(2011, 6, 15), AgeCategory::Teen)]
    #[case::exactly_nineteen_years(date(2005, 6, 15), AgeCategory::Teen)]
    #[case::nineteen_years_one_day(date(2005, 6, 14), AgeCategory::Teen)]
    #[case::exactly_twenty_years(date(2004, 6, 15), AgeCategory::Adult)]
    #[case::exactly_fifty_years(date(1974, 6, 15), AgeCategory::Adult)]
    #[case::fifty_one_years(date(1973, 6, 15), AgeCategory::Senior)]
    #[case::tomorrow(date(2024, 6, 16), AgeCategory::Unknown)]
    fn classifies_by_whole_years(#[case] birth_date: NaiveDate, #[case] expected: AgeCategory) {
        assert_eq!(AgeCategory::classify(Some(birth_date), today()), expected);
    }

    #[test]
    fn leap_day_birthday_counts_on_march_first() {
        // Given someone born on a leap day
        let birth_date = date(2004, 2, 29);

        // Then the anniversary has not passed on February 28th of a common year
        assert_eq!(whole_years_between(birth_date, date(2023, 2, 28)), 18);
        assert_eq!(whole_years_between(birth_date, date(2023, 3, 1)), 19);
    }

    #[test]
    fn future_dates_floor_to_negative_years() {
        assert_eq!(whole_years_between(date(2024, 6, 16), today()), -1);
        assert_eq!(whole_years_between(date(2025, 7, 1), today()), -2);
    }

    #[test]
    fn parses_category_names() {
        assert_eq!("teen".parse::<AgeCategory>(), Ok(AgeCategory::Teen));
        assert_eq!("SENIOR".parse::<AgeCategory>(), Ok(AgeCategory::Senior));
        assert!("elder".parse::<AgeCategory>().is_err());
        assert_eq!(AgeCategory::Adult.to_string(), "adult");
    }
}
