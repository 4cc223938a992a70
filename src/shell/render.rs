use chrono::NaiveDate;
use database::model::{person::Person, validation::ValidationError};

const HEADERS: [&str; 5] = ["ID", "First Name", "Last Name", "Birth Date", "Age"];

/// Plain text table, one row per person in list order
pub fn render_table(people: &[Person], today: NaiveDate) -> String {
    if people.is_empty() {
        return "(no records)".to_string();
    }

    let rows: Vec<[String; 5]> = people
        .iter()
        .map(|person| {
            [
                person.id.to_string(),
                person.first_name.clone(),
                person.last_name.clone(),
                person
                    .birth_date
                    .map(|date| date.to_string())
                    .unwrap_or_default(),
                person.age_category(today).to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());

    for row in rows.iter() {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = HEADERS.map(|header| header.to_string());

    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| render_row(row, &widths))
        .collect::<Vec<String>>()
        .join("\n")
}

fn render_row(row: &[String; 5], widths: &[usize; 5]) -> String {
    row.iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<String>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn render_json(people: &[Person]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(people)
}

pub fn render_validation_errors(errors: &[ValidationError]) -> String {
    let lines = errors
        .iter()
        .map(|error| format!("  - {}", error))
        .collect::<Vec<String>>()
        .join("\n");

    format!("Please correct the following:\n{}", lines)
}

pub fn render_stats(info: &[(String, String)]) -> String {
    let width = info.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    info.iter()
        .map(|(key, value)| format!("{:<width$}  {}", key, value, width = width))
        .collect::<Vec<String>>()
        .join("\n")
}
