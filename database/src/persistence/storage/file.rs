use std::{
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{
    consts::consts::{PersonId, PERSON_TABLE, START_AT_ID},
    model::person::{NewPerson, Person},
};

use super::{PersonRepository, RepositoryResult};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct PersonDocument {
    next_id: PersonId,
    rows: Vec<Person>,
}

impl Default for PersonDocument {
    fn default() -> Self {
        Self {
            next_id: START_AT_ID,
            rows: vec![],
        }
    }
}

/// Keeps the whole table in a single JSON document, rewritten on every mutation
pub struct FileRepository {
    base_path: PathBuf,
    document_path: PathBuf,
}

impl FileRepository {
    pub fn new(base_path: PathBuf) -> RepositoryResult<Self> {
        let document_path = base_path.join(format!("{}.json", PERSON_TABLE));

        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            document_path,
        })
    }

    fn read_document(&self) -> RepositoryResult<PersonDocument> {
        let mut file = match File::open(&self.document_path) {
            Ok(file) => file,
            Err(err) => match err.kind() {
                std::io::ErrorKind::NotFound => return Ok(PersonDocument::default()),
                _ => return Err(err.into()),
            },
        };

        let mut contents = String::new();

        file.read_to_string(&mut contents)?;

        Ok(serde_json::from_str(&contents)?)
    }

    // Written to a sibling file first so a crash never leaves a half written document
    fn write_document(&self, document: &PersonDocument) -> RepositoryResult<()> {
        let temporary_path = self.base_path.join(format!("{}.json.tmp", PERSON_TABLE));

        let serialized = serde_json::to_vec_pretty(document)?;

        let mut file = File::create(&temporary_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;

        fs::rename(&temporary_path, &self.document_path)?;

        Ok(())
    }
}

impl PersonRepository for FileRepository {
    fn list_all(&mut self) -> RepositoryResult<Vec<Person>> {
        let mut rows = self.read_document()?.rows;

        rows.sort_by_key(|person| person.id);

        Ok(rows)
    }

    fn insert(&mut self, person: &NewPerson) -> RepositoryResult<bool> {
        let mut document = self.read_document()?;

        document
            .rows
            .push(Person::from_new(document.next_id, person.clone()));
        document.next_id = document.next_id.increment();

        self.write_document(&document)?;

        Ok(true)
    }

    fn delete_by_id(&mut self, id: PersonId) -> RepositoryResult<bool> {
        let mut document = self.read_document()?;

        let before = document.rows.len();
        document.rows.retain(|person| person.id != id);

        if document.rows.len() == before {
            return Ok(false);
        }

        self.write_document(&document)?;

        Ok(true)
    }

    fn delete_all(&mut self) -> RepositoryResult<()> {
        self.write_document(&PersonDocument::default())
    }
}
