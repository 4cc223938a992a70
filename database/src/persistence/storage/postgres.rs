use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio_postgres::{Client, NoTls, Row};

use crate::{
    consts::consts::PersonId,
    model::person::{NewPerson, Person},
};

use super::{
    network::{
        start_runtime, ClientFuture, DeleteRequest, InsertRequest, NetworkRepository,
        NetworkRepositoryAction, TaskFuture,
    },
    PersonRepository, RepositoryError, RepositoryResult,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS personas (
        person_id SERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        birth_date DATE
    );
"#;

const LIST_ALL: &str =
    "SELECT person_id, first_name, last_name, birth_date FROM personas ORDER BY person_id";

const INSERT: &str = "INSERT INTO personas (first_name, last_name, birth_date) VALUES ($1, $2, $3)";

const DELETE_BY_ID: &str = "DELETE FROM personas WHERE person_id = $1";

// Restarting the identity keeps database ids in step with a store restore, which renumbers 1..N
const DELETE_ALL: &str = "TRUNCATE personas RESTART IDENTITY";

pub struct PgRepository {
    network_repository: NetworkRepository,
}

impl PgRepository {
    /// Connects with a libpq style string, e.g. `host=localhost user=postgres dbname=personas`
    pub fn connect(config: String) -> RepositoryResult<Self> {
        let (action_sender, action_receiver) = mpsc::channel::<NetworkRepositoryAction>(16);

        start_runtime(
            "Postgres Repository",
            action_receiver,
            PgEnv { config },
            task_fn,
            client_fn,
        )?;

        Ok(Self {
            network_repository: NetworkRepository::new(action_sender),
        })
    }
}

#[derive(Clone)]
struct PgEnv {
    config: String,
}

fn client_fn(env: PgEnv) -> ClientFuture<Client> {
    Box::pin(async move {
        let (client, connection) = tokio_postgres::connect(&env.config, NoTls)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Postgres connection error: {}", e);
            }
        });

        client.batch_execute(CREATE_TABLE).await.map_err(query_error)?;

        log::info!("Connected to postgres, table personas is ready");

        Ok(client)
    })
}

// Is there a way to avoid this duplication?
impl PersonRepository for PgRepository {
    fn list_all(&mut self) -> RepositoryResult<Vec<Person>> {
        self.network_repository.list_all()
    }

    fn insert(&mut self, person: &NewPerson) -> RepositoryResult<bool> {
        self.network_repository.insert(person)
    }

    fn delete_by_id(&mut self, id: PersonId) -> RepositoryResult<bool> {
        self.network_repository.delete_by_id(id)
    }

    fn delete_all(&mut self) -> RepositoryResult<()> {
        self.network_repository.delete_all()
    }
}

fn task_fn(_env: PgEnv, client: Arc<Client>, action: NetworkRepositoryAction) -> TaskFuture {
    Box::pin(async move {
        match action {
            NetworkRepositoryAction::ListAll(sender) => {
                let _ = sender.send(list_all(&client).await);
            }
            NetworkRepositoryAction::Insert(InsertRequest { person, sender }) => {
                let _ = sender.send(insert(&client, &person).await);
            }
            NetworkRepositoryAction::DeleteById(DeleteRequest { id, sender }) => {
                let _ = sender.send(delete_by_id(&client, id).await);
            }
            NetworkRepositoryAction::DeleteAll(sender) => {
                let _ = sender.send(client.batch_execute(DELETE_ALL).await.map_err(query_error));
            }
        }
    })
}

async fn list_all(client: &Client) -> RepositoryResult<Vec<Person>> {
    let rows = client.query(LIST_ALL, &[]).await.map_err(query_error)?;

    rows.iter().map(row_to_person).collect()
}

async fn insert(client: &Client, person: &NewPerson) -> RepositoryResult<bool> {
    let inserted = client
        .execute(
            INSERT,
            &[&person.first_name, &person.last_name, &person.birth_date],
        )
        .await
        .map_err(query_error)?;

    Ok(inserted > 0)
}

async fn delete_by_id(client: &Client, id: PersonId) -> RepositoryResult<bool> {
    let deleted = client
        .execute(DELETE_BY_ID, &[&id.to_number()])
        .await
        .map_err(query_error)?;

    Ok(deleted > 0)
}

fn row_to_person(row: &Row) -> RepositoryResult<Person> {
    let id: i32 = row.try_get("person_id").map_err(query_error)?;
    let birth_date: Option<NaiveDate> = row.try_get("birth_date").map_err(query_error)?;

    Ok(Person {
        id: PersonId::try_from(id).map_err(|e| RepositoryError::Query(e.to_string()))?,
        first_name: row.try_get("first_name").map_err(query_error)?,
        last_name: row.try_get("last_name").map_err(query_error)?,
        birth_date,
    })
}

fn query_error(e: tokio_postgres::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
