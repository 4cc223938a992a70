use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use database::database::database::Database;
use database::database::options::DatabaseOptions;
use database::database::request_manager::{RequestManager, RequestManagerError};
use database::database::store::store::RemoveOutcome;
use database::model::form::{parse_id_selection, parse_person_form};
use database::model::person::Person;
use database::model::validation::format_errors;
use database::persistence::storage::{StorageEngine, StorageEngineKind};

/// 📇 personadb TCP Server, provides a simple tcp interface for interacting with the person store
///
/// Can connect via netcat `echo "l" | netcat 127.0.0.1 9000`
#[derive(Parser, Debug)]
struct Cli {
    /// Where people are persisted: none, memory, file or postgres
    #[clap(short, long, default_value = "none")]
    engine: StorageEngineKind,

    /// Directory used by the file engine. Note: Does not support shell paths, e.g. ~
    #[clap(short, long, default_value = "data")]
    data: std::path::PathBuf,

    /// libpq style connection string for the postgres engine
    #[clap(long, env = "PERSONADB_PG_CONFIG")]
    pg_config: Option<String>,

    /// Port the tcp server will run on
    #[clap(short, long, default_value = "9000")]
    port: u16,

    /// Address the tcp server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let storage_engine = StorageEngine::from_kind(args.engine, args.data, args.pg_config)?;

    let database_options = DatabaseOptions::default().set_storage_engine(storage_engine);

    let request_manager = Database::new(database_options)
        .context("Failed to open storage")?
        .run()
        .context("Failed to load people")?;

    // Set up Ctrl-C handler
    let set_handler_request_manager = request_manager.clone();

    ctrlc::set_handler(move || {
        match set_handler_request_manager.send_shutdown_request() {
            Ok(shutdown_response) => log::info!("Shutting down server: {}", shutdown_response),
            Err(e) => log::error!("Failed to shutdown database: {}", e),
        }

        std::process::exit(0);
    })
    .context("Error setting Ctrl-C handler")?;

    let listener = TcpListener::bind(format!("{}:{}", args.address, args.port))?;

    log::info!("TCP Server running on {}:{}", args.address, args.port);

    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                let request_manager = request_manager.clone();

                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &request_manager) {
                        log::info!("Failed to serve connection: {}", e);
                    }
                });
            }
            Err(e) => {
                log::info!("Failed to establish connection: {}", e)
            }
        }
    }
}

fn handle_connection(mut stream: TcpStream, request_manager: &RequestManager) -> anyhow::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    // Requests end at the first newline, however many reads that takes
    let mut request = String::new();
    reader.read_line(&mut request)?;

    let response = handle_request(request.trim(), request_manager);

    writeln!(stream, "{}", response)?;

    Ok(())
}

fn handle_request(request: &str, request_manager: &RequestManager) -> String {
    log::info!("Request: {}", request);

    match respond(request, request_manager) {
        Ok(response) => response,
        Err(RequestManagerError::Rejected(errors)) => format_errors(&errors),
        Err(e) => format!("Error: {}", e),
    }
}

/// Request lines: `l`, `b`, `a first|last|yyyy-mm-dd`, `d 1,2`, `r`
fn respond(request: &str, request_manager: &RequestManager) -> Result<String, RequestManagerError> {
    let (command, rest) = match request.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (request, ""),
    };

    match command {
        "l" => Ok(render(&request_manager.send_list(None)?)),
        "b" => Ok(render(&request_manager.send_list_backup()?)),
        "a" => match parse_person_form(rest) {
            Ok(person) => Ok(format!("Added {}", request_manager.send_add(person)?)),
            Err(e) => Ok(e.to_string()),
        },
        "d" => match parse_id_selection(rest) {
            Ok(ids) => Ok(match request_manager.send_remove(ids)? {
                RemoveOutcome::NothingSelected => "No selection".to_string(),
                RemoveOutcome::Removed(count) => format!("Deleted {} records", count),
            }),
            Err(e) => Ok(e.to_string()),
        },
        "r" => Ok(format!("Restored {} records", request_manager.send_restore()?)),
        _ => Ok("Unknown Command".to_string()),
    }
}

fn render(people: &[Person]) -> String {
    let today = Local::now().date_naive();

    people
        .iter()
        .map(|person| format!("{} ({})", person, person.age_category(today)))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use chrono::NaiveDate;
    use database::model::person::NewPerson;
    use rstest::rstest;

    use super::*;

    fn request_manager() -> RequestManager {
        let options = DatabaseOptions::new_test().set_seed(vec![
            NewPerson::new("Ashwin", "Sharan", NaiveDate::from_ymd_opt(2012, 10, 11)),
            NewPerson::new("Babalu", "Sharan", NaiveDate::from_ymd_opt(1980, 1, 10)),
        ]);

        Database::new(options).unwrap().run().unwrap()
    }

    mod requests {
        use super::*;

        #[rstest]
        #[case("a Mason|Boyd|2003-04-20", "Added [id=3, first_name=Mason, last_name=Boyd, birth_date=2003-04-20]")]
        #[case("a |", "first name required\nlast name required")]
        #[case("a Mason|Boyd|20-04-2003", "Invalid birth date, expected yyyy-mm-dd: 20-04-2003")]
        #[case("d 1, 2", "Deleted 2 records")]
        #[case("d", "No selection")]
        #[case("d x", "Invalid id selection: Person id is not a number: invalid digit found in string")]
        #[case("r", "Restored 2 records")]
        #[case("u 1", "Unknown Command")]
        fn responses(#[case] request: &str, #[case] expected: &str) {
            let rm = request_manager();

            assert_eq!(handle_request(request, &rm), expected);
        }

        #[test]
        fn list_and_backup_render_people() {
            let rm = request_manager();

            handle_request("d 1", &rm);

            let listed = handle_request("l", &rm);
            assert!(listed.starts_with("[id=2, first_name=Babalu"));
            assert_eq!(listed.lines().count(), 1);

            let backup = handle_request("b", &rm);
            assert!(backup.starts_with("[id=1, first_name=Ashwin"));
            assert_eq!(backup.lines().count(), 2);
        }

        #[test]
        fn restore_undoes_add_and_delete() {
            let rm = request_manager();

            handle_request("a Mason|Boyd|", &rm);
            handle_request("d 1", &rm);
            handle_request("r", &rm);

            let people = rm.send_list(None).unwrap();
            let names: Vec<&str> = people.iter().map(|p| p.first_name.as_str()).collect();
            assert_eq!(names, vec!["Ashwin", "Babalu"]);
        }
    }

    mod connection {
        use super::*;

        #[test]
        fn long_multibyte_request_is_read_whole() {
            // Given a request far longer than a single read buffer, made of two byte characters
            let first_name = "Ñ".repeat(700);
            let rm = request_manager();

            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let address = listener.local_addr().unwrap();

            let server_rm = rm.clone();
            let server = thread::spawn(move || {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &server_rm).unwrap();
            });

            // When it is sent over the socket
            let mut client = TcpStream::connect(address).unwrap();
            writeln!(client, "a {}|Boyd|", first_name).unwrap();

            let mut response = String::new();
            client.read_to_string(&mut response).unwrap();
            server.join().unwrap();

            // Then the whole name was stored
            assert!(response.starts_with("Added [id=3"));
            assert_eq!(rm.send_list(None).unwrap()[2].first_name, first_name);
        }
    }
}
