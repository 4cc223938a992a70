use std::io;

use anyhow::Context;
use clap::Parser;
use database::{
    database::{database::Database, options::DatabaseOptions},
    persistence::storage::{StorageEngine, StorageEngineKind},
};
use personadb::shell::Shell;

/// 📇 personadb shell, keeps an editable list of people with add, delete and restore
///
/// Reads commands from stdin, e.g. `echo "list" | personadb --engine memory`
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

    /// Do not ask for confirmation before delete and restore
    #[clap(short, long)]
    yes: bool,

    /// Print listings as json
    #[clap(long)]
    json: bool,
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

    let stdin = io::stdin();

    Shell::new(request_manager.clone(), stdin.lock(), io::stdout())
        .set_assume_yes(args.yes)
        .set_json(args.json)
        .run()?;

    let shutdown_response = request_manager.send_shutdown_request()?;

    log::info!("{}", shutdown_response);

    Ok(())
}
