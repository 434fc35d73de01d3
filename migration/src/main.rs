use std::{env, fs, io, path::Path, process::ExitCode};
use util::config;

mod runner;

const USAGE: &str = "usage: migration [up | fresh | clean]";

/// SQLite keeps these next to the database file while a connection is open or
/// after an unclean shutdown.
const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

#[tokio::main]
async fn main() -> ExitCode {
    let db_path = config::database_path();
    let command = env::args().nth(1);

    let result = match command.as_deref() {
        None | Some("up") => migrate(&db_path).await,
        Some("fresh") => match remove_database(&db_path) {
            Ok(()) => migrate(&db_path).await,
            Err(e) => Err(e),
        },
        Some("clean") => remove_database(&db_path),
        Some(other) => {
            eprintln!("unknown command '{other}'\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn migrate(db_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(db_path).parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    println!("Database: {db_path}");
    runner::run_all_migrations(&format!("sqlite://{db_path}?mode=rwc")).await
}

/// Deletes the database file and any SQLite sidecar files. A missing file is
/// not an error.
fn remove_database(db_path: &str) -> Result<(), String> {
    let sidecars = SIDECAR_SUFFIXES.iter().map(|s| format!("{db_path}{s}"));

    for path in std::iter::once(db_path.to_owned()).chain(sidecars) {
        match fs::remove_file(&path) {
            Ok(()) => println!("Deleted {path}"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(format!("cannot delete {path}: {e}")),
        }
    }
    Ok(())
}
