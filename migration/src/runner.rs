use colored::*;
use futures::FutureExt;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

/// Applies every migration in order, stopping at the first failure.
pub async fn run_all_migrations(url: &str) -> Result<(), String> {
    let db = sea_orm::Database::connect(url)
        .await
        .map_err(|e| format!("database connection failed: {e}"))?;

    let migrations = <migration::Migrator as MigratorTrait>::migrations();
    println!("Running {} migrations...", migrations.len());
    let schema_manager = SchemaManager::new(&db);

    let started = Instant::now();
    for migration in migrations {
        run_migration(&schema_manager, migration).await?;
    }
    let total = format!("({:.2?})", started.elapsed()).dimmed();
    println!("{} {}", "Schema up to date".green(), total);
    Ok(())
}

async fn run_migration(
    schema_manager: &SchemaManager<'_>,
    migration: Box<dyn MigrationTrait>,
) -> Result<(), String> {
    let name_str = format!("Applying {}", migration.name().bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
    print!("{}{} ", name_str, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    let result = std::panic::AssertUnwindSafe(migration.up(schema_manager))
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(())) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {}", "done".green(), time_str);
            Ok(())
        }
        Ok(Err(e)) => {
            println!("{}", "failed".red());
            Err(format!("{}: {e}", migration.name()))
        }
        Err(_) => {
            println!("{}", "panicked".red());
            Err(format!("{} panicked", migration.name()))
        }
    }
}
