use crate::{Error, Result};
use quarry_conf::{DatabaseEngine, Settings};
use quarry_db::migrations::{ExecutionReport, Migration};
#[cfg(any(feature = "sqlite", feature = "mysql"))]
use quarry_db::{backends::MigrationConnection, migrations::MigrationExecutor};

/// Connect with `settings.database` and apply every pending step of `migrations`
///
/// Uses the bundled sqlx driver for the configured engine. SQL Server has
/// none; drive a [`MigrationExecutor`](quarry_db::migrations::MigrationExecutor)
/// with your own [`MigrationConnection`](quarry_db::backends::MigrationConnection)
/// instead.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "sqlite")]
/// # tokio_test::block_on(async {
/// use quarry::prelude::*;
///
/// let settings = Settings::default();
/// let migration = Migration::new("notes").create(|m| {
///     m.sql("CREATE TABLE IF NOT EXISTS \"Note\" (\"Id\" INTEGER PRIMARY KEY)");
///     Ok(())
/// });
///
/// let report = run_pending_migrations(&settings, vec![migration]).await.unwrap();
/// assert_eq!(report.applied.len(), 1);
/// # });
/// ```
pub async fn run_pending_migrations(
	settings: &Settings,
	migrations: Vec<Migration>,
) -> Result<ExecutionReport> {
	tracing::info!(
		engine = %settings.database.engine,
		migrations = migrations.len(),
		"Running pending migrations"
	);
	match settings.database.engine {
		#[cfg(feature = "sqlite")]
		DatabaseEngine::Sqlite => {
			let connection =
				quarry_db::backends::SqliteConnection::connect(&settings.database.url).await?;
			run(connection, settings, migrations).await
		}
		#[cfg(feature = "mysql")]
		DatabaseEngine::MySql => {
			let connection =
				quarry_db::backends::MySqlConnection::connect(&settings.database.url).await?;
			run(connection, settings, migrations).await
		}
		engine => Err(Error::NoDriver(engine)),
	}
}

#[cfg(any(feature = "sqlite", feature = "mysql"))]
async fn run<C: MigrationConnection>(
	connection: C,
	settings: &Settings,
	migrations: Vec<Migration>,
) -> Result<ExecutionReport> {
	let mut executor = MigrationExecutor::from_settings(connection, settings);
	for migration in migrations {
		executor.register(migration)?;
	}
	Ok(executor.run_pending().await?)
}
