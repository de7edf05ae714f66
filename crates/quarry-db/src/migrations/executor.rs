//! Applying pending migrations
//!
//! [`MigrationExecutor::run_pending`] walks registered migrations in priority
//! order. For each step above the ledger version it generates the DDL and
//! runs it together with the ledger upsert as one transaction, so a failed
//! step leaves the ledger where it was and the next run resumes there.

use super::generator::MigrationsSqlGenerator;
use super::migration::{Migration, MigrationStep};
use super::recorder::MigrationRecorder;
use super::{MigrationError, Result};
use crate::backends::connection::MigrationConnection;
use quarry_conf::Settings;
use std::cmp::Reverse;

/// Executor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
	/// Ledger table not yet probed
	Uninitialized,
	/// Ledger table known to exist
	Ready,
	/// Applying steps
	Applying,
	/// Last run finished, successfully or not
	Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStep {
	pub migration: String,
	pub version: u32,
	pub statements: usize,
}

/// Outcome of one [`MigrationExecutor::run_pending`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
	pub applied: Vec<AppliedStep>,
	/// DDL statements executed, ledger writes excluded
	pub statements: usize,
}

impl ExecutionReport {
	pub fn is_empty(&self) -> bool {
		self.applied.is_empty()
	}
}

/// Applies registered migrations over one connection
///
/// # Examples
///
/// ```
/// use quarry_db::backends::{DatabaseType, RecordingConnection};
/// use quarry_db::migrations::{Migration, MigrationExecutor};
///
/// # tokio_test::block_on(async {
/// let connection = RecordingConnection::new(DatabaseType::SqlServer);
/// let mut executor = MigrationExecutor::new(connection);
/// executor
///     .register(Migration::new("audit").create(|m| {
///         m.sql("CREATE TABLE [Audit] ([Id] int NOT NULL)");
///         Ok(())
///     }))
///     .unwrap();
///
/// let report = executor.run_pending().await.unwrap();
/// assert_eq!(report.statements, 1);
/// # });
/// ```
#[derive(Debug)]
pub struct MigrationExecutor<C> {
	connection: C,
	recorder: MigrationRecorder,
	generator: MigrationsSqlGenerator,
	migrations: Vec<Migration>,
	state: ExecutorState,
}

impl<C: MigrationConnection> MigrationExecutor<C> {
	pub fn new(connection: C) -> Self {
		let database = connection.database_type();
		Self {
			recorder: MigrationRecorder::new(database),
			generator: MigrationsSqlGenerator::new(database),
			connection,
			migrations: Vec::new(),
			state: ExecutorState::Uninitialized,
		}
	}

	/// Executor with the ledger table and id length from `settings`
	pub fn from_settings(connection: C, settings: &Settings) -> Self {
		let mut executor = Self::new(connection);
		executor.recorder = executor.recorder.with_settings(&settings.migrations);
		executor
	}

	pub fn with_recorder(mut self, recorder: MigrationRecorder) -> Self {
		self.recorder = recorder;
		self
	}

	pub fn register(&mut self, migration: Migration) -> Result<&mut Self> {
		if self.migrations.iter().any(|m| m.id == migration.id) {
			return Err(MigrationError::DuplicateMigration(migration.id));
		}
		self.migrations.push(migration);
		Ok(self)
	}

	pub fn connection(&self) -> &C {
		&self.connection
	}

	pub fn into_connection(self) -> C {
		self.connection
	}

	pub fn recorder(&self) -> &MigrationRecorder {
		&self.recorder
	}

	pub fn state(&self) -> ExecutorState {
		self.state
	}

	/// Registered migrations by priority, highest first, ties in registration order
	pub fn ordered(&self) -> Vec<&Migration> {
		let mut ordered: Vec<&Migration> = self.migrations.iter().collect();
		ordered.sort_by_key(|m| Reverse(m.priority));
		ordered
	}

	async fn initialize(&mut self) -> Result<()> {
		self.recorder.ensure_ledger(&self.connection).await?;
		self.state = ExecutorState::Ready;
		Ok(())
	}

	/// Apply every pending step of every registered migration
	///
	/// Stops at the first failing step and returns
	/// [`MigrationError::MigrationFailure`] naming the migration and step.
	pub async fn run_pending(&mut self) -> Result<ExecutionReport> {
		if self.state == ExecutorState::Uninitialized {
			self.initialize().await?;
		}
		self.state = ExecutorState::Applying;
		let result = self.apply_all().await;
		self.state = ExecutorState::Idle;
		result
	}

	async fn apply_all(&self) -> Result<ExecutionReport> {
		if !self.connection.database_type().supports_transactional_ddl() {
			tracing::warn!(
				database = %self.connection.database_type(),
				"DDL is not transactional on this database; a failed step may leave partial schema changes"
			);
		}

		let mut report = ExecutionReport::default();
		for migration in self.ordered() {
			let applied = self.recorder.version(&self.connection, &migration.id).await?;
			for step in migration.pending_steps(applied) {
				match self.apply_step(migration, step).await {
					Ok(statements) => {
						tracing::info!(
							migration = %migration.id,
							step = %step.name(),
							version = step.version(),
							statements,
							"Applied migration step"
						);
						report.statements += statements;
						report.applied.push(AppliedStep {
							migration: migration.id.clone(),
							version: step.version(),
							statements,
						});
					}
					Err(e) => {
						tracing::error!(
							migration = %migration.id,
							step = %step.name(),
							error = %e,
							"Migration step failed"
						);
						return Err(MigrationError::MigrationFailure {
							id: migration.id.clone(),
							step: step.version(),
							source: Box::new(e),
						});
					}
				}
			}
		}
		Ok(report)
	}

	/// Run one step's DDL and ledger write in a single transaction
	async fn apply_step(&self, migration: &Migration, step: &MigrationStep) -> Result<usize> {
		let operations = step.operations()?;
		let mut commands = self.generator.generate(&operations)?;
		let statements = commands.len();
		commands.push(self.recorder.upsert(&migration.id, step.version()));
		self.connection.execute_in_transaction(&commands).await?;
		Ok(statements)
	}
}
