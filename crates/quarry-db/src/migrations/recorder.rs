//! Migration ledger
//!
//! One row per migration identity: `Id` (primary key) and `Version`, the
//! highest step applied. Rows are only ever inserted or moved forward.

use super::{MigrationError, Result};
use crate::backends::connection::MigrationConnection;
use crate::backends::dialect::{Dialect, dialect_for};
use crate::backends::types::{DatabaseType, SqlCommand, Value, ValueType};
use quarry_conf::{MigrationSettings, Settings};

pub const DEFAULT_LEDGER_TABLE: &str = "__migrations";
pub const DEFAULT_ID_LENGTH: u32 = 256;

/// How to make sure the ledger table exists
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerProbe {
	/// Scalar query answering 1 when the table exists, 0 otherwise
	Query(SqlCommand),
	/// Run the create statement every time; it is guarded by `IF NOT EXISTS`
	Unconditional,
}

/// Reads and writes the ledger table
#[derive(Debug, Clone)]
pub struct MigrationRecorder {
	dialect: &'static dyn Dialect,
	table: String,
	id_length: u32,
}

impl MigrationRecorder {
	pub fn new(database: DatabaseType) -> Self {
		Self {
			dialect: dialect_for(database),
			table: DEFAULT_LEDGER_TABLE.to_string(),
			id_length: DEFAULT_ID_LENGTH,
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(settings.database.engine.into()).with_settings(&settings.migrations)
	}

	pub fn with_settings(self, settings: &MigrationSettings) -> Self {
		self.with_table(settings.ledger_table.clone())
			.with_id_length(settings.ledger_id_length)
	}

	pub fn with_table(mut self, table: impl Into<String>) -> Self {
		self.table = table.into();
		self
	}

	pub fn with_id_length(mut self, length: u32) -> Self {
		self.id_length = length;
		self
	}

	pub fn table(&self) -> &str {
		&self.table
	}

	pub fn database_type(&self) -> DatabaseType {
		self.dialect.database_type()
	}

	fn quoted_table(&self) -> String {
		self.dialect.quote_identifier(&self.table)
	}

	fn id(&self) -> String {
		self.dialect.quote_identifier("Id")
	}

	fn version_column(&self) -> String {
		self.dialect.quote_identifier("Version")
	}

	pub fn probe(&self) -> LedgerProbe {
		match self.database_type() {
			DatabaseType::Sqlite => LedgerProbe::Query(SqlCommand::new(format!(
				"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = {}",
				self.dialect.string_literal(&self.table)
			))),
			DatabaseType::SqlServer => LedgerProbe::Query(SqlCommand::new(format!(
				"SELECT CASE WHEN OBJECT_ID({}, N'U') IS NULL THEN 0 ELSE 1 END",
				self.dialect.string_literal(&self.quoted_table())
			))),
			DatabaseType::MySql => LedgerProbe::Unconditional,
		}
	}

	pub fn create_table_command(&self) -> Result<SqlCommand> {
		let mapper = self.dialect.type_mapper();
		let id_type = mapper.get_mapping(&ValueType::String, Some(self.id_length), false, None)?;
		let version_type = mapper.get_mapping(&ValueType::I32, None, false, None)?;
		let guard = match self.database_type() {
			DatabaseType::SqlServer => "",
			DatabaseType::MySql | DatabaseType::Sqlite => "IF NOT EXISTS ",
		};
		Ok(SqlCommand::new(format!(
			"CREATE TABLE {guard}{table} ({id} {id_type} NOT NULL, {version} {version_type} NOT NULL DEFAULT 0, CONSTRAINT {pk} PRIMARY KEY ({id}))",
			table = self.quoted_table(),
			id = self.id(),
			version = self.version_column(),
			pk = self.dialect.quote_identifier(&format!("PK_{}", self.table)),
		)))
	}

	pub fn version_query(&self, migration_id: &str) -> SqlCommand {
		SqlCommand::with_parameters(
			format!(
				"SELECT {} FROM {} WHERE {} = {}",
				self.version_column(),
				self.quoted_table(),
				self.id(),
				self.dialect.placeholder(1)
			),
			vec![Value::from(migration_id)],
		)
	}

	/// Insert or advance the ledger row for `migration_id`
	pub fn upsert(&self, migration_id: &str, version: u32) -> SqlCommand {
		let (p1, p2) = (self.dialect.placeholder(1), self.dialect.placeholder(2));
		let (table, id, ver) = (self.quoted_table(), self.id(), self.version_column());
		let sql = match self.database_type() {
			DatabaseType::Sqlite => format!(
				"INSERT INTO {table} ({id}, {ver}) VALUES ({p1}, {p2}) ON CONFLICT ({id}) DO UPDATE SET {ver} = excluded.{ver}"
			),
			DatabaseType::MySql => format!(
				"INSERT INTO {table} ({id}, {ver}) VALUES ({p1}, {p2}) ON DUPLICATE KEY UPDATE {ver} = VALUES({ver})"
			),
			DatabaseType::SqlServer => format!(
				"MERGE {table} WITH (HOLDLOCK) AS target USING (SELECT {p1} AS {id}, {p2} AS {ver}) AS source ON target.{id} = source.{id} WHEN MATCHED THEN UPDATE SET {ver} = source.{ver} WHEN NOT MATCHED THEN INSERT ({id}, {ver}) VALUES (source.{id}, source.{ver});"
			),
		};
		SqlCommand::with_parameters(
			sql,
			vec![Value::from(migration_id), Value::from(i64::from(version))],
		)
	}

	/// Create the ledger table if needed; returns whether a create statement ran
	pub async fn ensure_ledger(&self, connection: &dyn MigrationConnection) -> Result<bool> {
		let exists = match self.probe() {
			LedgerProbe::Query(probe) => connection.fetch_scalar(&probe).await?.unwrap_or(0) > 0,
			LedgerProbe::Unconditional => false,
		};
		if exists {
			return Ok(false);
		}
		connection.execute(&self.create_table_command()?).await?;
		tracing::info!(
			table = %self.table,
			database = %self.database_type(),
			"Ensured migration ledger table"
		);
		Ok(true)
	}

	/// Applied version of `migration_id`, `None` when it has no row
	pub async fn version(
		&self,
		connection: &dyn MigrationConnection,
		migration_id: &str,
	) -> Result<Option<u32>> {
		let Some(version) = connection.fetch_scalar(&self.version_query(migration_id)).await? else {
			return Ok(None);
		};
		u32::try_from(version).map(Some).map_err(|_| {
			MigrationError::SchemaMismatch(format!(
				"ledger holds invalid version {version} for {migration_id}"
			))
		})
	}
}
