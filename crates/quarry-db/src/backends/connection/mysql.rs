use super::MigrationConnection;
use crate::backends::error::DatabaseError;
use crate::backends::types::{DatabaseType, SqlCommand, Value};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

/// MySQL connection backed by a sqlx pool
///
/// MySQL commits DDL implicitly, so a batch mixing DDL and the ledger upsert
/// is only atomic for the DML part.
#[derive(Debug, Clone)]
pub struct MySqlConnection {
	pool: MySqlPool,
}

impl MySqlConnection {
	pub fn from_pool(pool: MySqlPool) -> Self {
		Self { pool }
	}

	pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
		let pool = MySqlPoolOptions::new().connect(url).await?;
		Ok(Self { pool })
	}

	pub fn pool(&self) -> &MySqlPool {
		&self.pool
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
		value: &'q Value,
	) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
		match value {
			Value::Null => query.bind(None::<i64>),
			Value::Bool(b) => query.bind(b),
			Value::Int(i) => query.bind(i),
			Value::UInt(u) => query.bind(u),
			Value::Float(f) => query.bind(f),
			Value::Decimal(d) => query.bind(d),
			Value::Char(c) => query.bind(c.to_string()),
			Value::String(s) => query.bind(s),
			Value::Bytes(b) => query.bind(b),
			// Stored as char(36)
			Value::Guid(g) => query.bind(g.to_string()),
			Value::DateTime(dt) => query.bind(dt),
			Value::Date(d) => query.bind(d),
			Value::Time(t) => query.bind(t),
		}
	}

	fn build<'q>(
		command: &'q SqlCommand,
	) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
		let mut query = sqlx::query(&command.sql);
		for param in &command.parameters {
			query = Self::bind_value(query, param);
		}
		query
	}
}

#[async_trait]
impl MigrationConnection for MySqlConnection {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::MySql
	}

	async fn execute(&self, command: &SqlCommand) -> Result<u64, DatabaseError> {
		tracing::debug!(sql = %command.sql, "Executing statement");
		let result = Self::build(command).execute(&self.pool).await?;
		Ok(result.rows_affected())
	}

	async fn fetch_scalar(&self, command: &SqlCommand) -> Result<Option<i64>, DatabaseError> {
		tracing::debug!(sql = %command.sql, "Fetching scalar");
		let row = Self::build(command).fetch_optional(&self.pool).await?;
		match row {
			Some(row) => Ok(row.try_get::<Option<i64>, _>(0)?),
			None => Ok(None),
		}
	}

	async fn execute_in_transaction(&self, commands: &[SqlCommand]) -> Result<(), DatabaseError> {
		let mut tx = self.pool.begin().await?;
		for command in commands {
			tracing::debug!(sql = %command.sql, "Executing statement in transaction");
			Self::build(command).execute(&mut *tx).await?;
		}
		tx.commit().await?;
		Ok(())
	}
}
