use super::MigrationConnection;
use crate::backends::error::DatabaseError;
use crate::backends::types::{DatabaseType, SqlCommand, Value};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// SQLite connection backed by a sqlx pool
#[derive(Debug, Clone)]
pub struct SqliteConnection {
	pool: SqlitePool,
}

impl SqliteConnection {
	pub fn from_pool(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Connect to `url`.
	///
	/// In-memory databases are private to one connection, so the pool is
	/// capped at a single connection for them.
	pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
		let mut options = SqlitePoolOptions::new();
		if url.contains(":memory:") || url.contains("mode=memory") {
			options = options.max_connections(1);
		}
		let pool = options.connect(url).await?;
		Ok(Self { pool })
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	fn bind_value<'q>(
		query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
		value: &'q Value,
	) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
		match value {
			Value::Null => query.bind(None::<i64>),
			Value::Bool(b) => query.bind(b),
			Value::Int(i) => query.bind(i),
			Value::UInt(u) => match i64::try_from(*u) {
				Ok(i) => query.bind(i),
				Err(_) => query.bind(u.to_string()),
			},
			Value::Float(f) => query.bind(f),
			// SQLite has no decimal type; NUMERIC affinity converts the text
			Value::Decimal(d) => query.bind(d.to_string()),
			Value::Char(c) => query.bind(c.to_string()),
			Value::String(s) => query.bind(s),
			Value::Bytes(b) => query.bind(b),
			Value::Guid(g) => query.bind(g.to_string()),
			Value::DateTime(dt) => query.bind(dt),
			Value::Date(d) => query.bind(d),
			Value::Time(t) => query.bind(t),
		}
	}

	fn build<'q>(
		command: &'q SqlCommand,
	) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
		let mut query = sqlx::query(&command.sql);
		for param in &command.parameters {
			query = Self::bind_value(query, param);
		}
		query
	}
}

#[async_trait]
impl MigrationConnection for SqliteConnection {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
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
