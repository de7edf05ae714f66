//! Connection boundary
//!
//! The migration executor and the query helpers only need four things from a
//! database: its dialect, single statement execution, a scalar read and an
//! all-or-nothing batch. Connection pooling, timeouts and driver details stay
//! behind this trait.

#[cfg(feature = "mysql")]
mod mysql;
mod recording;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MySqlConnection;
pub use recording::RecordingConnection;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

use super::error::DatabaseError;
use super::types::{DatabaseType, SqlCommand};
use async_trait::async_trait;

/// Async execution boundary for generated commands
#[async_trait]
pub trait MigrationConnection: Send + Sync {
	fn database_type(&self) -> DatabaseType;

	/// Execute one statement, returning the affected row count
	async fn execute(&self, command: &SqlCommand) -> Result<u64, DatabaseError>;

	/// First column of the first row as an integer; `None` when no row or NULL
	async fn fetch_scalar(&self, command: &SqlCommand) -> Result<Option<i64>, DatabaseError>;

	/// Execute every command inside one transaction, committing only if all succeed
	async fn execute_in_transaction(&self, commands: &[SqlCommand]) -> Result<(), DatabaseError>;
}
