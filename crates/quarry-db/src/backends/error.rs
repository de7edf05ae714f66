//! Connection-level errors

use thiserror::Error;

/// Errors raised by a [`MigrationConnection`](super::MigrationConnection)
#[derive(Debug, Error)]
pub enum DatabaseError {
	#[cfg(any(feature = "sqlite", feature = "mysql"))]
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Execution failed: {0}")]
	Execution(String),

	#[error("Unsupported parameter for {database}: {reason}")]
	UnsupportedParameter { database: String, reason: String },
}
