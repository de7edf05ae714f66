use super::MigrationConnection;
use crate::backends::error::DatabaseError;
use crate::backends::types::{DatabaseType, SqlCommand};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Connection that records commands instead of running them
///
/// Used for dry runs (printing the DDL a run would execute) and for driving
/// the executor against dialects without a bundled driver. Scalar reads
/// answer from scripted responses matched by SQL substring, `None` otherwise.
#[derive(Debug)]
pub struct RecordingConnection {
	database_type: DatabaseType,
	executed: Mutex<Vec<SqlCommand>>,
	scalars: Mutex<Vec<(String, i64)>>,
	fail_on: Option<String>,
}

impl RecordingConnection {
	pub fn new(database_type: DatabaseType) -> Self {
		Self {
			database_type,
			executed: Mutex::new(Vec::new()),
			scalars: Mutex::new(Vec::new()),
			fail_on: None,
		}
	}

	/// Answer scalar reads whose SQL contains `pattern` with `value`
	pub fn with_scalar(self, pattern: impl Into<String>, value: i64) -> Self {
		self.scalars.lock().push((pattern.into(), value));
		self
	}

	/// Fail any statement whose SQL contains `pattern`
	pub fn failing_on(mut self, pattern: impl Into<String>) -> Self {
		self.fail_on = Some(pattern.into());
		self
	}

	/// Commands executed so far, in order
	pub fn executed(&self) -> Vec<SqlCommand> {
		self.executed.lock().clone()
	}

	pub fn clear(&self) {
		self.executed.lock().clear();
	}

	fn check(&self, command: &SqlCommand) -> Result<(), DatabaseError> {
		match &self.fail_on {
			Some(pattern) if command.sql.contains(pattern.as_str()) => Err(
				DatabaseError::Execution(format!("statement rejected: {}", command.sql)),
			),
			_ => Ok(()),
		}
	}
}

#[async_trait]
impl MigrationConnection for RecordingConnection {
	fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	async fn execute(&self, command: &SqlCommand) -> Result<u64, DatabaseError> {
		self.check(command)?;
		self.executed.lock().push(command.clone());
		Ok(0)
	}

	async fn fetch_scalar(&self, command: &SqlCommand) -> Result<Option<i64>, DatabaseError> {
		self.check(command)?;
		let scalars = self.scalars.lock();
		Ok(scalars
			.iter()
			.find(|(pattern, _)| command.sql.contains(pattern.as_str()))
			.map(|(_, value)| *value))
	}

	async fn execute_in_transaction(&self, commands: &[SqlCommand]) -> Result<(), DatabaseError> {
		for command in commands {
			self.check(command)?;
		}
		self.executed.lock().extend(commands.iter().cloned());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_failed_batch_records_nothing() {
		// Arrange
		let conn = RecordingConnection::new(DatabaseType::SqlServer).failing_on("DROP");

		// Act
		let result = conn
			.execute_in_transaction(&[
				SqlCommand::new("CREATE TABLE a (x int)"),
				SqlCommand::new("DROP TABLE b"),
			])
			.await;

		// Assert
		assert!(result.is_err());
		assert!(conn.executed().is_empty());
	}

	#[tokio::test]
	async fn test_scripted_scalar() {
		let conn = RecordingConnection::new(DatabaseType::MySql).with_scalar("COUNT", 45);

		assert_eq!(
			conn.fetch_scalar(&SqlCommand::new("SELECT COUNT(*) FROM t"))
				.await
				.unwrap(),
			Some(45)
		);
		assert_eq!(
			conn.fetch_scalar(&SqlCommand::new("SELECT 1")).await.unwrap(),
			None
		);
	}
}
