//! Named migrations and their steps

use super::Result;
use super::builder::MigrationBuilder;
use super::operations::Operation;
use std::fmt;
use std::sync::Arc;

type StepFn = Arc<dyn Fn(&mut MigrationBuilder) -> Result<()> + Send + Sync>;

/// One versioned step: `Create` is version 0, `Up{n}` is version n
#[derive(Clone)]
pub struct MigrationStep {
	version: u32,
	build: StepFn,
}

impl MigrationStep {
	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn name(&self) -> String {
		match self.version {
			0 => "Create".to_string(),
			n => format!("Up{n}"),
		}
	}

	/// Whether the step still needs applying given the ledger version
	///
	/// An absent ledger row means nothing has run, `Create` included.
	pub fn is_pending(&self, applied: Option<u32>) -> bool {
		match applied {
			None => true,
			Some(version) => self.version > version,
		}
	}

	/// Run the step body against a fresh builder
	pub fn operations(&self) -> Result<Vec<Operation>> {
		let mut builder = MigrationBuilder::new();
		(self.build)(&mut builder)?;
		Ok(builder.into_operations())
	}
}

impl fmt::Debug for MigrationStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MigrationStep")
			.field("version", &self.version)
			.finish_non_exhaustive()
	}
}

/// A named migration: an identity, a priority and ordered steps
///
/// # Examples
///
/// ```
/// use quarry_db::backends::ValueType;
/// use quarry_db::metadata::{ColumnMetadata, EntityType};
/// use quarry_db::migrations::{ColumnOperation, Migration};
///
/// let migration = Migration::new("blog.posts")
///     .with_priority(10)
///     .create(|m| {
///         let post = EntityType::new("Post")
///             .column(ColumnMetadata::new("Id", ValueType::I64).identity());
///         m.create_table(&post, |_| {})?;
///         Ok(())
///     })
///     .up(|m| {
///         m.add_column("Post", ColumnOperation::new("Title", ValueType::String).size(200));
///         Ok(())
///     });
///
/// assert_eq!(migration.latest_version(), Some(1));
/// assert_eq!(migration.steps()[1].name(), "Up1");
/// ```
#[derive(Debug, Clone)]
pub struct Migration {
	pub id: String,
	/// Higher runs first; ties keep registration order
	pub priority: i32,
	steps: Vec<MigrationStep>,
}

impl Migration {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			priority: 0,
			steps: Vec::new(),
		}
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	/// Initial step (version 0), replacing any previous one
	pub fn create<F>(mut self, build: F) -> Self
	where
		F: Fn(&mut MigrationBuilder) -> Result<()> + Send + Sync + 'static,
	{
		self.steps.retain(|s| s.version != 0);
		self.steps.insert(
			0,
			MigrationStep {
				version: 0,
				build: Arc::new(build),
			},
		);
		self
	}

	/// Next incremental step, numbered after the latest one
	pub fn up<F>(mut self, build: F) -> Self
	where
		F: Fn(&mut MigrationBuilder) -> Result<()> + Send + Sync + 'static,
	{
		let version = self.latest_version().map_or(1, |v| v + 1);
		self.steps.push(MigrationStep {
			version,
			build: Arc::new(build),
		});
		self
	}

	/// Steps in version order
	pub fn steps(&self) -> &[MigrationStep] {
		&self.steps
	}

	pub fn latest_version(&self) -> Option<u32> {
		self.steps.last().map(|s| s.version)
	}

	/// Steps still to run given the ledger version
	pub fn pending_steps(&self, applied: Option<u32>) -> impl Iterator<Item = &MigrationStep> {
		self.steps.iter().filter(move |s| s.is_pending(applied))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn noop(_: &mut MigrationBuilder) -> Result<()> {
		Ok(())
	}

	#[rstest]
	fn test_step_versions() {
		let migration = Migration::new("m").up(noop).create(noop).up(noop);

		let versions: Vec<u32> = migration.steps().iter().map(|s| s.version()).collect();

		assert_eq!(versions, vec![0, 1, 2]);
	}

	#[rstest]
	#[case(None, vec![0, 1, 2])]
	#[case(Some(0), vec![1, 2])]
	#[case(Some(1), vec![2])]
	#[case(Some(2), vec![])]
	fn test_pending_steps(#[case] applied: Option<u32>, #[case] expected: Vec<u32>) {
		let migration = Migration::new("m").create(noop).up(noop).up(noop);

		let pending: Vec<u32> = migration.pending_steps(applied).map(|s| s.version()).collect();

		assert_eq!(pending, expected);
	}

	#[rstest]
	fn test_step_body_produces_operations() {
		let migration = Migration::new("m").create(|m| {
			m.sql("SELECT 1");
			Ok(())
		});

		let operations = migration.steps()[0].operations().unwrap();

		assert_eq!(operations, vec![Operation::Sql { sql: "SELECT 1".into() }]);
	}
}
