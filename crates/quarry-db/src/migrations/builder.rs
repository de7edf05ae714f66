//! Fluent assembly of migration operations

use super::operations::{
	ColumnOperation, CreateTableOperation, ForeignKeyOperation, Operation, PrimaryKeyOperation,
	UniqueConstraintOperation, to_strings,
};
use super::{MigrationError, Result};
use crate::metadata::EntityType;

/// Collects the operations of one migration step
///
/// # Examples
///
/// ```
/// use quarry_db::backends::ValueType;
/// use quarry_db::migrations::{ColumnOperation, MigrationBuilder, Operation};
///
/// let mut builder = MigrationBuilder::new();
/// builder
///     .add_column("User", ColumnOperation::new("Email", ValueType::String).size(256))
///     .create_index("User", &["Email"], true);
///
/// assert_eq!(builder.operations().len(), 2);
/// assert!(matches!(builder.operations()[0], Operation::AddColumn { .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MigrationBuilder {
	schema: Option<String>,
	operations: Vec<Operation>,
}

impl MigrationBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Schema applied to the table-level operations added after this call
	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn operations(&self) -> &[Operation] {
		&self.operations
	}

	pub fn into_operations(self) -> Vec<Operation> {
		self.operations
	}

	pub fn push(&mut self, operation: Operation) -> &mut Self {
		self.operations.push(operation);
		self
	}

	/// `CREATE TABLE` for `entity`
	///
	/// Columns come from the entity metadata in declaration order and the
	/// primary key from its key columns. `configure` can add foreign keys,
	/// unique constraints and extra columns. Every constraint column must
	/// name a column of the table.
	pub fn create_table<F>(&mut self, entity: &EntityType, configure: F) -> Result<&mut Self>
	where
		F: FnOnce(&mut CreateTableBuilder),
	{
		let mut table = CreateTableBuilder::from_entity(entity);
		if table.operation.schema.is_none() {
			table.operation.schema = self.schema.clone();
		}
		configure(&mut table);
		let operation = table.build()?;
		Ok(self.push(Operation::CreateTable(operation)))
	}

	pub fn drop_table(&mut self, table: impl Into<String>) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropTable {
			table: table.into(),
			schema,
		})
	}

	pub fn add_column(&mut self, table: impl Into<String>, column: ColumnOperation) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::AddColumn {
			table: table.into(),
			schema,
			column,
		})
	}

	pub fn drop_column(
		&mut self,
		table: impl Into<String>,
		column: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropColumn {
			table: table.into(),
			schema,
			column: column.into(),
		})
	}

	pub fn rename_column(
		&mut self,
		table: impl Into<String>,
		old_name: impl Into<String>,
		new_name: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::RenameColumn {
			table: table.into(),
			schema,
			old_name: old_name.into(),
			new_name: new_name.into(),
		})
	}

	pub fn add_primary_key<S: AsRef<str>>(
		&mut self,
		table: impl Into<String>,
		columns: &[S],
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::AddPrimaryKey {
			table: table.into(),
			schema,
			primary_key: PrimaryKeyOperation {
				name: None,
				columns: to_strings(columns),
			},
		})
	}

	/// Drop the conventionally named (`PK_{table}`) primary key
	pub fn drop_primary_key(&mut self, table: impl Into<String>) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropPrimaryKey {
			table: table.into(),
			schema,
			name: None,
		})
	}

	pub fn add_foreign_key(
		&mut self,
		table: impl Into<String>,
		foreign_key: ForeignKeyOperation,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::AddForeignKey {
			table: table.into(),
			schema,
			foreign_key,
		})
	}

	pub fn drop_foreign_key(
		&mut self,
		table: impl Into<String>,
		name: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropForeignKey {
			table: table.into(),
			schema,
			name: name.into(),
		})
	}

	pub fn add_unique_constraint<S: AsRef<str>>(
		&mut self,
		table: impl Into<String>,
		columns: &[S],
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::AddUniqueConstraint {
			table: table.into(),
			schema,
			constraint: UniqueConstraintOperation::new(columns),
		})
	}

	pub fn drop_unique_constraint(
		&mut self,
		table: impl Into<String>,
		name: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropUniqueConstraint {
			table: table.into(),
			schema,
			name: name.into(),
		})
	}

	pub fn create_index<S: AsRef<str>>(
		&mut self,
		table: impl Into<String>,
		columns: &[S],
		unique: bool,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::CreateIndex {
			table: table.into(),
			schema,
			name: None,
			columns: to_strings(columns),
			unique,
		})
	}

	pub fn drop_index(&mut self, table: impl Into<String>, name: impl Into<String>) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::DropIndex {
			table: table.into(),
			schema,
			name: name.into(),
		})
	}

	pub fn rename_index(
		&mut self,
		table: impl Into<String>,
		old_name: impl Into<String>,
		new_name: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::RenameIndex {
			table: table.into(),
			schema,
			old_name: old_name.into(),
			new_name: new_name.into(),
		})
	}

	pub fn rename_sequence(
		&mut self,
		old_name: impl Into<String>,
		new_name: impl Into<String>,
	) -> &mut Self {
		let schema = self.schema.clone();
		self.push(Operation::RenameSequence {
			schema,
			old_name: old_name.into(),
			new_name: new_name.into(),
		})
	}

	pub fn sql(&mut self, sql: impl Into<String>) -> &mut Self {
		self.push(Operation::Sql { sql: sql.into() })
	}
}

/// Configures one [`CreateTableOperation`]
#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
	operation: CreateTableOperation,
}

impl CreateTableBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			operation: CreateTableOperation {
				name: name.into(),
				schema: None,
				columns: Vec::new(),
				primary_key: None,
				foreign_keys: Vec::new(),
				unique_constraints: Vec::new(),
			},
		}
	}

	pub fn from_entity(entity: &EntityType) -> Self {
		let mut builder = Self::new(entity.table.clone());
		builder.operation.schema = entity.schema.clone();
		builder.operation.columns = entity.columns.iter().map(ColumnOperation::from).collect();
		let keys: Vec<&str> = entity.key_columns().map(|c| c.name.as_str()).collect();
		if !keys.is_empty() {
			builder.primary_key(keys.as_slice());
		}
		builder
	}

	pub fn column(&mut self, column: ColumnOperation) -> &mut Self {
		self.operation.columns.push(column);
		self
	}

	/// Replace the primary key
	pub fn primary_key<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
		self.operation.primary_key = Some(PrimaryKeyOperation {
			name: None,
			columns: to_strings(columns),
		});
		self
	}

	pub fn foreign_key(&mut self, foreign_key: ForeignKeyOperation) -> &mut Self {
		self.operation.foreign_keys.push(foreign_key);
		self
	}

	pub fn unique<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
		self.operation
			.unique_constraints
			.push(UniqueConstraintOperation::new(columns));
		self
	}

	pub fn unique_named<S: AsRef<str>>(
		&mut self,
		name: impl Into<String>,
		columns: &[S],
	) -> &mut Self {
		self.operation
			.unique_constraints
			.push(UniqueConstraintOperation::new(columns).named(name));
		self
	}

	/// Validate constraint columns against the table's columns
	pub fn build(self) -> Result<CreateTableOperation> {
		let op = &self.operation;
		let missing = |columns: &[String], what: &str| -> Result<()> {
			match columns.iter().find(|c| op.find_column(c).is_none()) {
				Some(column) => Err(MigrationError::SchemaMismatch(format!(
					"{what} of table {} references unknown column {column}",
					op.name
				))),
				None => Ok(()),
			}
		};

		if let Some(primary_key) = &op.primary_key {
			missing(&primary_key.columns, "primary key")?;
		}
		for foreign_key in &op.foreign_keys {
			missing(&foreign_key.columns, "foreign key")?;
			if foreign_key.columns.len() != foreign_key.principal_columns.len() {
				return Err(MigrationError::SchemaMismatch(format!(
					"foreign key {} has {} columns but references {}",
					foreign_key.name_for(&op.name),
					foreign_key.columns.len(),
					foreign_key.principal_columns.len()
				)));
			}
		}
		for unique in &op.unique_constraints {
			missing(&unique.columns, "unique constraint")?;
		}
		Ok(self.operation)
	}
}
