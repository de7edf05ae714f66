use super::DdlRenderer;
use crate::backends::dialect::{Dialect, dialect_for};
use crate::backends::types::DatabaseType;
use crate::migrations::Result;
use crate::migrations::operations::{
	CreateTableOperation, ForeignKeyOperation, PrimaryKeyOperation, UniqueConstraintOperation,
};

/// SQLite DDL
///
/// `ALTER TABLE` cannot add or drop constraints, so those operations are
/// rejected. Unique constraints added after creation become unique indexes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDdl;

impl SqliteDdl {
	/// Identity column that is the whole primary key, rendered inline
	fn rowid_alias<'a>(&self, op: &'a CreateTableOperation) -> Option<&'a str> {
		let primary_key = op.primary_key.as_ref()?;
		match primary_key.columns.as_slice() {
			[only] => op
				.find_column(only)
				.filter(|c| c.identity)
				.map(|c| c.name.as_str()),
			_ => None,
		}
	}
}

impl DdlRenderer for SqliteDdl {
	fn dialect(&self) -> &'static dyn Dialect {
		dialect_for(DatabaseType::Sqlite)
	}

	// AUTOINCREMENT is only valid on an inline INTEGER PRIMARY KEY
	fn identity_clause(&self) -> &'static str {
		""
	}

	fn nullable_clause(&self) -> &'static str {
		""
	}

	fn create_table(&self, op: &CreateTableOperation) -> Result<Vec<String>> {
		let Some(alias) = self.rowid_alias(op) else {
			return Ok(vec![format!(
				"CREATE TABLE IF NOT EXISTS {} ({})",
				self.table(op.schema.as_deref(), &op.name),
				self.table_elements(op)?.join(", ")
			)]);
		};

		let mut elements = Vec::with_capacity(op.columns.len());
		for column in &op.columns {
			if column.name == alias {
				elements.push(format!(
					"{} INTEGER PRIMARY KEY AUTOINCREMENT",
					self.quote(&column.name)
				));
			} else {
				elements.push(self.column_definition(column)?);
			}
		}
		for foreign_key in &op.foreign_keys {
			elements.push(self.foreign_key_constraint(&op.name, foreign_key));
		}
		for unique in &op.unique_constraints {
			elements.push(self.unique_constraint(&op.name, unique));
		}
		Ok(vec![format!(
			"CREATE TABLE IF NOT EXISTS {} ({})",
			self.table(op.schema.as_deref(), &op.name),
			elements.join(", ")
		)])
	}

	fn add_primary_key(
		&self,
		_table: &str,
		_name: &str,
		_primary_key: &PrimaryKeyOperation,
	) -> Result<String> {
		Err(self.unsupported("AddPrimaryKey"))
	}

	fn drop_primary_key(&self, _table: &str, _name: &str) -> Result<String> {
		Err(self.unsupported("DropPrimaryKey"))
	}

	fn add_foreign_key(
		&self,
		_table: &str,
		_table_name: &str,
		_foreign_key: &ForeignKeyOperation,
	) -> Result<String> {
		Err(self.unsupported("AddForeignKey"))
	}

	fn drop_foreign_key(&self, _table: &str, _name: &str) -> Result<String> {
		Err(self.unsupported("DropForeignKey"))
	}

	fn add_unique_constraint(
		&self,
		table: &str,
		table_name: &str,
		unique: &UniqueConstraintOperation,
	) -> Result<String> {
		self.create_index(table, &unique.name_for(table_name), &unique.columns, true)
	}

	fn drop_unique_constraint(&self, table: &str, name: &str) -> Result<String> {
		self.drop_index(table, name)
	}

	fn create_index(
		&self,
		table: &str,
		name: &str,
		columns: &[String],
		unique: bool,
	) -> Result<String> {
		Ok(format!(
			"CREATE {}INDEX IF NOT EXISTS {} ON {table} ({})",
			if unique { "UNIQUE " } else { "" },
			self.quote(name),
			self.column_list(columns)
		))
	}

	fn drop_index(&self, _table: &str, name: &str) -> Result<String> {
		Ok(format!("DROP INDEX IF EXISTS {}", self.quote(name)))
	}

	fn rename_index(
		&self,
		_table: &str,
		_schema: Option<&str>,
		_table_name: &str,
		_old_name: &str,
		_new_name: &str,
	) -> Result<String> {
		Err(self.unsupported("RenameIndex"))
	}

	fn rename_sequence(
		&self,
		_schema: Option<&str>,
		_old_name: &str,
		_new_name: &str,
	) -> Result<String> {
		Err(self.unsupported("RenameSequence"))
	}
}
