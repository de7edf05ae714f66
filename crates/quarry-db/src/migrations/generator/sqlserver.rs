use super::{DdlRenderer, escape_quotes};
use crate::backends::dialect::{Dialect, dialect_for};
use crate::backends::types::DatabaseType;
use crate::migrations::Result;
use crate::migrations::operations::{ColumnOperation, CreateTableOperation, ReferentialAction};

/// SQL Server DDL
///
/// No `CREATE TABLE IF NOT EXISTS`; creation is guarded by `OBJECT_ID`.
/// Renames go through `sp_rename`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDdl;

impl SqlServerDdl {
	fn sp_rename(&self, object: &str, new_name: &str, kind: &str) -> String {
		format!(
			"EXEC sp_rename N'{}', N'{}', N'{kind}'",
			escape_quotes(object),
			escape_quotes(new_name)
		)
	}
}

impl DdlRenderer for SqlServerDdl {
	fn dialect(&self) -> &'static dyn Dialect {
		dialect_for(DatabaseType::SqlServer)
	}

	fn identity_clause(&self) -> &'static str {
		" IDENTITY(1,1)"
	}

	fn referential_action(&self, action: ReferentialAction) -> &'static str {
		match action {
			// SQL Server spells RESTRICT as NO ACTION
			ReferentialAction::Restrict => ReferentialAction::NoAction.as_sql(),
			other => other.as_sql(),
		}
	}

	fn create_table(&self, op: &CreateTableOperation) -> Result<Vec<String>> {
		let table = self.table(op.schema.as_deref(), &op.name);
		Ok(vec![format!(
			"IF OBJECT_ID(N'{}', N'U') IS NULL CREATE TABLE {table} ({})",
			escape_quotes(&table),
			self.table_elements(op)?.join(", ")
		)])
	}

	fn add_column(&self, table: &str, column: &ColumnOperation) -> Result<String> {
		Ok(format!("ALTER TABLE {table} ADD {}", self.column_definition(column)?))
	}

	fn rename_column(
		&self,
		table: &str,
		_schema: Option<&str>,
		_table_name: &str,
		old_name: &str,
		new_name: &str,
	) -> Result<String> {
		let object = format!("{table}.{}", self.quote(old_name));
		Ok(self.sp_rename(&object, new_name, "COLUMN"))
	}

	fn rename_index(
		&self,
		table: &str,
		_schema: Option<&str>,
		_table_name: &str,
		old_name: &str,
		new_name: &str,
	) -> Result<String> {
		let object = format!("{table}.{}", self.quote(old_name));
		Ok(self.sp_rename(&object, new_name, "INDEX"))
	}

	fn rename_sequence(
		&self,
		schema: Option<&str>,
		old_name: &str,
		new_name: &str,
	) -> Result<String> {
		Ok(self.sp_rename(&self.table(schema, old_name), new_name, "OBJECT"))
	}
}
