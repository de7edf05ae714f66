use super::{DdlRenderer, standard_column_definition};
use crate::backends::dialect::{Dialect, dialect_for};
use crate::backends::types::DatabaseType;
use crate::migrations::Result;
use crate::migrations::operations::ColumnOperation;

/// MySQL DDL
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDdl;

impl DdlRenderer for MySqlDdl {
	fn dialect(&self) -> &'static dyn Dialect {
		dialect_for(DatabaseType::MySql)
	}

	fn identity_clause(&self) -> &'static str {
		" AUTO_INCREMENT"
	}

	fn column_definition(&self, column: &ColumnOperation) -> Result<String> {
		let mut sql = standard_column_definition(self, column)?;
		if column.is_row_version && column.default.is_none() {
			sql.push_str(" DEFAULT CURRENT_TIMESTAMP(6) ON UPDATE CURRENT_TIMESTAMP(6)");
		}
		Ok(sql)
	}

	fn drop_primary_key(&self, table: &str, _name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP PRIMARY KEY"))
	}

	fn drop_foreign_key(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP FOREIGN KEY {}", self.quote(name)))
	}

	fn drop_unique_constraint(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP INDEX {}", self.quote(name)))
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
