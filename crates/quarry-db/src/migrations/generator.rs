//! DDL generation
//!
//! [`MigrationsSqlGenerator`] turns [`Operation`]s into statements through a
//! per-dialect [`DdlRenderer`]. The trait's provided methods render the
//! ANSI-ish forms shared by most providers; each dialect overrides what it
//! spells differently and rejects what it cannot express.

mod mysql;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlDdl;
pub use sqlite::SqliteDdl;
pub use sqlserver::SqlServerDdl;

use super::operations::{
	ColumnOperation, CreateTableOperation, ForeignKeyOperation, Operation, PrimaryKeyOperation,
	ReferentialAction, UniqueConstraintOperation, index_name, primary_key_name,
};
use super::{MigrationError, Result};
use crate::backends::dialect::Dialect;
use crate::backends::types::{DatabaseType, SqlCommand};
use crate::metadata::DefaultValue;
use std::fmt;

static SQLSERVER: SqlServerDdl = SqlServerDdl;
static MYSQL: MySqlDdl = MySqlDdl;
static SQLITE: SqliteDdl = SqliteDdl;

/// Renders individual operations for one dialect
pub trait DdlRenderer: Send + Sync + fmt::Debug {
	fn dialect(&self) -> &'static dyn Dialect;

	fn database_type(&self) -> DatabaseType {
		self.dialect().database_type()
	}

	fn unsupported(&self, operation: &str) -> MigrationError {
		MigrationError::UnsupportedOperation {
			operation: operation.to_string(),
			database: self.database_type(),
		}
	}

	fn quote(&self, identifier: &str) -> String {
		self.dialect().quote_identifier(identifier)
	}

	fn table(&self, schema: Option<&str>, table: &str) -> String {
		self.dialect().quote_table(schema, table)
	}

	fn column_list(&self, columns: &[String]) -> String {
		columns
			.iter()
			.map(|c| self.quote(c))
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// Appended to identity columns
	fn identity_clause(&self) -> &'static str;

	/// Written after a nullable column's type
	fn nullable_clause(&self) -> &'static str {
		" NULL"
	}

	fn column_type(&self, column: &ColumnOperation) -> Result<String> {
		Ok(self.dialect().type_mapper().get_mapping(
			&column.value_type,
			column.size,
			column.is_row_version,
			column.is_unicode,
		)?)
	}

	fn default_clause(&self, default: &DefaultValue) -> String {
		match default {
			DefaultValue::Value(value) => {
				format!(" DEFAULT {}", self.dialect().render_literal(value))
			}
			DefaultValue::Sql(sql) => format!(" DEFAULT {sql}"),
		}
	}

	fn column_definition(&self, column: &ColumnOperation) -> Result<String> {
		standard_column_definition(self, column)
	}

	fn referential_action(&self, action: ReferentialAction) -> &'static str {
		action.as_sql()
	}

	fn primary_key_constraint(&self, name: &str, primary_key: &PrimaryKeyOperation) -> String {
		format!(
			"CONSTRAINT {} PRIMARY KEY ({})",
			self.quote(name),
			self.column_list(&primary_key.columns)
		)
	}

	fn foreign_key_constraint(&self, table: &str, foreign_key: &ForeignKeyOperation) -> String {
		format!(
			"CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
			self.quote(&foreign_key.name_for(table)),
			self.column_list(&foreign_key.columns),
			self.table(
				foreign_key.principal_schema.as_deref(),
				&foreign_key.principal_table
			),
			self.column_list(&foreign_key.principal_columns),
			self.referential_action(foreign_key.on_delete)
		)
	}

	fn unique_constraint(&self, table: &str, unique: &UniqueConstraintOperation) -> String {
		format!(
			"CONSTRAINT {} UNIQUE ({})",
			self.quote(&unique.name_for(table)),
			self.column_list(&unique.columns)
		)
	}

	/// Column definitions followed by table constraints
	fn table_elements(&self, op: &CreateTableOperation) -> Result<Vec<String>> {
		let mut elements = op
			.columns
			.iter()
			.map(|c| self.column_definition(c))
			.collect::<Result<Vec<_>>>()?;
		if let Some(primary_key) = &op.primary_key {
			elements.push(self.primary_key_constraint(&op.primary_key_name(), primary_key));
		}
		for foreign_key in &op.foreign_keys {
			elements.push(self.foreign_key_constraint(&op.name, foreign_key));
		}
		for unique in &op.unique_constraints {
			elements.push(self.unique_constraint(&op.name, unique));
		}
		Ok(elements)
	}

	fn create_table(&self, op: &CreateTableOperation) -> Result<Vec<String>> {
		Ok(vec![format!(
			"CREATE TABLE IF NOT EXISTS {} ({})",
			self.table(op.schema.as_deref(), &op.name),
			self.table_elements(op)?.join(", ")
		)])
	}

	fn drop_table(&self, table: &str) -> Result<String> {
		Ok(format!("DROP TABLE IF EXISTS {table}"))
	}

	fn add_column(&self, table: &str, column: &ColumnOperation) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} ADD COLUMN {}",
			self.column_definition(column)?
		))
	}

	fn drop_column(&self, table: &str, column: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP COLUMN {}", self.quote(column)))
	}

	/// `table` is quoted, `schema`/`table_name` are raw for procedures that need them
	fn rename_column(
		&self,
		table: &str,
		_schema: Option<&str>,
		_table_name: &str,
		old_name: &str,
		new_name: &str,
	) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} RENAME COLUMN {} TO {}",
			self.quote(old_name),
			self.quote(new_name)
		))
	}

	fn add_primary_key(
		&self,
		table: &str,
		name: &str,
		primary_key: &PrimaryKeyOperation,
	) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} ADD {}",
			self.primary_key_constraint(name, primary_key)
		))
	}

	fn drop_primary_key(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP CONSTRAINT {}", self.quote(name)))
	}

	fn add_foreign_key(
		&self,
		table: &str,
		table_name: &str,
		foreign_key: &ForeignKeyOperation,
	) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} ADD {}",
			self.foreign_key_constraint(table_name, foreign_key)
		))
	}

	fn drop_foreign_key(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP CONSTRAINT {}", self.quote(name)))
	}

	fn add_unique_constraint(
		&self,
		table: &str,
		table_name: &str,
		unique: &UniqueConstraintOperation,
	) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} ADD {}",
			self.unique_constraint(table_name, unique)
		))
	}

	fn drop_unique_constraint(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("ALTER TABLE {table} DROP CONSTRAINT {}", self.quote(name)))
	}

	fn create_index(
		&self,
		table: &str,
		name: &str,
		columns: &[String],
		unique: bool,
	) -> Result<String> {
		Ok(format!(
			"CREATE {}INDEX {} ON {table} ({})",
			if unique { "UNIQUE " } else { "" },
			self.quote(name),
			self.column_list(columns)
		))
	}

	fn drop_index(&self, table: &str, name: &str) -> Result<String> {
		Ok(format!("DROP INDEX {} ON {table}", self.quote(name)))
	}

	fn rename_index(
		&self,
		table: &str,
		_schema: Option<&str>,
		_table_name: &str,
		old_name: &str,
		new_name: &str,
	) -> Result<String> {
		Ok(format!(
			"ALTER TABLE {table} RENAME INDEX {} TO {}",
			self.quote(old_name),
			self.quote(new_name)
		))
	}

	fn rename_sequence(
		&self,
		schema: Option<&str>,
		old_name: &str,
		new_name: &str,
	) -> Result<String>;
}

/// `"Name" type [identity] NULL|NOT NULL [DEFAULT …]`
pub fn standard_column_definition<R: DdlRenderer + ?Sized>(
	renderer: &R,
	column: &ColumnOperation,
) -> Result<String> {
	let mut sql = format!(
		"{} {}",
		renderer.quote(&column.name),
		renderer.column_type(column)?
	);
	if column.identity {
		sql.push_str(renderer.identity_clause());
	}
	sql.push_str(if column.nullable {
		renderer.nullable_clause()
	} else {
		" NOT NULL"
	});
	if let Some(default) = &column.default {
		sql.push_str(&renderer.default_clause(default));
	}
	Ok(sql)
}

/// Double single quotes for embedding in a string literal
pub(crate) fn escape_quotes(value: &str) -> String {
	value.replace('\'', "''")
}

/// Generates migration DDL for one dialect
///
/// # Examples
///
/// ```
/// use quarry_db::backends::DatabaseType;
/// use quarry_db::migrations::{MigrationBuilder, MigrationError, MigrationsSqlGenerator};
///
/// let mut builder = MigrationBuilder::new();
/// builder.rename_column("User", "Name", "FullName");
///
/// let mysql = MigrationsSqlGenerator::new(DatabaseType::MySql);
/// let commands = mysql.generate(builder.operations()).unwrap();
/// assert_eq!(commands[0].sql, "ALTER TABLE `User` RENAME COLUMN `Name` TO `FullName`");
///
/// let mut builder = MigrationBuilder::new();
/// builder.rename_sequence("OrderNumbers", "InvoiceNumbers");
/// assert!(matches!(
///     mysql.generate(builder.operations()),
///     Err(MigrationError::UnsupportedOperation { .. })
/// ));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MigrationsSqlGenerator {
	renderer: &'static dyn DdlRenderer,
}

impl MigrationsSqlGenerator {
	pub fn new(database: DatabaseType) -> Self {
		let renderer: &'static dyn DdlRenderer = match database {
			DatabaseType::SqlServer => &SQLSERVER,
			DatabaseType::MySql => &MYSQL,
			DatabaseType::Sqlite => &SQLITE,
		};
		Self { renderer }
	}

	pub fn database_type(&self) -> DatabaseType {
		self.renderer.database_type()
	}

	pub fn renderer(&self) -> &'static dyn DdlRenderer {
		self.renderer
	}

	/// Statements for `operations`, in order
	///
	/// Fails on the first operation the dialect cannot express or whose
	/// column types it cannot map; no partial output is returned.
	pub fn generate(&self, operations: &[Operation]) -> Result<Vec<SqlCommand>> {
		let mut statements = Vec::with_capacity(operations.len());
		for operation in operations {
			self.render(operation, &mut statements)?;
		}
		for sql in &statements {
			tracing::debug!(database = %self.database_type(), sql = %sql, "Generated DDL");
		}
		Ok(statements.into_iter().map(SqlCommand::new).collect())
	}

	fn render(&self, operation: &Operation, out: &mut Vec<String>) -> Result<()> {
		let r = self.renderer;
		let sql = match operation {
			Operation::CreateTable(op) => {
				out.extend(r.create_table(op)?);
				return Ok(());
			}
			Operation::Sql { sql } => sql.clone(),
			Operation::DropTable { table, schema } => {
				r.drop_table(&r.table(schema.as_deref(), table))?
			}
			Operation::AddColumn {
				table,
				schema,
				column,
			} => r.add_column(&r.table(schema.as_deref(), table), column)?,
			Operation::DropColumn {
				table,
				schema,
				column,
			} => r.drop_column(&r.table(schema.as_deref(), table), column)?,
			Operation::RenameColumn {
				table,
				schema,
				old_name,
				new_name,
			} => r.rename_column(
				&r.table(schema.as_deref(), table),
				schema.as_deref(),
				table,
				old_name,
				new_name,
			)?,
			Operation::AddPrimaryKey {
				table,
				schema,
				primary_key,
			} => {
				let name = primary_key
					.name
					.clone()
					.unwrap_or_else(|| primary_key_name(table));
				r.add_primary_key(&r.table(schema.as_deref(), table), &name, primary_key)?
			}
			Operation::DropPrimaryKey {
				table,
				schema,
				name,
			} => {
				let name = name.clone().unwrap_or_else(|| primary_key_name(table));
				r.drop_primary_key(&r.table(schema.as_deref(), table), &name)?
			}
			Operation::AddForeignKey {
				table,
				schema,
				foreign_key,
			} => r.add_foreign_key(&r.table(schema.as_deref(), table), table, foreign_key)?,
			Operation::DropForeignKey {
				table,
				schema,
				name,
			} => r.drop_foreign_key(&r.table(schema.as_deref(), table), name)?,
			Operation::AddUniqueConstraint {
				table,
				schema,
				constraint,
			} => r.add_unique_constraint(&r.table(schema.as_deref(), table), table, constraint)?,
			Operation::DropUniqueConstraint {
				table,
				schema,
				name,
			} => r.drop_unique_constraint(&r.table(schema.as_deref(), table), name)?,
			Operation::CreateIndex {
				table,
				schema,
				name,
				columns,
				unique,
			} => {
				let name = name.clone().unwrap_or_else(|| index_name(table, columns));
				r.create_index(&r.table(schema.as_deref(), table), &name, columns, *unique)?
			}
			Operation::DropIndex {
				table,
				schema,
				name,
			} => r.drop_index(&r.table(schema.as_deref(), table), name)?,
			Operation::RenameIndex {
				table,
				schema,
				old_name,
				new_name,
			} => r.rename_index(
				&r.table(schema.as_deref(), table),
				schema.as_deref(),
				table,
				old_name,
				new_name,
			)?,
			Operation::RenameSequence {
				schema,
				old_name,
				new_name,
			} => r.rename_sequence(schema.as_deref(), old_name, new_name)?,
		};
		out.push(sql);
		Ok(())
	}
}
