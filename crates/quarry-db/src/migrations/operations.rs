//! Migration operations
//!
//! A closed set of schema changes. [`Operation::CreateTable`] owns its
//! columns and constraints; every other variant addresses an existing table.
//! Constraint names left as `None` get the conventional `PK_`, `FK_`, `UK_`
//! or `IX_` names from the helpers at the bottom of this module.

use crate::backends::types::{Value, ValueType};
use crate::metadata::{ColumnMetadata, DefaultValue, KeyRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOperation {
	pub name: String,
	pub value_type: ValueType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<u32>,
	pub nullable: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<DefaultValue>,
	/// Recorded for the query generator; DDL does not enforce it
	#[serde(default = "default_true")]
	pub is_updatable: bool,
	#[serde(default)]
	pub identity: bool,
	#[serde(default)]
	pub is_row_version: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_unicode: Option<bool>,
}

fn default_true() -> bool {
	true
}

impl ColumnOperation {
	pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
		let nullable = value_type.is_nullable();
		Self {
			name: name.into(),
			value_type,
			size: None,
			nullable,
			default: None,
			is_updatable: true,
			identity: false,
			is_row_version: false,
			is_unicode: None,
		}
	}

	pub fn size(mut self, size: u32) -> Self {
		self.size = Some(size);
		self
	}

	pub fn nullable(mut self, nullable: bool) -> Self {
		self.nullable = nullable;
		self
	}

	pub fn default_value(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(DefaultValue::Value(value.into()));
		self
	}

	pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
		self.default = Some(DefaultValue::Sql(sql.into()));
		self
	}

	pub fn identity(mut self) -> Self {
		self.identity = true;
		self.nullable = false;
		self
	}

	pub fn row_version(mut self) -> Self {
		self.is_row_version = true;
		self.is_updatable = false;
		self
	}

	pub fn unicode(mut self, unicode: bool) -> Self {
		self.is_unicode = Some(unicode);
		self
	}
}

impl From<&ColumnMetadata> for ColumnOperation {
	fn from(column: &ColumnMetadata) -> Self {
		Self {
			name: column.name.clone(),
			value_type: column.value_type.clone(),
			size: column.size,
			nullable: column.nullable && !column.is_key(),
			default: column.default.clone(),
			is_updatable: column.is_updatable,
			identity: column.key_role == KeyRole::Identity,
			is_row_version: column.is_row_version,
			is_unicode: column.is_unicode,
		}
	}
}

/// Action taken on dependent rows when the principal row is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
	#[default]
	NoAction,
	Cascade,
	SetNull,
	Restrict,
}

impl ReferentialAction {
	pub fn as_sql(&self) -> &'static str {
		match self {
			ReferentialAction::NoAction => "NO ACTION",
			ReferentialAction::Cascade => "CASCADE",
			ReferentialAction::SetNull => "SET NULL",
			ReferentialAction::Restrict => "RESTRICT",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyOperation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub columns: Vec<String>,
}

/// Foreign key from the owning table's `columns` to `principal_table`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyOperation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub columns: Vec<String>,
	pub principal_table: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub principal_schema: Option<String>,
	pub principal_columns: Vec<String>,
	#[serde(default)]
	pub on_delete: ReferentialAction,
}

impl ForeignKeyOperation {
	pub fn new<S: AsRef<str>>(
		columns: &[S],
		principal_table: impl Into<String>,
		principal_columns: &[S],
	) -> Self {
		Self {
			name: None,
			columns: to_strings(columns),
			principal_table: principal_table.into(),
			principal_schema: None,
			principal_columns: to_strings(principal_columns),
			on_delete: ReferentialAction::default(),
		}
	}

	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn principal_schema(mut self, schema: impl Into<String>) -> Self {
		self.principal_schema = Some(schema.into());
		self
	}

	pub fn on_delete(mut self, action: ReferentialAction) -> Self {
		self.on_delete = action;
		self
	}

	/// Explicit name, or `FK_{table}_{principal}_{columns}`
	pub fn name_for(&self, table: &str) -> String {
		self.name.clone().unwrap_or_else(|| {
			format!(
				"FK_{table}_{}_{}",
				self.principal_table,
				self.columns.join("_")
			)
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraintOperation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	pub columns: Vec<String>,
}

impl UniqueConstraintOperation {
	pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
		Self {
			name: None,
			columns: to_strings(columns),
		}
	}

	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name_for(&self, table: &str) -> String {
		self.name
			.clone()
			.unwrap_or_else(|| unique_constraint_name(table, &self.columns))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOperation {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schema: Option<String>,
	pub columns: Vec<ColumnOperation>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub primary_key: Option<PrimaryKeyOperation>,
	#[serde(default)]
	pub foreign_keys: Vec<ForeignKeyOperation>,
	#[serde(default)]
	pub unique_constraints: Vec<UniqueConstraintOperation>,
}

impl CreateTableOperation {
	pub fn find_column(&self, name: &str) -> Option<&ColumnOperation> {
		self.columns.iter().find(|c| c.name == name)
	}

	pub fn primary_key_name(&self) -> String {
		self.primary_key
			.as_ref()
			.and_then(|pk| pk.name.clone())
			.unwrap_or_else(|| primary_key_name(&self.name))
	}
}

/// A schema change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
	CreateTable(CreateTableOperation),
	DropTable {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
	},
	AddColumn {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		column: ColumnOperation,
	},
	DropColumn {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		column: String,
	},
	RenameColumn {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		old_name: String,
		new_name: String,
	},
	AddPrimaryKey {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		primary_key: PrimaryKeyOperation,
	},
	DropPrimaryKey {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
	},
	AddForeignKey {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		foreign_key: ForeignKeyOperation,
	},
	DropForeignKey {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		name: String,
	},
	AddUniqueConstraint {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		constraint: UniqueConstraintOperation,
	},
	DropUniqueConstraint {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		name: String,
	},
	CreateIndex {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
		columns: Vec<String>,
		#[serde(default)]
		unique: bool,
	},
	DropIndex {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		name: String,
	},
	RenameIndex {
		table: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		old_name: String,
		new_name: String,
	},
	RenameSequence {
		#[serde(default, skip_serializing_if = "Option::is_none")]
		schema: Option<String>,
		old_name: String,
		new_name: String,
	},
	/// Raw statement, passed through unchanged
	Sql { sql: String },
}

impl Operation {
	/// Variant name, used in error messages and logs
	pub fn kind(&self) -> &'static str {
		match self {
			Operation::CreateTable(_) => "CreateTable",
			Operation::DropTable { .. } => "DropTable",
			Operation::AddColumn { .. } => "AddColumn",
			Operation::DropColumn { .. } => "DropColumn",
			Operation::RenameColumn { .. } => "RenameColumn",
			Operation::AddPrimaryKey { .. } => "AddPrimaryKey",
			Operation::DropPrimaryKey { .. } => "DropPrimaryKey",
			Operation::AddForeignKey { .. } => "AddForeignKey",
			Operation::DropForeignKey { .. } => "DropForeignKey",
			Operation::AddUniqueConstraint { .. } => "AddUniqueConstraint",
			Operation::DropUniqueConstraint { .. } => "DropUniqueConstraint",
			Operation::CreateIndex { .. } => "CreateIndex",
			Operation::DropIndex { .. } => "DropIndex",
			Operation::RenameIndex { .. } => "RenameIndex",
			Operation::RenameSequence { .. } => "RenameSequence",
			Operation::Sql { .. } => "Sql",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Operation::CreateTable(op) => write!(f, "CreateTable {}", op.name),
			Operation::DropTable { table, .. } => write!(f, "DropTable {table}"),
			Operation::AddColumn { table, column, .. } => {
				write!(f, "AddColumn {table}.{}", column.name)
			}
			Operation::DropColumn { table, column, .. } => write!(f, "DropColumn {table}.{column}"),
			Operation::RenameColumn {
				table,
				old_name,
				new_name,
				..
			} => write!(f, "RenameColumn {table}.{old_name} -> {new_name}"),
			Operation::Sql { .. } => f.write_str("Sql"),
			other => f.write_str(other.kind()),
		}
	}
}

pub fn primary_key_name(table: &str) -> String {
	format!("PK_{table}")
}

pub fn unique_constraint_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
	format!("UK_{table}_{}", join(columns))
}

pub fn index_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
	format!("IX_{table}_{}", join(columns))
}

fn join<S: AsRef<str>>(columns: &[S]) -> String {
	columns
		.iter()
		.map(|c| c.as_ref())
		.collect::<Vec<_>>()
		.join("_")
}

pub(crate) fn to_strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
	items.iter().map(|s| s.as_ref().to_string()).collect()
}
