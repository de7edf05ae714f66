//! Entity metadata
//!
//! Ordered column descriptions supplied by the entity-metadata collaborator.
//! The migration builder turns them into table operations and the query
//! generator uses them for insert and update statements.

use crate::backends::types::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// Role a column plays in the table key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
	#[default]
	None,
	/// Member of the primary key, value supplied by the caller
	PrimaryKey,
	/// Primary key generated by the database
	Identity,
}

/// Column default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
	/// Constant rendered as a literal
	Value(Value),
	/// Raw SQL expression, e.g. `CURRENT_TIMESTAMP`
	Sql(String),
}

/// One column of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
	pub name: String,
	pub value_type: ValueType,
	pub size: Option<u32>,
	pub nullable: bool,
	/// `false` when the column is written on insert only
	pub is_updatable: bool,
	pub key_role: KeyRole,
	pub default: Option<DefaultValue>,
	pub is_row_version: bool,
	pub is_unicode: Option<bool>,
}

impl ColumnMetadata {
	/// Column with nullability taken from `value_type`
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::ValueType;
	/// use quarry_db::metadata::ColumnMetadata;
	///
	/// let name = ColumnMetadata::new("Name", ValueType::String).size(64);
	/// assert_eq!(name.size, Some(64));
	/// assert!(!name.nullable);
	/// ```
	pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
		let nullable = value_type.is_nullable();
		Self {
			name: name.into(),
			value_type,
			size: None,
			nullable,
			is_updatable: true,
			key_role: KeyRole::None,
			default: None,
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

	pub fn primary_key(mut self) -> Self {
		self.key_role = KeyRole::PrimaryKey;
		self
	}

	pub fn identity(mut self) -> Self {
		self.key_role = KeyRole::Identity;
		self
	}

	pub fn not_updatable(mut self) -> Self {
		self.is_updatable = false;
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

	pub fn row_version(mut self) -> Self {
		self.is_row_version = true;
		self.is_updatable = false;
		self
	}

	pub fn unicode(mut self, unicode: bool) -> Self {
		self.is_unicode = Some(unicode);
		self
	}

	pub fn is_key(&self) -> bool {
		self.key_role != KeyRole::None
	}
}

/// Table-level description of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
	pub table: String,
	pub schema: Option<String>,
	pub columns: Vec<ColumnMetadata>,
}

impl EntityType {
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			schema: None,
			columns: Vec::new(),
		}
	}

	pub fn schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn column(mut self, column: ColumnMetadata) -> Self {
		self.columns.push(column);
		self
	}

	pub fn find_column(&self, name: &str) -> Option<&ColumnMetadata> {
		self.columns.iter().find(|c| c.name == name)
	}

	/// Key columns in declaration order
	pub fn key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
		self.columns.iter().filter(|c| c.is_key())
	}

	pub fn identity_column(&self) -> Option<&ColumnMetadata> {
		self.columns.iter().find(|c| c.key_role == KeyRole::Identity)
	}
}
