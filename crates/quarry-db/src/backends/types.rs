//! Common type definitions for database abstraction

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use quarry_conf::DatabaseEngine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
	SqlServer,
	MySql,
	Sqlite,
}

impl DatabaseType {
	/// Check if this database type supports transactional DDL
	///
	/// - SQL Server: Supports transactional DDL
	/// - SQLite: Supports transactional DDL
	/// - MySQL/MariaDB: Does NOT support transactional DDL (DDL causes implicit commit)
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::DatabaseType;
	///
	/// assert!(DatabaseType::SqlServer.supports_transactional_ddl());
	/// assert!(DatabaseType::Sqlite.supports_transactional_ddl());
	/// assert!(!DatabaseType::MySql.supports_transactional_ddl());
	/// ```
	pub fn supports_transactional_ddl(&self) -> bool {
		matches!(self, DatabaseType::SqlServer | DatabaseType::Sqlite)
	}
}

impl fmt::Display for DatabaseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DatabaseType::SqlServer => f.write_str("SqlServer"),
			DatabaseType::MySql => f.write_str("MySql"),
			DatabaseType::Sqlite => f.write_str("Sqlite"),
		}
	}
}

impl From<DatabaseEngine> for DatabaseType {
	fn from(engine: DatabaseEngine) -> Self {
		match engine {
			DatabaseEngine::SqlServer => DatabaseType::SqlServer,
			DatabaseEngine::MySql => DatabaseType::MySql,
			DatabaseEngine::Sqlite => DatabaseType::Sqlite,
		}
	}
}

/// Semantic value type of a column or expression
///
/// Providers map these to concrete column types through a
/// [`TypeMapper`](super::TypeMapper). `Nullable` and `Enum` are wrappers:
/// mapping and type comparison look through them with [`ValueType::unwrap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
	Bool,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
	F32,
	F64,
	Decimal,
	Char,
	String,
	Bytes,
	Guid,
	Date,
	Time,
	DateTime,
	DateTimeOffset,
	TimeSpan,
	Nullable(Box<ValueType>),
	Enum {
		name: String,
		underlying: Box<ValueType>,
	},
	/// Untyped slot, e.g. the parameters of a generic equality helper
	Object,
	/// Caller type no provider knows how to store
	Custom(String),
}

impl ValueType {
	/// Wrap this type as nullable (idempotent)
	pub fn nullable(self) -> Self {
		match self {
			ValueType::Nullable(_) => self,
			other => ValueType::Nullable(Box::new(other)),
		}
	}

	/// Enum type stored as its underlying integral type
	pub fn enumeration(name: impl Into<String>, underlying: ValueType) -> Self {
		ValueType::Enum {
			name: name.into(),
			underlying: Box::new(underlying),
		}
	}

	/// Strip nullable and enum wrappers
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::ValueType;
	///
	/// let ty = ValueType::enumeration("Status", ValueType::I32).nullable();
	/// assert_eq!(ty.unwrap(), &ValueType::I32);
	/// ```
	pub fn unwrap(&self) -> &ValueType {
		match self {
			ValueType::Nullable(inner) => inner.unwrap(),
			ValueType::Enum { underlying, .. } => underlying.unwrap(),
			other => other,
		}
	}

	pub fn is_nullable(&self) -> bool {
		match self {
			ValueType::Nullable(_) | ValueType::Object => true,
			ValueType::Enum { underlying, .. } => underlying.is_nullable(),
			_ => false,
		}
	}

	pub fn is_string(&self) -> bool {
		matches!(self.unwrap(), ValueType::String | ValueType::Char)
	}

	pub fn is_bool(&self) -> bool {
		matches!(self.unwrap(), ValueType::Bool)
	}

	pub fn is_temporal(&self) -> bool {
		matches!(
			self.unwrap(),
			ValueType::Date | ValueType::DateTime | ValueType::DateTimeOffset | ValueType::Time
		)
	}

	pub fn is_numeric(&self) -> bool {
		matches!(
			self.unwrap(),
			ValueType::I8
				| ValueType::I16
				| ValueType::I32
				| ValueType::I64
				| ValueType::U8
				| ValueType::U16
				| ValueType::U32
				| ValueType::U64
				| ValueType::F32
				| ValueType::F64
				| ValueType::Decimal
		)
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValueType::Nullable(inner) => write!(f, "{inner}?"),
			ValueType::Enum { name, .. } => f.write_str(name),
			ValueType::Custom(name) => f.write_str(name),
			other => write!(f, "{other:?}"),
		}
	}
}

/// Runtime value bound as a statement parameter or rendered as a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	Decimal(Decimal),
	Char(char),
	String(String),
	Bytes(Vec<u8>),
	Guid(Uuid),
	DateTime(DateTime<Utc>),
	Date(NaiveDate),
	Time(NaiveTime),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Natural semantic type of this value; `Null` has no type of its own
	pub fn value_type(&self) -> ValueType {
		match self {
			Value::Null => ValueType::Object,
			Value::Bool(_) => ValueType::Bool,
			Value::Int(_) => ValueType::I64,
			Value::UInt(_) => ValueType::U64,
			Value::Float(_) => ValueType::F64,
			Value::Decimal(_) => ValueType::Decimal,
			Value::Char(_) => ValueType::Char,
			Value::String(_) => ValueType::String,
			Value::Bytes(_) => ValueType::Bytes,
			Value::Guid(_) => ValueType::Guid,
			Value::DateTime(_) => ValueType::DateTime,
			Value::Date(_) => ValueType::Date,
			Value::Time(_) => ValueType::Time,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i as i64)
	}
}

impl From<u64> for Value {
	fn from(u: u64) -> Self {
		Value::UInt(u)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}

impl From<Decimal> for Value {
	fn from(d: Decimal) -> Self {
		Value::Decimal(d)
	}
}

impl From<Uuid> for Value {
	fn from(u: Uuid) -> Self {
		Value::Guid(u)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(dt: DateTime<Utc>) -> Self {
		Value::DateTime(dt)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Value::Null)
	}
}

/// A generated SQL statement with its positional parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlCommand {
	pub sql: String,
	pub parameters: Vec<Value>,
}

impl SqlCommand {
	/// Statement without parameters
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			parameters: Vec::new(),
		}
	}

	pub fn with_parameters(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
		Self {
			sql: sql.into(),
			parameters,
		}
	}
}

impl fmt::Display for SqlCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.sql)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ValueType::I32.nullable(), ValueType::I32)]
	#[case(ValueType::enumeration("Color", ValueType::U8), ValueType::U8)]
	#[case(ValueType::enumeration("Color", ValueType::I16).nullable(), ValueType::I16)]
	#[case(ValueType::String, ValueType::String)]
	fn test_unwrap_strips_wrappers(#[case] input: ValueType, #[case] expected: ValueType) {
		assert_eq!(input.unwrap(), &expected);
	}

	#[rstest]
	fn test_nullable_is_idempotent() {
		let ty = ValueType::Guid.nullable().nullable();
		assert_eq!(ty, ValueType::Nullable(Box::new(ValueType::Guid)));
	}

	#[rstest]
	fn test_option_into_value() {
		let none: Option<i32> = None;
		assert_eq!(Value::from(none), Value::Null);
		assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
	}

	#[rstest]
	fn test_engine_maps_to_database_type() {
		assert_eq!(
			DatabaseType::from(DatabaseEngine::SqlServer),
			DatabaseType::SqlServer
		);
		assert_eq!(DatabaseType::from(DatabaseEngine::MySql), DatabaseType::MySql);
		assert_eq!(DatabaseType::from(DatabaseEngine::Sqlite), DatabaseType::Sqlite);
	}
}
