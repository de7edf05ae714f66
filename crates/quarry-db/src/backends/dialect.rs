//! SQL dialects
//!
//! A [`Dialect`] bundles everything that differs between providers when
//! rendering an expression or a statement: identifier quoting, parameter
//! placeholders, literal syntax, LIKE escaping, string concatenation,
//! scalar functions, cast targets and the paging style. Dialects are
//! stateless; [`dialect_for`] hands out process-wide instances.

mod mysql;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use super::type_mapper::{TypeMapper, TypeMappingError};
use super::types::{DatabaseType, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

static SQLSERVER: SqlServerDialect = SqlServerDialect;
static MYSQL: MySqlDialect = MySqlDialect;
static SQLITE: SqliteDialect = SqliteDialect;

/// Shared dialect instance for a database type
///
/// # Examples
///
/// ```
/// use quarry_db::backends::{DatabaseType, dialect_for};
///
/// let dialect = dialect_for(DatabaseType::MySql);
/// assert_eq!(dialect.quote_identifier("User"), "`User`");
/// assert_eq!(dialect.placeholder(1), "?");
/// ```
pub fn dialect_for(database: DatabaseType) -> &'static dyn Dialect {
	match database {
		DatabaseType::SqlServer => &SQLSERVER,
		DatabaseType::MySql => &MYSQL,
		DatabaseType::Sqlite => &SQLITE,
	}
}

/// How a provider expresses row paging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStyle {
	/// `ORDER BY … OFFSET n ROWS FETCH NEXT m ROWS ONLY`; total via a window count
	OffsetFetch,
	/// `LIMIT m OFFSET n`; total via a separate count statement
	Limit,
}

/// Date component extracted by [`SqlFunction::DatePart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePart {
	Year,
	Month,
	Day,
	Hour,
	Minute,
	Second,
}

impl DatePart {
	pub fn keyword(&self) -> &'static str {
		match self {
			DatePart::Year => "year",
			DatePart::Month => "month",
			DatePart::Day => "day",
			DatePart::Hour => "hour",
			DatePart::Minute => "minute",
			DatePart::Second => "second",
		}
	}
}

/// Provider scalar and aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlFunction {
	Upper,
	Lower,
	Trim,
	Length,
	DatePart(DatePart),
	Coalesce,
	Count,
	Sum,
	Max,
	Min,
	Avg,
}

impl SqlFunction {
	pub fn is_aggregate(&self) -> bool {
		matches!(
			self,
			SqlFunction::Count
				| SqlFunction::Sum
				| SqlFunction::Max
				| SqlFunction::Min
				| SqlFunction::Avg
		)
	}
}

/// Provider-specific rendering hooks
pub trait Dialect: Send + Sync + fmt::Debug {
	fn database_type(&self) -> DatabaseType;

	/// Quote a single identifier, escaping the closing quote character
	fn quote_identifier(&self, name: &str) -> String;

	/// Placeholder for the 1-based parameter `index`
	fn placeholder(&self, index: usize) -> String;

	fn paging_style(&self) -> PagingStyle;

	fn type_mapper(&self) -> &dyn TypeMapper;

	fn true_literal(&self) -> &'static str;

	fn false_literal(&self) -> &'static str;

	/// Extract a date component from an already rendered operand
	fn date_part(&self, part: DatePart, operand: &str) -> String;

	/// Concatenate two already rendered string operands
	fn concat(&self, left: &str, right: &str) -> String;

	/// Schema-qualified, quoted table name
	fn quote_table(&self, schema: Option<&str>, table: &str) -> String {
		match schema {
			Some(schema) => format!(
				"{}.{}",
				self.quote_identifier(schema),
				self.quote_identifier(table)
			),
			None => self.quote_identifier(table),
		}
	}

	fn string_literal(&self, value: &str) -> String {
		format!("'{}'", value.replace('\'', "''"))
	}

	fn bytes_literal(&self, bytes: &[u8]) -> String {
		let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
		format!("X'{hex}'")
	}

	/// Render a value inline
	fn render_literal(&self, value: &Value) -> String {
		match value {
			Value::Null => "NULL".to_string(),
			Value::Bool(true) => self.true_literal().to_string(),
			Value::Bool(false) => self.false_literal().to_string(),
			Value::Int(i) => i.to_string(),
			Value::UInt(u) => u.to_string(),
			Value::Float(f) => f.to_string(),
			Value::Decimal(d) => d.to_string(),
			Value::Char(c) => self.string_literal(&c.to_string()),
			Value::String(s) => self.string_literal(s),
			Value::Bytes(b) => self.bytes_literal(b),
			Value::Guid(g) => self.string_literal(&g.to_string()),
			Value::DateTime(dt) => {
				self.string_literal(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
			}
			Value::Date(d) => self.string_literal(&d.format("%Y-%m-%d").to_string()),
			Value::Time(t) => self.string_literal(&t.format("%H:%M:%S%.f").to_string()),
		}
	}

	/// Escape LIKE wildcards in caller data
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::{DatabaseType, dialect_for};
	///
	/// let dialect = dialect_for(DatabaseType::Sqlite);
	/// assert_eq!(dialect.escape_like("50%_off"), "50\\%\\_off");
	/// ```
	fn escape_like(&self, value: &str) -> String {
		value
			.replace('\\', "\\\\")
			.replace('%', "\\%")
			.replace('_', "\\_")
	}

	/// Clause appended after a LIKE pattern, if the provider needs one
	fn like_escape_clause(&self) -> Option<&'static str> {
		Some("ESCAPE '\\'")
	}

	/// Collation making string comparison ordinal; `None` when the default already is
	fn ordinal_collation(&self) -> Option<&'static str> {
		None
	}

	/// Target type name inside `CAST(x AS …)`
	fn cast_type(&self, target: &ValueType) -> Result<String, TypeMappingError> {
		self.type_mapper().get_mapping(target, None, false, None)
	}

	/// Render a function call over already rendered arguments
	fn render_function(&self, function: SqlFunction, args: &[String]) -> String {
		let joined = args.join(", ");
		match function {
			SqlFunction::Upper => format!("UPPER({joined})"),
			SqlFunction::Lower => format!("LOWER({joined})"),
			SqlFunction::Trim => format!("TRIM({joined})"),
			SqlFunction::Length => format!("LENGTH({joined})"),
			SqlFunction::DatePart(part) => self.date_part(part, &joined),
			SqlFunction::Coalesce => format!("COALESCE({joined})"),
			SqlFunction::Count if args.is_empty() => "COUNT(*)".to_string(),
			SqlFunction::Count => format!("COUNT({joined})"),
			SqlFunction::Sum => format!("SUM({joined})"),
			SqlFunction::Max => format!("MAX({joined})"),
			SqlFunction::Min => format!("MIN({joined})"),
			SqlFunction::Avg => format!("AVG({joined})"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(DatabaseType::SqlServer, "[Order]", "@p1")]
	#[case(DatabaseType::MySql, "`Order`", "?")]
	#[case(DatabaseType::Sqlite, "\"Order\"", "?")]
	fn test_quoting_and_placeholders(
		#[case] database: DatabaseType,
		#[case] quoted: &str,
		#[case] placeholder: &str,
	) {
		let dialect = dialect_for(database);
		assert_eq!(dialect.database_type(), database);
		assert_eq!(dialect.quote_identifier("Order"), quoted);
		assert_eq!(dialect.placeholder(1), placeholder);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "[a]]b]")]
	#[case(DatabaseType::MySql, "`a``b`")]
	#[case(DatabaseType::Sqlite, "\"a\"\"b\"")]
	fn test_quote_escapes_closing_character(
		#[case] database: DatabaseType,
		#[case] expected: &str,
	) {
		let name = match database {
			DatabaseType::SqlServer => "a]b",
			DatabaseType::MySql => "a`b",
			DatabaseType::Sqlite => "a\"b",
		};
		assert_eq!(dialect_for(database).quote_identifier(name), expected);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, PagingStyle::OffsetFetch)]
	#[case(DatabaseType::MySql, PagingStyle::Limit)]
	#[case(DatabaseType::Sqlite, PagingStyle::Limit)]
	fn test_paging_style(#[case] database: DatabaseType, #[case] expected: PagingStyle) {
		assert_eq!(dialect_for(database).paging_style(), expected);
	}

	#[rstest]
	fn test_render_literal_escapes_quotes() {
		let dialect = dialect_for(DatabaseType::Sqlite);
		assert_eq!(
			dialect.render_literal(&Value::String("O'Brien".to_string())),
			"'O''Brien'"
		);
		assert_eq!(dialect.render_literal(&Value::Null), "NULL");
		assert_eq!(dialect.render_literal(&Value::Bytes(vec![0xAB, 0x01])), "X'AB01'");
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "LEN(x)")]
	#[case(DatabaseType::MySql, "CHAR_LENGTH(x)")]
	#[case(DatabaseType::Sqlite, "LENGTH(x)")]
	fn test_length_function(#[case] database: DatabaseType, #[case] expected: &str) {
		let rendered =
			dialect_for(database).render_function(SqlFunction::Length, &["x".to_string()]);
		assert_eq!(rendered, expected);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "DATEPART(year, d)")]
	#[case(DatabaseType::MySql, "YEAR(d)")]
	#[case(DatabaseType::Sqlite, "CAST(strftime('%Y', d) AS INTEGER)")]
	fn test_date_part(#[case] database: DatabaseType, #[case] expected: &str) {
		let rendered = dialect_for(database).render_function(
			SqlFunction::DatePart(DatePart::Year),
			&["d".to_string()],
		);
		assert_eq!(rendered, expected);
	}

	#[rstest]
	fn test_count_without_arguments() {
		let rendered = dialect_for(DatabaseType::Sqlite).render_function(SqlFunction::Count, &[]);
		assert_eq!(rendered, "COUNT(*)");
	}
}
