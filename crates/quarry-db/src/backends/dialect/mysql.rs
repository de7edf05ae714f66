use super::{DatePart, Dialect, PagingStyle, SqlFunction};
use crate::backends::type_mapper::{MySqlTypeMapper, TypeMapper, TypeMappingError};
use crate::backends::types::{DatabaseType, ValueType};

static TYPE_MAPPER: MySqlTypeMapper = MySqlTypeMapper;

/// MySQL dialect (`` `ident` ``, `?` parameters, LIMIT paging)
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::MySql
	}

	fn quote_identifier(&self, name: &str) -> String {
		format!("`{}`", name.replace('`', "``"))
	}

	fn placeholder(&self, _index: usize) -> String {
		"?".to_string()
	}

	fn paging_style(&self) -> PagingStyle {
		PagingStyle::Limit
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&TYPE_MAPPER
	}

	fn true_literal(&self) -> &'static str {
		"TRUE"
	}

	fn false_literal(&self) -> &'static str {
		"FALSE"
	}

	fn date_part(&self, part: DatePart, operand: &str) -> String {
		format!("{}({operand})", part.keyword().to_ascii_uppercase())
	}

	fn concat(&self, left: &str, right: &str) -> String {
		format!("CONCAT({left}, {right})")
	}

	// Backslash is an escape character inside MySQL string literals
	fn string_literal(&self, value: &str) -> String {
		format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
	}

	// Backslash is already the default LIKE escape
	fn ordinal_collation(&self) -> Option<&'static str> {
		Some("utf8mb4_bin")
	}

	fn like_escape_clause(&self) -> Option<&'static str> {
		None
	}

	fn cast_type(&self, target: &ValueType) -> Result<String, TypeMappingError> {
		let name = match target.unwrap() {
			ValueType::String | ValueType::Char => "CHAR",
			ValueType::Guid => "CHAR(36)",
			ValueType::Bool | ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64 => {
				"SIGNED"
			}
			ValueType::U8 | ValueType::U16 | ValueType::U32 | ValueType::U64 => "UNSIGNED",
			ValueType::F32 | ValueType::F64 => "DOUBLE",
			ValueType::Decimal => "DECIMAL(18, 2)",
			ValueType::Date => "DATE",
			ValueType::Time | ValueType::TimeSpan => "TIME",
			ValueType::DateTime | ValueType::DateTimeOffset => "DATETIME(6)",
			ValueType::Bytes => "BINARY",
			_ => {
				return Err(TypeMappingError::UnsupportedType {
					database: DatabaseType::MySql,
					type_name: target.to_string(),
				});
			}
		};
		Ok(name.to_string())
	}

	fn render_function(&self, function: SqlFunction, args: &[String]) -> String {
		match function {
			SqlFunction::Length => format!("CHAR_LENGTH({})", args.join(", ")),
			SqlFunction::Upper => format!("UPPER({})", args.join(", ")),
			SqlFunction::Lower => format!("LOWER({})", args.join(", ")),
			SqlFunction::Trim => format!("TRIM({})", args.join(", ")),
			SqlFunction::DatePart(part) => self.date_part(part, &args.join(", ")),
			SqlFunction::Coalesce => format!("COALESCE({})", args.join(", ")),
			SqlFunction::Count if args.is_empty() => "COUNT(*)".to_string(),
			SqlFunction::Count => format!("COUNT({})", args.join(", ")),
			SqlFunction::Sum => format!("SUM({})", args.join(", ")),
			SqlFunction::Max => format!("MAX({})", args.join(", ")),
			SqlFunction::Min => format!("MIN({})", args.join(", ")),
			SqlFunction::Avg => format!("AVG({})", args.join(", ")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ValueType::String, "CHAR")]
	#[case(ValueType::I32.nullable(), "SIGNED")]
	#[case(ValueType::U64, "UNSIGNED")]
	#[case(ValueType::DateTime, "DATETIME(6)")]
	fn test_cast_targets(#[case] target: ValueType, #[case] expected: &str) {
		assert_eq!(MySqlDialect.cast_type(&target).unwrap(), expected);
	}

	#[rstest]
	fn test_cast_to_unknown_type_fails() {
		assert!(MySqlDialect.cast_type(&ValueType::Object).is_err());
	}

	#[rstest]
	fn test_string_literal_escapes_backslash() {
		assert_eq!(MySqlDialect.string_literal("a\\b'c"), "'a\\\\b''c'");
	}

	#[rstest]
	fn test_concat_uses_function() {
		assert_eq!(MySqlDialect.concat("a", "b"), "CONCAT(a, b)");
	}
}
