use super::{DatePart, Dialect, PagingStyle, SqlFunction};
use crate::backends::type_mapper::{SqlServerTypeMapper, TypeMapper};
use crate::backends::types::DatabaseType;

static TYPE_MAPPER: SqlServerTypeMapper = SqlServerTypeMapper;

/// SQL Server dialect (`[ident]`, `@pN` parameters, OFFSET/FETCH paging)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::SqlServer
	}

	fn quote_identifier(&self, name: &str) -> String {
		format!("[{}]", name.replace(']', "]]"))
	}

	fn placeholder(&self, index: usize) -> String {
		format!("@p{index}")
	}

	fn paging_style(&self) -> PagingStyle {
		PagingStyle::OffsetFetch
	}

	fn type_mapper(&self) -> &dyn TypeMapper {
		&TYPE_MAPPER
	}

	fn true_literal(&self) -> &'static str {
		"1"
	}

	fn ordinal_collation(&self) -> Option<&'static str> {
		Some("Latin1_General_BIN2")
	}

	fn false_literal(&self) -> &'static str {
		"0"
	}

	fn date_part(&self, part: DatePart, operand: &str) -> String {
		format!("DATEPART({}, {operand})", part.keyword())
	}

	fn concat(&self, left: &str, right: &str) -> String {
		format!("({left} + {right})")
	}

	fn string_literal(&self, value: &str) -> String {
		format!("N'{}'", value.replace('\'', "''"))
	}

	fn bytes_literal(&self, bytes: &[u8]) -> String {
		let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
		format!("0x{hex}")
	}

	fn escape_like(&self, value: &str) -> String {
		value
			.replace('\\', "\\\\")
			.replace('%', "\\%")
			.replace('_', "\\_")
			.replace('[', "\\[")
	}

	fn render_function(&self, function: SqlFunction, args: &[String]) -> String {
		let joined = args.join(", ");
		match function {
			SqlFunction::Trim => format!("LTRIM(RTRIM({joined}))"),
			SqlFunction::Length => format!("LEN({joined})"),
			SqlFunction::Upper => format!("UPPER({joined})"),
			SqlFunction::Lower => format!("LOWER({joined})"),
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
	use crate::backends::types::Value;

	#[test]
	fn test_unicode_string_literal() {
		assert_eq!(
			SqlServerDialect.render_literal(&Value::String("it's".to_string())),
			"N'it''s'"
		);
	}

	#[test]
	fn test_like_escape_includes_bracket() {
		assert_eq!(SqlServerDialect.escape_like("[a]%"), "\\[a]\\%");
	}

	#[test]
	fn test_trim_uses_ltrim_rtrim() {
		assert_eq!(
			SqlServerDialect.render_function(SqlFunction::Trim, &["[Name]".to_string()]),
			"LTRIM(RTRIM([Name]))"
		);
	}
}
