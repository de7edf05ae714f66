use super::{DatePart, Dialect, PagingStyle};
use crate::backends::type_mapper::{SqliteTypeMapper, TypeMapper};
use crate::backends::types::DatabaseType;

static TYPE_MAPPER: SqliteTypeMapper = SqliteTypeMapper;

/// SQLite dialect (`"ident"`, `?` parameters, LIMIT paging)
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
	}

	fn quote_identifier(&self, name: &str) -> String {
		format!("\"{}\"", name.replace('"', "\"\""))
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
		"1"
	}

	fn false_literal(&self) -> &'static str {
		"0"
	}

	fn date_part(&self, part: DatePart, operand: &str) -> String {
		let format = match part {
			DatePart::Year => "%Y",
			DatePart::Month => "%m",
			DatePart::Day => "%d",
			DatePart::Hour => "%H",
			DatePart::Minute => "%M",
			DatePart::Second => "%S",
		};
		format!("CAST(strftime('{format}', {operand}) AS INTEGER)")
	}

	fn concat(&self, left: &str, right: &str) -> String {
		format!("({left} || {right})")
	}
}
