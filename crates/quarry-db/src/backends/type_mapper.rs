//! Semantic type to column type-name mapping
//!
//! Each provider owns one stateless mapper. Mapping first strips nullable and
//! enum wrappers, then consults a fixed table. Text and binary are the two
//! parametrized cases: a size selects a bounded column, no size selects the
//! provider's long form.
//!
//! SQL Server and MySQL reject types they cannot store. SQLite stores
//! anything in a `TEXT` column, so unknown types degrade with a warning.

use super::types::{DatabaseType, ValueType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeMappingError {
	#[error("Unsupported type for {database}: {type_name}")]
	UnsupportedType {
		database: DatabaseType,
		type_name: String,
	},
}

/// Maps a semantic type to a provider column type name
pub trait TypeMapper: Send + Sync {
	/// Provider this mapper targets
	fn database_type(&self) -> DatabaseType;

	/// Resolve the column type for `value_type`.
	///
	/// # Arguments
	///
	/// * `value_type` - Semantic type, possibly nullable or enum wrapped
	/// * `size` - Declared maximum length for text and binary columns
	/// * `is_row_version` - Column is an optimistic concurrency token
	/// * `is_unicode` - `Some(false)` requests a non-Unicode text column where supported
	fn get_mapping(
		&self,
		value_type: &ValueType,
		size: Option<u32>,
		is_row_version: bool,
		is_unicode: Option<bool>,
	) -> Result<String, TypeMappingError>;
}

fn unsupported(database: DatabaseType, value_type: &ValueType) -> TypeMappingError {
	TypeMappingError::UnsupportedType {
		database,
		type_name: value_type.to_string(),
	}
}

/// SQL Server column types
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerTypeMapper;

impl TypeMapper for SqlServerTypeMapper {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::SqlServer
	}

	fn get_mapping(
		&self,
		value_type: &ValueType,
		size: Option<u32>,
		is_row_version: bool,
		is_unicode: Option<bool>,
	) -> Result<String, TypeMappingError> {
		if is_row_version {
			return Ok("rowversion".to_string());
		}
		let ty = value_type.unwrap();
		let mapped = match ty {
			ValueType::Bool => "bit",
			ValueType::I8 | ValueType::U8 => "tinyint",
			ValueType::I16 => "smallint",
			ValueType::I32 | ValueType::U16 => "int",
			ValueType::I64 | ValueType::U32 => "bigint",
			ValueType::U64 => "decimal(20, 0)",
			ValueType::F32 => "real",
			ValueType::F64 => "float",
			ValueType::Decimal => "decimal(18, 2)",
			ValueType::Char => "nchar(1)",
			ValueType::Guid => "uniqueidentifier",
			ValueType::Date => "date",
			ValueType::Time | ValueType::TimeSpan => "time",
			ValueType::DateTime => "datetime2",
			ValueType::DateTimeOffset => "datetimeoffset",
			ValueType::String => {
				let prefix = if is_unicode == Some(false) {
					"varchar"
				} else {
					"nvarchar"
				};
				return Ok(match size {
					Some(n) => format!("{prefix}({n})"),
					None => format!("{prefix}(max)"),
				});
			}
			ValueType::Bytes => {
				return Ok(match size {
					Some(n) => format!("varbinary({n})"),
					None => "varbinary(max)".to_string(),
				});
			}
			_ => return Err(unsupported(self.database_type(), value_type)),
		};
		Ok(mapped.to_string())
	}
}

/// MySQL column types
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlTypeMapper;

impl TypeMapper for MySqlTypeMapper {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::MySql
	}

	fn get_mapping(
		&self,
		value_type: &ValueType,
		size: Option<u32>,
		is_row_version: bool,
		_is_unicode: Option<bool>,
	) -> Result<String, TypeMappingError> {
		if is_row_version {
			return Ok("timestamp(6)".to_string());
		}
		let mapped = match value_type.unwrap() {
			ValueType::Bool => "bit",
			ValueType::I8 => "tinyint",
			ValueType::U8 => "tinyint unsigned",
			ValueType::I16 => "smallint",
			ValueType::U16 => "smallint unsigned",
			ValueType::I32 => "int",
			ValueType::U32 => "int unsigned",
			ValueType::I64 => "bigint",
			ValueType::U64 => "bigint unsigned",
			ValueType::F32 => "float",
			ValueType::F64 => "double",
			ValueType::Decimal => "decimal(18, 2)",
			ValueType::Char => "char(1)",
			ValueType::Guid => "char(36)",
			ValueType::Date => "date",
			ValueType::Time | ValueType::TimeSpan => "time",
			ValueType::DateTime | ValueType::DateTimeOffset => "datetime(6)",
			ValueType::String => {
				return Ok(match size {
					Some(n) => format!("varchar({n})"),
					None => "longtext".to_string(),
				});
			}
			ValueType::Bytes => {
				return Ok(match size {
					Some(n) => format!("varbinary({n})"),
					None => "longblob".to_string(),
				});
			}
			_ => return Err(unsupported(self.database_type(), value_type)),
		};
		Ok(mapped.to_string())
	}
}

/// SQLite storage classes
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypeMapper;

impl TypeMapper for SqliteTypeMapper {
	fn database_type(&self) -> DatabaseType {
		DatabaseType::Sqlite
	}

	fn get_mapping(
		&self,
		value_type: &ValueType,
		_size: Option<u32>,
		is_row_version: bool,
		_is_unicode: Option<bool>,
	) -> Result<String, TypeMappingError> {
		if is_row_version {
			return Ok("BLOB".to_string());
		}
		let mapped = match value_type.unwrap() {
			ValueType::Bool
			| ValueType::I8
			| ValueType::I16
			| ValueType::I32
			| ValueType::I64
			| ValueType::U8
			| ValueType::U16
			| ValueType::U32
			| ValueType::U64 => "INTEGER",
			ValueType::F32 | ValueType::F64 => "REAL",
			ValueType::Decimal => "NUMERIC",
			ValueType::Bytes => "BLOB",
			ValueType::Char
			| ValueType::String
			| ValueType::Guid
			| ValueType::Date
			| ValueType::Time
			| ValueType::TimeSpan
			| ValueType::DateTime
			| ValueType::DateTimeOffset => "TEXT",
			other => {
				tracing::warn!(
					value_type = %other,
					"No SQLite mapping for type, storing as TEXT"
				);
				"TEXT"
			}
		};
		Ok(mapped.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const ALL_SUPPORTED: &[ValueType] = &[
		ValueType::Bool,
		ValueType::I8,
		ValueType::I16,
		ValueType::I32,
		ValueType::I64,
		ValueType::U8,
		ValueType::U16,
		ValueType::U32,
		ValueType::U64,
		ValueType::F32,
		ValueType::F64,
		ValueType::Decimal,
		ValueType::Char,
		ValueType::String,
		ValueType::Bytes,
		ValueType::Guid,
		ValueType::Date,
		ValueType::Time,
		ValueType::DateTime,
		ValueType::DateTimeOffset,
		ValueType::TimeSpan,
	];

	fn mappers() -> Vec<Box<dyn TypeMapper>> {
		vec![
			Box::new(SqlServerTypeMapper),
			Box::new(MySqlTypeMapper),
			Box::new(SqliteTypeMapper),
		]
	}

	#[rstest]
	fn test_every_supported_type_maps_to_non_empty_name() {
		for mapper in mappers() {
			for ty in ALL_SUPPORTED {
				for size in [None, Some(64)] {
					let mapped = mapper.get_mapping(ty, size, false, None).unwrap();
					assert!(
						!mapped.is_empty(),
						"{} produced empty mapping for {ty}",
						mapper.database_type()
					);
				}
			}
		}
	}

	#[rstest]
	#[case(Box::new(SqlServerTypeMapper) as Box<dyn TypeMapper>, "nvarchar(64)", "nvarchar(max)")]
	#[case(Box::new(MySqlTypeMapper) as Box<dyn TypeMapper>, "varchar(64)", "longtext")]
	#[case(Box::new(SqliteTypeMapper) as Box<dyn TypeMapper>, "TEXT", "TEXT")]
	fn test_string_sized_and_unsized(
		#[case] mapper: Box<dyn TypeMapper>,
		#[case] sized: &str,
		#[case] unsized_name: &str,
	) {
		// Act
		let bounded = mapper
			.get_mapping(&ValueType::String, Some(64), false, None)
			.unwrap();
		let long = mapper
			.get_mapping(&ValueType::String, None, false, None)
			.unwrap();

		// Assert
		assert_eq!(bounded, sized);
		assert_eq!(long, unsized_name);
	}

	#[rstest]
	#[case(Box::new(SqlServerTypeMapper) as Box<dyn TypeMapper>, "varbinary(16)", "varbinary(max)")]
	#[case(Box::new(MySqlTypeMapper) as Box<dyn TypeMapper>, "varbinary(16)", "longblob")]
	#[case(Box::new(SqliteTypeMapper) as Box<dyn TypeMapper>, "BLOB", "BLOB")]
	fn test_bytes_sized_and_unsized(
		#[case] mapper: Box<dyn TypeMapper>,
		#[case] sized: &str,
		#[case] unsized_name: &str,
	) {
		assert_eq!(
			mapper
				.get_mapping(&ValueType::Bytes, Some(16), false, None)
				.unwrap(),
			sized
		);
		assert_eq!(
			mapper
				.get_mapping(&ValueType::Bytes, None, false, None)
				.unwrap(),
			unsized_name
		);
	}

	#[rstest]
	fn test_non_unicode_string_on_sqlserver() {
		let mapped = SqlServerTypeMapper
			.get_mapping(&ValueType::String, Some(10), false, Some(false))
			.unwrap();
		assert_eq!(mapped, "varchar(10)");
	}

	#[rstest]
	fn test_wrappers_are_unwrapped_before_lookup() {
		// Arrange
		let ty = ValueType::enumeration("Status", ValueType::I16).nullable();

		// Act
		let mapped = MySqlTypeMapper.get_mapping(&ty, None, false, None).unwrap();

		// Assert
		assert_eq!(mapped, "smallint");
	}

	#[rstest]
	fn test_row_version_overrides_value_type() {
		assert_eq!(
			SqlServerTypeMapper
				.get_mapping(&ValueType::Bytes, None, true, None)
				.unwrap(),
			"rowversion"
		);
	}

	#[rstest]
	#[case(Box::new(SqlServerTypeMapper) as Box<dyn TypeMapper>)]
	#[case(Box::new(MySqlTypeMapper) as Box<dyn TypeMapper>)]
	fn test_strict_providers_reject_unknown_types(#[case] mapper: Box<dyn TypeMapper>) {
		// Act
		let result = mapper.get_mapping(&ValueType::Custom("Point".to_string()), None, false, None);

		// Assert
		assert_eq!(
			result,
			Err(TypeMappingError::UnsupportedType {
				database: mapper.database_type(),
				type_name: "Point".to_string(),
			})
		);
	}

	#[rstest]
	fn test_sqlite_degrades_unknown_type_to_text() {
		let mapped = SqliteTypeMapper
			.get_mapping(&ValueType::Custom("Point".to_string()), None, false, None)
			.unwrap();
		assert_eq!(mapped, "TEXT");
	}
}
