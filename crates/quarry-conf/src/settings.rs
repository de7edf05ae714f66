//! Settings loading and validation

mod database_config;
mod error;

pub use database_config::{DatabaseEngine, DatabaseSettings};
pub use error::SettingsError;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `database.engine`
pub const ENV_DATABASE_ENGINE: &str = "QUARRY_DATABASE_ENGINE";
/// Environment variable overriding `database.url`
pub const ENV_DATABASE_URL: &str = "QUARRY_DATABASE_URL";
/// Environment variable overriding `migrations.ledger_table`
pub const ENV_LEDGER_TABLE: &str = "QUARRY_LEDGER_TABLE";
/// Environment variable overriding `query.default_page_size`
pub const ENV_DEFAULT_PAGE_SIZE: &str = "QUARRY_DEFAULT_PAGE_SIZE";

static PLAIN_IDENTIFIER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Top-level settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub database: DatabaseSettings,
	pub migrations: MigrationSettings,
	pub query: QuerySettings,
}

/// Migration ledger settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
	/// Name of the table recording applied migration versions
	pub ledger_table: String,
	/// Maximum length of a migration id stored in the ledger
	pub ledger_id_length: u32,
}

impl Default for MigrationSettings {
	fn default() -> Self {
		Self {
			ledger_table: "__migrations".to_string(),
			ledger_id_length: 256,
		}
	}
}

/// Query generation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
	/// Page size used when a page request does not carry one
	pub default_page_size: u32,
}

impl Default for QuerySettings {
	fn default() -> Self {
		Self {
			default_page_size: 20,
		}
	}
}

impl Settings {
	/// Parse settings from a TOML document and validate them.
	///
	/// Missing sections and keys fall back to their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: Settings = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read a TOML settings file, then apply environment overrides.
	///
	/// # Examples
	///
	/// ```no_run
	/// use quarry_conf::Settings;
	///
	/// let settings = Settings::from_file("quarry.toml").unwrap();
	/// println!("{}", settings.database.url);
	/// ```
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.display().to_string(),
			source,
		})?;
		let mut settings: Settings = toml::from_str(&source)?;
		settings.apply_env_overrides()?;
		settings.validate()?;
		tracing::debug!(
			path = %path.display(),
			engine = %settings.database.engine,
			"Loaded settings"
		);
		Ok(settings)
	}

	/// Apply `QUARRY_*` overrides from the process environment.
	pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
		self.apply_overrides(|key| std::env::var(key).ok())
	}

	/// Apply overrides from an arbitrary key lookup.
	pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(engine) = lookup(ENV_DATABASE_ENGINE) {
			self.database.engine = engine.parse()?;
		}
		if let Some(url) = lookup(ENV_DATABASE_URL) {
			self.database.url = url;
		}
		if let Some(table) = lookup(ENV_LEDGER_TABLE) {
			self.migrations.ledger_table = table;
		}
		if let Some(size) = lookup(ENV_DEFAULT_PAGE_SIZE) {
			self.query.default_page_size =
				size.trim().parse().map_err(|_| SettingsError::InvalidValue {
					key: ENV_DEFAULT_PAGE_SIZE.to_string(),
					value: size.clone(),
				})?;
		}
		Ok(())
	}

	/// Check the invariants the engine relies on.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.query.default_page_size == 0 {
			return Err(SettingsError::InvalidValue {
				key: "query.default_page_size".to_string(),
				value: "0".to_string(),
			});
		}
		if !PLAIN_IDENTIFIER.is_match(&self.migrations.ledger_table) {
			return Err(SettingsError::InvalidValue {
				key: "migrations.ledger_table".to_string(),
				value: self.migrations.ledger_table.clone(),
			});
		}
		if self.migrations.ledger_id_length == 0 {
			return Err(SettingsError::InvalidValue {
				key: "migrations.ledger_id_length".to_string(),
				value: "0".to_string(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashMap;
	use std::io::Write;

	#[rstest]
	fn test_defaults_when_sections_missing() {
		// Arrange
		let source = "";

		// Act
		let settings = Settings::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(settings.database.engine, DatabaseEngine::Sqlite);
		assert_eq!(settings.migrations.ledger_table, "__migrations");
		assert_eq!(settings.migrations.ledger_id_length, 256);
		assert_eq!(settings.query.default_page_size, 20);
	}

	#[rstest]
	fn test_parse_full_document() {
		// Arrange
		let source = r#"
			[database]
			engine = "sqlserver"
			url = "mssql://sa@localhost/app"

			[migrations]
			ledger_table = "schema_versions"
			ledger_id_length = 128

			[query]
			default_page_size = 50
		"#;

		// Act
		let settings = Settings::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(settings.database.engine, DatabaseEngine::SqlServer);
		assert_eq!(settings.database.url, "mssql://sa@localhost/app");
		assert_eq!(settings.migrations.ledger_table, "schema_versions");
		assert_eq!(settings.migrations.ledger_id_length, 128);
		assert_eq!(settings.query.default_page_size, 50);
	}

	#[rstest]
	#[case("[query]\ndefault_page_size = 0", "query.default_page_size")]
	#[case("[migrations]\nledger_table = \"bad name;\"", "migrations.ledger_table")]
	#[case("[migrations]\nledger_id_length = 0", "migrations.ledger_id_length")]
	fn test_validation_rejects(#[case] source: &str, #[case] expected_key: &str) {
		// Act
		let result = Settings::from_toml_str(source);

		// Assert
		match result {
			Err(SettingsError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
			other => panic!("expected InvalidValue for {expected_key}, got {other:?}"),
		}
	}

	#[rstest]
	fn test_unknown_engine_is_a_parse_error() {
		// Act
		let result = Settings::from_toml_str("[database]\nengine = \"oracle\"");

		// Assert
		assert!(matches!(result, Err(SettingsError::Parse(_))));
	}

	#[rstest]
	fn test_overrides_replace_file_values() {
		// Arrange
		let mut settings = Settings::default();
		let env: HashMap<&str, &str> = HashMap::from([
			(ENV_DATABASE_ENGINE, "mysql"),
			(ENV_DATABASE_URL, "mysql://root@localhost/app"),
			(ENV_LEDGER_TABLE, "ledger"),
			(ENV_DEFAULT_PAGE_SIZE, " 10 "),
		]);

		// Act
		settings
			.apply_overrides(|key| env.get(key).map(|v| v.to_string()))
			.unwrap();

		// Assert
		assert_eq!(settings.database.engine, DatabaseEngine::MySql);
		assert_eq!(settings.database.url, "mysql://root@localhost/app");
		assert_eq!(settings.migrations.ledger_table, "ledger");
		assert_eq!(settings.query.default_page_size, 10);
	}

	#[rstest]
	fn test_override_with_bad_page_size() {
		// Arrange
		let mut settings = Settings::default();

		// Act
		let result = settings.apply_overrides(|key| {
			(key == ENV_DEFAULT_PAGE_SIZE).then(|| "twenty".to_string())
		});

		// Assert
		assert!(matches!(
			result,
			Err(SettingsError::InvalidValue { ref key, .. }) if key == ENV_DEFAULT_PAGE_SIZE
		));
	}

	#[rstest]
	#[serial_test::serial(quarry_env)]
	fn test_from_file_reads_toml() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[database]\nengine = \"sqlite\"\nurl = \"sqlite:app.db\"").unwrap();

		// Act
		let settings = Settings::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(settings.database.engine, DatabaseEngine::Sqlite);
	}

	#[rstest]
	fn test_from_file_missing_path() {
		// Act
		let result = Settings::from_file("/nonexistent/quarry.toml");

		// Assert
		assert!(matches!(result, Err(SettingsError::Io { .. })));
	}

	#[rstest]
	#[serial_test::serial(quarry_env)]
	fn test_env_overrides_apply_over_file() {
		// Arrange
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[database]\nengine = \"sqlite\"\nurl = \"sqlite::memory:\"").unwrap();
		// SAFETY: serialized with every other test touching QUARRY_* variables
		unsafe {
			std::env::set_var(ENV_DATABASE_ENGINE, "mysql");
			std::env::set_var(ENV_LEDGER_TABLE, "schema_versions");
		}

		// Act
		let result = Settings::from_file(file.path());
		unsafe {
			std::env::remove_var(ENV_DATABASE_ENGINE);
			std::env::remove_var(ENV_LEDGER_TABLE);
		}

		// Assert
		let settings = result.unwrap();
		assert_eq!(settings.database.engine, DatabaseEngine::MySql);
		assert_eq!(settings.migrations.ledger_table, "schema_versions");
		assert_eq!(settings.database.url, "sqlite::memory:");
	}
}
