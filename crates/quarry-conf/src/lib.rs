//! # quarry-conf
//!
//! Settings for the quarry engine: which database dialect to target, where
//! the migration ledger lives and how queries are paged by default.
//!
//! Settings are read from a TOML document and then overridden from the
//! process environment.
//!
//! ## Example
//!
//! ```
//! use quarry_conf::{DatabaseEngine, Settings};
//!
//! let settings = Settings::from_toml_str(
//! 	r#"
//! 	[database]
//! 	engine = "sqlite"
//! 	url = "sqlite::memory:"
//! 	"#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.database.engine, DatabaseEngine::Sqlite);
//! assert_eq!(settings.migrations.ledger_table, "__migrations");
//! ```

pub mod settings;

pub use settings::{
	DatabaseEngine, DatabaseSettings, MigrationSettings, QuerySettings, Settings, SettingsError,
};
