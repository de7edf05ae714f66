//! # Quarry
//!
//! Provider-agnostic query translation and schema migrations for SQL Server,
//! MySQL and SQLite.
//!
//! Quarry turns in-memory predicate and selector trees into dialect-correct
//! SQL, turns declarative table descriptions into dialect-correct DDL, and
//! tracks applied schema changes in a versioned ledger.
//!
//! ## Crates
//!
//! - `quarry-conf`: settings loaded from TOML and `QUARRY_*` environment variables
//! - `quarry-db`: backends, query translation and migrations
//!
//! ## Feature Flags
//!
//! - `sqlite` (default): SQLite connections through sqlx
//! - `mysql`: MySQL connections through sqlx
//! - `all-databases`: both
//!
//! ## Quick Start
//!
//! ```
//! use quarry::prelude::*;
//!
//! let generator = QuerySqlGenerator::new(DatabaseType::MySql);
//! let query = SelectQuery::new("User")
//!     .filter(Expr::column("Name", ValueType::String).starts_with(Expr::constant("Jo")));
//!
//! let command = generator.select(&query).unwrap();
//! assert_eq!(command.sql, "SELECT * FROM `User` WHERE `Name` LIKE ?");
//! assert_eq!(command.parameters, vec![Value::from("Jo%")]);
//! ```

mod migrate;

pub use quarry_conf as conf;
pub use quarry_db::{backends, metadata, migrations, query};

pub use migrate::run_pending_migrations;
pub use quarry_conf::{DatabaseEngine, Settings, SettingsError};
pub use quarry_db::{DatabaseError, DatabaseType, MigrationError, QueryError};

use thiserror::Error;

/// Any error surfaced by quarry
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Query(#[from] QueryError),

	#[error(transparent)]
	Migration(#[from] MigrationError),

	#[error(transparent)]
	Database(#[from] DatabaseError),

	#[error(
		"No connection driver for {0}; enable the matching feature or supply a MigrationConnection"
	)]
	NoDriver(DatabaseEngine),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::{Error, Result, Settings, run_pending_migrations};
	pub use quarry_db::prelude::*;
}
