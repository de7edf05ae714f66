//! # Schema migrations
//!
//! Declarative schema changes applied through a versioned ledger.
//!
//! - [`operations`]: the closed set of schema-change operations
//! - [`builder`]: fluent assembly of operations from entity metadata
//! - [`generator`]: per-dialect DDL rendering
//! - [`migration`]: named migrations made of ordered steps (`Create`, `Up1`, …)
//! - [`recorder`]: the ledger table recording each migration's applied version
//! - [`executor`]: applies pending steps, one transaction per step
//!
//! ## Example
//!
//! ```
//! use quarry_db::backends::{DatabaseType, ValueType};
//! use quarry_db::metadata::{ColumnMetadata, EntityType};
//! use quarry_db::migrations::{MigrationBuilder, MigrationsSqlGenerator};
//!
//! let user = EntityType::new("User")
//!     .column(ColumnMetadata::new("Id", ValueType::I32).primary_key())
//!     .column(ColumnMetadata::new("Name", ValueType::String).size(64));
//!
//! let mut builder = MigrationBuilder::new();
//! builder.create_table(&user, |_| {}).unwrap();
//!
//! let commands = MigrationsSqlGenerator::new(DatabaseType::Sqlite)
//!     .generate(builder.operations())
//!     .unwrap();
//! assert!(commands[0].sql.starts_with("CREATE TABLE IF NOT EXISTS \"User\""));
//! ```

pub mod builder;
pub mod executor;
pub mod generator;
pub mod migration;
pub mod operations;
pub mod recorder;

pub use builder::{CreateTableBuilder, MigrationBuilder};
pub use executor::{AppliedStep, ExecutionReport, ExecutorState, MigrationExecutor};
pub use generator::{DdlRenderer, MigrationsSqlGenerator};
pub use migration::{Migration, MigrationStep};
pub use operations::{
	ColumnOperation, CreateTableOperation, ForeignKeyOperation, Operation, PrimaryKeyOperation,
	ReferentialAction, UniqueConstraintOperation,
};
pub use recorder::{LedgerProbe, MigrationRecorder};

use crate::backends::error::DatabaseError;
use crate::backends::type_mapper::TypeMappingError;
use crate::backends::types::DatabaseType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
	#[error("Schema mismatch: {0}")]
	SchemaMismatch(String),

	#[error("Operation {operation} is not supported by {database}")]
	UnsupportedOperation {
		operation: String,
		database: DatabaseType,
	},

	#[error("Migration {id} failed at step {step}: {source}")]
	MigrationFailure {
		id: String,
		step: u32,
		source: Box<MigrationError>,
	},

	#[error("Migration already registered: {0}")]
	DuplicateMigration(String),

	#[error("Type mapping failed: {0}")]
	TypeMapping(#[from] TypeMappingError),

	#[error("Database error: {0}")]
	Database(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, MigrationError>;
