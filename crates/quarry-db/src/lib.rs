//! # Quarry Database
//!
//! Provider-agnostic query translation and schema migrations for SQL Server,
//! MySQL and SQLite.
//!
//! ## Modules
//!
//! - **Backends** (`backends`): semantic types, dialects, type mappers,
//!   parameter-collecting SQL writer and the migration connection boundary
//! - **Metadata** (`metadata`): entity and column descriptions
//! - **Query** (`query`): expression trees, the translator pipeline, the SQL
//!   expression visitor and statement generation (select, paging, writes)
//! - **Migrations** (`migrations`): schema operations, DDL generation, the
//!   version ledger and the pending-migration executor
//!
//! ## Quick Start
//!
//! ```
//! use quarry_db::backends::{DatabaseType, ValueType};
//! use quarry_db::query::{Expr, PageRequest, PagedCommand, QuerySqlGenerator, SelectQuery};
//!
//! let generator = QuerySqlGenerator::new(DatabaseType::SqlServer);
//! let query = SelectQuery::new("User")
//!     .filter(Expr::column("Name", ValueType::String).contains(Expr::constant("ann")))
//!     .order_by(Expr::column("Name", ValueType::String));
//!
//! let page = generator.page(&query, PageRequest::new(2, 10)).unwrap();
//! assert_eq!(page.offset, 10);
//! assert!(matches!(page.command, PagedCommand::Combined { .. }));
//! ```
//!
//! ## Feature Flags
//!
//! - `sqlite` (default): sqlx-backed SQLite connection
//! - `mysql`: sqlx-backed MySQL connection
//! - `all-databases`: both
//!
//! SQL Server has no bundled driver; its SQL is generated all the same and
//! can be executed through any [`backends::MigrationConnection`].

pub mod backends;
pub mod metadata;
pub mod migrations;
pub mod query;

/// Prelude module for convenient imports
pub mod prelude {
	pub use crate::backends::{
		DatabaseError, DatabaseType, Dialect, MigrationConnection, RecordingConnection,
		SqlCommand, SqlFunction, Value, ValueType, dialect_for,
	};
	#[cfg(feature = "mysql")]
	pub use crate::backends::MySqlConnection;
	#[cfg(feature = "sqlite")]
	pub use crate::backends::SqliteConnection;
	pub use crate::metadata::{ColumnMetadata, EntityType, KeyRole};
	pub use crate::migrations::{
		ColumnOperation, ForeignKeyOperation, Migration, MigrationBuilder, MigrationError,
		MigrationExecutor, MigrationsSqlGenerator, Operation,
	};
	pub use crate::query::{
		Expr, PageRequest, PagedCommand, QueryError, QuerySqlGenerator, SelectQuery,
	};
}

pub use backends::{DatabaseError, DatabaseType};
pub use migrations::MigrationError;
pub use query::QueryError;
