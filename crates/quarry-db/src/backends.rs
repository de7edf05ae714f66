//! Database backends
//!
//! Provider-level building blocks shared by query generation and migrations:
//!
//! - [`types`]: runtime values, semantic value types and generated commands
//! - [`type_mapper`]: semantic type to column type-name mapping per provider
//! - [`dialect`]: quoting, placeholders, literals, functions and paging style
//! - [`sql_writer`]: accumulator used by every statement renderer
//! - [`connection`]: async execution boundary used by the migration executor

pub mod connection;
pub mod dialect;
pub mod error;
pub mod sql_writer;
pub mod type_mapper;
pub mod types;

pub use connection::{MigrationConnection, RecordingConnection};
#[cfg(feature = "mysql")]
pub use connection::MySqlConnection;
#[cfg(feature = "sqlite")]
pub use connection::SqliteConnection;
pub use dialect::{DatePart, Dialect, PagingStyle, SqlFunction, dialect_for};
pub use error::DatabaseError;
pub use sql_writer::SqlWriter;
pub use type_mapper::{TypeMapper, TypeMappingError};
pub use types::{DatabaseType, SqlCommand, Value, ValueType};
