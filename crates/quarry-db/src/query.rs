//! Query translation
//!
//! Turns caller expression trees into dialect SQL:
//!
//! - [`expr`]: the host expression tree
//! - [`sql_expr`]: intermediate SQL nodes produced by translators
//! - [`translators`]: the ordered translator pipeline
//! - [`visitor`]: renders trees into SQL fragments with parameters
//! - [`generator`]: whole statements (select, paging, count, writes)

pub mod expr;
pub mod generator;
pub mod sql_expr;
pub mod translators;
pub mod visitor;

pub use expr::{BinaryOperator, Expr, SubQuery, methods};
pub use generator::{
	OrderBy, PageRequest, PagedCommand, PagedQuery, QuerySqlGenerator, SelectQuery,
};
pub use sql_expr::{InSet, SqlExpr};
pub use translators::{ExpressionTranslator, TranslatorPipeline, TranslatorPipelineBuilder};
pub use visitor::{SqlExpressionVisitor, SqlFragment};

use crate::backends::type_mapper::TypeMappingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
	#[error("Unsupported expression: {0}")]
	UnsupportedExpression(String),

	#[error("Type mapping failed: {0}")]
	TypeMapping(#[from] TypeMappingError),

	#[error("Invalid query: {0}")]
	InvalidQuery(String),
}
