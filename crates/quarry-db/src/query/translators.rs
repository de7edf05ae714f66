//! Node translators
//!
//! A translator inspects one host node and either rewrites it into a tree of
//! intermediate [`SqlExpr`](super::SqlExpr) nodes or declines. The pipeline
//! asks translators in order and the first match wins, so custom translators
//! registered on the builder take precedence over the built-ins.
//!
//! Pipelines are immutable once built. The default pipeline is built once per
//! process and shared.

mod compare;
mod concat;
mod equals;
mod functions;
mod membership;
mod string;

pub use compare::CompareTranslator;
pub use concat::StringConcatTranslator;
pub use equals::EqualsTranslator;
pub use functions::DatePartTranslator;
pub use membership::MembershipTranslator;
pub use string::{IsNullOrEmptyTranslator, LikeTranslator, StringFunctionTranslator};

use super::expr::Expr;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

static DEFAULT_PIPELINE: Lazy<Arc<TranslatorPipeline>> =
	Lazy::new(|| Arc::new(TranslatorPipeline::builder().build()));

/// Rewrites a host node into intermediate SQL nodes
pub trait ExpressionTranslator: Send + Sync {
	/// Return the rewritten node, or `None` when this translator does not apply
	fn translate(&self, expr: &Expr) -> Option<Expr>;

	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}
}

impl<F> ExpressionTranslator for F
where
	F: Fn(&Expr) -> Option<Expr> + Send + Sync,
{
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		self(expr)
	}

	fn name(&self) -> &str {
		"closure"
	}
}

/// Ordered, immutable list of translators
#[derive(Clone)]
pub struct TranslatorPipeline {
	translators: Vec<Arc<dyn ExpressionTranslator>>,
}

impl TranslatorPipeline {
	pub fn builder() -> TranslatorPipelineBuilder {
		TranslatorPipelineBuilder::default()
	}

	/// Process-wide pipeline holding only the built-in translators
	pub fn shared() -> Arc<TranslatorPipeline> {
		Arc::clone(&DEFAULT_PIPELINE)
	}

	/// First successful translation of `expr`
	pub fn translate(&self, expr: &Expr) -> Option<Expr> {
		self.translators.iter().find_map(|t| t.translate(expr))
	}

	pub fn len(&self) -> usize {
		self.translators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.translators.is_empty()
	}
}

impl fmt::Debug for TranslatorPipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.translators.iter().map(|t| t.name()))
			.finish()
	}
}

/// Collects custom translators ahead of the built-ins
#[derive(Default)]
pub struct TranslatorPipelineBuilder {
	custom: Vec<Arc<dyn ExpressionTranslator>>,
}

impl TranslatorPipelineBuilder {
	/// Add a custom translator; earlier additions are consulted first
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::ValueType;
	/// use quarry_db::query::{Expr, SqlExpr, TranslatorPipeline};
	///
	/// let pipeline = TranslatorPipeline::builder()
	/// 	.with(|expr: &Expr| match expr {
	/// 		Expr::Call { method, .. } if method == "IsActive" => {
	/// 			Some(SqlExpr::literal(true).into())
	/// 		}
	/// 		_ => None,
	/// 	})
	/// 	.build();
	///
	/// let call = Expr::static_call("IsActive", vec![], ValueType::Bool);
	/// assert!(pipeline.translate(&call).is_some());
	/// ```
	pub fn with<T>(mut self, translator: T) -> Self
	where
		T: ExpressionTranslator + 'static,
	{
		self.custom.push(Arc::new(translator));
		self
	}

	pub fn build(self) -> TranslatorPipeline {
		let mut translators = self.custom;
		translators.push(Arc::new(LikeTranslator));
		translators.push(Arc::new(IsNullOrEmptyTranslator));
		translators.push(Arc::new(EqualsTranslator));
		translators.push(Arc::new(MembershipTranslator));
		translators.push(Arc::new(StringConcatTranslator));
		translators.push(Arc::new(StringFunctionTranslator));
		translators.push(Arc::new(DatePartTranslator));
		translators.push(Arc::new(CompareTranslator));
		TranslatorPipeline { translators }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::types::ValueType;
	use crate::query::sql_expr::SqlExpr;

	#[test]
	fn test_custom_translator_takes_precedence() {
		// Arrange
		let pipeline = TranslatorPipeline::builder()
			.with(|expr: &Expr| match expr {
				Expr::Call { method, .. } if method == "Contains" => {
					Some(SqlExpr::literal(true).into())
				}
				_ => None,
			})
			.build();
		let expr = Expr::column("Name", ValueType::String).contains(Expr::constant("x"));

		// Act
		let translated = pipeline.translate(&expr).unwrap();

		// Assert
		assert_eq!(translated, SqlExpr::literal(true).into());
	}

	#[test]
	fn test_unmatched_node_is_declined() {
		let pipeline = TranslatorPipeline::shared();
		let expr = Expr::column("Name", ValueType::String);
		assert!(pipeline.translate(&expr).is_none());
	}

	#[test]
	fn test_shared_pipeline_is_the_same_instance() {
		assert!(Arc::ptr_eq(
			&TranslatorPipeline::shared(),
			&TranslatorPipeline::shared()
		));
	}
}
