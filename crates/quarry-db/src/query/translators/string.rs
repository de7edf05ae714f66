//! String predicates and functions

use super::ExpressionTranslator;
use super::concat::as_text;
use crate::backends::dialect::SqlFunction;
use crate::backends::types::ValueType;
use crate::query::expr::{Expr, methods};
use crate::query::sql_expr::SqlExpr;

fn wildcard() -> Expr {
	SqlExpr::literal("%").into()
}

/// `Contains` / `StartsWith` / `EndsWith` on strings become `LIKE`
///
/// The pattern is composed from `%` literals and the argument, cast to text
/// when it is not a string; the visitor escapes caller data when it renders
/// the pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct LikeTranslator;

impl ExpressionTranslator for LikeTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		let Expr::Call {
			method,
			receiver: Some(receiver),
			args,
			..
		} = expr
		else {
			return None;
		};
		if args.len() != 1 || !receiver.value_type().is_string() {
			return None;
		}
		if matches!(**receiver, Expr::List { .. } | Expr::SubQuery(_)) {
			return None;
		}
		let value = as_text(&args[0]);
		let pattern = match method.as_str() {
			methods::CONTAINS => wildcard() + value + wildcard(),
			methods::STARTS_WITH => value + wildcard(),
			methods::ENDS_WITH => wildcard() + value,
			_ => return None,
		};
		Some(
			SqlExpr::Like {
				operand: (**receiver).clone(),
				pattern,
			}
			.into(),
		)
	}

	fn name(&self) -> &str {
		"LikeTranslator"
	}
}

/// `IsNullOrEmpty(x)` becomes `x IS NULL`
///
/// Empty strings are not matched. The approximation is kept until the
/// intended semantics are confirmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsNullOrEmptyTranslator;

impl ExpressionTranslator for IsNullOrEmptyTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		match expr {
			Expr::Call {
				method,
				receiver: None,
				args,
				..
			} if method == methods::IS_NULL_OR_EMPTY && args.len() == 1 => {
				Some(SqlExpr::IsNull(args[0].clone()).into())
			}
			_ => None,
		}
	}

	fn name(&self) -> &str {
		"IsNullOrEmptyTranslator"
	}
}

/// `ToUpper` / `ToLower` / `Trim` calls and the `Length` member
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFunctionTranslator;

impl ExpressionTranslator for StringFunctionTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		match expr {
			Expr::Call {
				method,
				receiver: Some(receiver),
				args,
				..
			} if args.is_empty() && receiver.value_type().is_string() => {
				let function = match method.as_str() {
					methods::TO_UPPER => SqlFunction::Upper,
					methods::TO_LOWER => SqlFunction::Lower,
					methods::TRIM => SqlFunction::Trim,
					_ => return None,
				};
				let operand = vec![(**receiver).clone()];
				Some(SqlExpr::function(function, ValueType::String, operand).into())
			}
			Expr::Member {
				receiver, member, ..
			} if member == methods::LENGTH && receiver.value_type().is_string() => Some(
				SqlExpr::function(SqlFunction::Length, ValueType::I32, vec![(**receiver).clone()])
					.into(),
			),
			_ => None,
		}
	}

	fn name(&self) -> &str {
		"StringFunctionTranslator"
	}
}
