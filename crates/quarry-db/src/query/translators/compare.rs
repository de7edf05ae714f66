use super::ExpressionTranslator;
use crate::backends::types::Value;
use crate::query::expr::{BinaryOperator, Expr, methods};
use crate::query::sql_expr::SqlExpr;

/// `Compare(a, b) <op> 0` and `a.CompareTo(b) <op> 0` become `a <op> b`
/// with ordinal string semantics
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareTranslator;

fn compare_operands(expr: &Expr) -> Option<(Expr, Expr)> {
	match expr {
		Expr::Call {
			method,
			receiver: None,
			args,
			..
		} if method == methods::COMPARE && args.len() == 2 => {
			Some((args[0].clone(), args[1].clone()))
		}
		Expr::Call {
			method,
			receiver: Some(receiver),
			args,
			..
		} if method == methods::COMPARE_TO && args.len() == 1 => {
			Some(((**receiver).clone(), args[0].clone()))
		}
		_ => None,
	}
}

fn is_zero(expr: &Expr) -> bool {
	matches!(
		expr,
		Expr::Constant {
			value: Value::Int(0) | Value::UInt(0),
			..
		}
	)
}

impl ExpressionTranslator for CompareTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		let Expr::Binary { op, left, right } = expr else {
			return None;
		};
		if !op.is_comparison() {
			return None;
		}
		let ((a, b), op) = if is_zero(right) {
			(compare_operands(left)?, *op)
		} else if is_zero(left) {
			(compare_operands(right)?, op.mirror())
		} else {
			return None;
		};
		if !a.value_type().is_string() && !b.value_type().is_string() {
			return Some(Expr::binary(op, a, b));
		}
		Some(
			SqlExpr::StringCompare {
				left: a,
				right: b,
				op,
			}
			.into(),
		)
	}

	fn name(&self) -> &str {
		"CompareTranslator"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::types::ValueType;
	use rstest::rstest;

	fn code() -> Expr {
		Expr::column("Code", ValueType::String)
	}

	#[rstest]
	fn test_compare_greater_than_zero() {
		// Arrange
		let expr = Expr::compare(code(), Expr::constant("M")).gt(Expr::constant(0));

		// Act
		let translated = CompareTranslator.translate(&expr).unwrap();

		// Assert
		assert_eq!(
			translated,
			SqlExpr::StringCompare {
				left: code(),
				right: Expr::constant("M"),
				op: BinaryOperator::Gt,
			}
			.into()
		);
	}

	#[rstest]
	fn test_zero_on_left_mirrors_operator() {
		let expr = Expr::constant(0).lt(code().compare_to(Expr::constant("M")));
		let translated = CompareTranslator.translate(&expr).unwrap();
		assert_eq!(
			translated,
			SqlExpr::StringCompare {
				left: code(),
				right: Expr::constant("M"),
				op: BinaryOperator::Gt,
			}
			.into()
		);
	}

	#[rstest]
	fn test_non_zero_comparison_is_declined() {
		let expr = Expr::compare(code(), Expr::constant("M")).gt(Expr::constant(1));
		assert!(CompareTranslator.translate(&expr).is_none());
	}
}
