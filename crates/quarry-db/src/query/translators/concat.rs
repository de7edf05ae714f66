use super::ExpressionTranslator;
use crate::backends::types::ValueType;
use crate::query::expr::{BinaryOperator, Expr};
use crate::query::sql_expr::SqlExpr;

/// `+` between a string and a non-string casts the non-string side to text
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConcatTranslator;

/// `expr` unchanged when it is already text, otherwise cast to text
pub(super) fn as_text(expr: &Expr) -> Expr {
	if expr.value_type().is_string() {
		expr.clone()
	} else {
		SqlExpr::cast(expr.clone(), ValueType::String).into()
	}
}

impl ExpressionTranslator for StringConcatTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		let Expr::Binary {
			op: BinaryOperator::Add,
			left,
			right,
		} = expr
		else {
			return None;
		};
		let left_text = left.value_type().is_string();
		let right_text = right.value_type().is_string();
		if left_text == right_text {
			return None;
		}
		Some(Expr::binary(BinaryOperator::Add, as_text(left), as_text(right)))
	}

	fn name(&self) -> &str {
		"StringConcatTranslator"
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_non_string_operand_is_cast() {
		// Arrange
		let expr = Expr::constant("#") + Expr::column("Id", ValueType::I32);

		// Act
		let translated = StringConcatTranslator.translate(&expr).unwrap();

		// Assert
		assert_eq!(
			translated,
			Expr::constant("#")
				+ SqlExpr::cast(Expr::column("Id", ValueType::I32), ValueType::String).into()
		);
	}

	#[test]
	fn test_string_plus_string_is_declined() {
		let expr = Expr::constant("a") + Expr::column("Name", ValueType::String);
		assert!(StringConcatTranslator.translate(&expr).is_none());
	}

	#[test]
	fn test_numeric_addition_is_declined() {
		let expr = Expr::column("Qty", ValueType::I32) + Expr::constant(1);
		assert!(StringConcatTranslator.translate(&expr).is_none());
	}
}
