//! Generic equality helper

use super::ExpressionTranslator;
use crate::backends::types::ValueType;
use crate::query::expr::{Expr, methods};
use crate::query::sql_expr::SqlExpr;

/// `Equals(x, y)` over untyped slots
///
/// Operands arrive converted to [`ValueType::Object`]. The conversion is
/// looked through: operands with compatible underlying types become a typed
/// `x = y`. Operands that can never be equal (concrete, incompatible types,
/// or a null against a non-nullable operand) become the literal `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualsTranslator;

fn strip_object(expr: &Expr) -> &Expr {
	match expr {
		Expr::Convert {
			operand,
			value_type: ValueType::Object,
		} => strip_object(operand),
		other => other,
	}
}

fn compatible(left: &ValueType, right: &ValueType) -> bool {
	let (l, r) = (left.unwrap(), right.unwrap());
	l == r
		|| (left.is_numeric() && right.is_numeric())
		|| (left.is_string() && right.is_string())
		|| (left.is_temporal() && right.is_temporal())
}

impl ExpressionTranslator for EqualsTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		let Expr::Call {
			method,
			receiver,
			args,
			..
		} = expr
		else {
			return None;
		};
		if method != methods::EQUALS {
			return None;
		}
		// Static helper takes both operands; instance form takes the receiver
		let (left, right) = match (receiver, args.as_slice()) {
			(None, [left, right]) => (left, right),
			(Some(receiver), [right]) => (&**receiver, right),
			_ => return None,
		};
		let left = strip_object(left);
		let right = strip_object(right);

		let never_equal = SqlExpr::literal(false);
		match (left.is_null_constant(), right.is_null_constant()) {
			(true, true) => return Some(SqlExpr::literal(true).into()),
			(true, false) if !right.value_type().is_nullable() => return Some(never_equal.into()),
			(false, true) if !left.value_type().is_nullable() => return Some(never_equal.into()),
			(true, false) | (false, true) => {
				return Some(left.clone().eq(right.clone()));
			}
			(false, false) => {}
		}

		let (lt, rt) = (left.value_type(), right.value_type());
		if lt.unwrap() == &ValueType::Object
			|| rt.unwrap() == &ValueType::Object
			|| compatible(&lt, &rt)
		{
			Some(left.clone().eq(right.clone()))
		} else {
			Some(never_equal.into())
		}
	}

	fn name(&self) -> &str {
		"EqualsTranslator"
	}
}
