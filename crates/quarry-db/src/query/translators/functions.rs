use super::ExpressionTranslator;
use crate::backends::dialect::{DatePart, SqlFunction};
use crate::backends::types::ValueType;
use crate::query::expr::{Expr, methods};
use crate::query::sql_expr::SqlExpr;

/// Date component members (`Year`, `Month`, …) on temporal operands
#[derive(Debug, Clone, Copy, Default)]
pub struct DatePartTranslator;

impl ExpressionTranslator for DatePartTranslator {
	fn translate(&self, expr: &Expr) -> Option<Expr> {
		let Expr::Member {
			receiver, member, ..
		} = expr
		else {
			return None;
		};
		if !receiver.value_type().is_temporal() {
			return None;
		}
		let part = match member.as_str() {
			methods::YEAR => DatePart::Year,
			methods::MONTH => DatePart::Month,
			methods::DAY => DatePart::Day,
			methods::HOUR => DatePart::Hour,
			methods::MINUTE => DatePart::Minute,
			methods::SECOND => DatePart::Second,
			_ => return None,
		};
		Some(
			SqlExpr::function(
				SqlFunction::DatePart(part),
				ValueType::I32,
				vec![(**receiver).clone()],
			)
			.into(),
		)
	}

	fn name(&self) -> &str {
		"DatePartTranslator"
	}
}
