use super::ExpressionTranslator;
use crate::query::expr::{Expr, methods};
use crate::query::sql_expr::{InSet, SqlExpr};

/// Set membership: `In(x, set)`, `NotIn(x, set)` and `set.Contains(x)`
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipTranslator;

fn as_set(expr: &Expr) -> Option<InSet> {
	match expr {
		Expr::List { items, .. } => Some(InSet::Values(items.clone())),
		Expr::SubQuery(sub) => Some(InSet::SubQuery((**sub).clone())),
		_ => None,
	}
}

impl ExpressionTranslator for MembershipTranslator {
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
		let node = match (method.as_str(), receiver, args.as_slice()) {
			(methods::IN, None, [operand, set]) => SqlExpr::In {
				operand: operand.clone(),
				set: as_set(set)?,
			},
			(methods::NOT_IN, None, [operand, set]) => SqlExpr::NotIn {
				operand: operand.clone(),
				set: as_set(set)?,
			},
			(methods::CONTAINS, Some(set), [operand]) => SqlExpr::In {
				operand: operand.clone(),
				set: as_set(set)?,
			},
			_ => return None,
		};
		Some(node.into())
	}

	fn name(&self) -> &str {
		"MembershipTranslator"
	}
}
