//! Intermediate SQL expression nodes
//!
//! Translators rewrite host calls into these nodes; the visitor renders them.
//! Each node carries or derives its return type so rendering never infers
//! types from data.

use super::expr::{BinaryOperator, Expr, SubQuery};
use crate::backends::dialect::SqlFunction;
use crate::backends::types::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// Right-hand side of `IN` / `NOT IN`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InSet {
	Values(Vec<Expr>),
	SubQuery(SubQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlExpr {
	IsNull(Expr),
	Like {
		operand: Expr,
		pattern: Expr,
	},
	/// Rendered inline, never bound as a parameter
	Literal {
		value: Value,
		value_type: ValueType,
	},
	/// Ordinal string comparison
	StringCompare {
		left: Expr,
		right: Expr,
		op: BinaryOperator,
	},
	Function {
		function: SqlFunction,
		return_type: ValueType,
		args: Vec<Expr>,
	},
	In {
		operand: Expr,
		set: InSet,
	},
	NotIn {
		operand: Expr,
		set: InSet,
	},
	ExplicitCast {
		operand: Expr,
		target: ValueType,
	},
}

impl SqlExpr {
	pub fn return_type(&self) -> ValueType {
		match self {
			SqlExpr::IsNull(_)
			| SqlExpr::Like { .. }
			| SqlExpr::StringCompare { .. }
			| SqlExpr::In { .. }
			| SqlExpr::NotIn { .. } => ValueType::Bool,
			SqlExpr::Literal { value_type, .. } => value_type.clone(),
			SqlExpr::Function { return_type, .. } => return_type.clone(),
			SqlExpr::ExplicitCast { target, .. } => target.clone(),
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			SqlExpr::IsNull(_) => "IsNull",
			SqlExpr::Like { .. } => "Like",
			SqlExpr::Literal { .. } => "Literal",
			SqlExpr::StringCompare { .. } => "StringCompare",
			SqlExpr::Function { .. } => "Function",
			SqlExpr::In { .. } => "In",
			SqlExpr::NotIn { .. } => "NotIn",
			SqlExpr::ExplicitCast { .. } => "ExplicitCast",
		}
	}

	/// Inline literal typed by its value
	pub fn literal(value: impl Into<Value>) -> Self {
		let value = value.into();
		let value_type = value.value_type();
		SqlExpr::Literal { value, value_type }
	}

	pub fn function(function: SqlFunction, return_type: ValueType, args: Vec<Expr>) -> Self {
		SqlExpr::Function {
			function,
			return_type,
			args,
		}
	}

	pub fn cast(operand: Expr, target: ValueType) -> Self {
		SqlExpr::ExplicitCast { operand, target }
	}
}
