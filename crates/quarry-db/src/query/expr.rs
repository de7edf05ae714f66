//! Host expression tree
//!
//! `Expr` is the caller's predicate or selector tree. It mirrors what a host
//! language lambda compiles to: columns, constants, operators, method calls
//! and member accesses, plus [`Expr::Sql`] to embed already translated
//! intermediate nodes. Every node knows its [`ValueType`] without looking at
//! data.

use super::sql_expr::SqlExpr;
use crate::backends::types::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::ops;

/// Method and member names recognised by the built-in translators
pub mod methods {
	pub const CONTAINS: &str = "Contains";
	pub const STARTS_WITH: &str = "StartsWith";
	pub const ENDS_WITH: &str = "EndsWith";
	pub const IS_NULL_OR_EMPTY: &str = "IsNullOrEmpty";
	pub const EQUALS: &str = "Equals";
	pub const IN: &str = "In";
	pub const NOT_IN: &str = "NotIn";
	pub const TO_UPPER: &str = "ToUpper";
	pub const TO_LOWER: &str = "ToLower";
	pub const TRIM: &str = "Trim";
	pub const COMPARE: &str = "Compare";
	pub const COMPARE_TO: &str = "CompareTo";
	pub const LENGTH: &str = "Length";
	pub const YEAR: &str = "Year";
	pub const MONTH: &str = "Month";
	pub const DAY: &str = "Day";
	pub const HOUR: &str = "Hour";
	pub const MINUTE: &str = "Minute";
	pub const SECOND: &str = "Second";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	And,
	Or,
	Add,
	Subtract,
	Multiply,
	Divide,
	Modulo,
}

impl BinaryOperator {
	pub fn as_sql(&self) -> &'static str {
		match self {
			BinaryOperator::Eq => "=",
			BinaryOperator::Ne => "<>",
			BinaryOperator::Lt => "<",
			BinaryOperator::Le => "<=",
			BinaryOperator::Gt => ">",
			BinaryOperator::Ge => ">=",
			BinaryOperator::And => "AND",
			BinaryOperator::Or => "OR",
			BinaryOperator::Add => "+",
			BinaryOperator::Subtract => "-",
			BinaryOperator::Multiply => "*",
			BinaryOperator::Divide => "/",
			BinaryOperator::Modulo => "%",
		}
	}

	pub fn is_comparison(&self) -> bool {
		matches!(
			self,
			BinaryOperator::Eq
				| BinaryOperator::Ne
				| BinaryOperator::Lt
				| BinaryOperator::Le
				| BinaryOperator::Gt
				| BinaryOperator::Ge
		)
	}

	pub fn is_logical(&self) -> bool {
		matches!(self, BinaryOperator::And | BinaryOperator::Or)
	}

	/// Operator with its operands swapped: `a < b` is `b > a`
	pub fn mirror(&self) -> Self {
		match self {
			BinaryOperator::Lt => BinaryOperator::Gt,
			BinaryOperator::Le => BinaryOperator::Ge,
			BinaryOperator::Gt => BinaryOperator::Lt,
			BinaryOperator::Ge => BinaryOperator::Le,
			other => *other,
		}
	}
}

/// Single-column sub-select used as a membership set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuery {
	pub table: String,
	pub schema: Option<String>,
	pub column: String,
	pub filter: Option<Expr>,
	pub value_type: ValueType,
}

impl SubQuery {
	pub fn new(table: impl Into<String>, column: impl Into<String>, value_type: ValueType) -> Self {
		Self {
			table: table.into(),
			schema: None,
			column: column.into(),
			filter: None,
			value_type,
		}
	}

	pub fn filter(mut self, filter: Expr) -> Self {
		self.filter = Some(filter);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
	Column {
		table: Option<String>,
		name: String,
		value_type: ValueType,
	},
	Constant {
		value: Value,
		value_type: ValueType,
	},
	Binary {
		op: BinaryOperator,
		left: Box<Expr>,
		right: Box<Expr>,
	},
	Not(Box<Expr>),
	Negate(Box<Expr>),
	Call {
		method: String,
		receiver: Option<Box<Expr>>,
		args: Vec<Expr>,
		return_type: ValueType,
	},
	Member {
		receiver: Box<Expr>,
		member: String,
		value_type: ValueType,
	},
	Convert {
		operand: Box<Expr>,
		value_type: ValueType,
	},
	List {
		items: Vec<Expr>,
		element_type: ValueType,
	},
	SubQuery(Box<SubQuery>),
	Sql(Box<SqlExpr>),
}

impl Expr {
	/// Static type of this node
	pub fn value_type(&self) -> ValueType {
		match self {
			Expr::Column { value_type, .. }
			| Expr::Constant { value_type, .. }
			| Expr::Member { value_type, .. }
			| Expr::Convert { value_type, .. } => value_type.clone(),
			Expr::Binary { op, left, right } => {
				if op.is_comparison() || op.is_logical() {
					ValueType::Bool
				} else if *op == BinaryOperator::Add
					&& (left.value_type().is_string() || right.value_type().is_string())
				{
					ValueType::String
				} else {
					left.value_type()
				}
			}
			Expr::Not(_) => ValueType::Bool,
			Expr::Negate(operand) => operand.value_type(),
			Expr::Call { return_type, .. } => return_type.clone(),
			Expr::List { element_type, .. } => element_type.clone(),
			Expr::SubQuery(sub) => sub.value_type.clone(),
			Expr::Sql(node) => node.return_type(),
		}
	}

	/// Short description used in error messages
	pub fn describe(&self) -> String {
		match self {
			Expr::Column { name, .. } => format!("column {name}"),
			Expr::Constant { value, .. } => format!("constant {value:?}"),
			Expr::Binary { op, .. } => format!("binary {op:?}"),
			Expr::Not(_) => "not".to_string(),
			Expr::Negate(_) => "negate".to_string(),
			Expr::Call { method, args, .. } => format!("call {method}/{}", args.len()),
			Expr::Member { member, .. } => format!("member {member}"),
			Expr::Convert { value_type, .. } => format!("convert to {value_type}"),
			Expr::List { items, .. } => format!("list of {}", items.len()),
			Expr::SubQuery(sub) => format!("sub-query on {}", sub.table),
			Expr::Sql(node) => format!("sql {}", node.kind()),
		}
	}

	pub fn is_null_constant(&self) -> bool {
		matches!(self, Expr::Constant { value: Value::Null, .. })
	}

	/// Column reference
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::ValueType;
	/// use quarry_db::query::Expr;
	///
	/// let filter = Expr::column("Age", ValueType::I32).gt(Expr::constant(18));
	/// assert_eq!(filter.value_type(), ValueType::Bool);
	/// ```
	pub fn column(name: impl Into<String>, value_type: ValueType) -> Self {
		Expr::Column {
			table: None,
			name: name.into(),
			value_type,
		}
	}

	pub fn qualified_column(
		table: impl Into<String>,
		name: impl Into<String>,
		value_type: ValueType,
	) -> Self {
		Expr::Column {
			table: Some(table.into()),
			name: name.into(),
			value_type,
		}
	}

	/// Constant typed by its value
	pub fn constant(value: impl Into<Value>) -> Self {
		let value = value.into();
		let value_type = value.value_type();
		Expr::Constant { value, value_type }
	}

	pub fn typed_constant(value: impl Into<Value>, value_type: ValueType) -> Self {
		Expr::Constant {
			value: value.into(),
			value_type,
		}
	}

	/// Null constant of the given type
	pub fn null(value_type: ValueType) -> Self {
		Expr::Constant {
			value: Value::Null,
			value_type: value_type.nullable(),
		}
	}

	pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
		Expr::Binary {
			op,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn eq(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Eq, self, other)
	}

	pub fn ne(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Ne, self, other)
	}

	pub fn lt(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Lt, self, other)
	}

	pub fn le(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Le, self, other)
	}

	pub fn gt(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Gt, self, other)
	}

	pub fn ge(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Ge, self, other)
	}

	pub fn and(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::And, self, other)
	}

	pub fn or(self, other: Expr) -> Self {
		Self::binary(BinaryOperator::Or, self, other)
	}

	pub fn is_null(self) -> Self {
		let ty = self.value_type();
		self.eq(Expr::null(ty))
	}

	pub fn is_not_null(self) -> Self {
		let ty = self.value_type();
		self.ne(Expr::null(ty))
	}

	/// Instance method call on `self`
	pub fn call(self, method: impl Into<String>, args: Vec<Expr>, return_type: ValueType) -> Self {
		Expr::Call {
			method: method.into(),
			receiver: Some(Box::new(self)),
			args,
			return_type,
		}
	}

	/// Static helper call
	pub fn static_call(method: impl Into<String>, args: Vec<Expr>, return_type: ValueType) -> Self {
		Expr::Call {
			method: method.into(),
			receiver: None,
			args,
			return_type,
		}
	}

	pub fn member(self, member: impl Into<String>, value_type: ValueType) -> Self {
		Expr::Member {
			receiver: Box::new(self),
			member: member.into(),
			value_type,
		}
	}

	/// `self.Contains(value)`: substring test on strings, membership on lists
	pub fn contains(self, value: Expr) -> Self {
		self.call(methods::CONTAINS, vec![value], ValueType::Bool)
	}

	pub fn starts_with(self, value: Expr) -> Self {
		self.call(methods::STARTS_WITH, vec![value], ValueType::Bool)
	}

	pub fn ends_with(self, value: Expr) -> Self {
		self.call(methods::ENDS_WITH, vec![value], ValueType::Bool)
	}

	pub fn is_null_or_empty(value: Expr) -> Self {
		Self::static_call(methods::IS_NULL_OR_EMPTY, vec![value], ValueType::Bool)
	}

	/// Generic equality helper; both operands pass through untyped slots
	pub fn equals(left: Expr, right: Expr) -> Self {
		Self::static_call(
			methods::EQUALS,
			vec![left.boxed(), right.boxed()],
			ValueType::Bool,
		)
	}

	/// Convert into the untyped object slot
	pub fn boxed(self) -> Self {
		self.convert(ValueType::Object)
	}

	pub fn convert(self, value_type: ValueType) -> Self {
		Expr::Convert {
			operand: Box::new(self),
			value_type,
		}
	}

	pub fn list(items: Vec<Expr>, element_type: ValueType) -> Self {
		Expr::List {
			items,
			element_type,
		}
	}

	pub fn sub_query(sub: SubQuery) -> Self {
		Expr::SubQuery(Box::new(sub))
	}

	pub fn in_list(value: Expr, set: Expr) -> Self {
		Self::static_call(methods::IN, vec![value, set], ValueType::Bool)
	}

	pub fn not_in_list(value: Expr, set: Expr) -> Self {
		Self::static_call(methods::NOT_IN, vec![value, set], ValueType::Bool)
	}

	pub fn to_upper(self) -> Self {
		self.call(methods::TO_UPPER, Vec::new(), ValueType::String)
	}

	pub fn to_lower(self) -> Self {
		self.call(methods::TO_LOWER, Vec::new(), ValueType::String)
	}

	pub fn trim(self) -> Self {
		self.call(methods::TRIM, Vec::new(), ValueType::String)
	}

	pub fn length(self) -> Self {
		self.member(methods::LENGTH, ValueType::I32)
	}

	pub fn year(self) -> Self {
		self.member(methods::YEAR, ValueType::I32)
	}

	pub fn month(self) -> Self {
		self.member(methods::MONTH, ValueType::I32)
	}

	pub fn day(self) -> Self {
		self.member(methods::DAY, ValueType::I32)
	}

	pub fn hour(self) -> Self {
		self.member(methods::HOUR, ValueType::I32)
	}

	pub fn minute(self) -> Self {
		self.member(methods::MINUTE, ValueType::I32)
	}

	pub fn second(self) -> Self {
		self.member(methods::SECOND, ValueType::I32)
	}

	/// Static `Compare(left, right)`, meant to be compared with zero
	pub fn compare(left: Expr, right: Expr) -> Self {
		Self::static_call(methods::COMPARE, vec![left, right], ValueType::I32)
	}

	pub fn compare_to(self, other: Expr) -> Self {
		self.call(methods::COMPARE_TO, vec![other], ValueType::I32)
	}
}

impl From<SqlExpr> for Expr {
	fn from(node: SqlExpr) -> Self {
		Expr::Sql(Box::new(node))
	}
}

impl ops::Not for Expr {
	type Output = Expr;

	fn not(self) -> Expr {
		Expr::Not(Box::new(self))
	}
}

impl ops::Neg for Expr {
	type Output = Expr;

	fn neg(self) -> Expr {
		Expr::Negate(Box::new(self))
	}
}

macro_rules! arithmetic {
	($trait:ident, $method:ident, $op:ident) => {
		impl ops::$trait for Expr {
			type Output = Expr;

			fn $method(self, rhs: Expr) -> Expr {
				Expr::binary(BinaryOperator::$op, self, rhs)
			}
		}
	};
}

arithmetic!(Add, add, Add);
arithmetic!(Sub, sub, Subtract);
arithmetic!(Mul, mul, Multiply);
arithmetic!(Div, div, Divide);
arithmetic!(Rem, rem, Modulo);

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_string_addition_is_string_typed() {
		let expr = Expr::constant("Id: ") + Expr::column("Id", ValueType::I32);
		assert_eq!(expr.value_type(), ValueType::String);
	}

	#[rstest]
	fn test_numeric_addition_keeps_left_type() {
		let expr = Expr::column("Qty", ValueType::I32) + Expr::constant(1);
		assert_eq!(expr.value_type(), ValueType::I32);
	}

	#[rstest]
	fn test_equals_boxes_operands() {
		let expr = Expr::equals(Expr::column("A", ValueType::I32), Expr::constant(1));
		let Expr::Call { args, .. } = expr else {
			panic!("expected call");
		};
		assert!(args.iter().all(|a| a.value_type() == ValueType::Object));
	}

	#[rstest]
	#[case(BinaryOperator::Lt, BinaryOperator::Gt)]
	#[case(BinaryOperator::Ge, BinaryOperator::Le)]
	#[case(BinaryOperator::Eq, BinaryOperator::Eq)]
	fn test_mirror(#[case] op: BinaryOperator, #[case] expected: BinaryOperator) {
		assert_eq!(op.mirror(), expected);
	}
}
