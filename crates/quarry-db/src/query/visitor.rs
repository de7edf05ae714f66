//! SQL expression visitor
//!
//! Walks a host expression tree and renders dialect SQL with positional
//! parameters. Every node is first offered to the translator pipeline; a
//! translated node is rendered as-is, while its children go through the
//! pipeline again. Nodes nobody translates fall back to the default rules
//! below, and anything left over is an [`QueryError::UnsupportedExpression`].
//!
//! Rendering rules worth knowing:
//!
//! - constants become parameters, intermediate literals are inlined
//! - `x == null` / `x != null` render `IS NULL` / `IS NOT NULL`
//! - boolean terms in predicate position are compared with the dialect's
//!   true literal; boolean literals there render `1 = 1` / `1 = 0`
//! - LIKE patterns made only of literals and constants fold into a single
//!   escaped parameter

use super::QueryError;
use super::expr::{BinaryOperator, Expr, SubQuery};
use super::sql_expr::{InSet, SqlExpr};
use super::translators::TranslatorPipeline;
use crate::backends::dialect::Dialect;
use crate::backends::sql_writer::SqlWriter;
use crate::backends::types::{SqlCommand, Value};

type Result<T> = std::result::Result<T, QueryError>;

/// Rendered SQL text with the parameters its placeholders refer to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
	pub sql: String,
	pub parameters: Vec<Value>,
}

impl SqlFragment {
	pub fn into_command(self) -> SqlCommand {
		SqlCommand::with_parameters(self.sql, self.parameters)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
	Predicate,
	Value,
}

/// Renders expression trees for one dialect
#[derive(Debug, Clone, Copy)]
pub struct SqlExpressionVisitor<'a> {
	dialect: &'a dyn Dialect,
	pipeline: &'a TranslatorPipeline,
}

impl<'a> SqlExpressionVisitor<'a> {
	pub fn new(dialect: &'a dyn Dialect, pipeline: &'a TranslatorPipeline) -> Self {
		Self { dialect, pipeline }
	}

	/// Render `expr` as a predicate (WHERE clause body)
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::backends::{DatabaseType, Value, ValueType, dialect_for};
	/// use quarry_db::query::{Expr, SqlExpressionVisitor, TranslatorPipeline};
	///
	/// let pipeline = TranslatorPipeline::shared();
	/// let visitor = SqlExpressionVisitor::new(dialect_for(DatabaseType::Sqlite), &pipeline);
	///
	/// let filter = Expr::column("Name", ValueType::String).starts_with(Expr::constant("Jo"));
	/// let fragment = visitor.visit(&filter).unwrap();
	///
	/// assert_eq!(fragment.sql, "\"Name\" LIKE ? ESCAPE '\\'");
	/// assert_eq!(fragment.parameters, vec![Value::from("Jo%")]);
	/// ```
	pub fn visit(&self, expr: &Expr) -> Result<SqlFragment> {
		let mut writer = SqlWriter::new(self.dialect);
		self.visit_into(&mut writer, expr)?;
		Ok(Self::fragment(writer))
	}

	/// Render `expr` as a value (selector, ORDER BY term, SET source)
	pub fn visit_value(&self, expr: &Expr) -> Result<SqlFragment> {
		let mut writer = SqlWriter::new(self.dialect);
		self.visit_value_into(&mut writer, expr)?;
		Ok(Self::fragment(writer))
	}

	/// Render a predicate into an existing writer, continuing its parameter numbering
	pub fn visit_into(&self, writer: &mut SqlWriter<'_>, expr: &Expr) -> Result<()> {
		self.render(writer, expr, Position::Predicate)
	}

	pub fn visit_value_into(&self, writer: &mut SqlWriter<'_>, expr: &Expr) -> Result<()> {
		self.render(writer, expr, Position::Value)
	}

	fn fragment(writer: SqlWriter<'_>) -> SqlFragment {
		let (sql, parameters) = writer.into_parts();
		SqlFragment { sql, parameters }
	}

	fn render(&self, w: &mut SqlWriter<'_>, expr: &Expr, pos: Position) -> Result<()> {
		match self.pipeline.translate(expr) {
			Some(translated) => self.render_node(w, &translated, pos),
			None => self.render_node(w, expr, pos),
		}
	}

	/// Render each expression detached, numbering parameters from `w`'s index
	fn render_parts(
		&self,
		w: &SqlWriter<'_>,
		exprs: &[&Expr],
		pos: Position,
	) -> Result<(Vec<String>, Vec<Value>)> {
		let mut parts = Vec::with_capacity(exprs.len());
		let mut values = Vec::new();
		for expr in exprs {
			let mut child = SqlWriter::starting_at(self.dialect, w.next_param() + values.len());
			self.render(&mut child, expr, pos)?;
			let (sql, child_values) = child.into_parts();
			parts.push(sql);
			values.extend(child_values);
		}
		Ok((parts, values))
	}

	fn push_true_comparison(&self, w: &mut SqlWriter<'_>) {
		w.push(" = ");
		w.push(self.dialect.true_literal());
	}

	fn push_bool_predicate(w: &mut SqlWriter<'_>, value: bool) {
		w.push(if value { "1 = 1" } else { "1 = 0" });
	}

	fn render_node(&self, w: &mut SqlWriter<'_>, expr: &Expr, pos: Position) -> Result<()> {
		match expr {
			Expr::Column {
				table,
				name,
				value_type,
			} => {
				if let Some(table) = table {
					w.push_identifier(table);
					w.push(".");
				}
				w.push_identifier(name);
				if pos == Position::Predicate && value_type.is_bool() {
					self.push_true_comparison(w);
				}
			}
			Expr::Constant { value, .. } => match (pos, value) {
				(Position::Predicate, Value::Bool(b)) => Self::push_bool_predicate(w, *b),
				_ => w.push_param(value.clone()),
			},
			Expr::Binary { op, left, right } => self.render_binary(w, expr, *op, left, right)?,
			Expr::Not(operand) => {
				w.push("NOT (");
				self.render(w, operand, Position::Predicate)?;
				w.push(")");
			}
			Expr::Negate(operand) => {
				w.push("-(");
				self.render(w, operand, Position::Value)?;
				w.push(")");
			}
			Expr::Convert { operand, .. } => self.render(w, operand, pos)?,
			Expr::List { items, .. } => {
				w.push("(");
				w.try_push_separated(items, ", ", |w, item| self.render(w, item, Position::Value))?;
				w.push(")");
			}
			Expr::SubQuery(sub) => {
				w.push("(");
				self.render_sub_query(w, sub)?;
				w.push(")");
			}
			Expr::Sql(node) => self.render_sql(w, node, pos)?,
			Expr::Call { .. } | Expr::Member { .. } => {
				return Err(QueryError::UnsupportedExpression(expr.describe()));
			}
		}
		Ok(())
	}

	fn render_binary(
		&self,
		w: &mut SqlWriter<'_>,
		expr: &Expr,
		op: BinaryOperator,
		left: &Expr,
		right: &Expr,
	) -> Result<()> {
		match op {
			BinaryOperator::And | BinaryOperator::Or => {
				w.push("(");
				self.render(w, left, Position::Predicate)?;
				w.push(" ");
				w.push(op.as_sql());
				w.push(" ");
				self.render(w, right, Position::Predicate)?;
				w.push(")");
			}
			BinaryOperator::Eq | BinaryOperator::Ne
				if left.is_null_constant() || right.is_null_constant() =>
			{
				let operand = if right.is_null_constant() { left } else { right };
				if operand.is_null_constant() {
					Self::push_bool_predicate(w, op == BinaryOperator::Eq);
				} else {
					self.render(w, operand, Position::Value)?;
					w.push(if op == BinaryOperator::Eq {
						" IS NULL"
					} else {
						" IS NOT NULL"
					});
				}
			}
			op if op.is_comparison() => {
				self.render(w, left, Position::Value)?;
				w.push(" ");
				w.push(op.as_sql());
				w.push(" ");
				self.render(w, right, Position::Value)?;
			}
			BinaryOperator::Add if expr.value_type().is_string() => {
				let (parts, values) = self.render_parts(w, &[left, right], Position::Value)?;
				w.push_fragment(&self.dialect.concat(&parts[0], &parts[1]), &values);
			}
			_ => {
				w.push("(");
				self.render(w, left, Position::Value)?;
				w.push(" ");
				w.push(op.as_sql());
				w.push(" ");
				self.render(w, right, Position::Value)?;
				w.push(")");
			}
		}
		Ok(())
	}

	fn render_sql(&self, w: &mut SqlWriter<'_>, node: &SqlExpr, pos: Position) -> Result<()> {
		match node {
			SqlExpr::IsNull(operand) => {
				self.render(w, operand, Position::Value)?;
				w.push(" IS NULL");
			}
			SqlExpr::Like { operand, pattern } => {
				self.render(w, operand, Position::Value)?;
				w.push(" LIKE ");
				match self.fold_pattern(pattern) {
					Some(folded) => w.push_param(Value::String(folded)),
					None => {
						let (sql, values) = self.render_pattern(w.next_param(), pattern)?;
						w.push_fragment(&sql, &values);
					}
				}
				if let Some(clause) = self.dialect.like_escape_clause() {
					w.push(" ");
					w.push(clause);
				}
			}
			SqlExpr::Literal { value, .. } => match (pos, value) {
				(Position::Predicate, Value::Bool(b)) => Self::push_bool_predicate(w, *b),
				_ => w.push(&self.dialect.render_literal(value)),
			},
			SqlExpr::StringCompare { left, right, op } => {
				self.render(w, left, Position::Value)?;
				if let Some(collation) = self.dialect.ordinal_collation() {
					w.push(" COLLATE ");
					w.push(collation);
				}
				w.push(" ");
				w.push(op.as_sql());
				w.push(" ");
				self.render(w, right, Position::Value)?;
			}
			SqlExpr::Function {
				function,
				return_type,
				args,
			} => {
				let args: Vec<&Expr> = args.iter().collect();
				let (parts, values) = self.render_parts(w, &args, Position::Value)?;
				w.push_fragment(&self.dialect.render_function(*function, &parts), &values);
				if pos == Position::Predicate && return_type.is_bool() {
					self.push_true_comparison(w);
				}
			}
			SqlExpr::In { operand, set } => self.render_membership(w, operand, set, false)?,
			SqlExpr::NotIn { operand, set } => self.render_membership(w, operand, set, true)?,
			SqlExpr::ExplicitCast { operand, target } => {
				let type_name = self.dialect.cast_type(target)?;
				w.push("CAST(");
				self.render(w, operand, Position::Value)?;
				w.push(" AS ");
				w.push(&type_name);
				w.push(")");
			}
		}
		Ok(())
	}

	fn render_membership(
		&self,
		w: &mut SqlWriter<'_>,
		operand: &Expr,
		set: &InSet,
		negated: bool,
	) -> Result<()> {
		if let InSet::Values(items) = set
			&& items.is_empty()
		{
			// Nothing is a member of the empty set
			Self::push_bool_predicate(w, negated);
			return Ok(());
		}
		self.render(w, operand, Position::Value)?;
		w.push(if negated { " NOT IN (" } else { " IN (" });
		match set {
			InSet::Values(items) => {
				w.try_push_separated(items, ", ", |w, item| self.render(w, item, Position::Value))?
			}
			InSet::SubQuery(sub) => self.render_sub_query(w, sub)?,
		}
		w.push(")");
		Ok(())
	}

	fn render_sub_query(&self, w: &mut SqlWriter<'_>, sub: &SubQuery) -> Result<()> {
		w.push("SELECT ");
		w.push_identifier(&sub.column);
		w.push(" FROM ");
		w.push_table(sub.schema.as_deref(), &sub.table);
		if let Some(filter) = &sub.filter {
			w.push(" WHERE ");
			self.render(w, filter, Position::Predicate)?;
		}
		Ok(())
	}

	/// Pattern text when built only from literals and string constants.
	/// Literal parts keep their wildcards, constant parts are escaped.
	fn fold_pattern(&self, pattern: &Expr) -> Option<String> {
		match pattern {
			Expr::Sql(node) => match &**node {
				SqlExpr::Literal {
					value: Value::String(s),
					..
				} => Some(s.clone()),
				_ => None,
			},
			Expr::Constant {
				value: Value::String(s),
				..
			} => Some(self.dialect.escape_like(s)),
			Expr::Constant {
				value: Value::Char(c),
				..
			} => Some(self.dialect.escape_like(&c.to_string())),
			Expr::Binary {
				op: BinaryOperator::Add,
				left,
				right,
			} => {
				let mut folded = self.fold_pattern(left)?;
				folded.push_str(&self.fold_pattern(right)?);
				Some(folded)
			}
			Expr::Convert { operand, .. } => self.fold_pattern(operand),
			_ => None,
		}
	}

	/// Render a pattern that references non-constant data, escaping string constants
	fn render_pattern(&self, start: usize, pattern: &Expr) -> Result<(String, Vec<Value>)> {
		let mut w = SqlWriter::starting_at(self.dialect, start);
		match pattern {
			Expr::Binary {
				op: BinaryOperator::Add,
				left,
				right,
			} => {
				let (l, mut values) = self.render_pattern(start, left)?;
				let (r, right_values) = self.render_pattern(start + values.len(), right)?;
				values.extend(right_values);
				w.push_fragment(&self.dialect.concat(&l, &r), &values);
			}
			Expr::Constant {
				value: Value::String(s),
				..
			} => {
				w.push_param(Value::String(self.dialect.escape_like(s)));
			}
			other => self.render(&mut w, other, Position::Value)?,
		}
		Ok(w.into_parts())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::dialect::dialect_for;
	use crate::backends::types::{DatabaseType, ValueType};
	use rstest::rstest;
	use std::sync::Arc;

	fn render(database: DatabaseType, expr: &Expr) -> SqlFragment {
		let pipeline = TranslatorPipeline::shared();
		SqlExpressionVisitor::new(dialect_for(database), &pipeline)
			.visit(expr)
			.unwrap()
	}

	fn name() -> Expr {
		Expr::column("Name", ValueType::String)
	}

	#[rstest]
	fn test_comparison_binds_constant() {
		// Arrange
		let expr = Expr::column("Age", ValueType::I32).ge(Expr::constant(18));

		// Act
		let fragment = render(DatabaseType::SqlServer, &expr);

		// Assert
		assert_eq!(fragment.sql, "[Age] >= @p1");
		assert_eq!(fragment.parameters, vec![Value::Int(18)]);
	}

	#[rstest]
	fn test_and_or_nesting_and_numbering() {
		let column = |name: &str| Expr::column(name, ValueType::I32);
		let expr = column("A").eq(Expr::constant(1)).and(
			column("B")
				.eq(Expr::constant(2))
				.or(column("C").lt(Expr::constant(3))),
		);

		let fragment = render(DatabaseType::SqlServer, &expr);

		assert_eq!(fragment.sql, "([A] = @p1 AND ([B] = @p2 OR [C] < @p3))");
	}

	#[rstest]
	#[case(DatabaseType::Sqlite, "\"Name\" LIKE ? ESCAPE '\\'")]
	#[case(DatabaseType::MySql, "`Name` LIKE ?")]
	#[case(DatabaseType::SqlServer, "[Name] LIKE @p1 ESCAPE '\\'")]
	fn test_contains_folds_pattern(#[case] database: DatabaseType, #[case] expected: &str) {
		// Act
		let fragment = render(database, &name().contains(Expr::constant("10%")));

		// Assert
		assert_eq!(fragment.sql, expected);
		assert_eq!(fragment.parameters, vec![Value::from("%10\\%%")]);
	}

	#[rstest]
	fn test_like_with_column_pattern_uses_concat() {
		let expr = name().starts_with(Expr::column("Prefix", ValueType::String));

		let fragment = render(DatabaseType::MySql, &expr);

		assert_eq!(fragment.sql, "`Name` LIKE CONCAT(`Prefix`, '%')");
		assert!(fragment.parameters.is_empty());
	}

	#[rstest]
	#[case(BinaryOperator::Eq, "\"DeletedAt\" IS NULL")]
	#[case(BinaryOperator::Ne, "\"DeletedAt\" IS NOT NULL")]
	fn test_null_comparison(#[case] op: BinaryOperator, #[case] expected: &str) {
		let column = Expr::column("DeletedAt", ValueType::DateTime.nullable());
		let expr = Expr::binary(op, column, Expr::null(ValueType::DateTime));

		let fragment = render(DatabaseType::Sqlite, &expr);

		assert_eq!(fragment.sql, expected);
		assert!(fragment.parameters.is_empty());
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "([IsActive] = 1 AND NOT ([IsLocked] = 1))")]
	#[case(DatabaseType::MySql, "(`IsActive` = TRUE AND NOT (`IsLocked` = TRUE))")]
	fn test_bool_terms_in_predicate_position(
		#[case] database: DatabaseType,
		#[case] expected: &str,
	) {
		let expr = Expr::column("IsActive", ValueType::Bool)
			.and(!Expr::column("IsLocked", ValueType::Bool));

		assert_eq!(render(database, &expr).sql, expected);
	}

	#[rstest]
	fn test_bool_literal_predicate() {
		let expr = Expr::equals(
			Expr::column("Id", ValueType::I32),
			Expr::column("Name", ValueType::String),
		);
		assert_eq!(render(DatabaseType::Sqlite, &expr).sql, "1 = 0");
	}

	#[rstest]
	fn test_equals_renders_like_operator() {
		// Arrange
		let helper = Expr::equals(name(), Expr::constant("bob"));
		let operator = name().eq(Expr::constant("bob"));

		// Act
		let via_helper = render(DatabaseType::SqlServer, &helper);
		let via_operator = render(DatabaseType::SqlServer, &operator);

		// Assert
		assert_eq!(via_helper, via_operator);
	}

	#[rstest]
	fn test_in_list_and_empty_sets() {
		let id = || Expr::column("Id", ValueType::I32);
		let list = Expr::list(vec![Expr::constant(1), Expr::constant(2)], ValueType::I32);
		let empty = Expr::list(Vec::new(), ValueType::I32);

		assert_eq!(
			render(DatabaseType::SqlServer, &list.contains(id())).sql,
			"[Id] IN (@p1, @p2)"
		);
		assert_eq!(
			render(DatabaseType::SqlServer, &Expr::in_list(id(), empty.clone())).sql,
			"1 = 0"
		);
		assert_eq!(
			render(DatabaseType::SqlServer, &Expr::not_in_list(id(), empty)).sql,
			"1 = 1"
		);
	}

	#[rstest]
	fn test_in_sub_query() {
		let sub = SubQuery::new("Orders", "UserId", ValueType::I32)
			.filter(Expr::column("Total", ValueType::Decimal).gt(Expr::constant(100)));
		let expr = Expr::in_list(Expr::column("Id", ValueType::I32), Expr::sub_query(sub));

		let fragment = render(DatabaseType::Sqlite, &expr);

		assert_eq!(
			fragment.sql,
			"\"Id\" IN (SELECT \"UserId\" FROM \"Orders\" WHERE \"Total\" > ?)"
		);
		assert_eq!(fragment.parameters, vec![Value::Int(100)]);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "(@p1 + CAST([Id] AS nvarchar(max))) = @p2")]
	#[case(DatabaseType::MySql, "CONCAT(?, CAST(`Id` AS CHAR)) = ?")]
	#[case(DatabaseType::Sqlite, "(? || CAST(\"Id\" AS TEXT)) = ?")]
	fn test_string_concat_casts(#[case] database: DatabaseType, #[case] expected: &str) {
		let expr = (Expr::constant("#") + Expr::column("Id", ValueType::I32))
			.eq(Expr::constant("#7"));

		let fragment = render(database, &expr);

		assert_eq!(fragment.sql, expected);
		assert_eq!(fragment.parameters, vec![Value::from("#"), Value::from("#7")]);
	}

	#[rstest]
	fn test_functions_and_date_parts() {
		let expr = name()
			.to_upper()
			.eq(Expr::constant("BOB"))
			.and(Expr::column("CreatedAt", ValueType::DateTime).year().eq(Expr::constant(2024)));

		let fragment = render(DatabaseType::SqlServer, &expr);

		assert_eq!(
			fragment.sql,
			"(UPPER([Name]) = @p1 AND DATEPART(year, [CreatedAt]) = @p2)"
		);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "[Name] COLLATE Latin1_General_BIN2 <= @p1")]
	#[case(DatabaseType::MySql, "`Name` COLLATE utf8mb4_bin <= ?")]
	#[case(DatabaseType::Sqlite, "\"Name\" <= ?")]
	fn test_string_compare_is_ordinal(#[case] database: DatabaseType, #[case] expected: &str) {
		// Arrange
		let expr = Expr::compare(name(), Expr::constant("M")).le(Expr::constant(0));

		// Act
		let fragment = render(database, &expr);

		// Assert
		assert_eq!(fragment.sql, expected);
		assert_eq!(fragment.parameters, vec![Value::from("M")]);
	}

	#[rstest]
	fn test_like_over_non_string_column_casts_explicitly() {
		// Arrange
		let expr = name().starts_with(Expr::column("Id", ValueType::I32));

		// Act
		let fragment = render(DatabaseType::SqlServer, &expr);

		// Assert
		assert_eq!(
			fragment.sql,
			"[Name] LIKE (CAST([Id] AS nvarchar(max)) + N'%') ESCAPE '\\'"
		);
		assert!(fragment.parameters.is_empty());
	}

	#[rstest]
	fn test_is_null_or_empty() {
		let fragment = render(DatabaseType::Sqlite, &Expr::is_null_or_empty(name()));
		assert_eq!(fragment.sql, "\"Name\" IS NULL");
	}

	#[rstest]
	fn test_arithmetic_and_negation() {
		let expr = (-Expr::column("Balance", ValueType::Decimal))
			.gt(Expr::column("Limit", ValueType::Decimal) * Expr::constant(2));
		assert_eq!(
			render(DatabaseType::Sqlite, &expr).sql,
			"-(\"Balance\") > (\"Limit\" * ?)"
		);
	}

	#[rstest]
	fn test_unknown_call_is_unsupported() {
		// Arrange
		let pipeline = TranslatorPipeline::shared();
		let visitor = SqlExpressionVisitor::new(dialect_for(DatabaseType::Sqlite), &pipeline);
		let expr = name().call("Reverse", vec![], ValueType::String).eq(Expr::constant("x"));

		// Act
		let result = visitor.visit(&expr);

		// Assert
		assert!(
			matches!(result, Err(QueryError::UnsupportedExpression(ref d)) if d == "call Reverse/0")
		);
	}

	#[rstest]
	fn test_cast_to_unmappable_type_fails() {
		let pipeline = Arc::new(TranslatorPipeline::builder().build());
		let visitor = SqlExpressionVisitor::new(dialect_for(DatabaseType::MySql), &pipeline);
		let expr: Expr =
			SqlExpr::cast(Expr::column("Shape", ValueType::Object), ValueType::Object).into();

		assert!(matches!(
			visitor.visit_value(&expr),
			Err(QueryError::TypeMapping(_))
		));
	}
}
