//! Statement accumulator bound to a dialect
//!
//! Every renderer in the crate writes through a [`SqlWriter`]: it owns the
//! SQL text, the collected parameters and the number of the next placeholder.
//! Identifiers and placeholders are rendered by the writer's dialect, so a
//! renderer never formats them by hand.
//!
//! Sub-expressions that must be rendered before their surroundings (function
//! arguments, concatenation operands) go through a [`detached`](SqlWriter::detached)
//! writer and are spliced back with [`push_fragment`](SqlWriter::push_fragment).

use super::dialect::Dialect;
use super::types::{SqlCommand, Value};

/// SQL text plus the parameters its placeholders refer to, under construction
///
/// # Examples
///
/// ```
/// use quarry_db::backends::{DatabaseType, SqlWriter, Value, dialect_for};
///
/// let mut w = SqlWriter::new(dialect_for(DatabaseType::SqlServer));
/// w.push("SELECT * FROM ");
/// w.push_table(Some("dbo"), "User");
/// w.push(" WHERE ");
/// w.push_identifier("Id");
/// w.push(" = ");
/// w.push_param(Value::Int(7));
///
/// let command = w.into_command();
/// assert_eq!(command.sql, "SELECT * FROM [dbo].[User] WHERE [Id] = @p1");
/// assert_eq!(command.parameters, vec![Value::Int(7)]);
/// ```
#[derive(Debug, Clone)]
pub struct SqlWriter<'d> {
	dialect: &'d dyn Dialect,
	buf: String,
	params: Vec<Value>,
	// 1-based number of the next placeholder
	next: usize,
}

impl<'d> SqlWriter<'d> {
	pub fn new(dialect: &'d dyn Dialect) -> Self {
		Self::starting_at(dialect, 1)
	}

	/// Writer whose first placeholder is numbered `next`
	pub fn starting_at(dialect: &'d dyn Dialect, next: usize) -> Self {
		Self {
			dialect,
			buf: String::new(),
			params: Vec::new(),
			next,
		}
	}

	/// Empty writer continuing this writer's placeholder numbering.
	///
	/// Its output is meant to be appended back with [`push_fragment`](Self::push_fragment)
	/// before anything else consumes a parameter here.
	pub fn detached(&self) -> Self {
		Self::starting_at(self.dialect, self.next)
	}

	pub fn dialect(&self) -> &'d dyn Dialect {
		self.dialect
	}

	pub fn push(&mut self, sql: &str) {
		self.buf.push_str(sql);
	}

	pub fn push_identifier(&mut self, name: &str) {
		let quoted = self.dialect.quote_identifier(name);
		self.buf.push_str(&quoted);
	}

	pub fn push_table(&mut self, schema: Option<&str>, table: &str) {
		let quoted = self.dialect.quote_table(schema, table);
		self.buf.push_str(&quoted);
	}

	/// Bind `value` behind the next placeholder.
	///
	/// `NULL` is written inline and consumes no parameter.
	pub fn push_param(&mut self, value: Value) {
		if value.is_null() {
			self.buf.push_str("NULL");
			return;
		}
		let placeholder = self.dialect.placeholder(self.next);
		self.buf.push_str(&placeholder);
		self.params.push(value);
		self.next += 1;
	}

	/// Write `items` with `separator` between them
	pub fn push_separated<I, F>(&mut self, items: I, separator: &str, mut write: F)
	where
		I: IntoIterator,
		F: FnMut(&mut Self, I::Item),
	{
		for (i, item) in items.into_iter().enumerate() {
			if i > 0 {
				self.buf.push_str(separator);
			}
			write(self, item);
		}
	}

	/// Fallible [`push_separated`](Self::push_separated); stops at the first error
	pub fn try_push_separated<I, E, F>(
		&mut self,
		items: I,
		separator: &str,
		mut write: F,
	) -> Result<(), E>
	where
		I: IntoIterator,
		F: FnMut(&mut Self, I::Item) -> Result<(), E>,
	{
		for (i, item) in items.into_iter().enumerate() {
			if i > 0 {
				self.buf.push_str(separator);
			}
			write(self, item)?;
		}
		Ok(())
	}

	/// Append text rendered elsewhere together with its parameters.
	///
	/// Numbered placeholders in `sql` must start at [`next_param`](Self::next_param).
	pub fn push_fragment(&mut self, sql: &str, params: &[Value]) {
		self.buf.push_str(sql);
		self.params.extend_from_slice(params);
		self.next += params.len();
	}

	pub fn next_param(&self) -> usize {
		self.next
	}

	pub fn sql(&self) -> &str {
		&self.buf
	}

	pub fn parameters(&self) -> &[Value] {
		&self.params
	}

	pub fn into_parts(self) -> (String, Vec<Value>) {
		(self.buf, self.params)
	}

	pub fn into_command(self) -> SqlCommand {
		SqlCommand::with_parameters(self.buf, self.params)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::dialect::dialect_for;
	use crate::backends::types::DatabaseType;
	use rstest::rstest;

	#[rstest]
	#[case(DatabaseType::SqlServer, "[Id] = @p1 AND [Name] = @p2")]
	#[case(DatabaseType::MySql, "`Id` = ? AND `Name` = ?")]
	#[case(DatabaseType::Sqlite, "\"Id\" = ? AND \"Name\" = ?")]
	fn test_placeholders_follow_dialect(#[case] database: DatabaseType, #[case] expected: &str) {
		// Arrange
		let mut w = SqlWriter::new(dialect_for(database));

		// Act
		w.push_identifier("Id");
		w.push(" = ");
		w.push_param(Value::Int(1));
		w.push(" AND ");
		w.push_identifier("Name");
		w.push(" = ");
		w.push_param(Value::from("x"));

		// Assert
		assert_eq!(w.sql(), expected);
		assert_eq!(w.parameters().len(), 2);
	}

	#[rstest]
	fn test_null_is_inlined() {
		let mut w = SqlWriter::new(dialect_for(DatabaseType::SqlServer));

		w.push_param(Value::Null);

		assert_eq!(w.sql(), "NULL");
		assert_eq!(w.next_param(), 1);
	}

	#[rstest]
	fn test_try_push_separated_stops_on_error() {
		let mut w = SqlWriter::new(dialect_for(DatabaseType::Sqlite));

		let result: Result<(), &str> = w.try_push_separated([1, 2, 3], ", ", |w, n| {
			if n == 3 {
				return Err("three");
			}
			w.push(&n.to_string());
			Ok(())
		});

		assert_eq!(result, Err("three"));
		assert_eq!(w.sql(), "1, 2, ");
	}

	#[rstest]
	fn test_detached_writer_continues_numbering() {
		// Arrange
		let mut parent = SqlWriter::new(dialect_for(DatabaseType::SqlServer));
		parent.push_param(Value::Int(1));

		// Act
		let mut child = parent.detached();
		child.push_param(Value::Int(2));
		let (sql, params) = child.into_parts();
		parent.push(" + ");
		parent.push_fragment(&sql, &params);
		parent.push(" + ");
		parent.push_param(Value::Int(3));

		// Assert
		assert_eq!(parent.sql(), "@p1 + @p2 + @p3");
		assert_eq!(
			parent.into_command().parameters,
			vec![Value::Int(1), Value::Int(2), Value::Int(3)]
		);
	}
}
