//! Statement generation
//!
//! Builds complete SELECT, paged SELECT, TOP-N, COUNT and write statements
//! from a [`SelectQuery`] description, rendering filters and selectors with
//! the [`SqlExpressionVisitor`].

use super::expr::Expr;
use super::translators::TranslatorPipeline;
use super::visitor::{SqlExpressionVisitor, SqlFragment};
use super::{QueryError, Result};
use crate::backends::dialect::{Dialect, PagingStyle, SqlFunction, dialect_for};
use crate::backends::sql_writer::SqlWriter;
use crate::backends::types::{DatabaseType, SqlCommand, Value};
use crate::metadata::{EntityType, KeyRole};
use indexmap::IndexMap;
use quarry_conf::Settings;
use std::sync::Arc;

/// Column name standing for "count rows" rather than a real column
pub const SYNTHETIC_COUNT_COLUMN: &str = "1";

/// Alias of the window total column in combined paging statements
pub const TOTAL_COLUMN: &str = "__total";

/// Alias of the derived table wrapping DISTINCT rows in OFFSET/FETCH paging
const DERIVED_TABLE_ALIAS: &str = "page";

/// Default page size when neither the request nor the settings carry one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
	pub expr: Expr,
	pub descending: bool,
}

/// Description of a single-table read
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
	pub table: String,
	pub schema: Option<String>,
	/// Selectors; empty selects every column
	pub fields: Vec<Expr>,
	pub filter: Option<Expr>,
	pub order_by: Vec<OrderBy>,
	pub distinct: bool,
	/// Column counted by [`QuerySqlGenerator::count`]; `None` counts rows
	pub aggregation: Option<String>,
}

impl SelectQuery {
	pub fn new(table: impl Into<String>) -> Self {
		Self {
			table: table.into(),
			schema: None,
			fields: Vec::new(),
			filter: None,
			order_by: Vec::new(),
			distinct: false,
			aggregation: None,
		}
	}

	/// Query over an entity's table
	pub fn from_entity(entity: &EntityType) -> Self {
		Self {
			schema: entity.schema.clone(),
			..Self::new(entity.table.clone())
		}
	}

	pub fn schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn field(mut self, field: Expr) -> Self {
		self.fields.push(field);
		self
	}

	/// Add a filter, AND-ed with any existing one
	pub fn filter(mut self, filter: Expr) -> Self {
		self.filter = Some(match self.filter.take() {
			Some(existing) => existing.and(filter),
			None => filter,
		});
		self
	}

	pub fn order_by(mut self, expr: Expr) -> Self {
		self.order_by.push(OrderBy {
			expr,
			descending: false,
		});
		self
	}

	pub fn order_by_desc(mut self, expr: Expr) -> Self {
		self.order_by.push(OrderBy {
			expr,
			descending: true,
		});
		self
	}

	pub fn distinct(mut self) -> Self {
		self.distinct = true;
		self
	}

	pub fn aggregate(mut self, column: impl Into<String>) -> Self {
		self.aggregation = Some(column.into());
		self
	}
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	pub index: u32,
	pub size: Option<u32>,
}

impl PageRequest {
	pub fn new(index: u32, size: u32) -> Self {
		Self {
			index,
			size: Some(size),
		}
	}

	/// Page `index` with the generator's default size
	pub fn index(index: u32) -> Self {
		Self { index, size: None }
	}

	/// Effective `(size, offset)`; the index is clamped to at least 1
	///
	/// # Examples
	///
	/// ```
	/// use quarry_db::query::PageRequest;
	///
	/// assert_eq!(PageRequest::new(1, 20).resolve(20), (20, 0));
	/// assert_eq!(PageRequest::new(3, 20).resolve(20), (20, 40));
	/// assert_eq!(PageRequest::new(0, 10).resolve(20), (10, 0));
	/// assert_eq!(PageRequest::index(2).resolve(25), (25, 25));
	/// ```
	pub fn resolve(&self, default_size: u32) -> (u32, u64) {
		let size = match self.size {
			Some(size) if size > 0 => size,
			_ if default_size > 0 => default_size,
			_ => DEFAULT_PAGE_SIZE,
		};
		let index = self.index.max(1);
		let offset = u64::from(index - 1) * u64::from(size);
		(size, offset)
	}
}

/// Statements for one page
#[derive(Debug, Clone, PartialEq)]
pub enum PagedCommand {
	/// Rows and total in one statement; the total is the `total_column` of every row
	Combined {
		command: SqlCommand,
		total_column: String,
	},
	/// Rows and total as two statements sharing one filter
	Split { data: SqlCommand, count: SqlCommand },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery {
	pub size: u32,
	pub offset: u64,
	pub command: PagedCommand,
}

/// Statement generator for one dialect
#[derive(Debug, Clone)]
pub struct QuerySqlGenerator {
	dialect: &'static dyn Dialect,
	pipeline: Arc<TranslatorPipeline>,
	default_page_size: u32,
}

impl QuerySqlGenerator {
	/// Generator using the shared built-in translator pipeline
	pub fn new(database: DatabaseType) -> Self {
		Self {
			dialect: dialect_for(database),
			pipeline: TranslatorPipeline::shared(),
			default_page_size: DEFAULT_PAGE_SIZE,
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(settings.database.engine.into())
			.with_default_page_size(settings.query.default_page_size)
	}

	pub fn with_pipeline(mut self, pipeline: Arc<TranslatorPipeline>) -> Self {
		self.pipeline = pipeline;
		self
	}

	pub fn with_default_page_size(mut self, size: u32) -> Self {
		self.default_page_size = size;
		self
	}

	pub fn dialect(&self) -> &'static dyn Dialect {
		self.dialect
	}

	pub fn visitor(&self) -> SqlExpressionVisitor<'_> {
		SqlExpressionVisitor::new(self.dialect, &self.pipeline)
	}

	fn finish(writer: SqlWriter<'_>) -> SqlCommand {
		let command = writer.into_command();
		tracing::debug!(
			sql = %command.sql,
			parameters = command.parameters.len(),
			"Generated query"
		);
		command
	}

	fn write_fields(&self, w: &mut SqlWriter<'_>, query: &SelectQuery) -> Result<()> {
		if query.fields.is_empty() {
			w.push("*");
			return Ok(());
		}
		let visitor = self.visitor();
		w.try_push_separated(&query.fields, ", ", |w, field| {
			visitor.visit_value_into(w, field)
		})
	}

	fn write_from(&self, w: &mut SqlWriter<'_>, query: &SelectQuery) {
		w.push(" FROM ");
		w.push_table(query.schema.as_deref(), &query.table);
	}

	fn write_where(&self, w: &mut SqlWriter<'_>, filter: Option<&Expr>) -> Result<()> {
		if let Some(filter) = filter {
			w.push(" WHERE ");
			self.visitor().visit_into(w, filter)?;
		}
		Ok(())
	}

	fn write_where_fragment(w: &mut SqlWriter<'_>, filter: Option<&SqlFragment>) {
		if let Some(filter) = filter {
			w.push(" WHERE ");
			w.push_fragment(&filter.sql, &filter.parameters);
		}
	}

	fn write_order_by(&self, w: &mut SqlWriter<'_>, query: &SelectQuery) -> Result<()> {
		if query.order_by.is_empty() {
			return Ok(());
		}
		w.push(" ORDER BY ");
		let visitor = self.visitor();
		w.try_push_separated(&query.order_by, ", ", |w, order| {
			visitor.visit_value_into(w, &order.expr)?;
			if order.descending {
				w.push(" DESC");
			}
			Ok(())
		})
	}

	fn select_prefix(query: &SelectQuery) -> &'static str {
		if query.distinct {
			"SELECT DISTINCT "
		} else {
			"SELECT "
		}
	}

	/// `SELECT fields FROM table WHERE filter ORDER BY …`
	pub fn select(&self, query: &SelectQuery) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		w.push(Self::select_prefix(query));
		self.write_fields(&mut w, query)?;
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		self.write_order_by(&mut w, query)?;
		Ok(Self::finish(w))
	}

	/// First `n` rows: `TOP (n)` on SQL Server, `LIMIT n` elsewhere
	pub fn top(&self, query: &SelectQuery, n: u64) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		w.push(Self::select_prefix(query));
		if self.dialect.paging_style() == PagingStyle::OffsetFetch {
			w.push(&format!("TOP ({n}) "));
		}
		self.write_fields(&mut w, query)?;
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		self.write_order_by(&mut w, query)?;
		if self.dialect.paging_style() == PagingStyle::Limit {
			w.push(&format!(" LIMIT {n}"));
		}
		Ok(Self::finish(w))
	}

	/// Whether the count aggregates a real column rather than the synthetic `1`
	fn counts_column(query: &SelectQuery) -> bool {
		matches!(query.aggregation.as_deref(), Some(column) if column != SYNTHETIC_COUNT_COLUMN)
	}

	fn count_expression(&self, query: &SelectQuery) -> String {
		match query.aggregation.as_deref() {
			Some(column) if Self::counts_column(query) && query.distinct => {
				format!("COUNT(DISTINCT {})", self.dialect.quote_identifier(column))
			}
			Some(column) if Self::counts_column(query) => {
				format!("COUNT({})", self.dialect.quote_identifier(column))
			}
			_ => format!("COUNT({SYNTHETIC_COUNT_COLUMN})"),
		}
	}

	/// Row count honouring the query's filter and distinct aggregation
	pub fn count(&self, query: &SelectQuery) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		w.push("SELECT ");
		w.push(&self.count_expression(query));
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		Ok(Self::finish(w))
	}

	/// Statements for one page of results plus the total row count
	pub fn page(&self, query: &SelectQuery, page: PageRequest) -> Result<PagedQuery> {
		let (size, offset) = page.resolve(self.default_page_size);
		let command = match self.dialect.paging_style() {
			PagingStyle::OffsetFetch => self.page_combined(query, size, offset)?,
			PagingStyle::Limit => self.page_split(query, size, offset)?,
		};
		Ok(PagedQuery {
			size,
			offset,
			command,
		})
	}

	/// OFFSET/FETCH paging with the total as a window count.
	///
	/// A window count runs before DISTINCT and cannot itself be distinct, so a
	/// distinct count over a column falls back to a separate count statement.
	fn page_combined(&self, query: &SelectQuery, size: u32, offset: u64) -> Result<PagedCommand> {
		if query.distinct && Self::counts_column(query) {
			return Ok(PagedCommand::Split {
				data: self.offset_fetch(query, size, offset, false)?,
				count: self.count(query)?,
			});
		}
		Ok(PagedCommand::Combined {
			command: self.offset_fetch(query, size, offset, true)?,
			total_column: TOTAL_COLUMN.to_string(),
		})
	}

	fn offset_fetch(
		&self,
		query: &SelectQuery,
		size: u32,
		offset: u64,
		with_total: bool,
	) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		// DISTINCT rows are paged from a derived table so the outer ORDER BY
		// is not restricted to the select list
		if query.distinct {
			w.push("SELECT * FROM (");
		}
		w.push(Self::select_prefix(query));
		self.write_fields(&mut w, query)?;
		if with_total {
			w.push(", COUNT(*) OVER() AS ");
			w.push_identifier(TOTAL_COLUMN);
		}
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		if query.distinct {
			w.push(") AS ");
			w.push_identifier(DERIVED_TABLE_ALIAS);
		}
		if query.order_by.is_empty() {
			// OFFSET requires an ORDER BY
			w.push(" ORDER BY (SELECT NULL)");
		} else {
			self.write_order_by(&mut w, query)?;
		}
		w.push(&format!(" OFFSET {offset} ROWS FETCH NEXT {size} ROWS ONLY"));
		Ok(Self::finish(w))
	}

	fn page_split(&self, query: &SelectQuery, size: u32, offset: u64) -> Result<PagedCommand> {
		let filter = query
			.filter
			.as_ref()
			.map(|filter| self.visitor().visit(filter))
			.transpose()?;

		let mut data = SqlWriter::new(self.dialect);
		data.push(Self::select_prefix(query));
		self.write_fields(&mut data, query)?;
		self.write_from(&mut data, query);
		Self::write_where_fragment(&mut data, filter.as_ref());
		self.write_order_by(&mut data, query)?;
		data.push(&format!(" LIMIT {size} OFFSET {offset}"));

		let mut count = SqlWriter::new(self.dialect);
		count.push("SELECT ");
		count.push(&self.count_expression(query));
		self.write_from(&mut count, query);
		Self::write_where_fragment(&mut count, filter.as_ref());

		Ok(PagedCommand::Split {
			data: Self::finish(data),
			count: Self::finish(count),
		})
	}

	/// `INSERT` of the supplied values; identity and row-version columns are left to the database
	pub fn insert(
		&self,
		entity: &EntityType,
		values: &IndexMap<String, Value>,
	) -> Result<SqlCommand> {
		Self::check_known_columns(entity, values)?;
		let columns: Vec<_> = entity
			.columns
			.iter()
			.filter(|c| c.key_role != KeyRole::Identity && !c.is_row_version)
			.filter_map(|c| values.get(&c.name).map(|v| (c, v)))
			.collect();

		let mut w = SqlWriter::new(self.dialect);
		w.push("INSERT INTO ");
		w.push_table(entity.schema.as_deref(), &entity.table);
		if columns.is_empty() {
			w.push(match self.dialect.database_type() {
				DatabaseType::MySql => " () VALUES ()",
				DatabaseType::SqlServer | DatabaseType::Sqlite => " DEFAULT VALUES",
			});
			return Ok(Self::finish(w));
		}
		w.push(" (");
		w.push_separated(&columns, ", ", |w, (column, _)| w.push_identifier(&column.name));
		w.push(") VALUES (");
		w.push_separated(&columns, ", ", |w, (_, value)| w.push_param((*value).clone()));
		w.push(")");
		Ok(Self::finish(w))
	}

	/// `UPDATE … SET … WHERE filter`; key, row-version and not-updatable columns are skipped
	pub fn update(
		&self,
		entity: &EntityType,
		values: &IndexMap<String, Value>,
		filter: &Expr,
	) -> Result<SqlCommand> {
		Self::check_known_columns(entity, values)?;
		let columns: Vec<_> = entity
			.columns
			.iter()
			.filter(|c| c.is_updatable && !c.is_key() && !c.is_row_version)
			.filter_map(|c| values.get(&c.name).map(|v| (c, v)))
			.collect();
		if columns.is_empty() {
			return Err(QueryError::InvalidQuery(format!(
				"no updatable columns supplied for {}",
				entity.table
			)));
		}

		let mut w = SqlWriter::new(self.dialect);
		w.push("UPDATE ");
		w.push_table(entity.schema.as_deref(), &entity.table);
		w.push(" SET ");
		w.push_separated(&columns, ", ", |w, (column, value)| {
			w.push_identifier(&column.name);
			w.push(" = ");
			w.push_param((*value).clone());
		});
		self.write_where(&mut w, Some(filter))?;
		Ok(Self::finish(w))
	}

	pub fn delete(&self, entity: &EntityType, filter: Option<&Expr>) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		w.push("DELETE FROM ");
		w.push_table(entity.schema.as_deref(), &entity.table);
		self.write_where(&mut w, filter)?;
		Ok(Self::finish(w))
	}

	/// Single aggregate over the filtered rows, e.g. `SELECT SUM(x) FROM …`
	pub fn scalar(
		&self,
		query: &SelectQuery,
		function: SqlFunction,
		operand: &Expr,
	) -> Result<SqlCommand> {
		if !function.is_aggregate() {
			return Err(QueryError::InvalidQuery(format!(
				"{function:?} is not an aggregate function"
			)));
		}
		let mut w = SqlWriter::new(self.dialect);
		w.push("SELECT ");
		let mut argument = w.detached();
		self.visitor().visit_value_into(&mut argument, operand)?;
		let (argument, parameters) = argument.into_parts();
		w.push_fragment(&self.dialect.render_function(function, &[argument]), &parameters);
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		Ok(Self::finish(w))
	}

	/// Existence probe returning 1 or 0
	pub fn any(&self, query: &SelectQuery) -> Result<SqlCommand> {
		let mut w = SqlWriter::new(self.dialect);
		let (open, close) = match self.dialect.database_type() {
			DatabaseType::SqlServer => ("SELECT CASE WHEN EXISTS (", ") THEN 1 ELSE 0 END"),
			DatabaseType::MySql | DatabaseType::Sqlite => ("SELECT EXISTS (", ")"),
		};
		w.push(open);
		w.push("SELECT 1");
		self.write_from(&mut w, query);
		self.write_where(&mut w, query.filter.as_ref())?;
		w.push(close);
		Ok(Self::finish(w))
	}

	fn check_known_columns(entity: &EntityType, values: &IndexMap<String, Value>) -> Result<()> {
		match values.keys().find(|name| entity.find_column(name).is_none()) {
			Some(unknown) => Err(QueryError::InvalidQuery(format!(
				"{} has no column {unknown}",
				entity.table
			))),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::types::ValueType;
	use crate::metadata::ColumnMetadata;
	use rstest::{fixture, rstest};

	#[fixture]
	fn user() -> EntityType {
		EntityType::new("User")
			.column(ColumnMetadata::new("Id", ValueType::I32).identity())
			.column(ColumnMetadata::new("Name", ValueType::String).size(64))
			.column(ColumnMetadata::new("CreatedAt", ValueType::DateTime).not_updatable())
	}

	fn active_query() -> SelectQuery {
		SelectQuery::new("User")
			.field(Expr::column("Id", ValueType::I32))
			.field(Expr::column("Name", ValueType::String))
			.filter(Expr::column("Name", ValueType::String).starts_with(Expr::constant("A")))
	}

	#[rstest]
	fn test_select_with_order() {
		// Arrange
		let generator = QuerySqlGenerator::new(DatabaseType::Sqlite);
		let query = active_query().order_by_desc(Expr::column("Id", ValueType::I32));

		// Act
		let command = generator.select(&query).unwrap();

		// Assert
		assert_eq!(
			command.sql,
			"SELECT \"Id\", \"Name\" FROM \"User\" WHERE \"Name\" LIKE ? ESCAPE '\\' ORDER BY \"Id\" DESC"
		);
		assert_eq!(command.parameters, vec![Value::from("A%")]);
	}

	#[rstest]
	#[case(DatabaseType::SqlServer, "SELECT TOP (5) * FROM [User]")]
	#[case(DatabaseType::MySql, "SELECT * FROM `User` LIMIT 5")]
	#[case(DatabaseType::Sqlite, "SELECT * FROM \"User\" LIMIT 5")]
	fn test_top(#[case] database: DatabaseType, #[case] expected: &str) {
		let command = QuerySqlGenerator::new(database)
			.top(&SelectQuery::new("User"), 5)
			.unwrap();
		assert_eq!(command.sql, expected);
	}

	#[rstest]
	#[case(SelectQuery::new("User").distinct().aggregate("Name"), "SELECT COUNT(DISTINCT \"Name\") FROM \"User\"")]
	#[case(SelectQuery::new("User").distinct().aggregate("1"), "SELECT COUNT(1) FROM \"User\"")]
	#[case(SelectQuery::new("User").distinct(), "SELECT COUNT(1) FROM \"User\"")]
	#[case(SelectQuery::new("User").aggregate("Name"), "SELECT COUNT(\"Name\") FROM \"User\"")]
	fn test_count_distinct(#[case] query: SelectQuery, #[case] expected: &str) {
		let command = QuerySqlGenerator::new(DatabaseType::Sqlite)
			.count(&query)
			.unwrap();
		assert_eq!(command.sql, expected);
	}

	#[rstest]
	fn test_page_combined_on_sqlserver() {
		// Arrange
		let generator = QuerySqlGenerator::new(DatabaseType::SqlServer);

		// Act
		let page = generator.page(&active_query(), PageRequest::new(3, 20)).unwrap();

		// Assert
		assert_eq!(page.offset, 40);
		let PagedCommand::Combined {
			command,
			total_column,
		} = page.command
		else {
			panic!("expected combined paging");
		};
		assert_eq!(total_column, "__total");
		assert_eq!(
			command.sql,
			"SELECT [Id], [Name], COUNT(*) OVER() AS [__total] FROM [User] WHERE [Name] LIKE @p1 ESCAPE '\\' ORDER BY (SELECT NULL) OFFSET 40 ROWS FETCH NEXT 20 ROWS ONLY"
		);
	}

	#[rstest]
	fn test_distinct_column_page_on_sqlserver_counts_distinct_rows() {
		// Arrange
		let generator = QuerySqlGenerator::new(DatabaseType::SqlServer);
		let query = SelectQuery::new("T")
			.field(Expr::column("Name", ValueType::String))
			.distinct()
			.aggregate("Name");

		// Act
		let page = generator.page(&query, PageRequest::new(1, 20)).unwrap();

		// Assert
		let PagedCommand::Split { data, count } = page.command else {
			panic!("a distinct column count cannot be a window count");
		};
		assert_eq!(
			data.sql,
			"SELECT * FROM (SELECT DISTINCT [Name] FROM [T]) AS [page] ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 20 ROWS ONLY"
		);
		assert_eq!(count.sql, "SELECT COUNT(DISTINCT [Name]) FROM [T]");
		assert_eq!(count, generator.count(&query).unwrap());
	}

	#[rstest]
	fn test_distinct_page_on_sqlserver_orders_outside_derived_table() {
		// Arrange
		let generator = QuerySqlGenerator::new(DatabaseType::SqlServer);
		let query = active_query()
			.distinct()
			.order_by(Expr::column("Name", ValueType::String));

		// Act
		let page = generator.page(&query, PageRequest::new(2, 10)).unwrap();

		// Assert
		let PagedCommand::Combined { command, .. } = page.command else {
			panic!("a row count pages in one statement");
		};
		assert_eq!(
			command.sql,
			"SELECT * FROM (SELECT DISTINCT [Id], [Name], COUNT(*) OVER() AS [__total] FROM [User] WHERE [Name] LIKE @p1 ESCAPE '\\') AS [page] ORDER BY [Name] OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"
		);
		assert_eq!(command.parameters, vec![Value::from("A%")]);
	}

	#[rstest]
	#[case(DatabaseType::MySql)]
	#[case(DatabaseType::Sqlite)]
	fn test_page_split_shares_filter(#[case] database: DatabaseType) {
		// Arrange
		let generator = QuerySqlGenerator::new(database);

		// Act
		let page = generator.page(&active_query(), PageRequest::new(1, 20)).unwrap();

		// Assert
		assert_eq!(page.offset, 0);
		let PagedCommand::Split { data, count } = page.command else {
			panic!("expected split paging");
		};
		assert!(data.sql.ends_with(" LIMIT 20 OFFSET 0"));
		assert_eq!(data.parameters, count.parameters);
		let data_where = data.sql.split(" WHERE ").nth(1).unwrap();
		let count_where = count.sql.split(" WHERE ").nth(1).unwrap();
		assert!(data_where.starts_with(count_where));
	}

	#[rstest]
	fn test_page_uses_configured_default_size() {
		let generator = QuerySqlGenerator::new(DatabaseType::Sqlite).with_default_page_size(50);
		let page = generator
			.page(&SelectQuery::new("User"), PageRequest::index(2))
			.unwrap();
		assert_eq!((page.size, page.offset), (50, 50));
	}

	#[rstest]
	fn test_insert_skips_identity(user: EntityType) {
		// Arrange
		let values = IndexMap::from([
			("Name".to_string(), Value::from("Ann")),
			("Id".to_string(), Value::Int(9)),
		]);

		// Act
		let command = QuerySqlGenerator::new(DatabaseType::SqlServer)
			.insert(&user, &values)
			.unwrap();

		// Assert
		assert_eq!(command.sql, "INSERT INTO [User] ([Name]) VALUES (@p1)");
		assert_eq!(command.parameters, vec![Value::from("Ann")]);
	}

	#[rstest]
	fn test_update_excludes_not_updatable_columns(user: EntityType) {
		// Arrange
		let values = IndexMap::from([
			("Name".to_string(), Value::from("Bo")),
			("CreatedAt".to_string(), Value::from("2020-01-01")),
		]);
		let filter = Expr::column("Id", ValueType::I32).eq(Expr::constant(4));

		// Act
		let command = QuerySqlGenerator::new(DatabaseType::SqlServer)
			.update(&user, &values, &filter)
			.unwrap();

		// Assert
		assert_eq!(command.sql, "UPDATE [User] SET [Name] = @p1 WHERE [Id] = @p2");
		assert_eq!(command.parameters, vec![Value::from("Bo"), Value::Int(4)]);
	}

	#[rstest]
	fn test_update_without_updatable_columns_fails(user: EntityType) {
		let values = IndexMap::from([("CreatedAt".to_string(), Value::from("2020-01-01"))]);
		let filter = Expr::column("Id", ValueType::I32).eq(Expr::constant(4));

		let result = QuerySqlGenerator::new(DatabaseType::Sqlite).update(&user, &values, &filter);

		assert!(matches!(result, Err(QueryError::InvalidQuery(_))));
	}

	#[rstest]
	fn test_unknown_column_is_rejected(user: EntityType) {
		let values = IndexMap::from([("Email".to_string(), Value::from("a@b"))]);
		let result = QuerySqlGenerator::new(DatabaseType::Sqlite).insert(&user, &values);
		assert!(matches!(result, Err(QueryError::InvalidQuery(msg)) if msg.contains("Email")));
	}

	#[rstest]
	fn test_delete_and_scalar_and_any(user: EntityType) {
		let generator = QuerySqlGenerator::new(DatabaseType::MySql);
		let filter = Expr::column("Id", ValueType::I32).gt(Expr::constant(10));
		let query = SelectQuery::from_entity(&user).filter(filter.clone());

		assert_eq!(
			generator.delete(&user, Some(&filter)).unwrap().sql,
			"DELETE FROM `User` WHERE `Id` > ?"
		);
		assert_eq!(
			generator
				.scalar(&query, SqlFunction::Max, &Expr::column("Id", ValueType::I32))
				.unwrap()
				.sql,
			"SELECT MAX(`Id`) FROM `User` WHERE `Id` > ?"
		);
		assert_eq!(
			generator.any(&query).unwrap().sql,
			"SELECT EXISTS (SELECT 1 FROM `User` WHERE `Id` > ?)"
		);
		assert!(
			generator
				.scalar(&query, SqlFunction::Upper, &Expr::column("Id", ValueType::I32))
				.is_err()
		);
	}

	#[rstest]
	fn test_any_on_sqlserver() {
		let command = QuerySqlGenerator::new(DatabaseType::SqlServer)
			.any(&SelectQuery::new("User"))
			.unwrap();
		assert_eq!(
			command.sql,
			"SELECT CASE WHEN EXISTS (SELECT 1 FROM [User]) THEN 1 ELSE 0 END"
		);
	}
}
