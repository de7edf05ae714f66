//! Paged query generation
//!
//! Offsets are checked on every dialect; totals are checked end to end
//! against an in-memory SQLite database.

use proptest::prelude::*;
use quarry_db::backends::{DatabaseType, ValueType};
use quarry_db::metadata::{ColumnMetadata, EntityType};
use quarry_db::query::{Expr, PageRequest, PagedCommand, QuerySqlGenerator, SelectQuery};
use rstest::*;

fn item() -> EntityType {
	EntityType::new("Item")
		.column(ColumnMetadata::new("Id", ValueType::I64).identity())
		.column(ColumnMetadata::new("Name", ValueType::String).size(40))
}

#[rstest]
#[case(1, 20, 0)]
#[case(3, 20, 40)]
#[case(0, 20, 0)]
#[case(2, 15, 15)]
fn test_page_offsets(
	#[values(DatabaseType::SqlServer, DatabaseType::MySql, DatabaseType::Sqlite)]
	database: DatabaseType,
	#[case] index: u32,
	#[case] size: u32,
	#[case] expected_offset: u64,
) {
	// Arrange
	let generator = QuerySqlGenerator::new(database);
	let query = SelectQuery::from_entity(&item()).order_by(Expr::column("Id", ValueType::I64));

	// Act
	let page = generator.page(&query, PageRequest::new(index, size)).unwrap();

	// Assert
	assert_eq!(page.offset, expected_offset);
	let data_sql = match &page.command {
		PagedCommand::Combined { command, .. } => &command.sql,
		PagedCommand::Split { data, .. } => &data.sql,
	};
	match database {
		DatabaseType::SqlServer => assert!(data_sql.ends_with(&format!(
			"OFFSET {expected_offset} ROWS FETCH NEXT {size} ROWS ONLY"
		))),
		DatabaseType::MySql | DatabaseType::Sqlite => {
			assert!(data_sql.ends_with(&format!("LIMIT {size} OFFSET {expected_offset}")))
		}
	}
}

proptest! {
	#[test]
	fn prop_offset_never_negative(index in any::<u32>(), size in 1u32..500) {
		let (resolved, offset) = PageRequest::new(index, size).resolve(20);

		prop_assert_eq!(resolved, size);
		prop_assert_eq!(offset, u64::from(index.max(1) - 1) * u64::from(size));
	}
}

#[cfg(feature = "sqlite")]
mod sqlite {
	use super::*;
	use indexmap::IndexMap;
	use quarry_db::backends::{MigrationConnection, SqlCommand, SqliteConnection, Value};
	use quarry_db::migrations::{Migration, MigrationExecutor};
	use sqlx::Row;

	async fn seeded(rows: usize) -> SqliteConnection {
		let connection = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		let mut executor = MigrationExecutor::new(connection);
		executor
			.register(Migration::new("items").create(|m| {
				m.create_table(&item(), |_| {})?;
				Ok(())
			}))
			.unwrap();
		executor.run_pending().await.unwrap();
		let connection = executor.into_connection();

		let generator = QuerySqlGenerator::new(DatabaseType::Sqlite);
		for i in 0..rows {
			let name = Value::from(format!("item {i:02}"));
			let values = IndexMap::from([("Name".to_string(), name)]);
			let insert = generator.insert(&item(), &values).unwrap();
			connection.execute(&insert).await.unwrap();
		}
		connection
	}

	async fn fetch_names(connection: &SqliteConnection, command: &SqlCommand) -> Vec<String> {
		let mut query = sqlx::query(&command.sql);
		for parameter in &command.parameters {
			query = match parameter {
				Value::String(s) => query.bind(s.as_str()),
				Value::Int(i) => query.bind(*i),
				other => panic!("unexpected parameter {other:?}"),
			};
		}
		query
			.fetch_all(connection.pool())
			.await
			.unwrap()
			.iter()
			.map(|row| row.get::<String, _>("Name"))
			.collect()
	}

	#[rstest]
	#[case(1, 20, 20)]
	#[case(3, 20, 5)]
	#[tokio::test]
	async fn test_page_over_45_rows(
		#[case] index: u32,
		#[case] size: u32,
		#[case] expected_rows: usize,
	) {
		// Arrange
		let connection = seeded(45).await;
		let generator = QuerySqlGenerator::new(DatabaseType::Sqlite);
		let query = SelectQuery::from_entity(&item())
			.field(Expr::column("Name", ValueType::String))
			.filter(Expr::column("Name", ValueType::String).starts_with(Expr::constant("item")))
			.order_by(Expr::column("Id", ValueType::I64));

		// Act
		let page = generator.page(&query, PageRequest::new(index, size)).unwrap();
		let PagedCommand::Split { data, count } = page.command else {
			panic!("SQLite pages with separate statements");
		};
		let total = connection.fetch_scalar(&count).await.unwrap();
		let names = fetch_names(&connection, &data).await;

		// Assert
		assert_eq!(total, Some(45));
		assert_eq!(names.len(), expected_rows);
		assert_eq!(names[0], format!("item {:02}", page.offset));
	}

	#[rstest]
	#[tokio::test]
	async fn test_count_top_and_any_agree() {
		// Arrange
		let connection = seeded(12).await;
		let generator = QuerySqlGenerator::new(DatabaseType::Sqlite);
		let query = SelectQuery::from_entity(&item())
			.filter(Expr::column("Id", ValueType::I64).gt(Expr::constant(10i64)));

		// Act
		let count = connection.fetch_scalar(&generator.count(&query).unwrap()).await.unwrap();
		let any = connection.fetch_scalar(&generator.any(&query).unwrap()).await.unwrap();
		let ordered = query.clone().order_by(Expr::column("Id", ValueType::I64));
		let top = fetch_names(&connection, &generator.top(&ordered, 1).unwrap()).await;

		// Assert
		assert_eq!(count, Some(2));
		assert_eq!(any, Some(1));
		assert_eq!(top, vec!["item 10".to_string()]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_distinct_totals_agree_across_dialects() {
		// Arrange
		let connection = SqliteConnection::connect("sqlite::memory:").await.unwrap();
		connection
			.execute(&SqlCommand::new("CREATE TABLE T (Name TEXT NOT NULL)"))
			.await
			.unwrap();
		connection
			.execute(&SqlCommand::new("INSERT INTO T (Name) VALUES ('a'), ('a'), ('a'), ('b')"))
			.await
			.unwrap();
		let query = SelectQuery::new("T")
			.field(Expr::column("Name", ValueType::String))
			.distinct()
			.aggregate("Name");

		// Act
		let mut totals = Vec::new();
		for database in [DatabaseType::SqlServer, DatabaseType::Sqlite] {
			let page = QuerySqlGenerator::new(database)
				.page(&query, PageRequest::new(1, 20))
				.unwrap();
			let PagedCommand::Split { count, .. } = page.command else {
				panic!("distinct column totals come from a count statement");
			};
			// SQLite also accepts bracket-quoted identifiers
			totals.push(connection.fetch_scalar(&count).await.unwrap());
		}

		// Assert
		assert_eq!(totals, vec![Some(2), Some(2)]);
	}
}
