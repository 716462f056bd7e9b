//! Testing utilities for channels
//!
//! [`MockConnectionFactory`] serves an in-memory [`MockCatalog`] through the
//! same catalog statements a dialect issues against a real server, so
//! channel behavior can be exercised without a database. The factory counts
//! opened and closed connections and records every URL it was asked to
//! connect to.
//!
//! ```rust,ignore
//! use rivven_datasource::testing::*;
//!
//! let catalog = MockCatalog::new()
//!     .with_database("app_db")
//!     .with_table("app_db", "orders")
//!     .with_column("app_db", "orders", MockColumn::new("id", "BIGINT"))
//!     .with_primary_key("app_db", "orders", ["id"]);
//!
//! let factory = Arc::new(MockConnectionFactory::new(catalog));
//! let channel = JdbcDataSourceChannel::new(Arc::new(TidbEngine::default()), factory.clone());
//!
//! let fields = channel
//!     .get_table_fields("tidb", &MockCatalog::params(), "app_db", "orders")
//!     .await?;
//! assert_eq!(factory.opened(), factory.closed());
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::connection::{ConnectOptions, Connection, ConnectionFactory};
use crate::dialect::{labels, CatalogDialect, MySqlCatalogDialect};
use crate::engine::MYSQL_CJ_DRIVER;
use crate::error::{Error, Result};
use crate::jdbc_url::JdbcUrl;
use crate::params::{ConnectionParams, DRIVER, PASSWORD, URL, USER};
use crate::types::{Row, Value};

/// Raw relation kind the catalog reports for base tables
pub const BASE_TABLE: &str = "BASE TABLE";
/// Raw relation kind the catalog reports for views
pub const VIEW: &str = "VIEW";

/// A column of a mock table
#[derive(Debug, Clone, PartialEq)]
pub struct MockColumn {
    /// Column name
    pub name: String,
    /// Native type name
    pub type_name: String,
    /// Comment
    pub comment: Option<String>,
    /// Nullability
    pub nullable: bool,
}

impl MockColumn {
    /// Non-nullable column without comment
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
            nullable: false,
        }
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Mark the column nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone)]
struct MockTable {
    database: String,
    name: String,
    kind: String,
    columns: Vec<MockColumn>,
    primary_key: Vec<String>,
}

/// In-memory catalog served by [`MockConnectionFactory`]
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    databases: Vec<String>,
    tables: Vec<MockTable>,
    failing_tables: HashSet<String>,
    connect_error: Option<String>,
}

impl MockCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid connection parameters for a mock channel
    pub fn params() -> ConnectionParams {
        ConnectionParams::new()
            .with(DRIVER, MYSQL_CJ_DRIVER)
            .with(URL, "jdbc:mysql://mock:4000/")
            .with(USER, "root")
            .with(PASSWORD, "secret")
    }

    /// Add a database, in catalog order
    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.databases.push(name.into());
        self
    }

    /// Add a base table
    pub fn with_table(self, database: &str, table: &str) -> Self {
        self.with_relation(database, table, BASE_TABLE)
    }

    /// Add a view
    pub fn with_view(self, database: &str, view: &str) -> Self {
        self.with_relation(database, view, VIEW)
    }

    /// Add a relation with a raw kind
    pub fn with_relation(mut self, database: &str, name: &str, kind: &str) -> Self {
        self.tables.push(MockTable {
            database: database.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        });
        self
    }

    /// Append a column to a table added earlier
    pub fn with_column(mut self, database: &str, table: &str, column: MockColumn) -> Self {
        if let Some(t) = self.table_mut(database, table) {
            t.columns.push(column);
        }
        self
    }

    /// Set the primary key columns of a table, in key order
    pub fn with_primary_key<I, S>(mut self, database: &str, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(t) = self.table_mut(database, table) {
            t.primary_key = columns.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Make every catalog query about `table` fail
    pub fn failing_table(mut self, table: impl Into<String>) -> Self {
        self.failing_tables.insert(table.into());
        self
    }

    /// Make every connection attempt fail with `message`
    pub fn refusing_connections(mut self, message: impl Into<String>) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    fn table_mut(&mut self, database: &str, table: &str) -> Option<&mut MockTable> {
        self.tables
            .iter_mut()
            .find(|t| t.database == database && t.name == table)
    }

    fn table(&self, database: &str, table: &str) -> Option<&MockTable> {
        self.tables
            .iter()
            .find(|t| t.database == database && t.name == table)
    }

    fn check_table(&self, table: &str) -> Result<()> {
        if self.failing_tables.contains(table) {
            Err(Error::query(format!("catalog lookup failed for table {}", table)))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

/// Connection factory serving a [`MockCatalog`]
pub struct MockConnectionFactory {
    catalog: Arc<MockCatalog>,
    dialect: Arc<dyn CatalogDialect>,
    counters: Arc<Counters>,
    urls: Mutex<Vec<String>>,
    options: Mutex<Vec<ConnectOptions>>,
    fail_close: bool,
    query_delay: Option<Duration>,
}

impl MockConnectionFactory {
    /// Factory answering the MySQL catalog dialect
    pub fn new(catalog: MockCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            dialect: Arc::new(MySqlCatalogDialect),
            counters: Arc::new(Counters::default()),
            urls: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
            fail_close: false,
            query_delay: None,
        }
    }

    /// Make every close fail (the connection still counts as closed)
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Delay every query, to keep connections open concurrently
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    /// Connections opened so far
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Connections closed so far
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Connections currently open, neither closed nor dropped
    pub fn active(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Highest number of connections open at the same time
    pub fn max_concurrent(&self) -> usize {
        self.counters.max_active.load(Ordering::SeqCst)
    }

    /// URLs of every connection attempt, in order
    pub fn connected_urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    /// Options of every connection attempt, in order
    pub fn connect_options(&self) -> Vec<ConnectOptions> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl ConnectionFactory for MockConnectionFactory {
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        self.urls.lock().push(options.url.clone());
        self.options.lock().push(options.clone());

        if let Some(message) = &self.catalog.connect_error {
            return Err(Error::connection(message.clone()));
        }

        let database = JdbcUrl::parse(&options.url)?.database;

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_active.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(MockConnection {
            catalog: Arc::clone(&self.catalog),
            dialect: Arc::clone(&self.dialect),
            counters: Arc::clone(&self.counters),
            database,
            fail_close: self.fail_close,
            query_delay: self.query_delay,
            released: false,
        }))
    }
}

struct MockConnection {
    catalog: Arc<MockCatalog>,
    dialect: Arc<dyn CatalogDialect>,
    counters: Arc<Counters>,
    database: Option<String>,
    fail_close: bool,
    query_delay: Option<Duration>,
    released: bool,
}

impl MockConnection {
    fn param(params: &[Value], idx: usize) -> Result<String> {
        params
            .get(idx)
            .and_then(Value::as_string)
            .ok_or_else(|| Error::query(format!("missing statement parameter {}", idx)))
    }

    fn answer(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let catalog = &self.catalog;

        if sql == self.dialect.list_databases().sql {
            return Ok(catalog
                .databases
                .iter()
                .map(|db| Row::from_pairs([(labels::DATABASE, db.as_str())]))
                .collect());
        }

        if sql == self.dialect.list_tables(None).sql || sql == self.dialect.list_tables(Some("")).sql
        {
            let database = match params.first() {
                Some(_) => Some(Self::param(params, 0)?),
                None => self.database.clone(),
            };
            return Ok(catalog
                .tables
                .iter()
                .filter(|t| Some(&t.database) == database.as_ref())
                .map(|t| {
                    Row::from_pairs([
                        (labels::TABLE_NAME, t.name.as_str()),
                        (labels::TABLE_TYPE, t.kind.as_str()),
                    ])
                })
                .collect());
        }

        if sql == self.dialect.primary_keys("", "").sql {
            let (database, table) = (Self::param(params, 0)?, Self::param(params, 1)?);
            catalog.check_table(&table)?;
            return Ok(catalog
                .table(&database, &table)
                .map(|t| {
                    t.primary_key
                        .iter()
                        .map(|c| Row::from_pairs([(labels::COLUMN_NAME, c.as_str())]))
                        .collect()
                })
                .unwrap_or_default());
        }

        if sql == self.dialect.list_columns("", "").sql {
            let (database, table) = (Self::param(params, 0)?, Self::param(params, 1)?);
            catalog.check_table(&table)?;
            return Ok(catalog
                .table(&database, &table)
                .map(|t| {
                    t.columns
                        .iter()
                        .map(|c| {
                            Row::from_pairs([
                                (labels::COLUMN_NAME, Value::from(c.name.as_str())),
                                (labels::TYPE_NAME, Value::from(c.type_name.as_str())),
                                (labels::REMARKS, Value::from(c.comment.clone())),
                                (
                                    labels::IS_NULLABLE,
                                    Value::from(if c.nullable { "true" } else { "false" }),
                                ),
                            ])
                        })
                        .collect()
                })
                .unwrap_or_default());
        }

        Err(Error::query(format!("unsupported statement: {}", sql)))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.counters.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(sql, params)
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.release();
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(Error::connection("mock close failure"))
        } else {
            Ok(())
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MockCatalog {
        MockCatalog::new()
            .with_database("app_db")
            .with_table("app_db", "orders")
            .with_view("app_db", "order_totals")
            .with_column("app_db", "orders", MockColumn::new("id", "BIGINT"))
            .with_primary_key("app_db", "orders", ["id"])
    }

    #[tokio::test]
    async fn test_answers_dialect_statements() {
        let factory = MockConnectionFactory::new(catalog());
        let mut conn = factory
            .connect(&ConnectOptions::new("x", "jdbc:mysql://mock/app_db"))
            .await
            .unwrap();

        let dialect = MySqlCatalogDialect;
        let stmt = dialect.list_tables(None);
        let rows = conn.query(&stmt.sql, &stmt.params).await.unwrap();
        assert_eq!(rows.len(), 2);

        let stmt = dialect.primary_keys("app_db", "orders");
        let rows = conn.query(&stmt.sql, &stmt.params).await.unwrap();
        assert_eq!(rows[0].string(labels::COLUMN_NAME).as_deref(), Some("id"));

        assert!(conn.query("SELECT 1", &[]).await.is_err());
        conn.close().await.unwrap();
        assert_eq!((factory.opened(), factory.closed()), (1, 1));
    }

    #[tokio::test]
    async fn test_drop_releases_connection() {
        let factory = MockConnectionFactory::new(catalog());
        let options = ConnectOptions::new("x", "jdbc:mysql://mock/app_db");

        let first = factory.connect(&options).await.unwrap();
        let second = factory.connect(&options).await.unwrap();
        assert_eq!(factory.active(), 2);

        drop(first);
        assert_eq!(factory.active(), 1);
        second.close().await.unwrap();
        assert_eq!(factory.active(), 0);
        assert_eq!((factory.opened(), factory.closed(), factory.max_concurrent()), (2, 1, 2));
    }

    #[tokio::test]
    async fn test_refusing_connections() {
        let factory = MockConnectionFactory::new(MockCatalog::new().refusing_connections("refused"));
        let result = factory
            .connect(&ConnectOptions::new("x", "jdbc:mysql://mock/"))
            .await;
        assert!(matches!(result, Err(Error::Connection { .. })));
        assert_eq!(factory.opened(), 0);
        assert_eq!(factory.connected_urls(), vec!["jdbc:mysql://mock/"]);
    }

    #[tokio::test]
    async fn test_failing_table() {
        let factory = MockConnectionFactory::new(catalog().failing_table("orders"));
        let mut conn = factory
            .connect(&ConnectOptions::new("x", "jdbc:mysql://mock/app_db"))
            .await
            .unwrap();

        let stmt = MySqlCatalogDialect.list_columns("app_db", "orders");
        assert!(conn.query(&stmt.sql, &stmt.params).await.is_err());
    }
}
