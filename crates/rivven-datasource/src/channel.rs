//! Data source channels
//!
//! [`DataSourceChannel`] is the introspection contract callers program
//! against. [`JdbcDataSourceChannel`] implements it for any [`Engine`] by
//! combining the engine's dialect and quirks with a [`ConnectionFactory`].
//!
//! Every operation that talks to the database opens its own connection,
//! closes it before returning, and reports connection or query failures as
//! [`Error::Plugin`] with a short description of the failing step. Missing
//! connection parameters are reported as [`Error::Precondition`] before any
//! I/O happens.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ChannelConfig;
use crate::connection::{ConnectOptions, Connection, ConnectionFactory};
use crate::dialect::labels;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::jdbc_url;
use crate::option::OptionRule;
use crate::params::ConnectionParams;
use crate::types::{is_blank, TableField};

const CHECK_CONNECTIVITY_FAILED: &str = "check jdbc connectivity failed";
const GET_DATABASES_FAILED: &str = "get databases failed";
const GET_TABLES_FAILED: &str = "get table names failed";
const GET_TABLE_FIELDS_FAILED: &str = "get table fields failed";

/// Metadata introspection contract of a data source plugin
///
/// `plugin_name` selects configuration only; a channel serves one engine.
#[async_trait]
pub trait DataSourceChannel: Send + Sync {
    /// Connection options of the engine
    fn data_source_options(&self, plugin_name: &str) -> OptionRule;

    /// Metadata fields the engine can expose
    fn datasource_metadata_fields(&self, plugin_name: &str) -> OptionRule;

    /// Open and close a connection. Returns `Ok(true)` on success; failures
    /// are errors, never `Ok(false)`.
    async fn check_data_source_connectivity(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
    ) -> Result<bool>;

    /// List user databases in catalog order
    async fn get_databases(&self, plugin_name: &str, params: &ConnectionParams)
        -> Result<Vec<String>>;

    /// List ordinary tables (no views) in catalog order
    async fn get_tables(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Describe the columns of one table
    async fn get_table_fields(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Vec<TableField>>;

    /// Describe the columns of several tables concurrently.
    ///
    /// The result has exactly one entry per distinct requested table. Any
    /// failing table fails the whole call.
    async fn get_tables_fields(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: &str,
        tables: &[String],
    ) -> Result<HashMap<String, Vec<TableField>>>;
}

/// Channel for engines reached through a JDBC-style URL
#[derive(Clone)]
pub struct JdbcDataSourceChannel {
    engine: Arc<dyn Engine>,
    factory: Arc<dyn ConnectionFactory>,
    config: ChannelConfig,
}

impl JdbcDataSourceChannel {
    /// Create a channel with default configuration
    pub fn new(engine: Arc<dyn Engine>, factory: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            engine,
            factory,
            config: ChannelConfig::default(),
        }
    }

    /// Set the channel configuration
    pub fn with_config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    /// The engine this channel serves
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// The channel configuration
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Check that the parameters allow a connection attempt, returning the URL template
    fn preflight<'p>(&self, params: &'p ConnectionParams) -> Result<&'p str> {
        params
            .driver()
            .ok_or_else(|| Error::precondition("jdbc driver cannot be null"))?;
        let url = params
            .url()
            .ok_or_else(|| Error::precondition("jdbc url cannot be null"))?;
        self.engine.option_rule().validate(params)?;
        Ok(url)
    }

    /// Open a connection, optionally scoped to `database`
    async fn open(
        &self,
        params: &ConnectionParams,
        database: Option<&str>,
    ) -> Result<Box<dyn Connection>> {
        let template = self.preflight(params)?;
        let url = self.engine.rewrite_url(template, database)?;
        let options = ConnectOptions::resolve(params, url)?;

        debug!(
            engine = self.engine.name(),
            database = database.unwrap_or_default(),
            url = %jdbc_url::redact(&options.url),
            "opening connection"
        );
        self.factory.connect(&options).await
    }

    async fn list_databases(&self, conn: &mut dyn Connection) -> Result<Vec<String>> {
        let stmt = self.engine.dialect().list_databases();
        let rows = conn.query(&stmt.sql, &stmt.params).await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.string(labels::DATABASE))
            .filter(|name| !is_blank(name) && !self.engine.is_system_database(name))
            .collect())
    }

    async fn list_tables(
        &self,
        conn: &mut dyn Connection,
        database: Option<&str>,
    ) -> Result<Vec<String>> {
        let dialect = self.engine.dialect();
        let stmt = dialect.list_tables(database);
        let rows = conn.query(&stmt.sql, &stmt.params).await?;

        Ok(rows
            .iter()
            .filter(|row| {
                row.string(labels::TABLE_TYPE)
                    .is_some_and(|kind| dialect.table_kind(&kind).is_table())
            })
            .filter_map(|row| row.string(labels::TABLE_NAME))
            .filter(|name| !is_blank(name))
            .collect())
    }

    async fn primary_key(
        &self,
        conn: &mut dyn Connection,
        database: &str,
        table: &str,
    ) -> Result<Option<String>> {
        let stmt = self.engine.dialect().primary_keys(database, table);
        let rows = conn.query(&stmt.sql, &stmt.params).await?;

        // Composite keys: only the leading column is reported.
        Ok(rows
            .first()
            .and_then(|row| row.string(labels::COLUMN_NAME))
            .filter(|name| !is_blank(name)))
    }

    async fn table_fields(
        &self,
        conn: &mut dyn Connection,
        database: &str,
        table: &str,
    ) -> Result<Vec<TableField>> {
        let primary_key = self.primary_key(conn, database, table).await?;

        let stmt = self.engine.dialect().list_columns(database, table);
        let rows = conn.query(&stmt.sql, &stmt.params).await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = row
                    .string(labels::COLUMN_NAME)
                    .filter(|name| !is_blank(name))?;
                let primary = primary_key.as_deref() == Some(name.as_str());
                Some(TableField {
                    type_name: row.string(labels::TYPE_NAME).unwrap_or_default(),
                    comment: row.string(labels::REMARKS),
                    nullable: row.string(labels::IS_NULLABLE).as_deref() == Some("true"),
                    primary_key: primary,
                    name,
                })
            })
            .collect())
    }
}

/// Close `conn` and merge the close outcome into the operation's result.
///
/// A close failure fails an otherwise successful operation; after a failed
/// operation it is only logged so the operation's error reaches the caller.
async fn release<T>(conn: Box<dyn Connection>, result: Result<T>) -> Result<T> {
    let closed = conn.close().await;
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close connection after error");
            Err(err)
        }
    }
}

/// Wrap connection and query failures; precondition violations pass through.
fn wrap(message: &'static str) -> impl FnOnce(Error) -> Error {
    move |err| match err {
        Error::Precondition { .. } => err,
        other => Error::plugin(message, other),
    }
}

#[async_trait]
impl DataSourceChannel for JdbcDataSourceChannel {
    fn data_source_options(&self, _plugin_name: &str) -> OptionRule {
        self.engine.option_rule()
    }

    fn datasource_metadata_fields(&self, _plugin_name: &str) -> OptionRule {
        self.engine.metadata_rule()
    }

    async fn check_data_source_connectivity(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
    ) -> Result<bool> {
        debug!(plugin = plugin_name, "checking connectivity");
        let conn = self
            .open(params, None)
            .await
            .map_err(wrap(CHECK_CONNECTIVITY_FAILED))?;
        release(conn, Ok(true))
            .await
            .map_err(wrap(CHECK_CONNECTIVITY_FAILED))
    }

    async fn get_databases(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
    ) -> Result<Vec<String>> {
        debug!(plugin = plugin_name, "listing databases");
        let mut conn = self
            .open(params, None)
            .await
            .map_err(wrap(GET_DATABASES_FAILED))?;
        let result = self.list_databases(conn.as_mut()).await;
        release(conn, result).await.map_err(wrap(GET_DATABASES_FAILED))
    }

    async fn get_tables(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: Option<&str>,
    ) -> Result<Vec<String>> {
        debug!(plugin = plugin_name, database, "listing tables");
        let mut conn = self
            .open(params, database)
            .await
            .map_err(wrap(GET_TABLES_FAILED))?;
        let result = self.list_tables(conn.as_mut(), database).await;
        release(conn, result).await.map_err(wrap(GET_TABLES_FAILED))
    }

    async fn get_table_fields(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: &str,
        table: &str,
    ) -> Result<Vec<TableField>> {
        debug!(plugin = plugin_name, database, table, "describing table");
        let mut conn = self
            .open(params, Some(database))
            .await
            .map_err(wrap(GET_TABLE_FIELDS_FAILED))?;
        let result = self.table_fields(conn.as_mut(), database, table).await;
        release(conn, result)
            .await
            .map_err(wrap(GET_TABLE_FIELDS_FAILED))
    }

    async fn get_tables_fields(
        &self,
        plugin_name: &str,
        params: &ConnectionParams,
        database: &str,
        tables: &[String],
    ) -> Result<HashMap<String, Vec<TableField>>> {
        self.preflight(params)?;

        let mut seen = HashSet::with_capacity(tables.len());
        let distinct: Vec<&String> = tables.iter().filter(|t| seen.insert(*t)).collect();
        debug!(
            plugin = plugin_name,
            database,
            tables = distinct.len(),
            concurrency = self.config.fan_out_concurrency,
            "describing tables"
        );

        let permits = Arc::new(Semaphore::new(
            self.config
                .fan_out_concurrency
                .clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut units = JoinSet::new();
        for table in distinct {
            let channel = self.clone();
            let permits = Arc::clone(&permits);
            let plugin_name = plugin_name.to_string();
            let params = params.clone();
            let database = database.to_string();
            let table = table.clone();

            units.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::internal("fan-out semaphore closed"))?;
                let fields = channel
                    .get_table_fields(&plugin_name, &params, &database, &table)
                    .await?;
                Ok::<_, Error>((table, fields))
            });
        }

        // Returning early drops the JoinSet, which aborts the remaining units.
        let mut result = HashMap::with_capacity(units.len());
        while let Some(joined) = units.join_next().await {
            let (table, fields) = joined
                .map_err(|e| Error::internal(format!("table fan-out unit failed: {}", e)))??;
            result.insert(table, fields);
        }
        Ok(result)
    }
}
