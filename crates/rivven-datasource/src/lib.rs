//! # rivven-datasource
//!
//! Uniform metadata introspection for relational data sources.
//!
//! A [`DataSourceChannel`](channel::DataSourceChannel) answers the questions a
//! configuration UI or pipeline planner asks about a database: which options
//! does it take, can we connect, which databases and tables exist, and what
//! columns does a table have. Engines (TiDB, MySQL) plug their quirks into a
//! shared JDBC-style channel; drivers plug in behind a connection factory.
//!
//! ## Features
//!
//! - **Option rules**: required/optional connection options, rendered as form options
//! - **Connectivity checks**: open-and-close checks with wrapped failures
//! - **Catalog listing**: databases (system ones hidden) and base tables
//! - **Column introspection**: name, type, comment, nullability, primary key
//! - **Multi-table fan-out**: bounded concurrent introspection, all-or-nothing
//! - **Registry**: plugin-name lookup of channels
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivven_datasource::prelude::*;
//!
//! let registry = ChannelRegistry::with_builtin(ChannelConfig::default());
//! let channel = registry.channel("tidb")?;
//!
//! let params = ConnectionParams::new()
//!     .with("driver", "com.mysql.cj.jdbc.Driver")
//!     .with("url", "jdbc:mysql://localhost:4000/")
//!     .with("user", "root");
//!
//! assert!(channel.check_data_source_connectivity("tidb", &params).await?);
//! for db in channel.get_databases("tidb", &params).await? {
//!     let tables = channel.get_tables("tidb", &params, Some(&db)).await?;
//!     let fields = channel.get_tables_fields("tidb", &params, &db, &tables).await?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `mysql` (default) - MySQL wire protocol backend via mysql_async (TiDB, MySQL)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod form;
pub mod jdbc_url;
pub mod option;
pub mod params;
pub mod registry;
pub mod testing;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Channels and registry
    pub use crate::channel::{DataSourceChannel, JdbcDataSourceChannel};
    pub use crate::config::ChannelConfig;
    pub use crate::registry::ChannelRegistry;

    // Engines and dialects
    pub use crate::dialect::{CatalogDialect, MySqlCatalogDialect, Statement};
    pub use crate::engine::{Engine, MySqlEngine, TidbEngine};

    // Connections
    pub use crate::connection::{ConnectOptions, Connection, ConnectionFactory};
    pub use crate::params::ConnectionParams;

    // Options and forms
    pub use crate::form::{FormOption, FormOptionBuilder, InputType, SelectOption};
    pub use crate::option::{ConfigOption, OptionRule};

    // Records
    pub use crate::types::{Row, TableField, TableKind, Value};

    #[cfg(feature = "mysql")]
    pub use crate::mysql::{mysql_channel, tidb_channel, MySqlConnectionFactory};
}

// Re-export commonly used items at crate root
pub use channel::DataSourceChannel;
pub use error::{Error, Result};
pub use types::TableField;
