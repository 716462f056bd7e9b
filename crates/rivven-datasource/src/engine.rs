//! Engine variants
//!
//! An engine bundles everything a channel needs to know about one database
//! product: its option rules, its system-database deny-list, how to scope a
//! URL to a database, and the catalog dialect to speak.

use crate::dialect::{CatalogDialect, MySqlCatalogDialect};
use crate::error::Result;
use crate::jdbc_url;
use crate::option::{ConfigOption, OptionRule};
use crate::params::{DRIVER, PASSWORD, URL, USER};

/// Metadata rule key naming a database
pub const DATABASE: &str = "database";
/// Metadata rule key naming a table
pub const TABLE: &str = "table";

/// Driver identifier of MySQL Connector/J
pub const MYSQL_CJ_DRIVER: &str = "com.mysql.cj.jdbc.Driver";

/// A database engine supported by a channel
pub trait Engine: Send + Sync {
    /// Engine name, also the plugin name it is registered under
    fn name(&self) -> &'static str;

    /// Connection options the engine requires or accepts
    fn option_rule(&self) -> OptionRule;

    /// Metadata fields that can be queried
    fn metadata_rule(&self) -> OptionRule {
        OptionRule::builder()
            .required([
                ConfigOption::new(DATABASE, "database name"),
                ConfigOption::new(TABLE, "table name"),
            ])
            .build()
    }

    /// Engine-internal databases hidden from listings
    fn system_databases(&self) -> &'static [&'static str];

    /// Whether `name` is a system database
    fn is_system_database(&self, name: &str) -> bool {
        self.system_databases()
            .iter()
            .any(|db| db.eq_ignore_ascii_case(name))
    }

    /// Scope a URL template to `database`
    fn rewrite_url(&self, url: &str, database: Option<&str>) -> Result<String>;

    /// Catalog dialect
    fn dialect(&self) -> &dyn CatalogDialect;
}

/// Connection option rule shared by MySQL-protocol engines
fn jdbc_option_rule(url_example: &str) -> OptionRule {
    OptionRule::builder()
        .required([
            ConfigOption::new(URL, format!("jdbc url, e.g. {}", url_example)),
            ConfigOption::new(DRIVER, "jdbc driver class")
                .with_default(MYSQL_CJ_DRIVER)
                .with_allowed_values([MYSQL_CJ_DRIVER]),
        ])
        .optional([
            ConfigOption::new(USER, "user name"),
            ConfigOption::new(PASSWORD, "password").secret(),
        ])
        .build()
}

/// TiDB
#[derive(Debug, Clone, Default)]
pub struct TidbEngine {
    dialect: MySqlCatalogDialect,
}

/// System databases of TiDB
pub const TIDB_SYSTEM_DATABASES: &[&str] = &[
    "information_schema",
    "mysql",
    "performance_schema",
    "metrics_schema",
];

impl Engine for TidbEngine {
    fn name(&self) -> &'static str {
        "tidb"
    }

    fn option_rule(&self) -> OptionRule {
        jdbc_option_rule("jdbc:mysql://localhost:4000/test")
    }

    fn system_databases(&self) -> &'static [&'static str] {
        TIDB_SYSTEM_DATABASES
    }

    fn rewrite_url(&self, url: &str, database: Option<&str>) -> Result<String> {
        jdbc_url::replace_database(url, database)
    }

    fn dialect(&self) -> &dyn CatalogDialect {
        &self.dialect
    }
}

/// MySQL
#[derive(Debug, Clone, Default)]
pub struct MySqlEngine {
    dialect: MySqlCatalogDialect,
}

/// System databases of MySQL
pub const MYSQL_SYSTEM_DATABASES: &[&str] =
    &["information_schema", "mysql", "performance_schema", "sys"];

impl Engine for MySqlEngine {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn option_rule(&self) -> OptionRule {
        jdbc_option_rule("jdbc:mysql://localhost:3306/test")
    }

    fn system_databases(&self) -> &'static [&'static str] {
        MYSQL_SYSTEM_DATABASES
    }

    fn rewrite_url(&self, url: &str, database: Option<&str>) -> Result<String> {
        jdbc_url::replace_database(url, database)
    }

    fn dialect(&self) -> &dyn CatalogDialect {
        &self.dialect
    }
}
