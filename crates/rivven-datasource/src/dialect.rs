//! Catalog dialects for rivven-datasource
//!
//! A dialect translates the generic catalog requests of a channel into
//! engine-specific SQL. Whatever the engine's native catalog looks like, the
//! statements must return rows labelled as listed in [`labels`], so the
//! channel can normalize every engine's results the same way:
//!
//! | Statement | Labels |
//! |-----------|--------|
//! | `list_databases` | `Database` |
//! | `list_tables` | `TABLE_NAME`, `TABLE_TYPE` |
//! | `primary_keys` | `COLUMN_NAME` |
//! | `list_columns` | `COLUMN_NAME`, `TYPE_NAME`, `REMARKS`, `IS_NULLABLE` (`"true"`/`"false"`) |

use crate::types::{TableKind, Value};

/// Row labels shared by every dialect
pub mod labels {
    /// Database name in database listings
    pub const DATABASE: &str = "Database";
    /// Relation name in table listings
    pub const TABLE_NAME: &str = "TABLE_NAME";
    /// Raw relation kind in table listings
    pub const TABLE_TYPE: &str = "TABLE_TYPE";
    /// Column name in key and column listings
    pub const COLUMN_NAME: &str = "COLUMN_NAME";
    /// Engine-native type name
    pub const TYPE_NAME: &str = "TYPE_NAME";
    /// Column comment
    pub const REMARKS: &str = "REMARKS";
    /// Nullability, `"true"` or `"false"`
    pub const IS_NULLABLE: &str = "IS_NULLABLE";
}

/// SQL text with positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text
    pub sql: String,
    /// Positional parameters
    pub params: Vec<Value>,
}

impl Statement {
    /// Create a statement without parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Catalog dialect for engine-specific introspection SQL
pub trait CatalogDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// List databases
    fn list_databases(&self) -> Statement;

    /// List relations of a database, or of the connection's current one
    fn list_tables(&self, database: Option<&str>) -> Statement;

    /// List primary key columns of a table, leading key column first
    fn primary_keys(&self, database: &str, table: &str) -> Statement;

    /// List columns of a table in ordinal order
    fn list_columns(&self, database: &str, table: &str) -> Statement;

    /// Normalize a raw relation kind reported by `list_tables`
    fn table_kind(&self, raw: &str) -> TableKind;
}

/// Dialect for MySQL-protocol engines (MySQL, TiDB) using `information_schema`
#[derive(Debug, Clone, Default)]
pub struct MySqlCatalogDialect;

impl CatalogDialect for MySqlCatalogDialect {
    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn list_databases(&self) -> Statement {
        Statement::new("SHOW DATABASES")
    }

    fn list_tables(&self, database: Option<&str>) -> Statement {
        match database {
            Some(db) => Statement::new(
                "SELECT TABLE_NAME, TABLE_TYPE FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = ? ORDER BY TABLE_NAME",
            )
            .bind(db),
            None => Statement::new(
                "SELECT TABLE_NAME, TABLE_TYPE FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() ORDER BY TABLE_NAME",
            ),
        }
    }

    fn primary_keys(&self, database: &str, table: &str) -> Statement {
        Statement::new(
            "SELECT COLUMN_NAME FROM information_schema.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY' \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(database)
        .bind(table)
    }

    fn list_columns(&self, database: &str, table: &str) -> Statement {
        Statement::new(
            "SELECT COLUMN_NAME, \
             UPPER(CONCAT(DATA_TYPE, IF(COLUMN_TYPE LIKE '%unsigned%', ' UNSIGNED', ''))) AS TYPE_NAME, \
             NULLIF(COLUMN_COMMENT, '') AS REMARKS, \
             IF(IS_NULLABLE = 'YES', 'true', 'false') AS IS_NULLABLE \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION",
        )
        .bind(database)
        .bind(table)
    }

    fn table_kind(&self, raw: &str) -> TableKind {
        match raw.trim().to_uppercase().as_str() {
            "BASE TABLE" | "TABLE" => TableKind::Table,
            "VIEW" => TableKind::View,
            "SYSTEM VIEW" => TableKind::SystemView,
            _ => TableKind::Other(raw.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tables_scoping() {
        let dialect = MySqlCatalogDialect;

        let scoped = dialect.list_tables(Some("app_db"));
        assert!(scoped.sql.contains("TABLE_SCHEMA = ?"));
        assert_eq!(scoped.params, vec![Value::from("app_db")]);

        let current = dialect.list_tables(None);
        assert!(current.sql.contains("DATABASE()"));
        assert!(current.params.is_empty());
    }

    #[test]
    fn test_column_statement_uses_shared_labels() {
        let stmt = MySqlCatalogDialect.list_columns("app_db", "orders");
        for label in [
            labels::COLUMN_NAME,
            labels::TYPE_NAME,
            labels::REMARKS,
            labels::IS_NULLABLE,
        ] {
            assert!(stmt.sql.contains(label), "missing {}", label);
        }
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_primary_keys_ordered_by_key_sequence() {
        let stmt = MySqlCatalogDialect.primary_keys("app_db", "orders");
        assert!(stmt.sql.contains("CONSTRAINT_NAME = 'PRIMARY'"));
        assert!(stmt.sql.ends_with("ORDER BY ORDINAL_POSITION"));
    }

    #[test]
    fn test_table_kind() {
        let dialect = MySqlCatalogDialect;
        assert_eq!(dialect.table_kind("BASE TABLE"), TableKind::Table);
        assert_eq!(dialect.table_kind("view"), TableKind::View);
        assert_eq!(dialect.table_kind("SYSTEM VIEW"), TableKind::SystemView);
        assert_eq!(
            dialect.table_kind("SEQUENCE"),
            TableKind::Other("SEQUENCE".into())
        );
    }
}
