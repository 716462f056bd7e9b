//! Unit tests for rivven-datasource dialect, engine and URL modules

use rivven_datasource::dialect::{labels, CatalogDialect, MySqlCatalogDialect, Statement};
use rivven_datasource::engine::{
    Engine, MySqlEngine, TidbEngine, MYSQL_CJ_DRIVER, MYSQL_SYSTEM_DATABASES,
    TIDB_SYSTEM_DATABASES,
};
use rivven_datasource::jdbc_url::{replace_database, JdbcUrl};
use rivven_datasource::types::{TableKind, Value};

#[test]
fn test_statement_bind() {
    let stmt = Statement::new("SELECT ?, ?").bind("a").bind(1_i64);

    assert_eq!(stmt.sql, "SELECT ?, ?");
    assert_eq!(stmt.params, vec![Value::from("a"), Value::Int64(1)]);
}

#[test]
fn test_mysql_list_databases() {
    let stmt = MySqlCatalogDialect.list_databases();

    assert_eq!(stmt.sql, "SHOW DATABASES");
    assert!(stmt.params.is_empty());
}

#[test]
fn test_mysql_table_statements_are_parameterized() {
    let dialect = MySqlCatalogDialect;

    // Identifiers are bound, never spliced into SQL text
    let stmt = dialect.list_columns("app'db", "or`ders");
    assert!(!stmt.sql.contains("app'db"));
    assert_eq!(
        stmt.params,
        vec![Value::from("app'db"), Value::from("or`ders")]
    );

    let stmt = dialect.primary_keys("app_db", "orders");
    assert!(stmt.sql.contains(labels::COLUMN_NAME));
    assert_eq!(stmt.params.len(), 2);
}

#[test]
fn test_mysql_table_kinds() {
    let dialect = MySqlCatalogDialect;

    assert_eq!(dialect.name(), "MySQL");
    assert_eq!(dialect.table_kind("BASE TABLE"), TableKind::Table);
    assert_eq!(dialect.table_kind(" base table "), TableKind::Table);
    assert_eq!(dialect.table_kind("VIEW"), TableKind::View);
    assert_eq!(dialect.table_kind("SYSTEM VIEW"), TableKind::SystemView);
}

#[test]
fn test_engine_deny_lists() {
    let tidb = TidbEngine::default();
    for db in TIDB_SYSTEM_DATABASES {
        assert!(tidb.is_system_database(db));
        assert!(tidb.is_system_database(&db.to_uppercase()));
    }

    let mysql = MySqlEngine::default();
    for db in MYSQL_SYSTEM_DATABASES {
        assert!(mysql.is_system_database(db));
    }
    assert!(!mysql.is_system_database("app_db"));
}

#[test]
fn test_engine_driver_option() {
    let rule = TidbEngine::default().option_rule();
    let driver = rule.option("driver").unwrap();

    assert_eq!(driver.default_value.as_deref(), Some(MYSQL_CJ_DRIVER));
    assert_eq!(driver.allowed_values, vec![MYSQL_CJ_DRIVER.to_string()]);
}

#[test]
fn test_replace_database() {
    assert_eq!(
        replace_database("jdbc:mysql://localhost:4000", Some("app_db")).unwrap(),
        "jdbc:mysql://localhost:4000/app_db"
    );
    assert_eq!(
        replace_database("jdbc:mysql://localhost:4000/test?useSSL=false&a=b", Some("app_db"))
            .unwrap(),
        "jdbc:mysql://localhost:4000/app_db?useSSL=false&a=b"
    );
    assert_eq!(
        replace_database("jdbc:mysql://localhost:4000/test", None).unwrap(),
        "jdbc:mysql://localhost:4000/test"
    );
}

#[test]
fn test_jdbc_url_parse() {
    let url = JdbcUrl::parse("JDBC:mysql://localhost:4000/app_db?characterEncoding=utf8").unwrap();

    assert_eq!(url.subprotocol, "mysql");
    assert_eq!(url.host, "localhost");
    assert_eq!(url.port, Some(4000));
    assert_eq!(url.database.as_deref(), Some("app_db"));
    assert_eq!(url.property("characterEncoding"), Some("utf8"));
    assert_eq!(url.property("missing"), None);
}

#[test]
fn test_jdbc_url_without_prefix() {
    let url = JdbcUrl::parse("mysql://h").unwrap();

    assert_eq!(url.host, "h");
    assert_eq!(url.database, None);
    assert_eq!(url.user, None);
}

#[test]
fn test_jdbc_url_invalid() {
    assert!(JdbcUrl::parse("jdbc:mysql:///nohost").is_err());
    assert!(JdbcUrl::parse("garbage").is_err());
}
