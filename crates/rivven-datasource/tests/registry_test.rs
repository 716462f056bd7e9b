//! Integration tests for rivven-datasource registry dispatch

use rivven_datasource::channel::{DataSourceChannel, JdbcDataSourceChannel};
use rivven_datasource::engine::{MySqlEngine, TidbEngine};
use rivven_datasource::error::Error;
use rivven_datasource::registry::ChannelRegistry;
use rivven_datasource::testing::{MockCatalog, MockConnectionFactory};
use std::sync::Arc;

fn registry(factory: Arc<MockConnectionFactory>) -> ChannelRegistry {
    let mut registry = ChannelRegistry::new();
    registry.register(
        "tidb",
        Arc::new(JdbcDataSourceChannel::new(
            Arc::new(TidbEngine::default()),
            factory.clone(),
        )),
    );
    registry.register(
        "mysql",
        Arc::new(JdbcDataSourceChannel::new(
            Arc::new(MySqlEngine::default()),
            factory,
        )),
    );
    registry
}

#[tokio::test]
async fn test_dispatch_by_plugin_name() {
    let catalog = MockCatalog::new()
        .with_database("app_db")
        .with_database("sys")
        .with_database("metrics_schema");
    let factory = Arc::new(MockConnectionFactory::new(catalog));
    let registry = registry(factory.clone());
    let params = MockCatalog::params();

    let tidb = registry.channel("tidb").unwrap();
    assert_eq!(
        tidb.get_databases("tidb", &params).await.unwrap(),
        vec!["app_db", "sys"]
    );

    let mysql = registry.channel("mysql").unwrap();
    assert_eq!(
        mysql.get_databases("mysql", &params).await.unwrap(),
        vec!["app_db", "metrics_schema"]
    );

    assert_eq!(factory.opened(), 2);
    assert_eq!(factory.closed(), 2);
}

#[test]
fn test_unknown_plugin() {
    let registry = registry(Arc::new(MockConnectionFactory::new(MockCatalog::new())));

    assert_eq!(registry.names(), vec!["mysql", "tidb"]);
    assert!(matches!(
        registry.channel("postgres"),
        Err(Error::UnknownPlugin { .. })
    ));
}
