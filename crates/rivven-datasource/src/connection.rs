//! Connection traits for rivven-datasource
//!
//! Connections are single-use: a channel operation opens one through a
//! [`ConnectionFactory`], runs its catalog statements, and hands it back to
//! [`Connection::close`], which consumes it.

use async_trait::async_trait;
use std::fmt;

use crate::error::{Error, Result};
use crate::params::ConnectionParams;
use crate::types::{Row, Value};

/// A short-lived connection to a database
#[async_trait]
pub trait Connection: Send {
    /// Execute a query that returns rows, fully materialized in catalog order
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Resolved options for opening one connection
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Driver identifier from the parameters
    pub driver: String,
    /// URL after engine-specific database rewriting
    pub url: String,
    /// Explicit username; `None` means the URL carries the credentials
    pub user: Option<String>,
    /// Explicit password
    pub password: Option<String>,
}

impl ConnectOptions {
    /// Create options that connect with the URL alone
    pub fn new(driver: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            url: url.into(),
            user: None,
            password: None,
        }
    }

    /// Set explicit credentials
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.user = Some(user.into());
        self.password = password;
        self
    }

    /// Resolve options from caller parameters and an already rewritten URL.
    ///
    /// Driver and URL must be present and non-blank. When the `user` key is
    /// present the connection uses explicit credentials.
    pub fn resolve(params: &ConnectionParams, url: impl Into<String>) -> Result<Self> {
        let driver = params
            .driver()
            .ok_or_else(|| Error::precondition("jdbc driver cannot be null"))?;
        let options = Self::new(driver, url);

        Ok(match params.user() {
            Some(user) => options.with_credentials(user, params.password().map(String::from)),
            None => options,
        })
    }
}

impl fmt::Debug for ConnectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("driver", &self.driver)
            .field("url", &crate::jdbc_url::redact(&self.url))
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Factory for opening connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Open a new connection
    async fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DRIVER, PASSWORD, URL, USER};

    #[test]
    fn test_resolve_with_user() {
        let params = ConnectionParams::new()
            .with(DRIVER, "x")
            .with(URL, "jdbc:db://host/")
            .with(USER, "u")
            .with(PASSWORD, "p");

        let options = ConnectOptions::resolve(&params, "jdbc:db://host/d").unwrap();
        assert_eq!(options.url, "jdbc:db://host/d");
        assert_eq!(options.user.as_deref(), Some("u"));
        assert_eq!(options.password.as_deref(), Some("p"));
    }

    #[test]
    fn test_resolve_url_only() {
        let params = ConnectionParams::new().with(DRIVER, "x").with(URL, "jdbc:db://host/");

        let options = ConnectOptions::resolve(&params, "jdbc:db://host/").unwrap();
        assert_eq!(options.user, None);
        assert_eq!(options.password, None);
    }

    #[test]
    fn test_resolve_requires_driver() {
        let params = ConnectionParams::new().with(URL, "jdbc:db://host/");
        assert!(matches!(
            ConnectOptions::resolve(&params, "jdbc:db://host/"),
            Err(Error::Precondition { .. })
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let options = ConnectOptions::new("x", "jdbc:mysql://u:urlpw@h/")
            .with_credentials("root", Some("pw123".into()));
        let debug = format!("{:?}", options);
        assert!(!debug.contains("pw123"));
        assert!(!debug.contains("urlpw"));
    }
}
