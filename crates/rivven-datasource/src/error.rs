//! Error types for rivven-datasource
//!
//! Three failure classes reach callers:
//! - Precondition violations (missing connection parameters), raised before any I/O
//! - Connection and query failures, wrapped by every channel operation into
//!   [`Error::Plugin`] with a short description of the failing step
//! - Lookup and configuration errors from the registry and URL handling

use std::fmt;
use thiserror::Error;

/// Result type for rivven-datasource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Required parameters missing or blank
    Precondition,
    /// Driver or connection establishment failure (retriable)
    Connection,
    /// Catalog query execution or row decoding failure
    Query,
    /// Wrapped failure of a channel operation
    Plugin,
    /// Invalid URL or channel configuration
    Configuration,
    /// No channel registered under the requested name
    UnknownPlugin,
    /// Unknown/other errors
    Other,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection)
    }
}

/// Main error type for rivven-datasource
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Required connection parameters are missing
    #[error("precondition failed: {message}")]
    Precondition { message: String },

    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Catalog query failed
    #[error("query error: {message}")]
    Query {
        message: String,
        sql: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A channel operation failed; `source` holds the underlying cause
    #[error("{message}")]
    Plugin {
        message: String,
        #[source]
        source: Box<Error>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unknown data source plugin
    #[error("unknown data source plugin: {name}")]
    UnknownPlugin { name: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Precondition { .. } => ErrorCategory::Precondition,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Plugin { .. } => ErrorCategory::Plugin,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::UnknownPlugin { .. } => ErrorCategory::UnknownPlugin,
            Self::Internal { .. } => ErrorCategory::Other,
        }
    }

    /// Whether this error is retriable.
    ///
    /// A plugin error is retriable when its cause is.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Plugin { source, .. } => source.is_retriable(),
            other => other.category().is_retriable(),
        }
    }

    /// The innermost rivven-datasource error, looking through plugin wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Plugin { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create a query error carrying the failing SQL and driver error
    pub fn query_with_source(
        message: impl Into<String>,
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a failure of a channel operation
    pub fn plugin(message: impl Into<String>, source: Error) -> Self {
        Self::Plugin {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown plugin error
    pub fn unknown_plugin(name: impl Into<String>) -> Self {
        Self::UnknownPlugin { name: name.into() }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition => write!(f, "precondition"),
            Self::Connection => write!(f, "connection"),
            Self::Query => write!(f, "query"),
            Self::Plugin => write!(f, "plugin"),
            Self::Configuration => write!(f, "configuration"),
            Self::UnknownPlugin => write!(f, "unknown_plugin"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_category_retriable() {
        assert!(ErrorCategory::Connection.is_retriable());

        assert!(!ErrorCategory::Precondition.is_retriable());
        assert!(!ErrorCategory::Query.is_retriable());
        assert!(!ErrorCategory::Configuration.is_retriable());
    }

    #[test]
    fn test_plugin_error_keeps_cause() {
        let err = Error::plugin("get databases failed", Error::connection("refused"));

        assert_eq!(err.to_string(), "get databases failed");
        assert_eq!(err.category(), ErrorCategory::Plugin);
        assert!(err.is_retriable());
        assert_eq!(err.root_cause().category(), ErrorCategory::Connection);

        let source = err.source().expect("plugin error has a source");
        assert!(source.to_string().contains("refused"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::precondition("jdbc url cannot be null");
        assert!(err.to_string().contains("jdbc url cannot be null"));

        let err = Error::unknown_plugin("oracle");
        assert!(err.to_string().contains("oracle"));
    }
}
