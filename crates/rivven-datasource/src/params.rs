//! Connection parameters supplied by callers
//!
//! A flat string-to-string map. Keys are defined by the engine's option rule;
//! the well-known ones are exported as constants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Driver identifier key
pub const DRIVER: &str = "driver";
/// Connection URL template key
pub const URL: &str = "url";
/// Username key
pub const USER: &str = "user";
/// Password key
pub const PASSWORD: &str = "password";

/// Connection parameters for one call
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionParams {
    values: HashMap<String, String>,
}

impl ConnectionParams {
    /// Create an empty parameter map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a parameter by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get a parameter, treating blank values as absent
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Whether the key is present (even with an empty value)
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Driver identifier
    pub fn driver(&self) -> Option<&str> {
        self.get_non_blank(DRIVER)
    }

    /// URL template
    pub fn url(&self) -> Option<&str> {
        self.get_non_blank(URL)
    }

    /// Username, when the key is present
    pub fn user(&self) -> Option<&str> {
        self.get(USER)
    }

    /// Password
    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters were supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for ConnectionParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConnectionParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact credentials to keep passwords out of logs.
        let mut map = f.debug_map();
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        for key in keys {
            if key == PASSWORD {
                map.entry(key, &"***");
            } else if key == URL {
                map.entry(key, &crate::jdbc_url::redact(&self.values[key]));
            } else {
                map.entry(key, &self.values[key]);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let params = ConnectionParams::new()
            .with(DRIVER, "com.mysql.cj.jdbc.Driver")
            .with(URL, "jdbc:mysql://localhost:4000/")
            .with(USER, "root");

        assert_eq!(params.driver(), Some("com.mysql.cj.jdbc.Driver"));
        assert_eq!(params.url(), Some("jdbc:mysql://localhost:4000/"));
        assert_eq!(params.user(), Some("root"));
        assert_eq!(params.password(), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_blank_values_are_missing() {
        let params = ConnectionParams::new().with(DRIVER, "  ").with(URL, "");

        assert!(params.contains(DRIVER));
        assert_eq!(params.driver(), None);
        assert_eq!(params.url(), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let params: ConnectionParams = [(USER, "u"), (PASSWORD, "hunter2")].into_iter().collect();
        let debug = format!("{:?}", params);

        assert!(debug.contains("***"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_from_flat_map() {
        let params: ConnectionParams =
            serde_json::from_str(r#"{"url": "jdbc:mysql://h/", "driver": "x"}"#).unwrap();
        assert_eq!(params.url(), Some("jdbc:mysql://h/"));
        assert_eq!(params.driver(), Some("x"));
    }
}
