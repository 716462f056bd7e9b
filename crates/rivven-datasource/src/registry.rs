//! Channel registry for runtime plugin lookup
//!
//! Maps plugin names (e.g. `"tidb"`) to channels so callers can dispatch
//! metadata requests without knowing concrete channel types.
//!
//! ```rust,ignore
//! use rivven_datasource::prelude::*;
//!
//! let registry = ChannelRegistry::with_builtin(ChannelConfig::default());
//! let channel = registry.channel("tidb")?;
//! let databases = channel.get_databases("tidb", &params).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::DataSourceChannel;
use crate::error::{Error, Result};

/// Registry of data source channels by plugin name
#[derive(Default, Clone)]
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<dyn DataSourceChannel>>,
}

impl ChannelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }

    /// Registry with every channel compiled into this build
    #[cfg(feature = "mysql")]
    pub fn with_builtin(config: crate::config::ChannelConfig) -> Self {
        let mut registry = Self::new();
        registry.register("tidb", Arc::new(crate::mysql::tidb_channel(config.clone())));
        registry.register("mysql", Arc::new(crate::mysql::mysql_channel(config)));
        registry
    }

    /// Register a channel, replacing any previous one with the same name
    pub fn register(&mut self, name: &str, channel: Arc<dyn DataSourceChannel>) {
        if self.channels.insert(name.to_string(), channel).is_some() {
            tracing::debug!(plugin = name, "replaced registered channel");
        }
    }

    /// Get a channel by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DataSourceChannel>> {
        self.channels.get(name)
    }

    /// Get a channel by name, failing for unknown plugins
    pub fn channel(&self, name: &str) -> Result<Arc<dyn DataSourceChannel>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_plugin(name))
    }

    /// Check if a channel is registered
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Registered plugin names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.names())
            .finish()
    }
}
