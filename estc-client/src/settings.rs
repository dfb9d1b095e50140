//! # Transport Settings
//!
//! Immutable key/value bundle handed to a transport when it is created.
//! Values are stored as strings and parsed on read, so unknown keys pass
//! through untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Enables discovery of cluster nodes beyond the seed list.
pub const TRANSPORT_SNIFF: &str = "client.transport.sniff";

/// Name of the cluster the client expects to join.
pub const CLUSTER_NAME: &str = "cluster.name";

/// TCP connect timeout per endpoint, in milliseconds.
pub const CONNECT_TIMEOUT_MS: &str = "client.transport.connect_timeout_ms";

/// Connect timeout used when `CONNECT_TIMEOUT_MS` is missing or zero.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Frozen transport settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    /// Starts an empty settings builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `key` parsed as a boolean; anything but `true`/`false` is `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    /// Returns `key` parsed as an unsigned integer.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|value| value.parse().ok())
    }

    /// Cluster the client expects to join, if set.
    pub fn cluster_name(&self) -> Option<&str> {
        self.get(CLUSTER_NAME)
    }

    /// True when node sniffing was requested. Defaults to false.
    pub fn sniff(&self) -> bool {
        self.get_bool(TRANSPORT_SNIFF).unwrap_or(false)
    }

    /// Per-endpoint connect timeout, falling back to `DEFAULT_CONNECT_TIMEOUT`.
    pub fn connect_timeout(&self) -> Duration {
        self.get_u64(CONNECT_TIMEOUT_MS)
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.entries {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Builder for [`Settings`]. Later `put`s for the same key win.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    entries: BTreeMap<String, String>,
}

impl SettingsBuilder {
    /// Sets `key`, replacing any earlier value.
    pub fn put(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.entries.insert(key.into(), value.to_string());
        self
    }

    /// Freezes the collected entries.
    pub fn build(self) -> Settings {
        Settings {
            entries: self.entries,
        }
    }
}
