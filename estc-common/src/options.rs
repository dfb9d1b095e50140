//! # Client Options
//!
//! Purpose: Carry the connection configuration handed to a cluster client
//! adapter: cluster name, seed servers and the port they share.
//!
//! ## Design Principles
//! 1. **Immutable Value**: Options are fixed once built; adapters clone or
//!    borrow them and never write back.
//! 2. **Ordered Seeds**: Servers keep the order they were supplied in, since
//!    endpoints are registered in that order.
//! 3. **Lenient Input**: A server list may be a JSON array or a single
//!    whitespace-separated string.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "cluster": "logs",
//!   "servers": ["es1.local", "es2.local"],   // or "es1.local es2.local"
//!   "port": 9300,
//!   "client_mode": "transport",              // optional
//!   "connect_timeout_ms": 1000               // optional
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{EstcError, EstcResult};

/// Default cluster name used by search clusters out of the box.
pub const DEFAULT_CLUSTER: &str = "elasticsearch";

/// Default binary transport port.
pub const DEFAULT_PORT: u16 = 9300;

/// Connection strategy used to reach the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Thin client talking to nodes over the binary transport port.
    #[default]
    Transport,
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMode::Transport => write!(f, "transport"),
        }
    }
}

/// Connection configuration for a cluster client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElasticSearchOptions {
    #[serde(default = "default_cluster")]
    cluster: String,
    #[serde(default, deserialize_with = "deserialize_servers")]
    servers: Vec<String>,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    client_mode: ClientMode,
    #[serde(default)]
    connect_timeout_ms: Option<u64>,
}

impl ElasticSearchOptions {
    /// Creates options for the given cluster, seed servers and shared port.
    pub fn new<I, S>(cluster: impl Into<String>, servers: I, port: u16) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ElasticSearchOptions {
            cluster: cluster.into(),
            servers: servers.into_iter().map(Into::into).collect(),
            port,
            client_mode: ClientMode::default(),
            connect_timeout_ms: None,
        }
    }

    /// Returns a copy using the given client mode.
    pub fn with_client_mode(mut self, mode: ClientMode) -> Self {
        self.client_mode = mode;
        self
    }

    /// Returns a copy with a TCP connect timeout for each endpoint.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Parses options from a JSON document.
    pub fn from_json_str(json: &str) -> EstcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> EstcResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| EstcError::OptionsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Name of the cluster to join.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Seed servers in the order they were supplied.
    pub fn server_list(&self) -> &[String] {
        &self.servers
    }

    /// Transport port shared by every server.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connection strategy to build a client for.
    pub fn client_mode(&self) -> ClientMode {
        self.client_mode
    }

    /// Per-endpoint connect timeout, if one was configured.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ElasticSearchOptions {
    fn default() -> Self {
        ElasticSearchOptions::new(DEFAULT_CLUSTER, Vec::<String>::new(), DEFAULT_PORT)
    }
}

/// Splits a whitespace-separated server string into host entries.
///
/// Empty input yields an empty list.
pub fn parse_server_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

fn default_cluster() -> String {
    DEFAULT_CLUSTER.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn deserialize_servers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Servers {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Servers::deserialize(deserializer)? {
        Servers::List(list) => list,
        Servers::Joined(raw) => parse_server_list(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn new_keeps_server_order() {
        let options = ElasticSearchOptions::new("test-cluster", ["host1", "host2"], 9300);
        assert_eq!(options.cluster(), "test-cluster");
        assert_eq!(options.server_list(), ["host1", "host2"]);
        assert_eq!(options.port(), 9300);
        assert_eq!(options.client_mode(), ClientMode::Transport);
        assert_eq!(options.connect_timeout(), None);
    }

    #[test]
    fn oversized_timeout_saturates() {
        let options = ElasticSearchOptions::default().with_connect_timeout(Duration::MAX);
        assert_eq!(options.connect_timeout(), Some(Duration::from_millis(u64::MAX)));
    }

    #[test]
    fn parses_joined_server_string() {
        assert_eq!(parse_server_list("  a  b\tc\n"), ["a", "b", "c"]);
        assert!(parse_server_list("   ").is_empty());
    }

    #[test]
    fn json_accepts_list_or_string() {
        let from_list = ElasticSearchOptions::from_json_str(
            r#"{"cluster":"logs","servers":["es1","es2"],"port":9301}"#,
        )
        .unwrap();
        let from_string = ElasticSearchOptions::from_json_str(
            r#"{"cluster":"logs","servers":"es1 es2","port":9301}"#,
        )
        .unwrap();
        assert_eq!(from_list, from_string);
        assert_eq!(from_list.server_list(), ["es1", "es2"]);
    }

    #[test]
    fn json_fills_defaults() {
        let options = ElasticSearchOptions::from_json_str("{}").unwrap();
        assert_eq!(options.cluster(), DEFAULT_CLUSTER);
        assert!(options.server_list().is_empty());
        assert_eq!(options.port(), DEFAULT_PORT);
        assert_eq!(options.client_mode(), ClientMode::Transport);
    }

    #[test]
    fn json_reads_mode_and_timeout() {
        let options = ElasticSearchOptions::from_json_str(
            r#"{"servers":["a"],"client_mode":"transport","connect_timeout_ms":250}"#,
        )
        .unwrap();
        assert_eq!(options.connect_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn json_rejects_unknown_mode() {
        let err = ElasticSearchOptions::from_json_str(r#"{"client_mode":"node"}"#).unwrap_err();
        assert!(matches!(err, EstcError::OptionsFormat(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cluster":"c1","servers":"h1","port":9400}}"#).unwrap();
        let options = ElasticSearchOptions::from_file(file.path()).unwrap();
        assert_eq!(options.cluster(), "c1");
        assert_eq!(options.server_list(), ["h1"]);
        assert_eq!(options.port(), 9400);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ElasticSearchOptions::from_file(&path).unwrap_err();
        match err {
            EstcError::OptionsIo { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
