//! # Cluster Client Contract
//!
//! The lifecycle every transport-backed output sink relies on, plus the
//! factory that picks a variant from the configured client mode.

use std::fmt;

use estc_common::{ClientMode, ElasticSearchOptions};

use crate::transport::DiscoveryNode;
use crate::transport_client::TransportModeClient;

/// Where a client's handle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No handle has been created yet.
    Uninitialized,
    /// A handle exists; it may have zero live nodes.
    Open,
    /// The handle was shut down and released.
    Closed,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Uninitialized => write!(f, "uninitialized"),
            ClientState::Open => write!(f, "open"),
            ClientState::Closed => write!(f, "closed"),
        }
    }
}

/// Lifecycle of a connection handle to a remote cluster.
///
/// Every operation is defined in every state: `is_opened` on a client that
/// was never opened or already closed is `false`, and `close` there is a
/// no-op.
pub trait ClusterClient: Send {
    /// Connection strategy this client implements.
    fn mode(&self) -> ClientMode;

    /// Options the client was built from.
    fn options(&self) -> &ElasticSearchOptions;

    /// Creates the handle unless one is already open.
    fn open(&mut self);

    /// True when the handle has at least one connected node.
    fn is_opened(&self) -> bool;

    /// Nodes the handle is connected to; empty unless open.
    fn connected_nodes(&self) -> Vec<DiscoveryNode>;

    /// Shuts the handle down and releases it.
    fn close(&mut self);

    /// Current lifecycle state of the handle.
    fn state(&self) -> ClientState;

    /// Variant-specific teardown hook.
    fn deinit(&mut self) {}
}

/// Builds the client variant selected by `options.client_mode()`.
///
/// The returned client is not opened yet.
pub fn build_client(options: ElasticSearchOptions) -> Box<dyn ClusterClient> {
    match options.client_mode() {
        ClientMode::Transport => Box::new(TransportModeClient::new(options)),
    }
}
