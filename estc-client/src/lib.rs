//! # estc Cluster Client
//!
//! Purpose: Open, inspect and tear down a connection handle to a remote
//! search cluster through a transport-mode client.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `ClusterClient` is the only surface a sink driver
//!    needs: open, liveness, close, deinit.
//! 2. **Narrow Seam**: The transport sits behind `TransportBackend` so the
//!    adapter only registers endpoints, asks for connected nodes and shuts down.
//! 3. **Explicit State**: The handle lives in a tagged state, so close and
//!    liveness are defined in every state.
//! 4. **Strategy Pattern**: Variants are picked from `ClientMode` at
//!    configuration time via `build_client`.

mod adapter;
mod settings;
mod transport;
mod transport_client;

pub use adapter::{build_client, ClientState, ClusterClient};
pub use settings::{
    Settings, SettingsBuilder, CLUSTER_NAME, CONNECT_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT,
    TRANSPORT_SNIFF,
};
pub use transport::{
    DiscoveryNode, TcpTransport, TcpTransportFactory, TransportAddress, TransportBackend,
    TransportFactory,
};
pub use transport_client::TransportModeClient;
