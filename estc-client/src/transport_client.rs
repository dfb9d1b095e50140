//! # Transport-Mode Client
//!
//! Purpose: Build transport settings from the options, register every seed
//! server on a fresh transport and own the resulting handle.
//!
//! ## Design Principles
//! 1. **Single Owner**: The handle lives inside `Handle`, so only this client
//!    can reach it and `&mut self` serializes lifecycle calls.
//! 2. **State-Tagged Handle**: `Uninitialized -> Open -> Closed -> Open`;
//!    nothing can observe a released handle.
//! 3. **Silent Degradation**: An empty server list still opens a handle; it
//!    just never reports a connected node.

use estc_common::{ClientMode, ElasticSearchOptions};
use tracing::{debug, info};

use crate::adapter::{ClientState, ClusterClient};
use crate::settings::{Settings, CLUSTER_NAME, CONNECT_TIMEOUT_MS, TRANSPORT_SNIFF};
use crate::transport::{
    DiscoveryNode, TcpTransportFactory, TransportAddress, TransportBackend, TransportFactory,
};

enum Handle<B> {
    Uninitialized,
    Open(B),
    Closed,
}

/// Cluster client talking to nodes through the transport port.
pub struct TransportModeClient<F: TransportFactory = TcpTransportFactory> {
    options: ElasticSearchOptions,
    factory: F,
    handle: Handle<F::Backend>,
}

impl TransportModeClient<TcpTransportFactory> {
    /// Creates an unopened client using the TCP transport.
    pub fn new(options: ElasticSearchOptions) -> Self {
        Self::with_factory(options, TcpTransportFactory)
    }
}

impl<F: TransportFactory> TransportModeClient<F> {
    /// Creates an unopened client that builds transports with `factory`.
    pub fn with_factory(options: ElasticSearchOptions, factory: F) -> Self {
        TransportModeClient {
            options,
            factory,
            handle: Handle::Uninitialized,
        }
    }

    /// Settings a new transport is created with.
    pub fn settings(&self) -> Settings {
        let mut builder = Settings::builder()
            .put(TRANSPORT_SNIFF, true)
            .put(CLUSTER_NAME, self.options.cluster());
        if let Some(timeout) = self.options.connect_timeout() {
            builder = builder.put(CONNECT_TIMEOUT_MS, timeout.as_millis());
        }
        builder.build()
    }

    /// Creates a new handle, replacing (and closing) any open one.
    pub fn create_client(&mut self) -> &F::Backend {
        if matches!(self.handle, Handle::Open(_)) {
            self.close();
        }

        let settings = self.settings();
        let mut transport = self.factory.create(&settings);
        for server in self.options.server_list() {
            let address = TransportAddress::new(server.as_str(), self.options.port());
            debug!(address = %address, "registering transport address");
            transport.add_transport_address(address);
        }
        info!(
            cluster = self.options.cluster(),
            endpoints = transport.transport_addresses().len(),
            "transport client created"
        );

        self.handle = Handle::Open(transport);
        match &self.handle {
            Handle::Open(transport) => transport,
            _ => unreachable!("handle was just opened"),
        }
    }

    /// Returns the open handle, creating one first if needed.
    pub fn client(&mut self) -> &F::Backend {
        match self.handle {
            Handle::Open(_) => {}
            _ => return self.create_client(),
        }
        match &self.handle {
            Handle::Open(transport) => transport,
            _ => unreachable!("handle is open"),
        }
    }

    /// The open handle, if any. Never creates one.
    pub fn handle(&self) -> Option<&F::Backend> {
        match &self.handle {
            Handle::Open(transport) => Some(transport),
            _ => None,
        }
    }
}

impl<F: TransportFactory> ClusterClient for TransportModeClient<F> {
    fn mode(&self) -> ClientMode {
        ClientMode::Transport
    }

    fn options(&self) -> &ElasticSearchOptions {
        &self.options
    }

    fn open(&mut self) {
        self.client();
    }

    fn is_opened(&self) -> bool {
        self.handle()
            .map(|transport| !transport.connected_nodes().is_empty())
            .unwrap_or(false)
    }

    fn connected_nodes(&self) -> Vec<DiscoveryNode> {
        self.handle()
            .map(|transport| transport.connected_nodes())
            .unwrap_or_default()
    }

    fn close(&mut self) {
        if !matches!(self.handle, Handle::Open(_)) {
            debug!(state = %self.state(), "close on a client that is not open");
            return;
        }
        if let Handle::Open(mut transport) = std::mem::replace(&mut self.handle, Handle::Closed) {
            transport.close();
            info!(cluster = self.options.cluster(), "transport client closed");
        }
    }

    fn state(&self) -> ClientState {
        match self.handle {
            Handle::Uninitialized => ClientState::Uninitialized,
            Handle::Open(_) => ClientState::Open,
            Handle::Closed => ClientState::Closed,
        }
    }
}
