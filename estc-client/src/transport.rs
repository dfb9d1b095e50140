//! # Transport Layer
//!
//! Purpose: Hold the set of endpoints a client registered and keep one TCP
//! channel per reachable node, so liveness can be answered from the
//! connected-node registry.
//!
//! ## Design Principles
//! 1. **Narrow Seam**: `TransportBackend` exposes registration, connected
//!    nodes and shutdown, nothing else.
//! 2. **Lazy Resolution**: Addresses keep the host string and resolve at
//!    connect time, so registration never fails.
//! 3. **Swallow and Log**: Unreachable endpoints are logged and left out of
//!    the connected set; callers only see fewer live nodes.
//! 4. **Idempotent Shutdown**: Closing twice is harmless.

use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use crate::settings::Settings;

/// A seed endpoint: host name or IP literal plus port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportAddress {
    host: String,
    port: u16,
}

impl TransportAddress {
    /// Creates an endpoint; nothing is resolved yet.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        TransportAddress {
            host: host.into(),
            port,
        }
    }

    /// Host name or IP literal as supplied.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Transport port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the endpoint to socket addresses (DNS lookup for host names).
    pub fn resolve(&self) -> io::Result<Vec<SocketAddr>> {
        Ok((self.host.as_str(), self.port).to_socket_addrs()?.collect())
    }
}

impl fmt::Display for TransportAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A node the transport currently holds a channel to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryNode {
    /// Endpoint as it was registered.
    pub address: TransportAddress,
    /// Socket address the channel actually connected to.
    pub socket_addr: SocketAddr,
}

impl fmt::Display for DiscoveryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.socket_addr)
    }
}

/// Connection machinery a cluster client delegates to.
pub trait TransportBackend: Send {
    /// Registers an endpoint and tries to reach it.
    fn add_transport_address(&mut self, address: TransportAddress);

    /// Endpoints in registration order.
    fn transport_addresses(&self) -> &[TransportAddress];

    /// Nodes with a live channel right now.
    fn connected_nodes(&self) -> Vec<DiscoveryNode>;

    /// Terminates every channel. Safe to call more than once.
    fn close(&mut self);
}

/// Builds a fresh transport from settings.
pub trait TransportFactory: Send {
    type Backend: TransportBackend;

    /// Creates a transport configured by `settings`, with no endpoints.
    fn create(&self, settings: &Settings) -> Self::Backend;
}

/// Factory for [`TcpTransport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransportFactory;

impl TransportFactory for TcpTransportFactory {
    type Backend = TcpTransport;

    fn create(&self, settings: &Settings) -> TcpTransport {
        TcpTransport::new(settings.clone())
    }
}

/// TCP-backed transport keeping one channel per reachable endpoint.
pub struct TcpTransport {
    settings: Settings,
    addresses: Vec<TransportAddress>,
    channels: Vec<NodeChannel>,
}

impl TcpTransport {
    /// Creates a transport with no registered endpoints.
    pub fn new(settings: Settings) -> Self {
        TcpTransport {
            settings,
            addresses: Vec::new(),
            channels: Vec::new(),
        }
    }
}

impl TransportBackend for TcpTransport {
    fn add_transport_address(&mut self, address: TransportAddress) {
        match NodeChannel::connect(&address, self.settings.connect_timeout()) {
            Ok(channel) => {
                debug!(node = %channel.node, "transport channel established");
                self.channels.push(channel);
            }
            Err(err) => {
                warn!(address = %address, error = %err, "failed to connect to transport address");
            }
        }
        self.addresses.push(address);
    }

    fn transport_addresses(&self) -> &[TransportAddress] {
        &self.addresses
    }

    fn connected_nodes(&self) -> Vec<DiscoveryNode> {
        self.channels
            .iter()
            .filter(|channel| channel.is_alive())
            .map(|channel| channel.node.clone())
            .collect()
    }

    fn close(&mut self) {
        for channel in self.channels.drain(..) {
            if let Err(err) = channel.stream.shutdown(Shutdown::Both) {
                // Peer may already have gone away.
                debug!(node = %channel.node, error = %err, "channel shutdown failed");
            }
        }
    }
}

/// One open TCP channel to a node.
struct NodeChannel {
    node: DiscoveryNode,
    stream: TcpStream,
}

impl NodeChannel {
    fn connect(address: &TransportAddress, timeout: Duration) -> io::Result<Self> {
        let mut last_err = None;
        for socket_addr in address.resolve()? {
            match TcpStream::connect_timeout(&socket_addr, timeout) {
                Ok(stream) => {
                    // Small control frames; do not wait on Nagle.
                    stream.set_nodelay(true)?;
                    return Ok(NodeChannel {
                        node: DiscoveryNode {
                            address: address.clone(),
                            socket_addr,
                        },
                        stream,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(ErrorKind::AddrNotAvailable, "address resolved to nothing")
        }))
    }

    /// Drains whatever the node sent without blocking. There is no protocol
    /// to hand those bytes to; only an empty, still-open socket is alive.
    fn is_alive(&self) -> bool {
        if self.stream.set_nonblocking(true).is_err() {
            return false;
        }
        let mut reader = &self.stream;
        let mut scratch = [0u8; 512];
        let alive = loop {
            match reader.read(&mut scratch) {
                Ok(0) => break false,
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => break true,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break false,
            }
        };
        let _ = self.stream.set_nonblocking(false);
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CONNECT_TIMEOUT_MS;
    use std::net::TcpListener;

    #[test]
    fn address_display_brackets_ipv6() {
        assert_eq!(TransportAddress::new("host1", 9300).to_string(), "host1:9300");
        assert_eq!(TransportAddress::new("::1", 9300).to_string(), "[::1]:9300");
    }

    #[test]
    fn resolves_ip_literal() {
        let addrs = TransportAddress::new("127.0.0.1", 9300).resolve().unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:9300".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn reachable_address_becomes_connected_node() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut transport = TcpTransport::new(Settings::default());
        transport.add_transport_address(TransportAddress::new("127.0.0.1", port));

        let nodes = transport.connected_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].address, TransportAddress::new("127.0.0.1", port));
        drop(listener);
    }

    #[test]
    fn unreachable_address_is_registered_but_not_connected() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let settings = Settings::builder().put(CONNECT_TIMEOUT_MS, 500).build();
        let mut transport = TcpTransport::new(settings);
        transport.add_transport_address(TransportAddress::new("127.0.0.1", port));

        assert_eq!(transport.transport_addresses().len(), 1);
        assert!(transport.connected_nodes().is_empty());
    }

    #[test]
    fn pending_bytes_do_not_mask_a_hangup() {
        use std::io::Write;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut transport = TcpTransport::new(Settings::default());
        transport.add_transport_address(TransportAddress::new("127.0.0.1", port));
        let (mut peer, _) = listener.accept().unwrap();
        peer.write_all(b"xyz").unwrap();
        drop(peer);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !transport.connected_nodes().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(transport.connected_nodes().is_empty());
    }

    #[test]
    fn close_drops_nodes_and_is_repeatable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut transport = TcpTransport::new(Settings::default());
        transport.add_transport_address(TransportAddress::new("127.0.0.1", port));
        assert!(!transport.connected_nodes().is_empty());

        transport.close();
        assert!(transport.connected_nodes().is_empty());
        transport.close();
        assert!(transport.connected_nodes().is_empty());
        assert_eq!(transport.transport_addresses().len(), 1);
    }
}
