//! Local socket pool
//!
//! The pool resolves a primary mapping to learn the public IP and NAT type,
//! then binds and resolves the secondary sockets that are actually raced.
//! Dropping the pool closes every socket it still owns.

use crate::error::RendezvousError;
use crate::nat::{ExternalMapping, NatDetector, StunQuery};
use crate::peer::Advertisement;
use crate::resolver::{ExternalEndpointResolver, Resolution};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Default number of secondary sockets
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Socket pool construction options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Secondary sockets to bind
    pub size: usize,
    /// Local address every socket binds to
    pub bind_ip: IpAddr,
    /// Local port of the primary socket (0 lets the OS choose)
    pub primary_port: u16,
    /// Refine the primary NAT type with extra probes
    pub detect_nat: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            primary_port: 0,
            detect_nat: true,
        }
    }
}

/// A bound socket with its learned external mapping
#[derive(Debug, Clone)]
pub struct LocalSocket {
    socket: Arc<UdpSocket>,
    mapping: ExternalMapping,
}

impl LocalSocket {
    /// Shared socket handle
    #[must_use]
    pub fn socket(&self) -> &Arc<UdpSocket> {
        &self.socket
    }

    /// External mapping learned at pool initialization
    #[must_use]
    pub fn mapping(&self) -> &ExternalMapping {
        &self.mapping
    }

    /// Local bound address
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.mapping.local
    }

    /// Port advertised to the peer
    #[must_use]
    pub fn external_port(&self) -> u16 {
        self.mapping.external_port()
    }

    /// Give up the mapping, keeping the socket
    #[must_use]
    pub fn into_socket(self) -> Arc<UdpSocket> {
        self.socket
    }
}

/// Owned set of resolved local sockets
#[derive(Debug)]
pub struct SocketPool {
    primary: ExternalMapping,
    sockets: Vec<LocalSocket>,
}

impl SocketPool {
    /// Resolve a primary mapping, then bind and resolve the secondary sockets
    ///
    /// The primary socket only serves to learn the public IP and NAT type;
    /// it is closed before this returns. Secondary sockets that fail to
    /// resolve are closed immediately.
    ///
    /// # Errors
    ///
    /// - `StunUnavailable` if the primary socket cannot be resolved
    /// - `NoUsableSockets` if no secondary socket resolves
    /// - `Io` if a socket cannot be bound
    pub async fn initialize<S: StunQuery>(
        resolver: &ExternalEndpointResolver<S>,
        options: &PoolOptions,
    ) -> Result<Self, RendezvousError> {
        let primary = Self::resolve_primary(resolver, options).await?;

        tracing::info!("Initializing sockets...");

        let mut sockets = Vec::with_capacity(options.size);
        for index in 0..options.size {
            let socket = UdpSocket::bind(SocketAddr::new(options.bind_ip, 0)).await?;

            match resolver.resolve(&socket, false).await {
                Resolution::Mapped(mapping) => {
                    tracing::debug!(
                        "Socket {} mapped {} -> {}",
                        index,
                        mapping.local,
                        mapping.external
                    );
                    sockets.push(LocalSocket {
                        socket: Arc::new(socket),
                        mapping,
                    });
                }
                Resolution::NotFound { .. } => {
                    tracing::debug!("Socket {} has no external mapping, closing it", index);
                }
            }
        }

        if sockets.is_empty() {
            return Err(RendezvousError::NoUsableSockets);
        }

        tracing::debug!("{} of {} sockets usable", sockets.len(), options.size);

        Ok(Self { primary, sockets })
    }

    async fn resolve_primary<S: StunQuery>(
        resolver: &ExternalEndpointResolver<S>,
        options: &PoolOptions,
    ) -> Result<ExternalMapping, RendezvousError> {
        let socket = UdpSocket::bind(SocketAddr::new(options.bind_ip, options.primary_port)).await?;

        let mut mapping = match resolver.resolve(&socket, true).await {
            Resolution::Mapped(mapping) => mapping,
            not_found @ Resolution::NotFound { .. } => {
                return Err(RendezvousError::StunUnavailable {
                    udp_blocked: not_found.udp_blocked(),
                });
            }
        };

        if options.detect_nat {
            let detector = NatDetector::new(resolver.stun(), resolver.servers());
            mapping.nat_type = detector.detect(&socket, &mapping).await;
            tracing::debug!("Detected NAT type: {}", mapping.nat_type);
        }

        Ok(mapping)
    }

    /// Mapping of the (already closed) primary socket
    #[must_use]
    pub fn primary(&self) -> &ExternalMapping {
        &self.primary
    }

    /// Usable sockets in pool order
    #[must_use]
    pub fn sockets(&self) -> &[LocalSocket] {
        &self.sockets
    }

    /// Number of usable sockets
    #[must_use]
    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    /// Whether the pool holds no sockets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }

    /// Shared handles of every socket, in pool order
    #[must_use]
    pub fn handles(&self) -> Vec<Arc<UdpSocket>> {
        self.sockets.iter().map(|s| Arc::clone(&s.socket)).collect()
    }

    /// External ports in pool order
    #[must_use]
    pub fn external_ports(&self) -> Vec<u16> {
        self.sockets.iter().map(LocalSocket::external_port).collect()
    }

    /// What the operator tells the peer
    #[must_use]
    pub fn advertisement(&self) -> Advertisement {
        Advertisement {
            external_ip: self.primary.external_ip(),
            nat_type: self.primary.nat_type,
            ports: self.external_ports(),
        }
    }

    /// Keep the socket at `index` and close all others
    #[must_use]
    pub fn take(mut self, index: usize) -> Option<LocalSocket> {
        (index < self.sockets.len()).then(|| self.sockets.swap_remove(index))
    }
}
