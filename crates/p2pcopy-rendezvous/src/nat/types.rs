//! NAT Types and Detection
//!
//! Shared NAT traversal types (classification, STUN server candidates, learned
//! mappings) and a small detector that refines the classification of a socket
//! by probing a second STUN server and a second local socket.

use super::stun::StunQuery;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use tokio::net::UdpSocket;

/// NAT type classification
///
/// The rendezvous core only cares whether a server reported UDP as blocked;
/// the finer classes are reported to the operator. They describe mapping
/// behaviour only, filtering is never probed:
/// - Open: No NAT, direct connection possible
/// - Cone: One mapping per socket whatever the destination, so the
///   advertised ports stay valid; port preservation is reported as well
/// - Symmetric: Hardest to traverse, different mapping per destination
/// - Blocked: No UDP answer from the STUN server at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatType {
    /// No NAT detected, public IP address
    Open,
    /// Endpoint-independent mapping that keeps the local port
    PortPreservingCone,
    /// Endpoint-independent mapping onto a different external port
    PortChangingCone,
    /// Symmetric NAT - different mapping per destination
    Symmetric,
    /// UDP blocked by a firewall (no STUN answer)
    Blocked,
    /// Behind some NAT, behaviour not determined
    Unknown,
}

impl NatType {
    /// Whether this classification means UDP does not get through at all
    #[must_use]
    pub fn is_blocked(self) -> bool {
        self == Self::Blocked
    }
}

impl fmt::Display for NatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open (No NAT)"),
            Self::PortPreservingCone => write!(f, "Cone NAT (port preserving)"),
            Self::PortChangingCone => write!(f, "Cone NAT (port changing)"),
            Self::Symmetric => write!(f, "Symmetric NAT"),
            Self::Blocked => write!(f, "UDP Blocked"),
            Self::Unknown => write!(f, "Unknown NAT Type"),
        }
    }
}

/// A STUN server candidate from the fallback list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StunServer {
    /// Hostname or IP literal
    pub host: String,
    /// UDP port
    pub port: u16,
}

impl StunServer {
    /// Create a server candidate
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The built-in fallback list, in query order
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        super::servers::DEFAULT_STUN_SERVERS
            .iter()
            .map(|&(host, port)| Self::new(host, port))
            .collect()
    }
}

impl fmt::Display for StunServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error parsing a `host:port` server string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseServerError(String);

impl fmt::Display for ParseServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid STUN server '{}' (expected host:port)", self.0)
    }
}

impl std::error::Error for ParseServerError {}

impl FromStr for StunServer {
    type Err = ParseServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| ParseServerError(s.to_string()))?;
        let port: u16 = port.parse().map_err(|_| ParseServerError(s.to_string()))?;

        if host.is_empty() || port == 0 {
            return Err(ParseServerError(s.to_string()));
        }

        Ok(Self::new(host, port))
    }
}

/// Answer to a single STUN query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StunResult {
    /// Server reflexive address, if the server gave one
    pub public_endpoint: Option<SocketAddr>,
    /// Classification derived from the exchange
    pub nat_type: NatType,
}

impl StunResult {
    /// The "no answer" result reported when UDP does not get through
    #[must_use]
    pub fn blocked() -> Self {
        Self {
            public_endpoint: None,
            nat_type: NatType::Blocked,
        }
    }
}

/// Externally visible mapping of one local socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalMapping {
    /// Local bound address
    pub local: SocketAddr,
    /// Address and port as seen by the STUN server
    pub external: SocketAddr,
    /// NAT classification
    pub nat_type: NatType,
    /// Server that produced this mapping
    pub server: StunServer,
}

impl ExternalMapping {
    /// External IP address
    #[must_use]
    pub fn external_ip(&self) -> IpAddr {
        self.external.ip()
    }

    /// External port
    #[must_use]
    pub fn external_port(&self) -> u16 {
        self.external.port()
    }
}

/// NAT type detector
///
/// Refines the classification of an already-resolved socket. Every probe that
/// fails leaves the classification as it was.
pub struct NatDetector<'a, S> {
    stun: &'a S,
    servers: &'a [StunServer],
}

impl<'a, S: StunQuery> NatDetector<'a, S> {
    /// Create a detector over a STUN collaborator and server list
    #[must_use]
    pub fn new(stun: &'a S, servers: &'a [StunServer]) -> Self {
        Self { stun, servers }
    }

    /// Classify the NAT in front of `socket`, given its first mapping
    ///
    /// 1. Public local address equal to the mapping: Open
    /// 2. Same socket, next answering server, different mapping: Symmetric
    /// 3. Fresh socket: port preserved or not decides between the two cone
    ///    classes
    pub async fn detect(&self, socket: &UdpSocket, first: &ExternalMapping) -> NatType {
        if first.nat_type.is_blocked() {
            return NatType::Blocked;
        }

        if Self::is_public_ip(&first.local.ip()) && first.local == first.external {
            return NatType::Open;
        }

        let others = self.servers.iter().filter(|s| **s != first.server);
        let Some((second_server, second)) = self.first_mapping(others, socket).await else {
            tracing::debug!("No second STUN server answered, keeping {}", first.nat_type);
            return first.nat_type;
        };
        if second != first.external {
            tracing::debug!(
                "{} mapped to {}, {} mapped to {}",
                first.server,
                first.external,
                second_server,
                second
            );
            return NatType::Symmetric;
        }

        let bind_addr = SocketAddr::new(first.local.ip(), 0);
        let Ok(fresh) = UdpSocket::bind(bind_addr).await else {
            return first.nat_type;
        };
        let Ok(fresh_local) = fresh.local_addr() else {
            return first.nat_type;
        };

        let answering = [&first.server, second_server].into_iter();
        match self.first_mapping(answering, &fresh).await {
            Some((_, mapped)) if mapped.port() == fresh_local.port() => NatType::PortPreservingCone,
            Some(_) => NatType::PortChangingCone,
            None => first.nat_type,
        }
    }

    /// Query `servers` in order until one reports a public endpoint
    async fn first_mapping<'s>(
        &self,
        servers: impl Iterator<Item = &'s StunServer>,
        socket: &UdpSocket,
    ) -> Option<(&'s StunServer, SocketAddr)> {
        for server in servers {
            match self.stun.query(server, socket).await {
                Ok(StunResult {
                    public_endpoint: Some(mapped),
                    nat_type,
                }) if !nat_type.is_blocked() => return Some((server, mapped)),
                Ok(_) => tracing::debug!("NAT detection: {} gave no mapping", server),
                Err(e) => tracing::debug!("NAT detection probe to {} failed: {}", server, e),
            }
        }
        None
    }

    /// Check if an IP address is public (not private/loopback/link-local)
    fn is_public_ip(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(ipv4) => {
                !ipv4.is_private()
                    && !ipv4.is_loopback()
                    && !ipv4.is_link_local()
                    && !ipv4.is_unspecified()
            }
            IpAddr::V6(ipv6) => !ipv6.is_loopback() && !ipv6.is_multicast() && !ipv6.is_unspecified(),
        }
    }
}
