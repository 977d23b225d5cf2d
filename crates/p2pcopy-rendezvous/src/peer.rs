//! Peer addressing
//!
//! What we tell the peer ([`Advertisement`]), what the peer tells us
//! ([`PeerTarget`]) and the seam through which the two are swapped
//! ([`PeerExchange`]).

use crate::error::RendezvousError;
use crate::nat::{NatType, Role};
use std::cmp::Ordering;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};

/// Details the operator relays to the remote peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// External IP of the primary mapping
    pub external_ip: IpAddr,
    /// NAT classification of the primary mapping
    pub nat_type: NatType,
    /// External ports of the pool sockets, in pool order
    pub ports: Vec<u16>,
}

impl Advertisement {
    /// Ports as the comma separated list the peer types back in
    #[must_use]
    pub fn ports_line(&self) -> String {
        self.ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Our role against `peer`
    ///
    /// Both sides compare the same two (IP, first port) endpoints, so they
    /// always end up in opposite roles; the lower one controls. `None` when
    /// the peer advertises our own endpoint.
    #[must_use]
    pub fn role_against(&self, peer: &PeerTarget) -> Option<Role> {
        let ours = (self.external_ip, *self.ports.first()?);
        let theirs = (peer.ip(), *peer.ports().first()?);
        match ours.cmp(&theirs) {
            Ordering::Less => Some(Role::Controlling),
            Ordering::Greater => Some(Role::Controlled),
            Ordering::Equal => None,
        }
    }
}

/// Remote peer address and its ordered candidate ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerTarget {
    ip: IpAddr,
    ports: Vec<u16>,
}

impl PeerTarget {
    /// Create a target from an address and candidate ports
    ///
    /// # Errors
    ///
    /// Returns `RendezvousError::InvalidPeer` if `ports` is empty or contains 0
    pub fn new(ip: IpAddr, ports: Vec<u16>) -> Result<Self, RendezvousError> {
        if ports.is_empty() {
            return Err(RendezvousError::InvalidPeer("no peer ports given".into()));
        }
        if ports.contains(&0) {
            return Err(RendezvousError::InvalidPeer("port 0 is not a valid peer port".into()));
        }
        Ok(Self { ip, ports })
    }

    /// Parse operator input: an IP and a comma separated port list
    ///
    /// Whitespace around the IP and around each port is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RendezvousError::InvalidPeer` if the IP does not parse, the
    /// list is empty, or any entry is not a port number
    pub fn parse(ip: &str, ports: &str) -> Result<Self, RendezvousError> {
        let ip: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| RendezvousError::InvalidPeer(format!("'{}' is not an IP address", ip.trim())))?;

        if ports.trim().is_empty() {
            return Err(RendezvousError::InvalidPeer("no peer ports given".into()));
        }

        let ports = ports
            .split(',')
            .map(|entry| {
                let entry = entry.trim();
                entry
                    .parse::<u16>()
                    .map_err(|_| RendezvousError::InvalidPeer(format!("'{entry}' is not a port")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ip, ports)
    }

    /// Peer IP
    #[must_use]
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Candidate ports in pairing order
    #[must_use]
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Candidate address at `index`
    #[must_use]
    pub fn addr(&self, index: usize) -> Option<SocketAddr> {
        self.ports
            .get(index)
            .map(|&port| SocketAddr::new(self.ip, port))
    }
}

/// Swaps advertisements with the remote peer
///
/// The console implementation prints ours and prompts for theirs; tests swap
/// them over a channel.
pub trait PeerExchange {
    /// Publish `ours` and obtain the peer's target
    fn exchange(
        &mut self,
        ours: &Advertisement,
    ) -> impl Future<Output = Result<PeerTarget, RendezvousError>> + Send;
}
