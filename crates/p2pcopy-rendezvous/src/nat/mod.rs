//! NAT Traversal Module
//!
//! The collaborators the rendezvous core talks to when it needs the network:
//!
//! - **STUN Client**: RFC 5389 Binding requests for server reflexive address discovery
//! - **NAT Type Detection**: Refines the classification of a mapped socket
//! - **UDP Hole Punching**: Probe/acknowledge handshake using simultaneous open
//! - **Server List**: Built-in ordered fallback list of public STUN servers
//!
//! # Example
//!
//! ```rust,no_run
//! use p2pcopy_rendezvous::nat::{StunClient, StunQuery, StunServer};
//! use tokio::net::UdpSocket;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = UdpSocket::bind("0.0.0.0:0").await?;
//! let server = StunServer::new("stun.l.google.com", 19302);
//! let result = StunClient::new().query(&server, &socket).await?;
//! println!("External endpoint: {:?} ({})", result.public_endpoint, result.nat_type);
//! # Ok(())
//! # }
//! ```

pub mod hole_punch;
pub mod servers;
pub mod stun;
pub mod types;

// Re-exports
pub use hole_punch::{ConnectError, Nomination, PeerLink, Role, TransportConnector, UdpHandshake};
pub use stun::{
    StunAttribute, StunClient, StunError, StunMessage, StunMessageClass, StunMessageType,
    StunQuery,
};
pub use types::{ExternalMapping, NatDetector, NatType, ParseServerError, StunResult, StunServer};
