//! # p2pcopy rendezvous
//!
//! Peer rendezvous layer for p2pcopy: establishes a direct UDP path between
//! two hosts behind NATs, without a relay.
//!
//! This crate provides:
//! - External endpoint discovery over an ordered STUN server list
//! - A pool of resolved local sockets to advertise to the peer
//! - Wall-clock synchronization of connect rounds (SNTP)
//! - Parallel hole punching across (local socket, peer port) pairs
//!
//! ## Flow
//!
//! 1. Resolve a primary socket to learn the public IP and NAT type
//! 2. Resolve a pool of secondary sockets and advertise their external ports
//! 3. Swap advertisements with the peer out of band
//! 4. Every round: wait for the next shared second mark, then race one
//!    handshake per pairing; the controlling side nominates the first
//!    pairing it confirms and both sides keep exactly that one
//!
//! ## Example
//!
//! ```rust,no_run
//! use p2pcopy_rendezvous::{
//!     ExternalEndpointResolver, PeerTarget, Rendezvous, RendezvousOptions, SntpClock,
//!     StunClient, TimeSyncBarrier, UdpHandshake,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ExternalEndpointResolver::with_default_servers(StunClient::new());
//! let rendezvous = Rendezvous::new(
//!     resolver,
//!     UdpHandshake::new(),
//!     TimeSyncBarrier::new(SntpClock::default()),
//!     RendezvousOptions::default(),
//!     CancellationToken::new(),
//! );
//!
//! let pool = rendezvous.prepare().await?;
//! println!("Tell your peer your ports are: {}", pool.advertisement().ports_line());
//!
//! let peer = PeerTarget::parse("203.0.113.10", "50000,50001,50002")?;
//! let link = rendezvous.connect(pool, &peer).await?;
//! link.transport.send(b"hello").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod nat;
pub mod peer;
pub mod pool;
pub mod race;
pub mod rendezvous;
pub mod resolver;
pub mod sync;

// Re-export commonly used types
pub use error::{BarrierError, RendezvousError};
pub use nat::{
    ConnectError, ExternalMapping, NatType, Nomination, PeerLink, Role, StunClient, StunError,
    StunQuery, StunResult, StunServer, TransportConnector, UdpHandshake,
};
pub use peer::{Advertisement, PeerExchange, PeerTarget};
pub use pool::{LocalSocket, PoolOptions, SocketPool};
pub use race::{ConnectionRace, RoundOutcome, RoundWinner};
pub use rendezvous::{Established, Rendezvous, RendezvousOptions};
pub use resolver::{ExternalEndpointResolver, Resolution};
pub use sync::{
    RoundBarrier, SntpClock, SystemClock, TimeSource, TimeSyncBarrier, Unsynchronized,
};
