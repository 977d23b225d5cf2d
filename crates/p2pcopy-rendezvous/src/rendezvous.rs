//! Rendezvous controller
//!
//! Ties the pieces together: resolve a socket pool, swap advertisements with
//! the peer, then run synchronized connect rounds until one pairing connects,
//! the round limit is reached, or the operator aborts. The advertisements
//! also settle which side nominates the pairing.

use crate::error::RendezvousError;
use crate::nat::{StunQuery, TransportConnector};
use crate::peer::{PeerExchange, PeerTarget};
use crate::pool::{PoolOptions, SocketPool};
use crate::race::ConnectionRace;
use crate::resolver::ExternalEndpointResolver;
use crate::sync::RoundBarrier;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Rendezvous options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendezvousOptions {
    /// Socket pool construction
    pub pool: PoolOptions,
    /// Stop after this many rounds (`None` retries until cancelled)
    pub max_rounds: Option<u32>,
}

/// A confirmed direct path to the peer
#[derive(Debug)]
pub struct Established<T> {
    /// Connected transport
    pub transport: T,
    /// Local port of the winning socket
    pub local_port: u16,
    /// Peer address
    pub remote: SocketAddr,
    /// Round (1-based) in which the path was confirmed
    pub round: u32,
}

/// Drives one peer rendezvous
pub struct Rendezvous<S, T, B> {
    resolver: Arc<ExternalEndpointResolver<S>>,
    race: ConnectionRace<S, T>,
    barrier: B,
    options: RendezvousOptions,
    shutdown: CancellationToken,
}

impl<S, T, B> Rendezvous<S, T, B>
where
    S: StunQuery + 'static,
    T: TransportConnector,
    B: RoundBarrier,
{
    /// Create a controller
    ///
    /// Cancelling `shutdown` aborts whichever phase is running.
    #[must_use]
    pub fn new(
        resolver: ExternalEndpointResolver<S>,
        connector: T,
        barrier: B,
        options: RendezvousOptions,
        shutdown: CancellationToken,
    ) -> Self {
        let resolver = Arc::new(resolver);
        let race = ConnectionRace::new(Arc::clone(&resolver), Arc::new(connector));
        Self {
            resolver,
            race,
            barrier,
            options,
            shutdown,
        }
    }

    /// Resolver used for the pool and for refreshes
    #[must_use]
    pub fn resolver(&self) -> &ExternalEndpointResolver<S> {
        &self.resolver
    }

    /// Token that aborts the rendezvous
    #[must_use]
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Build and resolve the socket pool
    ///
    /// # Errors
    ///
    /// Pool errors (`StunUnavailable`, `NoUsableSockets`, `Io`) or
    /// `Cancelled` if the operator aborts
    pub async fn prepare(&self) -> Result<SocketPool, RendezvousError> {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(RendezvousError::Cancelled),
            pool = SocketPool::initialize(&*self.resolver, &self.options.pool) => pool,
        }
    }

    /// Race the pool against the peer's ports until a path is confirmed
    ///
    /// Consumes the pool: the winning socket lives on inside the transport
    /// and every other socket is closed before this returns.
    ///
    /// # Errors
    ///
    /// - `InvalidPeer` if the peer has no candidate ports or advertises our
    ///   own endpoint
    /// - `RoundsExhausted` once `max_rounds` rounds have failed
    /// - `Cancelled` if the operator aborts
    pub async fn connect(
        &self,
        pool: SocketPool,
        peer: &PeerTarget,
    ) -> Result<Established<T::Transport>, RendezvousError> {
        if peer.ports().is_empty() {
            return Err(RendezvousError::InvalidPeer("no peer ports given".into()));
        }

        let Some(role) = pool.advertisement().role_against(peer) else {
            return Err(RendezvousError::InvalidPeer(
                "peer advertises our own endpoint".into(),
            ));
        };

        tracing::info!("Trying to connect to peer on different ports");
        tracing::debug!("Acting as the {} side", role);
        if peer.ports().len() != pool.len() {
            tracing::debug!(
                "Pairing {} local sockets with {} peer ports",
                pool.len(),
                peer.ports().len()
            );
        }

        let sockets = pool.handles();
        let mut round = 0;

        loop {
            if let Some(max) = self.options.max_rounds {
                if round >= max {
                    return Err(RendezvousError::RoundsExhausted { rounds: round });
                }
            }
            round += 1;

            tracing::info!("Try {}:", round);

            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return Err(RendezvousError::Cancelled),
                () = self.barrier.wait_for_slot() => {}
            }

            tracing::info!("Connecting to other peer, please wait...");
            let outcome = self.race.run_round(&sockets, peer, role, &self.shutdown).await;

            if let Some(winner) = outcome.winner {
                drop(sockets);
                drop(pool);

                tracing::info!(
                    "Connected successfully to {} from local port {}",
                    winner.remote,
                    winner.local_port
                );
                return Ok(Established {
                    transport: winner.transport,
                    local_port: winner.local_port,
                    remote: winner.remote,
                    round,
                });
            }

            if self.shutdown.is_cancelled() {
                return Err(RendezvousError::Cancelled);
            }
            tracing::debug!("Round {} failed ({} attempts)", round, outcome.launched);
        }
    }

    /// Full rendezvous: prepare the pool, swap details with the peer, connect
    ///
    /// # Errors
    ///
    /// Any error of [`prepare`](Self::prepare), of the exchange, or of
    /// [`connect`](Self::connect)
    pub async fn establish<E: PeerExchange>(
        &self,
        exchange: &mut E,
    ) -> Result<Established<T::Transport>, RendezvousError> {
        let pool = self.prepare().await?;
        let advertisement = pool.advertisement();

        let peer = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Err(RendezvousError::Cancelled),
            peer = exchange.exchange(&advertisement) => peer?,
        };

        self.connect(pool, &peer).await
    }
}
