//! Connection race
//!
//! One round launches an attempt per positional (local socket, peer port)
//! pair. All attempts share one [`Nomination`], so each side gets a transport
//! from the pairing both sides agreed on. The first attempt that yields a
//! transport wins; every sibling is cancelled and joined before the round
//! returns.

use crate::nat::{Nomination, Role, StunQuery, TransportConnector};
use crate::peer::PeerTarget;
use crate::resolver::ExternalEndpointResolver;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// The successful attempt of a round
#[derive(Debug)]
pub struct RoundWinner<T> {
    /// Pairing index (pool socket and peer port)
    pub index: usize,
    /// Local port of the winning socket
    pub local_port: u16,
    /// Peer address the transport is connected to
    pub remote: SocketAddr,
    /// Connected transport
    pub transport: T,
}

/// Result of one round
#[derive(Debug)]
pub struct RoundOutcome<T> {
    /// Attempts launched (`min(sockets, ports)`)
    pub launched: usize,
    /// Winning attempt, if any
    pub winner: Option<RoundWinner<T>>,
}

/// Runs connect rounds over a fixed resolver and transport
pub struct ConnectionRace<S, T> {
    resolver: Arc<ExternalEndpointResolver<S>>,
    connector: Arc<T>,
}

impl<S, T> ConnectionRace<S, T>
where
    S: StunQuery + 'static,
    T: TransportConnector,
{
    /// Create a race over shared collaborators
    #[must_use]
    pub fn new(resolver: Arc<ExternalEndpointResolver<S>>, connector: Arc<T>) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    /// Run one round of attempts
    ///
    /// Socket `i` is paired with peer port `i`; surplus on either side is
    /// left unused. Each attempt refreshes its socket's mapping, then runs
    /// the transport handshake in `role`. Cancelling `cancel` ends every
    /// attempt.
    pub async fn run_round(
        &self,
        sockets: &[Arc<UdpSocket>],
        peer: &PeerTarget,
        role: Role,
        cancel: &CancellationToken,
    ) -> RoundOutcome<T::Transport> {
        let round = cancel.child_token();
        let nomination = Nomination::new(role);
        let mut attempts = JoinSet::new();

        for (index, socket) in sockets.iter().enumerate() {
            let Some(remote) = peer.addr(index) else {
                break;
            };

            let resolver = Arc::clone(&self.resolver);
            let connector = Arc::clone(&self.connector);
            let socket = Arc::clone(socket);
            let token = round.clone();
            let nomination = nomination.clone();

            attempts.spawn(async move {
                let local_port = socket.local_addr().map(|a| a.port()).unwrap_or_default();
                tracing::debug!("Attempt {}: local port {} -> {}", index, local_port, remote);

                let work = async {
                    resolver.refresh(&socket).await;
                    connector.connect(Arc::clone(&socket), remote, nomination).await
                };

                let result = tokio::select! {
                    biased;
                    () = token.cancelled() => return None,
                    result = work => result,
                };

                match result {
                    Ok(transport) => Some(RoundWinner {
                        index,
                        local_port,
                        remote,
                        transport,
                    }),
                    Err(e) => {
                        tracing::info!("{} - port {}", e, remote.port());
                        None
                    }
                }
            });
        }

        let launched = attempts.len();
        let mut winner: Option<RoundWinner<T::Transport>> = None;

        while let Some(joined) = attempts.join_next().await {
            match joined {
                Ok(Some(found)) if winner.is_none() => {
                    tracing::debug!(
                        "Attempt {} won: local port {} <-> {}",
                        found.index,
                        found.local_port,
                        found.remote
                    );
                    round.cancel();
                    winner = Some(found);
                }
                Ok(Some(late)) => {
                    tracing::debug!("Dropping late connection to {}", late.remote);
                }
                Ok(None) => {}
                Err(e) if e.is_panic() => {
                    tracing::warn!("Connect attempt panicked: {}", e);
                }
                Err(e) => {
                    tracing::debug!("Connect attempt aborted: {}", e);
                }
            }
        }

        round.cancel();

        RoundOutcome { launched, winner }
    }
}
