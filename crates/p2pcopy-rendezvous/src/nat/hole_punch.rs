//! UDP Hole Punching
//!
//! Simultaneous-open handshake run on one pool socket against one peer
//! candidate. Both sides probe each other until a probe or acknowledgement
//! arrives from exactly the candidate address. That only proves the path;
//! the two sides may see several working pairings in the same round, so the
//! controlling side then nominates its pairing and the controlled side
//! accepts exactly one nomination per round. Only a nominated and accepted
//! pairing becomes a transport, on both sides.

use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// Default probe interval
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(100);
/// Default handshake timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Final markers sent once the pairing is agreed
const ACK_BURST: usize = 3;

/// Handshake datagrams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// Path probe
    Probe,
    /// Probe received
    Ack,
    /// Controlling side picks this pairing
    Nominate,
    /// Controlled side accepted the nomination
    Nominated,
}

impl Marker {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Probe => b"P2PCOPY_PROBE",
            Self::Ack => b"P2PCOPY_ACK",
            Self::Nominate => b"P2PCOPY_NOMINATE",
            Self::Nominated => b"P2PCOPY_NOMINATED",
        }
    }

    fn parse(packet: &[u8]) -> Option<Self> {
        [Self::Probe, Self::Ack, Self::Nominate, Self::Nominated]
            .into_iter()
            .find(|marker| marker.as_bytes() == packet)
    }
}

/// Which side of the rendezvous picks the pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Nominates the first pairing it confirms
    Controlling,
    /// Accepts the first nomination it receives
    Controlled,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controlling => write!(f, "controlling"),
            Self::Controlled => write!(f, "controlled"),
        }
    }
}

/// Pairing agreement shared by every attempt of one side in one round
///
/// Clones share state. A fresh value is needed for every round.
#[derive(Debug, Clone)]
pub struct Nomination {
    role: Role,
    accepted: Arc<AtomicBool>,
}

impl Nomination {
    /// Start a round in `role`
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            accepted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Role of this side
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Accept a nomination for the caller's pairing
    ///
    /// Returns `true` for the first caller of the round only.
    pub fn accept(&self) -> bool {
        !self.accepted.swap(true, Ordering::AcqRel)
    }

    /// Whether some pairing of this round was accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted.load(Ordering::Acquire)
    }
}

/// Transport handshake collaborator
///
/// Turns a bound socket and a remote candidate into a connected transport.
/// Every attempt of one round gets a clone of the same [`Nomination`], and
/// at most one pairing may produce a transport on each side.
/// Implementations must return promptly when their future is dropped.
pub trait TransportConnector: Send + Sync + 'static {
    /// Connected transport handed to the caller on success
    type Transport: Send + 'static;

    /// Run the handshake from `socket` to `peer`
    fn connect(
        &self,
        socket: Arc<UdpSocket>,
        peer: SocketAddr,
        nomination: Nomination,
    ) -> impl Future<Output = Result<Self::Transport, ConnectError>> + Send;
}

/// Probe/acknowledge/nominate handshake over plain UDP
#[derive(Debug, Clone)]
pub struct UdpHandshake {
    probe_interval: Duration,
    timeout: Duration,
}

impl UdpHandshake {
    /// Create a handshake with the default 100 ms probe interval and 5 s timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe_interval: DEFAULT_PROBE_INTERVAL,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the probe interval
    #[must_use]
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-attempt timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe until the pairing with `peer` is confirmed and agreed
    async fn punch(
        &self,
        socket: &UdpSocket,
        peer: SocketAddr,
        nomination: &Nomination,
    ) -> Result<(), ConnectError> {
        let controlling = nomination.role() == Role::Controlling;
        let deadline = Instant::now() + self.timeout;
        let mut ticker = tokio::time::interval(self.probe_interval);
        let mut buf = [0u8; 1500];
        let mut confirmed = false;

        loop {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    if confirmed {
                        tracing::debug!("Path to {} confirmed but never agreed", peer);
                    }
                    return Err(ConnectError::Timeout);
                }
                _ = ticker.tick() => {
                    let marker = if confirmed && controlling {
                        Marker::Nominate
                    } else {
                        Marker::Probe
                    };
                    send_marker(socket, marker, peer).await?;
                }
                received = socket.recv_from(&mut buf) => match received {
                    Ok((len, from)) if from == peer => {
                        if let Some(marker) = Marker::parse(&buf[..len]) {
                            if Self::on_marker(socket, peer, marker, nomination, &mut confirmed).await? {
                                return Ok(());
                            }
                        }
                    }
                    Ok((_, from)) => {
                        tracing::debug!("Ignoring datagram from {} while punching to {}", from, peer);
                    }
                    Err(e) if is_icmp_noise(&e) => {}
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }

    /// Handle one marker from the peer; `true` once the pairing is agreed
    async fn on_marker(
        socket: &UdpSocket,
        peer: SocketAddr,
        marker: Marker,
        nomination: &Nomination,
        confirmed: &mut bool,
    ) -> Result<bool, ConnectError> {
        match (marker, nomination.role()) {
            (Marker::Probe | Marker::Ack, role) => {
                if marker == Marker::Probe {
                    send_marker(socket, Marker::Ack, peer).await?;
                }
                if !*confirmed && role == Role::Controlling {
                    send_marker(socket, Marker::Nominate, peer).await?;
                }
                *confirmed = true;
                Ok(false)
            }
            (Marker::Nominate, Role::Controlled) => {
                if nomination.accept() {
                    return Ok(true);
                }
                tracing::debug!("Ignoring nomination of {}, round already agreed", peer);
                Ok(false)
            }
            (Marker::Nominated, Role::Controlling) => Ok(true),
            (Marker::Nominate | Marker::Nominated, _) => {
                tracing::debug!("Unexpected {:?} from {}", marker, peer);
                Ok(false)
            }
        }
    }
}

impl Default for UdpHandshake {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportConnector for UdpHandshake {
    type Transport = PeerLink;

    async fn connect(
        &self,
        socket: Arc<UdpSocket>,
        peer: SocketAddr,
        nomination: Nomination,
    ) -> Result<PeerLink, ConnectError> {
        self.punch(&socket, peer, &nomination).await?;

        socket.connect(peer).await?;
        let last = match nomination.role() {
            Role::Controlling => Marker::Ack,
            Role::Controlled => Marker::Nominated,
        };
        for _ in 0..ACK_BURST {
            // Covers a lost first one; the link also answers late nominations
            let _ = socket.send(last.as_bytes()).await;
        }

        let local = socket.local_addr()?;
        Ok(PeerLink {
            socket,
            peer,
            local,
        })
    }
}

async fn send_marker(socket: &UdpSocket, marker: Marker, peer: SocketAddr) -> Result<(), ConnectError> {
    match socket.send_to(marker.as_bytes(), peer).await {
        Ok(_) => Ok(()),
        Err(e) if is_icmp_noise(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// ICMP unreachable surfaces as a receive error on some platforms
fn is_icmp_noise(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused
    )
}

/// Confirmed UDP path to the peer
///
/// The socket is connected to the peer, so only its datagrams are received.
#[derive(Debug)]
pub struct PeerLink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    local: SocketAddr,
}

impl PeerLink {
    /// Remote address of the confirmed path
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Local address of the confirmed path
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Send one datagram to the peer
    ///
    /// # Errors
    ///
    /// Returns an error if the datagram cannot be sent
    pub async fn send(&self, data: &[u8]) -> std::io::Result<usize> {
        self.socket.send(data).await
    }

    /// Receive the next application datagram from the peer
    ///
    /// Handshake leftovers are skipped. Probes and nominations still arriving
    /// are answered, so a peer that missed the final markers can finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the receive fails
    pub async fn recv(&self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let len = self.socket.recv(buf).await?;
            let reply = match Marker::parse(&buf[..len]) {
                None => return Ok(len),
                Some(Marker::Probe) => Some(Marker::Ack),
                Some(Marker::Nominate) => Some(Marker::Nominated),
                Some(Marker::Ack | Marker::Nominated) => None,
            };
            if let Some(reply) = reply {
                self.socket.send(reply.as_bytes()).await?;
            }
        }
    }

    /// Keep the NAT binding alive
    ///
    /// Call every 15-30 seconds while the path is idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the keepalive packet cannot be sent
    pub async fn keepalive(&self) -> std::io::Result<()> {
        self.socket.send(Marker::Ack.as_bytes()).await?;
        Ok(())
    }

    /// Underlying connected socket
    #[must_use]
    pub fn into_socket(self) -> Arc<UdpSocket> {
        self.socket
    }
}

/// Transport handshake error
#[derive(Debug)]
pub enum ConnectError {
    /// I/O error
    Io(std::io::Error),
    /// No answer from the peer before the timeout
    Timeout,
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Timeout => write!(f, "Hole punching timeout"),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Timeout => None,
        }
    }
}

impl From<std::io::Error> for ConnectError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
