//! External endpoint resolution
//!
//! Walks an ordered STUN server list for one local socket and stops at the
//! first server that produces a mapping. Individual server failures are never
//! surfaced; the caller only learns whether a mapping was found and whether
//! any server reported UDP as blocked.

use crate::nat::{ExternalMapping, StunQuery, StunResult, StunServer};
use std::fmt;
use tokio::net::UdpSocket;

/// Outcome of walking the server list for one socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A server answered with a usable mapping
    Mapped(ExternalMapping),
    /// Every server was tried without success
    NotFound {
        /// Servers that reported UDP as blocked
        blocked: usize,
        /// Servers that could not be queried at all
        unreachable: usize,
    },
}

impl Resolution {
    /// Whether at least one server reported UDP as blocked
    #[must_use]
    pub fn udp_blocked(&self) -> bool {
        matches!(self, Self::NotFound { blocked, .. } if *blocked > 0)
    }

    /// The mapping, if one was found
    #[must_use]
    pub fn mapping(&self) -> Option<&ExternalMapping> {
        match self {
            Self::Mapped(mapping) => Some(mapping),
            Self::NotFound { .. } => None,
        }
    }

    /// Consume the outcome, keeping only the mapping
    #[must_use]
    pub fn into_mapping(self) -> Option<ExternalMapping> {
        match self {
            Self::Mapped(mapping) => Some(mapping),
            Self::NotFound { .. } => None,
        }
    }
}

/// Resolves the externally visible endpoint of local sockets
pub struct ExternalEndpointResolver<S> {
    stun: S,
    servers: Vec<StunServer>,
}

impl<S: StunQuery> ExternalEndpointResolver<S> {
    /// Create a resolver over an ordered server list
    #[must_use]
    pub fn new(stun: S, servers: Vec<StunServer>) -> Self {
        Self { stun, servers }
    }

    /// Create a resolver over the built-in server list
    #[must_use]
    pub fn with_default_servers(stun: S) -> Self {
        Self::new(stun, StunServer::defaults())
    }

    /// STUN collaborator
    #[must_use]
    pub fn stun(&self) -> &S {
        &self.stun
    }

    /// Server list in query order
    #[must_use]
    pub fn servers(&self) -> &[StunServer] {
        &self.servers
    }

    /// Find the external mapping of `socket`
    ///
    /// Servers are queried one at a time in list order; the first answer with
    /// a public endpoint wins and no later server is contacted. With `verbose`
    /// the progress messages are logged at info level, otherwise at debug.
    pub async fn resolve(&self, socket: &UdpSocket, verbose: bool) -> Resolution {
        let mut blocked = 0;
        let mut unreachable = 0;

        let local = match socket.local_addr() {
            Ok(local) => local,
            Err(e) => {
                tracing::debug!("Socket has no local address: {}", e);
                return Resolution::NotFound {
                    blocked,
                    unreachable,
                };
            }
        };

        report(
            verbose,
            format_args!("Contacting STUN servers to obtain your IP"),
        );

        for server in &self.servers {
            match self.stun.query(server, socket).await {
                Ok(StunResult {
                    public_endpoint: Some(external),
                    nat_type,
                }) if !nat_type.is_blocked() => {
                    report(verbose, format_args!("Your firewall is {nat_type}"));
                    return Resolution::Mapped(ExternalMapping {
                        local,
                        external,
                        nat_type,
                        server: server.clone(),
                    });
                }
                Ok(_) => {
                    tracing::debug!("STUN server {} reports UDP blocked for {}", server, local);
                    blocked += 1;
                }
                Err(e) => {
                    tracing::debug!("STUN server {} unreachable: {}", server, e);
                    unreachable += 1;
                }
            }
        }

        report(verbose, format_args!("Could not find a working STUN server"));

        Resolution::NotFound {
            blocked,
            unreachable,
        }
    }

    /// Re-query the mapping of `socket` to keep its NAT binding fresh
    ///
    /// The outcome is only logged.
    pub async fn refresh(&self, socket: &UdpSocket) {
        match self.resolve(socket, false).await {
            Resolution::Mapped(mapping) => {
                tracing::debug!("Refreshed {} -> {}", mapping.local, mapping.external);
            }
            Resolution::NotFound {
                blocked,
                unreachable,
            } => {
                tracing::debug!(
                    "Refresh found no mapping ({} blocked, {} unreachable)",
                    blocked,
                    unreachable
                );
            }
        }
    }
}

fn report(verbose: bool, message: fmt::Arguments<'_>) {
    if verbose {
        tracing::info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nat::{NatType, StunError};
    use std::net::SocketAddr;
    use std::sync::Mutex;

    enum Reply {
        Unreachable,
        Blocked,
        Mapped(u16),
    }

    /// Scripted answers keyed by server host, recording query order
    struct ScriptedStun {
        replies: Vec<(&'static str, Reply)>,
        queried: Mutex<Vec<String>>,
    }

    impl ScriptedStun {
        fn new(replies: Vec<(&'static str, Reply)>) -> Self {
            Self {
                replies,
                queried: Mutex::new(Vec::new()),
            }
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    impl StunQuery for ScriptedStun {
        async fn query(
            &self,
            server: &StunServer,
            _socket: &UdpSocket,
        ) -> Result<StunResult, StunError> {
            self.queried.lock().unwrap().push(server.host.clone());
            let reply = self
                .replies
                .iter()
                .find(|(host, _)| *host == server.host)
                .map(|(_, reply)| reply);

            match reply {
                Some(Reply::Mapped(port)) => Ok(StunResult {
                    public_endpoint: Some(SocketAddr::from(([198, 51, 100, 1], *port))),
                    nat_type: NatType::Unknown,
                }),
                Some(Reply::Blocked) => Ok(StunResult::blocked()),
                Some(Reply::Unreachable) | None => {
                    Err(StunError::Resolve(format!("{server}: unknown host")))
                }
            }
        }
    }

    fn servers(hosts: &[&str]) -> Vec<StunServer> {
        hosts.iter().map(|h| StunServer::new(*h, 3478)).collect()
    }

    #[tokio::test]
    async fn test_first_mapped_server_wins() {
        let stun = ScriptedStun::new(vec![
            ("a", Reply::Unreachable),
            ("b", Reply::Unreachable),
            ("c", Reply::Mapped(40000)),
            ("d", Reply::Mapped(40001)),
        ]);
        let resolver = ExternalEndpointResolver::new(stun, servers(&["a", "b", "c", "d"]));
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let resolution = resolver.resolve(&socket, true).await;
        let mapping = resolution.mapping().unwrap();

        assert_eq!(mapping.external_port(), 40000);
        assert_eq!(mapping.server, StunServer::new("c", 3478));
        assert_eq!(mapping.local, socket.local_addr().unwrap());
        assert_eq!(resolver.stun().queried(), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_blocked_answers_are_skipped() {
        let stun = ScriptedStun::new(vec![("a", Reply::Blocked), ("b", Reply::Mapped(5000))]);
        let resolver = ExternalEndpointResolver::new(stun, servers(&["a", "b"]));
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let resolution = resolver.resolve(&socket, false).await;
        assert_eq!(resolution.into_mapping().unwrap().external_port(), 5000);
    }

    #[tokio::test]
    async fn test_all_failures_report_not_found() {
        let stun = ScriptedStun::new(vec![
            ("a", Reply::Blocked),
            ("b", Reply::Unreachable),
            ("c", Reply::Blocked),
        ]);
        let resolver = ExternalEndpointResolver::new(stun, servers(&["a", "b", "c"]));
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let resolution = resolver.resolve(&socket, true).await;
        assert_eq!(
            resolution,
            Resolution::NotFound {
                blocked: 2,
                unreachable: 1
            }
        );
        assert!(resolution.udp_blocked());
    }

    #[tokio::test]
    async fn test_unreachable_only_is_not_blocked() {
        let stun = ScriptedStun::new(vec![]);
        let resolver = ExternalEndpointResolver::new(stun, servers(&["a", "b"]));
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let resolution = resolver.resolve(&socket, false).await;
        assert!(!resolution.udp_blocked());
        assert!(resolution.mapping().is_none());
    }

    #[tokio::test]
    async fn test_empty_server_list() {
        let resolver = ExternalEndpointResolver::new(ScriptedStun::new(vec![]), Vec::new());
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        assert_eq!(
            resolver.resolve(&socket, false).await,
            Resolution::NotFound {
                blocked: 0,
                unreachable: 0
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_walks_the_list() {
        let stun = ScriptedStun::new(vec![("a", Reply::Mapped(1234))]);
        let resolver = ExternalEndpointResolver::new(stun, servers(&["a", "b"]));
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        resolver.refresh(&socket).await;
        assert_eq!(resolver.stun().queried(), ["a"]);
    }
}
