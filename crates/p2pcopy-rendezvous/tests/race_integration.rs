//! Integration tests for the connection race

mod common;

use common::{LoopbackStun, loopback_resolver, loopback_sockets};
use p2pcopy_rendezvous::{
    ConnectError, ConnectionRace, Nomination, PeerTarget, Role, TransportConnector,
    UdpHandshake,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

/// Counts attempts that were started and attempts whose future is gone
#[derive(Default)]
struct Tally {
    started: AtomicUsize,
    finished: Arc<AtomicUsize>,
}

struct FinishGuard(Arc<AtomicUsize>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Succeeds for `win_ports`, fails fast for `fail_ports`, panics for
/// `panic_ports`, hangs for everything else
#[derive(Default)]
struct ScriptedConnector {
    win_ports: Vec<u16>,
    fail_ports: Vec<u16>,
    panic_ports: Vec<u16>,
    tally: Tally,
}

impl TransportConnector for ScriptedConnector {
    type Transport = SocketAddr;

    async fn connect(
        &self,
        _socket: Arc<UdpSocket>,
        peer: SocketAddr,
        _nomination: Nomination,
    ) -> Result<SocketAddr, ConnectError> {
        self.tally.started.fetch_add(1, Ordering::SeqCst);
        let _guard = FinishGuard(Arc::clone(&self.tally.finished));

        if self.win_ports.contains(&peer.port()) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            return Ok(peer);
        }
        if self.fail_ports.contains(&peer.port()) {
            return Err(ConnectError::Timeout);
        }
        if self.panic_ports.contains(&peer.port()) {
            panic!("attempt to port {} blew up", peer.port());
        }
        std::future::pending().await
    }
}

fn scripted_race(
    connector: ScriptedConnector,
) -> (
    ConnectionRace<LoopbackStun, ScriptedConnector>,
    Arc<ScriptedConnector>,
) {
    let connector = Arc::new(connector);
    let race = ConnectionRace::new(Arc::new(loopback_resolver()), Arc::clone(&connector));
    (race, connector)
}

fn peer(ports: &[u16]) -> PeerTarget {
    PeerTarget::new("127.0.0.1".parse().unwrap(), ports.to_vec()).unwrap()
}

#[tokio::test]
async fn test_attempts_launched_is_min_of_sockets_and_ports() {
    for (socket_count, ports) in [
        (3, vec![9001, 9002]),
        (2, vec![9001, 9002, 9003, 9004]),
        (4, vec![9001, 9002, 9003, 9004]),
    ] {
        let (race, connector) = scripted_race(ScriptedConnector {
            fail_ports: ports.clone(),
            ..Default::default()
        });
        let sockets = loopback_sockets(socket_count).await;

        let outcome = race
            .run_round(&sockets, &peer(&ports), Role::Controlling, &CancellationToken::new())
            .await;

        let expected = socket_count.min(ports.len());
        assert_eq!(outcome.launched, expected);
        assert_eq!(connector.tally.started.load(Ordering::SeqCst), expected);
        assert!(outcome.winner.is_none());
    }
}

#[tokio::test]
async fn test_single_winner_and_siblings_joined() {
    let ports = [9001, 9002, 9003, 9004];
    let (race, connector) = scripted_race(ScriptedConnector {
        win_ports: vec![9003],
        ..Default::default()
    });
    let sockets = loopback_sockets(4).await;

    let outcome = race
        .run_round(&sockets, &peer(&ports), Role::Controlling, &CancellationToken::new())
        .await;

    let winner = outcome.winner.unwrap();
    assert_eq!(winner.index, 2);
    assert_eq!(winner.remote, "127.0.0.1:9003".parse().unwrap());
    assert_eq!(winner.transport, winner.remote);
    assert_eq!(winner.local_port, sockets[2].local_addr().unwrap().port());

    // Every attempt, including the hung ones, is gone once the round returns
    assert_eq!(connector.tally.started.load(Ordering::SeqCst), 4);
    assert_eq!(connector.tally.finished.load(Ordering::SeqCst), 4);

    // Only the caller still holds the socket handles
    for socket in &sockets {
        assert_eq!(Arc::strong_count(socket), 1);
    }
}

#[tokio::test]
async fn test_two_successes_yield_one_winner() {
    let ports = [9001, 9002];
    let (race, _connector) = scripted_race(ScriptedConnector {
        win_ports: vec![9001, 9002],
        ..Default::default()
    });
    let sockets = loopback_sockets(2).await;

    let outcome = race
        .run_round(&sockets, &peer(&ports), Role::Controlling, &CancellationToken::new())
        .await;
    assert_eq!(outcome.launched, 2);
    assert!(outcome.winner.is_some());
}

#[tokio::test]
async fn test_panicking_attempt_is_a_failure() {
    let ports = [9001, 9002];
    let (race, _connector) = scripted_race(ScriptedConnector {
        panic_ports: vec![9001],
        win_ports: vec![9002],
        ..Default::default()
    });
    let sockets = loopback_sockets(2).await;

    let outcome = race
        .run_round(&sockets, &peer(&ports), Role::Controlling, &CancellationToken::new())
        .await;
    assert_eq!(outcome.winner.unwrap().index, 1);
}

#[tokio::test]
async fn test_outer_cancel_ends_round() {
    let ports = [9001, 9002, 9003];
    let (race, connector) = scripted_race(ScriptedConnector::default());
    let sockets = loopback_sockets(3).await;
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        race.run_round(&sockets, &peer(&ports), Role::Controlling, &cancel),
    )
    .await
    .unwrap();

    assert!(outcome.winner.is_none());
    assert_eq!(connector.tally.finished.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_round_refreshes_each_socket() {
    let ports = [9001, 9002];
    let connector = Arc::new(ScriptedConnector {
        fail_ports: ports.to_vec(),
        ..Default::default()
    });
    let resolver = Arc::new(loopback_resolver());
    let race = ConnectionRace::new(Arc::clone(&resolver), connector);
    let sockets = loopback_sockets(2).await;

    race.run_round(&sockets, &peer(&ports), Role::Controlling, &CancellationToken::new())
        .await;
    assert_eq!(resolver.stun().queries.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_udp_handshake_race_on_loopback() {
    // Peer side: three sockets, only the second one answers
    let remote = loopback_sockets(3).await;
    let ports: Vec<u16> = remote.iter().map(|s| s.local_addr().unwrap().port()).collect();
    let local = loopback_sockets(3).await;

    let answering = Arc::clone(&remote[1]);
    let expected_peer = local[1].local_addr().unwrap();
    let handshake = UdpHandshake::new().with_timeout(Duration::from_secs(2));
    let responder = {
        let handshake = handshake.clone();
        tokio::spawn(async move {
            handshake
                .connect(answering, expected_peer, Nomination::new(Role::Controlled))
                .await
        })
    };

    let race = ConnectionRace::new(Arc::new(loopback_resolver()), Arc::new(handshake));
    let outcome = race
        .run_round(&local, &peer(&ports), Role::Controlling, &CancellationToken::new())
        .await;

    let winner = outcome.winner.unwrap();
    assert_eq!(winner.index, 1);
    assert_eq!(winner.transport.peer_addr(), remote[1].local_addr().unwrap());
    assert!(responder.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_opposing_races_agree_on_one_pairing() {
    let handshake = UdpHandshake::new()
        .with_probe_interval(Duration::from_millis(20))
        .with_timeout(Duration::from_secs(2));

    for _ in 0..5 {
        let ours = loopback_sockets(6).await;
        let theirs = loopback_sockets(6).await;
        let ports = |sockets: &[Arc<UdpSocket>]| -> Vec<u16> {
            sockets.iter().map(|s| s.local_addr().unwrap().port()).collect()
        };
        let (to_theirs, to_ours) = (peer(&ports(&theirs)), peer(&ports(&ours)));

        let our_race =
            ConnectionRace::new(Arc::new(loopback_resolver()), Arc::new(handshake.clone()));
        let their_race =
            ConnectionRace::new(Arc::new(loopback_resolver()), Arc::new(handshake.clone()));
        let cancel = CancellationToken::new();
        let (our_outcome, their_outcome) = tokio::join!(
            our_race.run_round(&ours, &to_theirs, Role::Controlling, &cancel),
            their_race.run_round(&theirs, &to_ours, Role::Controlled, &cancel),
        );

        let ours_won = our_outcome.winner.unwrap();
        let theirs_won = their_outcome.winner.unwrap();
        assert_eq!(ours_won.index, theirs_won.index);
        assert_eq!(ours_won.remote.port(), theirs_won.local_port);
        assert_eq!(theirs_won.remote.port(), ours_won.local_port);

        ours_won.transport.send(b"agreed").await.unwrap();
        let mut buf = [0u8; 32];
        let received = theirs_won.transport.recv(&mut buf);
        let len = tokio::time::timeout(Duration::from_secs(1), received)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"agreed");
    }
}
