//! Shared loopback fixtures for integration tests

#![allow(dead_code)]

use p2pcopy_rendezvous::nat::NatType;
use p2pcopy_rendezvous::{
    Advertisement, ExternalEndpointResolver, PeerExchange, PeerTarget, PoolOptions,
    RendezvousError, StunError, StunQuery, StunResult, StunServer,
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// STUN stand-in for hosts without NAT: the mapping is the local address
#[derive(Debug, Default)]
pub struct LoopbackStun {
    pub queries: AtomicUsize,
}

impl StunQuery for LoopbackStun {
    async fn query(&self, _server: &StunServer, socket: &UdpSocket) -> Result<StunResult, StunError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(StunResult {
            public_endpoint: Some(socket.local_addr()?),
            nat_type: NatType::Unknown,
        })
    }
}

pub fn loopback_resolver() -> ExternalEndpointResolver<LoopbackStun> {
    ExternalEndpointResolver::new(
        LoopbackStun::default(),
        vec![StunServer::new("stun.loopback.test", 3478)],
    )
}

pub fn loopback_pool(size: usize) -> PoolOptions {
    PoolOptions {
        size,
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        primary_port: 0,
        detect_nat: false,
    }
}

pub async fn loopback_sockets(count: usize) -> Vec<Arc<UdpSocket>> {
    let mut sockets = Vec::with_capacity(count);
    for _ in 0..count {
        sockets.push(Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap()));
    }
    sockets
}

/// Swaps advertisements with another in-process peer
pub struct ChannelExchange {
    tx: mpsc::Sender<Advertisement>,
    rx: mpsc::Receiver<Advertisement>,
}

impl ChannelExchange {
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::channel(1);
        let (b_tx, a_rx) = mpsc::channel(1);
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }
}

impl PeerExchange for ChannelExchange {
    async fn exchange(&mut self, ours: &Advertisement) -> Result<PeerTarget, RendezvousError> {
        self.tx
            .send(ours.clone())
            .await
            .map_err(|_| RendezvousError::InvalidPeer("peer went away".into()))?;
        let theirs = self
            .rx
            .recv()
            .await
            .ok_or_else(|| RendezvousError::InvalidPeer("peer went away".into()))?;
        PeerTarget::new(theirs.external_ip, theirs.ports)
    }
}
