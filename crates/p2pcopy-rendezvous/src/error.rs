//! Rendezvous error types

use thiserror::Error;

/// Errors that end a rendezvous
#[derive(Debug, Error)]
pub enum RendezvousError {
    /// No STUN server produced a mapping for the primary socket
    #[error("no STUN server answered{}", blocked_suffix(.udp_blocked))]
    StunUnavailable {
        /// At least one server reported UDP as blocked
        udp_blocked: bool,
    },

    /// Every secondary socket failed to resolve
    #[error("no usable sockets: every secondary socket failed to resolve")]
    NoUsableSockets,

    /// Peer address or port list could not be used
    #[error("invalid peer: {0}")]
    InvalidPeer(String),

    /// The configured round limit was reached without a connection
    #[error("no connection after {rounds} rounds")]
    RoundsExhausted {
        /// Rounds attempted
        rounds: u32,
    },

    /// The operator aborted the rendezvous
    #[error("rendezvous cancelled")]
    Cancelled,

    /// Socket setup failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RendezvousError {
    /// Whether the failure happened before any connect round was possible
    #[must_use]
    pub fn is_fatal_setup(&self) -> bool {
        matches!(
            self,
            Self::StunUnavailable { .. } | Self::NoUsableSockets | Self::InvalidPeer(_)
        )
    }
}

fn blocked_suffix(udp_blocked: &bool) -> &'static str {
    if *udp_blocked {
        " (UDP appears to be blocked)"
    } else {
        ""
    }
}

/// Invalid barrier configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarrierError {
    /// Marks must be non-empty, within 1..=60 and strictly increasing
    #[error("invalid sync marks {0:?}: expected strictly increasing seconds in 1..=60")]
    InvalidMarks(Vec<u32>),
}
