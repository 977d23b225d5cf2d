//! Round synchronization
//!
//! Both peers start each connect round on the same wall-clock second mark so
//! their probes cross inside the NAT binding windows. The clock is a shared
//! network reference (SNTP) with the local clock as fallback.

use crate::error::BarrierError;
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;

/// Default second marks within each minute
pub const DEFAULT_MARKS: [u32; 6] = [10, 20, 30, 40, 50, 60];

/// Default network time server
pub const DEFAULT_TIME_SERVER: &str = "pool.ntp.org:123";

/// Default SNTP query timeout
pub const DEFAULT_SNTP_TIMEOUT: Duration = Duration::from_secs(3);

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// SNTP packet size
const SNTP_PACKET_SIZE: usize = 48;

/// LI = 0, VN = 3, Mode = 3 (client)
const SNTP_CLIENT_HEADER: u8 = 0x1B;

/// Source of the current wall-clock time
///
/// Infallible: implementations that can fail fall back to the local clock.
pub trait TimeSource: Send + Sync {
    /// Current time
    fn now(&self) -> impl Future<Output = SystemTime> + Send;
}

/// The local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    async fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Simple Network Time Protocol client (RFC 4330)
#[derive(Debug, Clone)]
pub struct SntpClock {
    server: String,
    timeout: Duration,
}

impl SntpClock {
    /// Create a client for a `host:port` time server
    #[must_use]
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            timeout: DEFAULT_SNTP_TIMEOUT,
        }
    }

    /// Set the query timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Time server address
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Ask the server for its transmit timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not resolve, does not answer in
    /// time, or answers with a malformed packet
    pub async fn query(&self) -> std::io::Result<SystemTime> {
        let server = tokio::net::lookup_host(self.server.as_str())
            .await?
            .next()
            .ok_or_else(|| std::io::Error::other(format!("{} did not resolve", self.server)))?;

        let bind_addr: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server).await?;

        let mut request = [0u8; SNTP_PACKET_SIZE];
        request[0] = SNTP_CLIENT_HEADER;
        socket.send(&request).await?;

        let mut response = [0u8; SNTP_PACKET_SIZE];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut response))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "SNTP timeout"))??;

        decode_transmit_time(&response[..len]).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed SNTP response")
        })
    }
}

impl Default for SntpClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SERVER)
    }
}

impl TimeSource for SntpClock {
    async fn now(&self) -> SystemTime {
        match self.query().await {
            Ok(time) => time,
            Err(e) => {
                tracing::warn!(
                    "Network time from {} unavailable ({}), using local clock",
                    self.server,
                    e
                );
                SystemTime::now()
            }
        }
    }
}

/// Read the transmit timestamp (bytes 40..48) of an SNTP response
fn decode_transmit_time(packet: &[u8]) -> Option<SystemTime> {
    if packet.len() < SNTP_PACKET_SIZE {
        return None;
    }

    let seconds = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]);
    let fraction = u32::from_be_bytes([packet[44], packet[45], packet[46], packet[47]]);
    if seconds == 0 {
        return None;
    }

    // MSB clear means NTP era 1 (after 2036-02-07)
    let seconds = if seconds & 0x8000_0000 == 0 {
        u64::from(seconds) + (1 << 32)
    } else {
        u64::from(seconds)
    };
    let nanos = (u64::from(fraction) * 1_000_000_000) >> 32;

    let unix = seconds.checked_sub(NTP_UNIX_OFFSET)?;
    UNIX_EPOCH.checked_add(Duration::new(unix, nanos as u32))
}

/// Second within the current minute (0..=59)
#[must_use]
pub fn second_of_minute(time: SystemTime) -> u32 {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    (secs % 60) as u32
}

/// `HH:MM:SS` (UTC) of a timestamp
#[must_use]
pub fn clock_label(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Check a mark set: non-empty, each in 1..=60, strictly increasing
///
/// # Errors
///
/// Returns `BarrierError::InvalidMarks` if any rule is broken
pub fn validate_marks(marks: &[u32]) -> Result<(), BarrierError> {
    let in_range = marks.iter().all(|m| (1..=60).contains(m));
    let increasing = marks.windows(2).all(|w| w[0] < w[1]);

    if marks.is_empty() || !in_range || !increasing {
        return Err(BarrierError::InvalidMarks(marks.to_vec()));
    }
    Ok(())
}

/// Wait performed before every connect round
pub trait RoundBarrier: Send + Sync {
    /// Return once the round may start
    fn wait_for_slot(&self) -> impl Future<Output = ()> + Send;
}

/// Starts rounds immediately, for peers that do not need to line up
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsynchronized;

impl RoundBarrier for Unsynchronized {
    async fn wait_for_slot(&self) {}
}

/// Waits for the next designated second of the minute on a shared clock
#[derive(Debug, Clone)]
pub struct TimeSyncBarrier<C> {
    clock: C,
    marks: Vec<u32>,
}

impl<C> TimeSyncBarrier<C> {
    /// Create a barrier with the default marks (every ten seconds)
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            marks: DEFAULT_MARKS.to_vec(),
        }
    }

    /// Create a barrier with custom marks
    ///
    /// # Errors
    ///
    /// Returns `BarrierError::InvalidMarks` if the marks are empty, out of
    /// 1..=60, or not strictly increasing
    pub fn with_marks(clock: C, marks: Vec<u32>) -> Result<Self, BarrierError> {
        validate_marks(&marks)?;
        Ok(Self { clock, marks })
    }

    /// Second marks in increasing order
    #[must_use]
    pub fn marks(&self) -> &[u32] {
        &self.marks
    }

    /// Clock this barrier reads
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Seconds from `second` until the next mark
    ///
    /// `second` is reduced modulo 60 first. A mark equal to the current
    /// second is not "next"; the wait then runs to the following mark, so the
    /// result is always in 1..=60.
    #[must_use]
    pub fn delay_secs(&self, second: u32) -> u32 {
        let s = second % 60;
        match self.marks.iter().find(|&&m| m > s) {
            Some(mark) => mark - s,
            None => 60 - s + self.marks.first().copied().unwrap_or(60),
        }
    }
}

impl<C: TimeSource> RoundBarrier for TimeSyncBarrier<C> {
    async fn wait_for_slot(&self) {
        let now = self.clock.now().await;
        let delay = self.delay_secs(second_of_minute(now));

        tracing::info!(
            "[{}] - Waiting {} sec to sync with other peer",
            clock_label(now),
            delay
        );

        tokio::time::sleep(Duration::from_secs(u64::from(delay))).await;
    }
}
