//! STUN Protocol Implementation (RFC 5389)
//!
//! Binding requests only: enough to learn the server reflexive address of a
//! socket. The query always goes out on the caller's socket so the mapping
//! learned is the mapping that socket will later punch through.

use super::types::{NatType, StunResult, StunServer};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

/// STUN magic cookie (0x2112A442)
const MAGIC_COOKIE: u32 = 0x2112_A442;

/// STUN message header size (20 bytes)
const HEADER_SIZE: usize = 20;

/// Default STUN timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Single STUN query, bound to a caller-owned socket
///
/// Implementations must not hold on to the socket beyond the returned future.
pub trait StunQuery: Send + Sync {
    /// Ask `server` for the reflexive address of `socket`
    fn query(
        &self,
        server: &StunServer,
        socket: &UdpSocket,
    ) -> impl Future<Output = Result<StunResult, StunError>> + Send;
}

/// STUN message class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StunMessageClass {
    /// Request message
    Request,
    /// Success response
    SuccessResponse,
    /// Error response
    ErrorResponse,
    /// Indication (no response expected)
    Indication,
}

/// STUN message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StunMessageType {
    /// Binding request/response
    Binding,
}

impl StunMessageType {
    /// Encode message type and class into a 16-bit value
    ///
    /// RFC 5389 Section 6 encoding:
    /// ```text
    ///  0                 1
    ///  2  3  4 5 6 7 8 9 0 1 2 3 4 5
    /// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
    /// |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
    /// |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
    /// +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
    /// ```
    fn encode(self, class: StunMessageClass) -> u16 {
        let method = match self {
            Self::Binding => 0x0001,
        };

        let class_bits = match class {
            StunMessageClass::Request => 0b00,
            StunMessageClass::Indication => 0b01,
            StunMessageClass::SuccessResponse => 0b10,
            StunMessageClass::ErrorResponse => 0b11,
        };

        let m0_m3 = method & 0x0F;
        let c0 = (class_bits & 0x01) << 4;
        let m4_m6 = (method & 0x70) << 1;
        let c1 = (class_bits & 0x02) << 7;
        let m7_m11 = (method & 0xF80) << 2;

        m0_m3 | c0 | m4_m6 | c1 | m7_m11
    }
}

/// STUN attribute types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StunAttribute {
    /// Mapped address (0x0001), sent by RFC 3489 servers
    MappedAddress(SocketAddr),
    /// XOR-Mapped address (0x0020) - preferred over MAPPED-ADDRESS
    XorMappedAddress(SocketAddr),
    /// Software identifier (0x8022)
    Software(String),
    /// Unknown attribute type
    Unknown(u16, Vec<u8>),
}

impl StunAttribute {
    /// Attribute type code
    fn attr_type(&self) -> u16 {
        match self {
            Self::MappedAddress(_) => 0x0001,
            Self::XorMappedAddress(_) => 0x0020,
            Self::Software(_) => 0x8022,
            Self::Unknown(t, _) => *t,
        }
    }

    /// Encode attribute to bytes, padded to a 4-byte boundary
    fn encode(&self, transaction_id: &[u8; 12]) -> Vec<u8> {
        let value = self.encode_value(transaction_id);

        let mut bytes = Vec::with_capacity(4 + value.len() + 3);
        bytes.extend_from_slice(&self.attr_type().to_be_bytes());
        bytes.extend_from_slice(&(value.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&value);

        let padding = (4 - (value.len() % 4)) % 4;
        bytes.extend(std::iter::repeat_n(0, padding));

        bytes
    }

    fn encode_value(&self, transaction_id: &[u8; 12]) -> Vec<u8> {
        match self {
            Self::MappedAddress(addr) => {
                let mut value = vec![0, if addr.is_ipv4() { 0x01 } else { 0x02 }];
                value.extend_from_slice(&addr.port().to_be_bytes());
                match addr.ip() {
                    IpAddr::V4(ip) => value.extend_from_slice(&ip.octets()),
                    IpAddr::V6(ip) => value.extend_from_slice(&ip.octets()),
                }
                value
            }
            Self::XorMappedAddress(addr) => {
                let mut value = vec![0, if addr.is_ipv4() { 0x01 } else { 0x02 }];

                // XOR port with most significant 16 bits of magic cookie
                let xor_port = addr.port() ^ (MAGIC_COOKIE >> 16) as u16;
                value.extend_from_slice(&xor_port.to_be_bytes());

                let xor_key = xor_key(transaction_id);
                match addr.ip() {
                    IpAddr::V4(ip) => {
                        value.extend(ip.octets().iter().zip(&xor_key).map(|(b, k)| b ^ k));
                    }
                    IpAddr::V6(ip) => {
                        value.extend(ip.octets().iter().zip(&xor_key).map(|(b, k)| b ^ k));
                    }
                }

                value
            }
            Self::Software(s) => s.as_bytes().to_vec(),
            Self::Unknown(_, data) => data.clone(),
        }
    }

    /// Decode attribute from bytes
    fn decode(attr_type: u16, value: &[u8], transaction_id: &[u8; 12]) -> Result<Self, StunError> {
        match attr_type {
            0x0001 => {
                let (family, port) = Self::address_header(value)?;
                let ip = Self::address_bytes(family, &value[4..], &[0u8; 16])?;
                Ok(Self::MappedAddress(SocketAddr::new(ip, port)))
            }
            0x0020 => {
                let (family, xor_port) = Self::address_header(value)?;
                let port = xor_port ^ (MAGIC_COOKIE >> 16) as u16;
                let ip = Self::address_bytes(family, &value[4..], &xor_key(transaction_id))?;
                Ok(Self::XorMappedAddress(SocketAddr::new(ip, port)))
            }
            0x8022 => Ok(Self::Software(String::from_utf8_lossy(value).to_string())),
            _ => Ok(Self::Unknown(attr_type, value.to_vec())),
        }
    }

    fn address_header(value: &[u8]) -> Result<(u8, u16), StunError> {
        if value.len() < 4 {
            return Err(StunError::InvalidAttribute);
        }
        Ok((value[1], u16::from_be_bytes([value[2], value[3]])))
    }

    fn address_bytes(family: u8, raw: &[u8], key: &[u8; 16]) -> Result<IpAddr, StunError> {
        match family {
            0x01 if raw.len() >= 4 => {
                let mut ip = [0u8; 4];
                for (i, byte) in ip.iter_mut().enumerate() {
                    *byte = raw[i] ^ key[i];
                }
                Ok(IpAddr::from(ip))
            }
            0x02 if raw.len() >= 16 => {
                let mut ip = [0u8; 16];
                for (i, byte) in ip.iter_mut().enumerate() {
                    *byte = raw[i] ^ key[i];
                }
                Ok(IpAddr::from(ip))
            }
            _ => Err(StunError::InvalidAttribute),
        }
    }
}

/// Magic cookie followed by the transaction id (RFC 5389 Section 15.2)
fn xor_key(transaction_id: &[u8; 12]) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    key[4..].copy_from_slice(transaction_id);
    key
}

/// STUN message
#[derive(Debug, Clone)]
pub struct StunMessage {
    /// Message type
    pub message_type: StunMessageType,
    /// Message class
    pub message_class: StunMessageClass,
    /// Transaction ID (96 bits)
    pub transaction_id: [u8; 12],
    /// Message attributes
    pub attributes: Vec<StunAttribute>,
}

impl StunMessage {
    /// Create a new STUN Binding Request with a random transaction id
    #[must_use]
    pub fn binding_request() -> Self {
        Self {
            message_type: StunMessageType::Binding,
            message_class: StunMessageClass::Request,
            transaction_id: rand::random(),
            attributes: Vec::new(),
        }
    }

    /// Build the success response a server sends for `transaction_id`
    #[must_use]
    pub fn binding_success(transaction_id: [u8; 12], mapped: SocketAddr) -> Self {
        Self {
            message_type: StunMessageType::Binding,
            message_class: StunMessageClass::SuccessResponse,
            transaction_id,
            attributes: vec![StunAttribute::XorMappedAddress(mapped)],
        }
    }

    /// Add an attribute to the message
    pub fn add_attribute(&mut self, attr: StunAttribute) {
        self.attributes.push(attr);
    }

    /// Encode message to bytes
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);

        let msg_type = self.message_type.encode(self.message_class);
        bytes.extend_from_slice(&msg_type.to_be_bytes());

        // Message Length - patched below
        bytes.extend_from_slice(&[0u8; 2]);
        bytes.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
        bytes.extend_from_slice(&self.transaction_id);

        for attr in &self.attributes {
            bytes.extend_from_slice(&attr.encode(&self.transaction_id));
        }

        // Excludes the 20-byte header
        let msg_length = (bytes.len() - HEADER_SIZE) as u16;
        bytes[2..4].copy_from_slice(&msg_length.to_be_bytes());

        bytes
    }

    /// Decode message from bytes
    ///
    /// # Errors
    ///
    /// Returns `StunError` if the header is truncated, carries the wrong magic
    /// cookie, or names a method other than Binding.
    pub fn decode(bytes: &[u8]) -> Result<Self, StunError> {
        if bytes.len() < HEADER_SIZE {
            return Err(StunError::MessageTooShort);
        }

        let msg_type = u16::from_be_bytes([bytes[0], bytes[1]]);
        let msg_length = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        let magic_cookie = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        if magic_cookie != MAGIC_COOKIE {
            return Err(StunError::InvalidMagicCookie);
        }

        let mut transaction_id = [0u8; 12];
        transaction_id.copy_from_slice(&bytes[8..HEADER_SIZE]);

        let (message_type, message_class) = Self::decode_type(msg_type)?;

        let end = bytes.len().min(HEADER_SIZE + msg_length);
        let mut attributes = Vec::new();
        let mut offset = HEADER_SIZE;

        while offset + 4 <= end {
            let attr_type = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
            let attr_length = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            offset += 4;

            if offset + attr_length > end {
                break;
            }

            let attr_value = &bytes[offset..offset + attr_length];
            if let Ok(attr) = StunAttribute::decode(attr_type, attr_value, &transaction_id) {
                attributes.push(attr);
            }

            offset += attr_length + (4 - (attr_length % 4)) % 4;
        }

        Ok(Self {
            message_type,
            message_class,
            transaction_id,
            attributes,
        })
    }

    fn decode_type(msg_type: u16) -> Result<(StunMessageType, StunMessageClass), StunError> {
        // Class bits: C0 at bit 4, C1 at bit 8
        let c0 = (msg_type >> 4) & 0x01;
        let c1 = (msg_type >> 8) & 0x01;

        let message_class = match c0 | (c1 << 1) {
            0b00 => StunMessageClass::Request,
            0b01 => StunMessageClass::Indication,
            0b10 => StunMessageClass::SuccessResponse,
            _ => StunMessageClass::ErrorResponse,
        };

        let m0_m3 = msg_type & 0x0F;
        let m4_m6 = (msg_type >> 1) & 0x70;
        let m7_m11 = (msg_type >> 2) & 0xF80;

        let message_type = match m0_m3 | m4_m6 | m7_m11 {
            0x0001 => StunMessageType::Binding,
            _ => return Err(StunError::InvalidMessageType),
        };

        Ok((message_type, message_class))
    }

    /// Reflexive address: XOR-MAPPED-ADDRESS, else MAPPED-ADDRESS
    #[must_use]
    pub fn mapped_address(&self) -> Option<SocketAddr> {
        let xor = self.attributes.iter().find_map(|attr| match attr {
            StunAttribute::XorMappedAddress(addr) => Some(*addr),
            _ => None,
        });

        xor.or_else(|| {
            self.attributes.iter().find_map(|attr| match attr {
                StunAttribute::MappedAddress(addr) => Some(*addr),
                _ => None,
            })
        })
    }
}

/// STUN client for server reflexive address discovery
///
/// Stateless apart from the timeout; the socket is supplied per query.
#[derive(Debug, Clone)]
pub struct StunClient {
    timeout: Duration,
}

impl StunClient {
    /// Create a client with the default 3 second timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client with a custom query timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Query timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a server candidate to an address of the socket's family
    async fn resolve(server: &StunServer, ipv4: bool) -> Result<SocketAddr, StunError> {
        let mut addrs = tokio::net::lookup_host((server.host.as_str(), server.port))
            .await
            .map_err(|e| StunError::Resolve(format!("{server}: {e}")))?;

        addrs
            .find(|addr| addr.is_ipv4() == ipv4)
            .ok_or_else(|| StunError::Resolve(format!("{server}: no usable address")))
    }
}

impl Default for StunClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StunQuery for StunClient {
    /// Send one Binding request from `socket` and wait for the matching answer
    ///
    /// No answer before the timeout is reported as [`NatType::Blocked`], the
    /// way classic STUN clients report a failed first test. Datagrams that are
    /// not the answer to this transaction are skipped.
    async fn query(&self, server: &StunServer, socket: &UdpSocket) -> Result<StunResult, StunError> {
        let local = socket.local_addr()?;
        let target = Self::resolve(server, local.is_ipv4()).await?;

        let request = StunMessage::binding_request();
        socket.send_to(&request.encode(), target).await?;

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; 1024];

        loop {
            let Ok(received) = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await
            else {
                return Ok(StunResult::blocked());
            };
            let (len, _from) = received?;

            let Ok(response) = StunMessage::decode(&buf[..len]) else {
                continue;
            };
            if response.transaction_id != request.transaction_id {
                continue;
            }
            if response.message_class != StunMessageClass::SuccessResponse {
                return Err(StunError::ErrorResponse);
            }

            let mapped = response
                .mapped_address()
                .ok_or(StunError::MissingAttribute)?;
            let nat_type = if mapped == local {
                NatType::Open
            } else {
                NatType::Unknown
            };

            return Ok(StunResult {
                public_endpoint: Some(mapped),
                nat_type,
            });
        }
    }
}

/// STUN error types
#[derive(Debug)]
pub enum StunError {
    /// I/O error
    Io(std::io::Error),
    /// Server hostname did not resolve
    Resolve(String),
    /// Invalid message format
    MessageTooShort,
    /// Invalid magic cookie
    InvalidMagicCookie,
    /// Invalid message type
    InvalidMessageType,
    /// Invalid attribute
    InvalidAttribute,
    /// Error response received
    ErrorResponse,
    /// Missing required attribute
    MissingAttribute,
}

impl std::fmt::Display for StunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Resolve(e) => write!(f, "Cannot resolve STUN server {e}"),
            Self::MessageTooShort => write!(f, "STUN message too short"),
            Self::InvalidMagicCookie => write!(f, "Invalid STUN magic cookie"),
            Self::InvalidMessageType => write!(f, "Invalid STUN message type"),
            Self::InvalidAttribute => write!(f, "Invalid STUN attribute"),
            Self::ErrorResponse => write!(f, "STUN error response"),
            Self::MissingAttribute => write!(f, "Missing required STUN attribute"),
        }
    }
}

impl std::error::Error for StunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StunError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers every Binding request with the sender's address
    async fn spawn_responder() -> SocketAddr {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            while let Ok((len, from)) = server.recv_from(&mut buf).await {
                if let Ok(request) = StunMessage::decode(&buf[..len]) {
                    let response = StunMessage::binding_success(request.transaction_id, from);
                    let _ = server.send_to(&response.encode(), from).await;
                }
            }
        });

        addr
    }

    #[test]
    fn test_stun_message_type_encoding() {
        // Binding Request: method=0x0001, class=Request(0b00)
        let encoded = StunMessageType::Binding.encode(StunMessageClass::Request);
        assert_eq!(encoded, 0x0001);

        // Binding Success Response: C1 set at bit 8
        let encoded = StunMessageType::Binding.encode(StunMessageClass::SuccessResponse);
        assert_eq!(encoded, 0x0101);

        let encoded = StunMessageType::Binding.encode(StunMessageClass::ErrorResponse);
        assert_eq!(encoded, 0x0111);
    }

    #[test]
    fn test_binding_request_header() {
        let msg = StunMessage::binding_request();
        let encoded = msg.encode();

        assert_eq!(encoded.len(), HEADER_SIZE);
        assert_eq!(&encoded[0..2], &[0x00, 0x01]);
        assert_eq!(&encoded[2..4], &[0x00, 0x00]);
        assert_eq!(&encoded[4..8], &MAGIC_COOKIE.to_be_bytes());
        assert_eq!(&encoded[8..20], &msg.transaction_id);
    }

    #[test]
    fn test_decode_rfc5769_xor_mapped_address() {
        // IPv4 response from RFC 5769 Section 2.2: 192.0.2.1:32853
        let transaction_id = [
            0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6, 0x86, 0xfa, 0x87, 0xdf, 0xae,
        ];
        let mut bytes = vec![0x01, 0x01, 0x00, 0x0c];
        bytes.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
        bytes.extend_from_slice(&transaction_id);
        bytes.extend_from_slice(&[0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0xa1, 0x47]);
        bytes.extend_from_slice(&[0xe1, 0x12, 0xa6, 0x43]);

        let msg = StunMessage::decode(&bytes).unwrap();
        assert_eq!(msg.message_class, StunMessageClass::SuccessResponse);
        assert_eq!(msg.mapped_address(), Some("192.0.2.1:32853".parse().unwrap()));
    }

    #[test]
    fn test_mapped_address_fallback() {
        let addr: SocketAddr = "198.51.100.4:4000".parse().unwrap();
        let mut msg = StunMessage::binding_success([7u8; 12], addr);
        msg.attributes.clear();
        msg.add_attribute(StunAttribute::Software("legacy".to_string()));
        msg.add_attribute(StunAttribute::MappedAddress(addr));

        let decoded = StunMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded.mapped_address(), Some(addr));
    }

    #[test]
    fn test_xor_mapped_address_ipv6() {
        let addr: SocketAddr = "[2001:db8::1]:5000".parse().unwrap();
        let msg = StunMessage::binding_success([9u8; 12], addr);

        let decoded = StunMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded.mapped_address(), Some(addr));
    }

    #[test]
    fn test_software_attribute_is_padded() {
        let software = StunAttribute::Software("p2pcopy".to_string());
        let encoded = software.encode(&[0u8; 12]);
        assert_eq!(encoded.len(), 4 + 8);
        assert_eq!(encoded.len() % 4, 0);
    }

    #[test]
    fn test_decode_error_too_short() {
        let result = StunMessage::decode(&[0u8; 10]);
        assert!(matches!(result, Err(StunError::MessageTooShort)));
    }

    #[test]
    fn test_decode_error_invalid_magic_cookie() {
        let mut msg = vec![0u8; 20];
        msg[4..8].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(
            StunMessage::decode(&msg),
            Err(StunError::InvalidMagicCookie)
        ));
    }

    #[test]
    fn test_decode_error_unknown_method() {
        let mut msg = StunMessage::binding_request().encode();
        msg[1] = 0x03;
        assert!(matches!(
            StunMessage::decode(&msg),
            Err(StunError::InvalidMessageType)
        ));
    }

    #[test]
    fn test_stun_error_display() {
        assert_eq!(
            StunError::Resolve("stun.invalid:3478: no usable address".into()).to_string(),
            "Cannot resolve STUN server stun.invalid:3478: no usable address"
        );
        assert_eq!(
            StunError::InvalidMagicCookie.to_string(),
            "Invalid STUN magic cookie"
        );
        assert_eq!(
            StunError::MissingAttribute.to_string(),
            "Missing required STUN attribute"
        );
    }

    #[tokio::test]
    async fn test_client_learns_mapping_from_responder() {
        let server_addr = spawn_responder().await;
        let server = StunServer::new("127.0.0.1", server_addr.port());
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let result = StunClient::new().query(&server, &socket).await.unwrap();

        assert_eq!(result.public_endpoint, Some(socket.local_addr().unwrap()));
        assert_eq!(result.nat_type, NatType::Open);
    }

    #[tokio::test]
    async fn test_client_skips_unrelated_datagrams() {
        let server_addr = spawn_responder().await;
        let server = StunServer::new("127.0.0.1", server_addr.port());
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let noise = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        noise
            .send_to(b"not stun", socket.local_addr().unwrap())
            .await
            .unwrap();

        let result = StunClient::new().query(&server, &socket).await.unwrap();
        assert!(result.public_endpoint.is_some());
    }

    #[tokio::test]
    async fn test_silent_server_reports_blocked() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server = StunServer::new("127.0.0.1", silent.local_addr().unwrap().port());
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let client = StunClient::with_timeout(Duration::from_millis(100));
        let result = client.query(&server, &socket).await.unwrap();

        assert_eq!(result, StunResult::blocked());
    }

    #[tokio::test]
    async fn test_foreign_transaction_is_ignored() {
        // Answers with a fresh transaction id, as a stale server would
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            while let Ok((_, from)) = server.recv_from(&mut buf).await {
                let stale = StunMessage::binding_request().transaction_id;
                let response = StunMessage::binding_success(stale, from);
                let _ = server.send_to(&response.encode(), from).await;
            }
        });

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let client = StunClient::with_timeout(Duration::from_millis(150));
        let result = client
            .query(&StunServer::new("127.0.0.1", server_addr.port()), &socket)
            .await
            .unwrap();

        assert_eq!(result, StunResult::blocked());
    }
}
