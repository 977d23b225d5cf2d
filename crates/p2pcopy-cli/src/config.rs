//! Configuration system for the p2pcopy CLI.

use p2pcopy_rendezvous::sync::validate_marks;
use p2pcopy_rendezvous::{PoolOptions, StunServer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// p2pcopy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// STUN configuration
    pub stun: StunConfig,
    /// Socket pool configuration
    pub pool: PoolConfig,
    /// Round synchronization configuration
    pub sync: SyncConfig,
    /// Connect round configuration
    pub connect: ConnectConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// STUN configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StunConfig {
    /// Extra servers (`host:port`), queried before the built-in list
    #[serde(default)]
    pub servers: Vec<String>,
    /// Fall back to the built-in server list
    #[serde(default = "default_true")]
    pub use_builtin: bool,
    /// Per-server query timeout in milliseconds
    #[serde(default = "default_stun_timeout_ms")]
    pub timeout_ms: u64,
    /// Refine the NAT type with extra probes
    #[serde(default = "default_true")]
    pub detect_nat: bool,
}

/// Socket pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of sockets to advertise
    #[serde(default = "default_pool_size")]
    pub size: usize,
    /// Local bind address
    #[serde(default = "default_bind_ip")]
    pub bind_ip: String,
    /// Local port for the primary socket (0 = any)
    #[serde(default)]
    pub local_port: u16,
}

/// Round synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Wait for a shared second mark before each round
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Second marks within each minute
    #[serde(default = "default_marks")]
    pub marks: Vec<u32>,
    /// Network time server (`host:port`)
    #[serde(default = "default_time_server")]
    pub time_server: String,
    /// Time query timeout in milliseconds
    #[serde(default = "default_sync_timeout_ms")]
    pub timeout_ms: u64,
}

/// Connect round configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectConfig {
    /// Hole punching probe interval in milliseconds
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    /// Per-attempt handshake timeout in milliseconds
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Give up after this many rounds (unset = retry until Ctrl+C)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values

fn default_true() -> bool {
    true
}

fn default_stun_timeout_ms() -> u64 {
    3000
}

fn default_pool_size() -> usize {
    p2pcopy_rendezvous::pool::DEFAULT_POOL_SIZE
}

fn default_bind_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_marks() -> Vec<u32> {
    p2pcopy_rendezvous::sync::DEFAULT_MARKS.to_vec()
}

fn default_time_server() -> String {
    p2pcopy_rendezvous::sync::DEFAULT_TIME_SERVER.to_string()
}

fn default_sync_timeout_ms() -> u64 {
    3000
}

fn default_probe_interval_ms() -> u64 {
    100
}

fn default_attempt_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StunConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            use_builtin: true,
            timeout_ms: default_stun_timeout_ms(),
            detect_nat: true,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            bind_ip: default_bind_ip(),
            local_port: 0,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marks: default_marks(),
            time_server: default_time_server(),
            timeout_ms: default_sync_timeout_ms(),
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            probe_interval_ms: default_probe_interval_ms(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            max_rounds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get default config path
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("p2pcopy/config.toml")
    }

    /// Load config from `path`, or create it with defaults if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if reading or creating the config fails.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// STUN servers in query order: configured ones first, then the built-in list
    ///
    /// # Errors
    ///
    /// Returns an error if a configured server is not `host:port`.
    pub fn stun_servers(&self) -> anyhow::Result<Vec<StunServer>> {
        let mut servers = self
            .stun
            .servers
            .iter()
            .map(|s| s.parse::<StunServer>())
            .collect::<Result<Vec<_>, _>>()?;

        if self.stun.use_builtin {
            for server in StunServer::defaults() {
                if !servers.contains(&server) {
                    servers.push(server);
                }
            }
        }

        Ok(servers)
    }

    /// Parse the pool bind address
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn bind_ip(&self) -> anyhow::Result<IpAddr> {
        Ok(self.pool.bind_ip.parse()?)
    }

    /// Socket pool options
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address cannot be parsed.
    pub fn pool_options(&self) -> anyhow::Result<PoolOptions> {
        Ok(PoolOptions {
            size: self.pool.size,
            bind_ip: self.bind_ip()?,
            primary_port: self.pool.local_port,
            detect_nat: self.stun.detect_nat,
        })
    }

    /// STUN query timeout
    #[must_use]
    pub fn stun_timeout(&self) -> Duration {
        Duration::from_millis(self.stun.timeout_ms)
    }

    /// Time query timeout
    #[must_use]
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync.timeout_ms)
    }

    /// Hole punching probe interval
    #[must_use]
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.connect.probe_interval_ms)
    }

    /// Per-attempt handshake timeout
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.connect.attempt_timeout_ms)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate STUN servers
        if self.stun_servers()?.is_empty() {
            anyhow::bail!("No STUN servers configured and built-in list disabled");
        }
        if self.stun.timeout_ms == 0 || self.stun.timeout_ms > 60_000 {
            anyhow::bail!("STUN timeout must be between 1 and 60000 ms");
        }

        // Validate pool
        if self.pool.size == 0 || self.pool.size > 100 {
            anyhow::bail!("Pool size must be between 1 and 100");
        }
        self.bind_ip()?;

        // Validate sync
        validate_marks(&self.sync.marks)?;
        validate_host_port(&self.sync.time_server, "Time server")?;
        if self.sync.timeout_ms == 0 || self.sync.timeout_ms > 60_000 {
            anyhow::bail!("Time server timeout must be between 1 and 60000 ms");
        }

        // Validate connect rounds
        if self.connect.probe_interval_ms == 0 {
            anyhow::bail!("Probe interval must be at least 1 ms");
        }
        if self.connect.attempt_timeout_ms <= self.connect.probe_interval_ms {
            anyhow::bail!(
                "Attempt timeout ({} ms) must exceed the probe interval ({} ms)",
                self.connect.attempt_timeout_ms,
                self.connect.probe_interval_ms
            );
        }
        if self.connect.max_rounds == Some(0) {
            anyhow::bail!("Max rounds must be at least 1 when set");
        }

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }
}

/// Validate host:port format
fn validate_host_port(addr: &str, name: &str) -> anyhow::Result<()> {
    let Some((host, port_str)) = addr.rsplit_once(':') else {
        anyhow::bail!(
            "{} '{}' missing port (expected format: host:port)",
            name,
            addr
        );
    };

    let port: u16 = port_str
        .parse()
        .map_err(|_| anyhow::anyhow!("{} '{}' has invalid port: {}", name, addr, port_str))?;

    if port == 0 {
        anyhow::bail!("{} '{}' has invalid port: 0", name, addr);
    }

    if host.is_empty() {
        anyhow::bail!("{} '{}' has empty hostname", name, addr);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pool.size, 10);
        assert_eq!(config.pool.bind_ip, "0.0.0.0");
        assert_eq!(config.sync.marks, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(config.sync.time_server, "pool.ntp.org:123");
        assert_eq!(config.connect.attempt_timeout_ms, 5000);
        assert!(config.connect.max_rounds.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.pool.size = 0;
        assert!(config.validate().is_err());
        config.pool.size = 10;

        config.sync.marks = vec![30, 10];
        assert!(config.validate().is_err());
        config.sync.marks = default_marks();

        config.pool.bind_ip = "not-an-ip".to_string();
        assert!(config.validate().is_err());
        config.pool.bind_ip = default_bind_ip();

        config.connect.max_rounds = Some(0);
        assert!(config.validate().is_err());
        config.connect.max_rounds = Some(3);

        config.connect.attempt_timeout_ms = 50;
        assert!(config.validate().is_err());
        config.connect.attempt_timeout_ms = 5000;

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "debug".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stun_server_order() {
        let mut config = Config::default();
        config.stun.servers = vec![
            "stun.example.net:3478".to_string(),
            "stun.l.google.com:19302".to_string(),
        ];

        let servers = config.stun_servers().unwrap();
        assert_eq!(servers[0], StunServer::new("stun.example.net", 3478));
        assert_eq!(servers[1], StunServer::new("stun.l.google.com", 19302));
        assert_eq!(
            servers
                .iter()
                .filter(|s| s.host == "stun.l.google.com")
                .count(),
            1
        );

        config.stun.use_builtin = false;
        assert_eq!(config.stun_servers().unwrap().len(), 2);

        config.stun.servers.clear();
        assert!(config.validate().is_err());

        config.stun.servers = vec!["no-port".to_string()];
        assert!(config.stun_servers().is_err());
    }

    #[test]
    fn test_time_server_validation() {
        assert!(validate_host_port("pool.ntp.org:123", "Time server").is_ok());
        assert!(validate_host_port("pool.ntp.org", "Time server").is_err());
        assert!(validate_host_port(":123", "Time server").is_err());
        assert!(validate_host_port("pool.ntp.org:0", "Time server").is_err());
    }

    #[test]
    fn test_pool_options() {
        let mut config = Config::default();
        config.pool.local_port = 4000;
        config.stun.detect_nat = false;

        let options = config.pool_options().unwrap();
        assert_eq!(options.primary_port, 4000);
        assert_eq!(options.size, 10);
        assert!(!options.detect_nat);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connect]
            max_rounds = 4

            [sync]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.connect.max_rounds, Some(4));
        assert_eq!(config.connect.attempt_timeout_ms, 5000);
        assert!(!config.sync.enabled);
        assert_eq!(config.sync.marks, default_marks());
        assert_eq!(config.pool.size, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.pool.size = 4;
        config.connect.max_rounds = Some(7);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.pool.size, 4);
        assert_eq!(loaded.connect.max_rounds, Some(7));
        assert_eq!(loaded.sync.time_server, config.sync.time_server);
    }

    #[test]
    fn test_load_or_default_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p2pcopy/config.toml");

        let config = Config::load_or_default(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.pool.size, 10);

        let again = Config::load_or_default(&path).unwrap();
        assert_eq!(again.sync.marks, config.sync.marks);
    }
}
