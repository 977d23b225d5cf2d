//! p2pcopy CLI
//!
//! Direct peer-to-peer UDP path setup through NATs, without a relay

mod config;
mod exchange;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

use config::Config;
use exchange::ConsoleExchange;
use p2pcopy_rendezvous::nat::NatDetector;
use p2pcopy_rendezvous::sync::{clock_label, second_of_minute};
use p2pcopy_rendezvous::{
    ExternalEndpointResolver, NatType, PeerExchange, Rendezvous, RendezvousError,
    RendezvousOptions, Resolution, RoundBarrier, SntpClock, StunClient, TimeSyncBarrier,
    UdpHandshake, Unsynchronized,
};

/// Exit code for usage and configuration errors
const EXIT_USAGE: u8 = 1;
/// Exit code when no peer connection could be established
const EXIT_RENDEZVOUS_FAILED: u8 = 3;

/// p2pcopy - serverless peer-to-peer connection through NATs
#[derive(Parser)]
#[command(name = "p2pcopy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover endpoints, swap them with the peer and punch a direct path
    Connect {
        /// Local port for the primary socket
        #[arg(long)]
        local_port: Option<u16>,

        /// Number of sockets to advertise
        #[arg(long)]
        sockets: Option<usize>,

        /// Give up after this many rounds
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Start rounds immediately instead of on shared second marks
        #[arg(long)]
        no_sync: bool,

        /// Peer IP (skips the prompt)
        #[arg(long, requires = "peer_ports")]
        peer_ip: Option<String>,

        /// Peer ports, comma separated (skips the prompt)
        #[arg(long, requires = "peer_ip")]
        peer_ports: Option<String>,
    },

    /// Show the external endpoint and NAT type of one socket
    Probe,

    /// Show network time and the wait until the next sync slot
    Clock,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e.downcast_ref::<RendezvousError>().is_some() {
                ExitCode::from(EXIT_RENDEZVOUS_FAILED)
            } else {
                ExitCode::from(EXIT_USAGE)
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default(Config::default_path())?,
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt().with_env_filter(level).init();

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Connect {
            local_port,
            sockets,
            max_rounds,
            no_sync,
            peer_ip,
            peer_ports,
        } => {
            let mut config = config;
            if let Some(port) = local_port {
                tracing::info!("Using local port: {}", port);
                config.pool.local_port = port;
            }
            if let Some(size) = sockets {
                config.pool.size = size;
            }
            if max_rounds.is_some() {
                config.connect.max_rounds = max_rounds;
            }
            if no_sync {
                config.sync.enabled = false;
            }
            config.validate()?;

            let mut exchange = ConsoleExchange::stdio().with_peer(peer_ip, peer_ports);
            if config.sync.enabled {
                let clock = SntpClock::new(config.sync.time_server.clone())
                    .with_timeout(config.sync_timeout());
                let barrier = TimeSyncBarrier::with_marks(clock, config.sync.marks.clone())?;
                connect(&config, barrier, &mut exchange).await?;
            } else {
                connect(&config, Unsynchronized, &mut exchange).await?;
            }
        }
        Commands::Probe => {
            probe(&config).await?;
        }
        Commands::Clock => {
            show_clock(&config).await?;
        }
    }

    Ok(())
}

fn resolver(config: &Config) -> anyhow::Result<ExternalEndpointResolver<StunClient>> {
    Ok(ExternalEndpointResolver::new(
        StunClient::with_timeout(config.stun_timeout()),
        config.stun_servers()?,
    ))
}

/// Full rendezvous with Ctrl+C abort
async fn connect<B: RoundBarrier, E: PeerExchange>(
    config: &Config,
    barrier: B,
    exchange: &mut E,
) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping");
                shutdown.cancel();
            }
        });
    }

    let handshake = UdpHandshake::new()
        .with_probe_interval(config.probe_interval())
        .with_timeout(config.attempt_timeout());
    let options = RendezvousOptions {
        pool: config.pool_options()?,
        max_rounds: config.connect.max_rounds,
    };
    let rendezvous = Rendezvous::new(resolver(config)?, handshake, barrier, options, shutdown);

    let established = match rendezvous.establish(exchange).await {
        Ok(established) => established,
        Err(RendezvousError::StunUnavailable { udp_blocked: true }) => {
            println!("Your firewall is: {}", NatType::Blocked);
            return Err(RendezvousError::StunUnavailable { udp_blocked: true }.into());
        }
        Err(e @ (RendezvousError::RoundsExhausted { .. } | RendezvousError::Cancelled)) => {
            return Err(e).context("Failed to establish P2P connection");
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Connected successfully to {} from local port {} (try {})",
        established.remote, established.local_port, established.round
    );
    established.transport.keepalive().await?;

    Ok(())
}

/// Resolve one socket and report what the peer would see
async fn probe(config: &Config) -> anyhow::Result<()> {
    let resolver = resolver(config)?;
    let options = config.pool_options()?;
    let socket = tokio::net::UdpSocket::bind((options.bind_ip, options.primary_port)).await?;

    match resolver.resolve(&socket, true).await {
        Resolution::Mapped(mut mapping) => {
            if options.detect_nat {
                let detector = NatDetector::new(resolver.stun(), resolver.servers());
                mapping.nat_type = detector.detect(&socket, &mapping).await;
            }
            println!("Local endpoint: {}", mapping.local);
            println!("External endpoint: {}", mapping.external);
            println!("Your firewall is: {}", mapping.nat_type);
            println!("STUN server: {}", mapping.server);
        }
        not_found @ Resolution::NotFound { .. } => {
            if not_found.udp_blocked() {
                println!("Your firewall is: {}", NatType::Blocked);
            }
            return Err(RendezvousError::StunUnavailable {
                udp_blocked: not_found.udp_blocked(),
            }
            .into());
        }
    }

    Ok(())
}

/// Show network time and the next sync slot
async fn show_clock(config: &Config) -> anyhow::Result<()> {
    let clock =
        SntpClock::new(config.sync.time_server.clone()).with_timeout(config.sync_timeout());
    let network = clock.query().await;
    let now = match &network {
        Ok(time) => *time,
        Err(_) => SystemTime::now(),
    };

    let barrier = TimeSyncBarrier::with_marks(clock, config.sync.marks.clone())?;
    let delay = barrier.delay_secs(second_of_minute(now));

    match network {
        Ok(_) => println!(
            "Network time ({}): {} UTC",
            barrier.clock().server(),
            clock_label(now)
        ),
        Err(e) => println!(
            "Network time unavailable ({e}), local time: {} UTC",
            clock_label(now)
        ),
    }
    println!("Next sync slot in {} sec", delay);

    Ok(())
}
