//! Operator console exchange.
//!
//! Prints our details for the operator to relay and reads the peer's back.

use p2pcopy_rendezvous::{Advertisement, PeerExchange, PeerTarget, RendezvousError};
use std::io::{self, BufRead, BufReader};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;

/// Lines typed by the operator
pub type Lines = mpsc::Receiver<io::Result<String>>;

/// Read lines from `input` on a dedicated thread
///
/// The thread lives outside the runtime, so a read still pending at exit
/// never holds up runtime shutdown.
pub fn spawn_line_reader<R: BufRead + Send + 'static>(input: R) -> Lines {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in input.lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Console prompts, optionally pre-answered from the command line
pub struct ConsoleExchange<W> {
    lines: Lines,
    output: W,
    peer_ip: Option<String>,
    peer_ports: Option<String>,
}

impl ConsoleExchange<Stdout> {
    /// Exchange over the process stdin/stdout
    pub fn stdio() -> Self {
        let lines = spawn_line_reader(BufReader::new(io::stdin()));
        Self::new(lines, tokio::io::stdout())
    }
}

impl<W> ConsoleExchange<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Exchange over an arbitrary line source and output stream
    pub fn new(lines: Lines, output: W) -> Self {
        Self {
            lines,
            output,
            peer_ip: None,
            peer_ports: None,
        }
    }

    /// Skip the prompts, using answers given up front
    #[must_use]
    pub fn with_peer(mut self, ip: Option<String>, ports: Option<String>) -> Self {
        self.peer_ip = ip;
        self.peer_ports = ports;
        self
    }

    /// Output stream
    #[cfg(test)]
    fn output(&self) -> &W {
        &self.output
    }

    async fn say(&mut self, text: &str) -> Result<(), RendezvousError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn ask(
        &mut self,
        preset: Option<String>,
        prompt: &str,
        what: &str,
    ) -> Result<String, RendezvousError> {
        let answer = match preset {
            Some(answer) => answer,
            None => {
                self.say(prompt).await?;
                match self.lines.recv().await {
                    Some(line) => line?,
                    None => {
                        return Err(RendezvousError::InvalidPeer(format!("no {what} entered")));
                    }
                }
            }
        };

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(RendezvousError::InvalidPeer(format!("Invalid {what} entered")));
        }
        Ok(answer.to_string())
    }
}

impl<W> PeerExchange for ConsoleExchange<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn exchange(&mut self, ours: &Advertisement) -> Result<PeerTarget, RendezvousError> {
        let details = format!(
            "\nTell your peer your IP is: {}\nYour firewall is: {}\nTell your peer your ports are: {}\n\n",
            ours.external_ip,
            ours.nat_type,
            ours.ports_line()
        );
        self.say(&details).await?;

        let preset_ip = self.peer_ip.take();
        let ip = self.ask(preset_ip, "Enter the ip of your peer: ", "ip").await?;

        let preset_ports = self.peer_ports.take();
        let ports = self
            .ask(preset_ports, "Enter the ports of your peer (comma separate): ", "ports")
            .await?;

        PeerTarget::parse(&ip, &ports)
    }
}
