//! Sentence sources.
//!
//! The receiver subsystem reads NMEA0183 lines from one [`Source`] and feeds
//! them through the [`AisPipeline`]. Bad sentences are logged and skipped;
//! only I/O failures end a source. A TCP source reconnects, while file and
//! stdin sources request shutdown at end of input.

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sextant_core::pipeline::log_line_error;
use sextant_core::AisPipeline;
use socket2::{Domain, Protocol, Type};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::sleep;
use tokio_graceful_shutdown::SubsystemHandle;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const MAX_DATAGRAM: usize = 65536;
/// NMEA0183 sentences are at most 82 characters; longer lines are dropped
const MAX_LINE: usize = 256;

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("Invalid source '{0}', expected tcp:<host>:<port>, udp:<port>, file:<path> or -")]
    InvalidSource(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where sentences come from
#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum Source {
    /// Connect to a TCP server that streams sentences
    Tcp { host: String, port: u16 },
    /// Listen for (broadcast) datagrams on a local port
    Udp { port: u16 },
    File(PathBuf),
    Stdin,
}

impl FromStr for Source {
    type Err = ReceiverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReceiverError::InvalidSource(s.to_string());
        if s == "-" {
            return Ok(Source::Stdin);
        }
        let (scheme, rest) = s.split_once(':').ok_or_else(invalid)?;
        match scheme.to_ascii_lowercase().as_str() {
            "tcp" => {
                let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
                if host.is_empty() {
                    return Err(invalid());
                }
                Ok(Source::Tcp {
                    host: host.to_string(),
                    port: port.parse().map_err(|_| invalid())?,
                })
            }
            "udp" => Ok(Source::Udp {
                port: rest.parse().map_err(|_| invalid())?,
            }),
            "file" if !rest.is_empty() => Ok(Source::File(PathBuf::from(rest))),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Tcp { host, port } => write!(f, "tcp:{}:{}", host, port),
            Source::Udp { port } => write!(f, "udp:{}", port),
            Source::File(path) => write!(f, "file:{}", path.display()),
            Source::Stdin => write!(f, "-"),
        }
    }
}

pub fn create_udp_listen(port: u16) -> io::Result<UdpSocket> {
    let socket = socket2::Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_nonblocking(true)?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;

    let socketaddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    socket.bind(&socket2::SockAddr::from(socketaddr))?;
    log::trace!("Binding socket to {}", socketaddr);

    UdpSocket::from_std(socket.into())
}

/// Discard input up to and including the next newline
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = chunk.len();
                reader.consume(len);
            }
        }
    }
}

pub struct Receiver {
    source: Source,
    pipeline: Arc<AisPipeline>,
    /// Print every decoded message as a JSON line
    output: bool,
}

impl Receiver {
    pub fn new(source: Source, pipeline: Arc<AisPipeline>, output: bool) -> Self {
        Receiver {
            source,
            pipeline,
            output,
        }
    }

    /// Returns true if the line completed a message
    fn handle_line(&self, line: &str) -> Result<bool, ReceiverError> {
        match self.pipeline.process_line(line, Utc::now()) {
            Ok(Some(message)) => {
                log::trace!("{}: {}", message.mmsi(), message.kind());
                if self.output {
                    println!("{}", serde_json::to_string(&message)?);
                }
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                log_line_error(line.trim(), &e);
                Ok(false)
            }
        }
    }

    /// Feed every line of `reader` through the pipeline until end of input.
    ///
    /// Lines longer than `MAX_LINE` bytes are skipped without buffering them.
    /// Returns the number of decoded messages.
    pub async fn process_lines<R>(&self, mut reader: R) -> Result<usize, ReceiverError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut decoded = 0;
        let mut buf = Vec::with_capacity(MAX_LINE);
        loop {
            buf.clear();
            let n = (&mut reader)
                .take(MAX_LINE as u64)
                .read_until(b'\n', &mut buf)
                .await?;
            if n == 0 {
                return Ok(decoded);
            }
            if n == MAX_LINE && buf.last() != Some(&b'\n') {
                log::warn!("Skipping line longer than {} bytes", MAX_LINE);
                skip_line(&mut reader).await?;
                continue;
            }
            if self.handle_line(&String::from_utf8_lossy(&buf))? {
                decoded += 1;
            }
        }
    }

    async fn udp_loop(&self, socket: UdpSocket) -> Result<(), ReceiverError> {
        let mut buf = Vec::with_capacity(MAX_DATAGRAM);
        loop {
            buf.clear();
            let (_len, from) = socket.recv_buf_from(&mut buf).await?;
            log::trace!("Datagram from {}", from);
            for line in String::from_utf8_lossy(&buf).lines() {
                self.handle_line(line)?;
            }
        }
    }

    async fn tcp_loop(&self, host: &str, port: u16) -> Result<(), ReceiverError> {
        loop {
            match TcpStream::connect((host, port)).await {
                Ok(stream) => {
                    log::info!("Connected to {}:{}", host, port);
                    match self.process_lines(BufReader::new(stream)).await {
                        Ok(n) => log::warn!("{}:{} closed the connection after {} messages", host, port, n),
                        Err(ReceiverError::Io(e)) => log::warn!("{}:{}: {}", host, port, e),
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => log::warn!("Cannot connect to {}:{}: {}", host, port, e),
            }
            sleep(RECONNECT_DELAY).await;
        }
    }

    async fn read_source(&self, subsys: &SubsystemHandle) -> Result<(), ReceiverError> {
        match &self.source {
            Source::Tcp { host, port } => self.tcp_loop(host, *port).await,
            Source::Udp { port } => {
                let socket = create_udp_listen(*port)?;
                log::info!("Listening for AIS on UDP port {}", port);
                self.udp_loop(socket).await
            }
            Source::File(path) => {
                let file = tokio::fs::File::open(path).await?;
                let n = self.process_lines(BufReader::new(file)).await?;
                log::info!("{}: {} messages decoded", path.display(), n);
                subsys.request_shutdown();
                Ok(())
            }
            Source::Stdin => {
                let n = self.process_lines(BufReader::new(tokio::io::stdin())).await?;
                log::info!("End of input, {} messages decoded", n);
                subsys.request_shutdown();
                Ok(())
            }
        }
    }

    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), ReceiverError> {
        log::info!("Reading AIS from {}", self.source);
        tokio::select! {
            _ = subsys.on_shutdown_requested() => {
                log::info!("Receiver: shutdown");
                Ok(())
            }
            r = self.read_source(&subsys) => {
                if let Err(e) = &r {
                    log::error!("{}: {}", self.source, e);
                }
                r
            }
        }
    }
}
