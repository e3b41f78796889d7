//! # Sextant Server
//!
//! AIS receiver with target tracking and collision warnings.
//!
//! The server reads NMEA0183 AIS sentences from one source, keeps a table of
//! all stations heard and periodically checks every moving target for
//! collision risk against the own ship.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    sextant-server                        │
//! │  ┌──────────────────┐            ┌─────────────────────┐ │
//! │  │ Receiver         │            │ CollisionWatch      │ │
//! │  │ tcp/udp/file/-   │            │ (interval timer)    │ │
//! │  └────────┬─────────┘            └──────────┬──────────┘ │
//! │           ▼                                 │            │
//! │  ┌──────────────────┐                       │            │
//! │  │ AisPipeline      │                       │            │
//! │  └────────┬─────────┘                       │            │
//! │           ▼                                 ▼            │
//! │  ┌─────────────────────────────────────────────────────┐ │
//! │  │          Arc<TargetRegistry> (sextant-core)         │ │
//! │  └─────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-s, --source` - `tcp:<host>:<port>`, `udp:<port>`, `file:<path>` or `-` for stdin
//! - `--own-mmsi`, `--own-position` - identify the own ship without `!AIVDO`
//! - `--output` - print decoded messages as JSON lines
//! - `--send-warnings` - print collision warnings as `!AIVDO` type 14 sentences
//! - `-v` - Increase verbosity (use multiple times)

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::Utc;
use clap::Parser;
use sextant_core::{AisPipeline, GeoPosition, MessageFactory, OwnShipFix, TargetRegistry};
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

pub mod config;
pub mod receiver;
pub mod watch;

use config::ServerConfig;
use receiver::{Receiver, Source};
use watch::CollisionWatch;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Sentence source: `tcp:<host>:<port>`, `udp:<port>`, `file:<path>` or `-` (stdin)
    #[arg(short, long)]
    pub source: Option<Source>,

    /// MMSI of the own ship
    #[arg(long)]
    pub own_mmsi: Option<u32>,

    /// Fixed own position as `<lat>,<lon>` in decimal degrees
    #[arg(long)]
    pub own_position: Option<GeoPosition>,

    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write decoded messages to stdout as JSON lines
    #[arg(long, default_value_t = false)]
    pub output: bool,

    /// Write collision warnings to stdout as AIS safety broadcast sentences
    #[arg(long, default_value_t = false)]
    pub send_warnings: bool,

    /// Report unsupported message types as errors
    #[arg(long, default_value_t = false)]
    pub throw_on_unknown: bool,
}

pub struct SessionInner {
    pub args: Cli,
    pub config: ServerConfig,
}

#[derive(Clone)]
pub struct Session {
    pub inner: Arc<RwLock<SessionInner>>,
    pub registry: Arc<TargetRegistry>,
}

impl Session {
    pub fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, SessionInner>, PoisonError<RwLockReadGuard<'_, SessionInner>>>
    {
        self.inner.read()
    }

    fn new_base(args: Cli, config: ServerConfig) -> Self {
        let registry = match config.own_mmsi {
            Some(mmsi) => TargetRegistry::with_own_mmsi(mmsi),
            None => TargetRegistry::new(),
        };
        if let Some(position) = config.own_position {
            registry.update_own_ship(&OwnShipFix {
                position,
                course_over_ground: None,
                speed_over_ground: Some(0.0),
                true_heading: None,
                timestamp: Utc::now(),
            });
        }
        Session {
            inner: Arc::new(RwLock::new(SessionInner { args, config })),
            registry: Arc::new(registry),
        }
    }

    /// Create the session and start the receiver and collision watch
    pub fn new(subsystem: &SubsystemHandle, args: Cli, config: ServerConfig) -> Self {
        let session = Self::new_base(args, config);

        let (receiver, watch) = {
            let inner = session.read().unwrap_or_else(PoisonError::into_inner);
            let pipeline = AisPipeline::new(
                MessageFactory::new(inner.config.decoder),
                session.registry.clone(),
            );
            let receiver = Receiver::new(inner.config.source(), Arc::new(pipeline), inner.args.output);
            let watch = CollisionWatch::new(
                session.registry.clone(),
                inner.config.estimation.clone(),
                inner.args.send_warnings,
            );
            (receiver, watch)
        };

        subsystem.start(SubsystemBuilder::new("Receiver", |s| receiver.run(s)));
        subsystem.start(SubsystemBuilder::new("CollisionWatch", |s| watch.run(s)));

        session
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session {{ targets: {} }}", self.registry.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = Cli::parse_from(["sextant-server"]);
        assert_eq!(args.source, None);
        assert!(!args.output);
        assert!(!args.send_warnings);
        assert_eq!(ServerConfig::default().with_args(&args).source(), Source::Stdin);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["sextant-server", "--source", "serial:/dev/ttyS0"]).is_err());
        assert!(Cli::try_parse_from(["sextant-server", "--own-position", "north"]).is_err());
    }

    #[test]
    fn test_session_applies_own_ship() {
        let args = Cli::parse_from(["sextant-server"]);
        let config = ServerConfig {
            own_mmsi: Some(244_123_456),
            own_position: Some(GeoPosition::new(54.0, 10.0)),
            ..Default::default()
        };
        let session = Session::new_base(args, config);
        assert_eq!(session.registry.own_mmsi(), Some(244_123_456));
        let own = session.registry.own_ship();
        assert_eq!(own.position, Some(GeoPosition::new(54.0, 10.0)));
        assert_eq!(own.speed_over_ground(), Some(0.0));
    }
}
