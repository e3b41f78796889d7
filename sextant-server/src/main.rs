use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sextant_server::config::ServerConfig;
use sextant_server::{Cli, Session, VERSION};
use tokio_graceful_shutdown::Toplevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = ServerConfig::load(args.config.as_deref())?.with_args(&args);
    log::info!("sextant-server {} starting", VERSION);
    log::debug!("Configuration: {:?}", config);

    Toplevel::new(move |s| async move {
        let session = Session::new(&s, args, config);
        log::debug!("{:?}", session);
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(5))
    .await
    .into_diagnostic()
}
