//! Uplink command-line tool
//!
//! Sends a file to the first available serial device and checks the status
//! byte the receiver answers with.
//!
//! Usage:
//!   uplink <payload-file>
//!
//! Exits with 0 when the receiver reports a clean transfer, 255 (-1) otherwise.

mod args;
mod report;

use anyhow::{anyhow, Context};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use uplink_core::prelude::*;

use args::Args;

/// Exit status for every failure (-1 as seen by the shell)
const EXIT_FAILURE: u8 = 255;

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Warning: {:#}", e);
    }

    let args = match Args::from_env() {
        Ok(args) => args,
        Err(e) => {
            println!("Error: {}!", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            println!("Error: {:#}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match transmit(&args, config) {
        Ok(report) => {
            tracing::debug!("transfer report: {:?}", report);
            println!("{}", report::SUCCESS_LINE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("transfer failed: {}", e);
            println!("{}", report::error_line(&e));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Log to stderr so stdout only carries the console report
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("{}", e))
        .context("installing log subscriber")
}

fn load_config(args: &Args) -> anyhow::Result<DeviceConfig> {
    match &args.config {
        Some(path) => {
            let config = DeviceConfig::from_file(path).with_context(|| {
                format!("cannot load device configuration '{}'", path.display())
            })?;
            tracing::info!("using device configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(DeviceConfig::default()),
    }
}

fn transmit(args: &Args, config: DeviceConfig) -> Result<TransferReport, ProtocolError> {
    let payload = Payload::from_file(&args.source)?;

    let driver = match &args.port {
        Some(name) => SerialDriver::with_port(name.as_str()),
        None => SerialDriver::new(),
    };
    let mut controller = TransmissionController::new(driver, config);
    controller.transmit_with(&payload, |event| println!("{}", report::event_line(&event)))
}
