//! `geobeacon` command line entry point.

use clap::{Parser, Subcommand};
use geobeacon_hub::LocationHub;
use geobeacon_runner::beacon::{BeaconAdvertiser, LoggingSink};
use geobeacon_runner::config::BeaconConfig;
use geobeacon_runner::replay::{OutputFormat, Replay};
use geobeacon_runner::uart_server::UartBridge;
use geobeacon_runner::{driver, RunnerResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "geobeacon", version, about = "GNSS location beacon runner")]
struct Cli {
    /// Default log filter when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the GNSS UART on a TCP port and advertise accepted fixes.
    Serve {
        /// Configuration file (YAML).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the UART port from the configuration.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Replay captured serial input and print the resulting fixes.
    Replay {
        /// File with raw serial bytes.
        input: PathBuf,

        /// Bytes delivered per update tick.
        #[arg(long, default_value_t = 8)]
        chunk_size: usize,

        /// Print JSON lines instead of text.
        #[arg(long)]
        json: bool,

        /// Also run the beacon advertiser with this configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Serve { config, port } => serve(config, port),
        Command::Replay {
            input,
            chunk_size,
            json,
            config,
        } => replay(input, chunk_size, json, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>) -> RunnerResult<BeaconConfig> {
    match path {
        Some(path) => {
            tracing::info!("loading configuration from {}", path.display());
            BeaconConfig::load(path)
        }
        None => Ok(BeaconConfig::default()),
    }
}

fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> RunnerResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.uart_port = port;
    }

    let bridge = UartBridge::bind(SocketAddr::from(([0, 0, 0, 0], config.uart_port)))?;
    tracing::info!(
        "{}: GNSS UART listening on {}, advertising every {} ms",
        config.device_name,
        bridge.local_addr(),
        config.advertising_interval_ms
    );

    let mut advertiser = BeaconAdvertiser::new(&config, LoggingSink::default());
    if config.echo_location {
        let sender = bridge.sender();
        advertiser = advertiser.with_echo(Box::new(move |field: &[u8]| sender.send_line(field)));
    }
    advertiser.start();

    let mut hub = LocationHub::new(bridge);
    hub.subscribe(advertiser)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::Relaxed))?;

    let stats = driver::run(
        &mut hub,
        Duration::from_millis(config.tick_interval_ms),
        &running,
    );
    tracing::info!(
        "stopped: {} accepted, {} rejected, {} empty lines, {} bytes dropped",
        stats.accepted,
        stats.rejected,
        stats.empty_lines,
        stats.overflow_bytes
    );
    Ok(())
}

fn replay(
    input: PathBuf,
    chunk_size: usize,
    json: bool,
    config_path: Option<PathBuf>,
) -> RunnerResult<()> {
    let data = std::fs::read(&input)?;
    let format = if json { OutputFormat::Json } else { OutputFormat::Text };

    let mut replay = Replay::new()?;
    if let Some(path) = config_path {
        let config = BeaconConfig::load(path)?;
        replay.subscribe(BeaconAdvertiser::new(&config, LoggingSink::default()))?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stats = replay.run(&data, chunk_size, format, &mut out)?;
    tracing::info!(
        "replayed {} bytes from {}: {} accepted, {} rejected",
        data.len(),
        input.display(),
        stats.accepted,
        stats.rejected
    );
    Ok(())
}
