//! btkbd: Bluetooth HID keyboard emulator, entry point.
//!
//! Registers an HID keyboard profile with BlueZ, waits for a host to connect,
//! then types every line read from standard input on that host, each
//! followed by Enter.
//!
//! # Usage
//!
//! ```text
//! sudo btkbd [OPTIONS]
//!
//! Options:
//!   --config <PATH>          TOML config file [default: /etc/btkbd/config.toml]
//!   --adapter <NAME>         BlueZ adapter, e.g. hci0
//!   --service-record <PATH>  SDP record XML [default: built-in keyboard record]
//!   --log-level <FILTER>     tracing filter used when RUST_LOG is unset
//!   --dry-run                use the in-memory stack instead of BlueZ
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable               | Flag               |
//! |------------------------|--------------------|
//! | `BTKBD_CONFIG`         | `--config`         |
//! | `BTKBD_ADAPTER`        | `--adapter`        |
//! | `BTKBD_SERVICE_RECORD` | `--service-record` |
//! | `BTKBD_LOG_LEVEL`      | `--log-level`      |
//!
//! CLI args take precedence over the config file.  Logs go to stderr so they
//! never mix with piped input.
//!
//! # Exit status
//!
//! Zero when input ends or Ctrl-C is pressed while waiting for input;
//! non-zero for a missing privilege, a setup failure, or a write failure.

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use btkbd_server::application::dictation::{DictationLoop, DictationSummary, LineSource};
use btkbd_server::application::establish::{ConnectionEstablisher, HidProfile};
use btkbd_server::infrastructure::bluetooth::mock::{
    ChannelLog, MockBluetoothManager, MockChannelFactory,
};
use btkbd_server::infrastructure::config::{load_config, AppConfig};
use btkbd_server::infrastructure::input::stdin_lines;
use btkbd_server::infrastructure::privilege::ensure_privileged;
use btkbd_server::infrastructure::service_record::load_service_record;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Bluetooth HID keyboard emulator.
///
/// Types lines from standard input on a paired Bluetooth host.
#[derive(Debug, Parser)]
#[command(
    name = "btkbd",
    about = "Bluetooth HID keyboard emulator: types stdin lines on a paired host",
    version
)]
struct Cli {
    /// TOML configuration file.  Must exist when given.
    #[arg(long, env = "BTKBD_CONFIG")]
    config: Option<PathBuf>,

    /// BlueZ adapter name, e.g. `hci0`.
    #[arg(long, env = "BTKBD_ADAPTER")]
    adapter: Option<String>,

    /// SDP service record XML passed to bluetoothd.
    #[arg(long, env = "BTKBD_SERVICE_RECORD")]
    service_record: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset, e.g. `debug`.
    #[arg(long, env = "BTKBD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Run against the in-memory Bluetooth stack.  Needs no root and no
    /// adapter; reports are logged at debug level.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Overlays the flags that were given on top of `config`.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(adapter) = &self.adapter {
            config.bluetooth.adapter = adapter.clone();
        }
        if let Some(path) = &self.service_record {
            config.bluetooth.service_record = Some(path.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    if !cli.dry_run {
        ensure_privileged()?;
    }

    let service_record = load_service_record(config.bluetooth.service_record.as_deref())?;
    let profile = HidProfile::keyboard(config.bluetooth.profile_name.clone(), service_record);

    // Stdin is not read until the host has connected.
    let input = stdin_lines();
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler; only end of input stops the loop.
            std::future::pending::<()>().await;
        }
        info!("received Ctrl-C");
    };

    info!(adapter = %config.bluetooth.adapter, dry_run = cli.dry_run, "btkbd starting");

    let summary = if cli.dry_run {
        run_dry(profile, input, shutdown).await?
    } else {
        run_bluez(&config, profile, input, shutdown).await?
    };

    info!(
        lines = summary.lines,
        characters = summary.characters,
        reports = summary.reports,
        termination = ?summary.termination,
        "btkbd stopped"
    );
    Ok(())
}

async fn run_dry(
    profile: HidProfile,
    input: impl LineSource,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<DictationSummary> {
    let establisher = ConnectionEstablisher::new(
        MockBluetoothManager::default(),
        MockChannelFactory::new(ChannelLog::default()),
        profile,
    );
    Ok(DictationLoop::new(establisher).run_until(input, shutdown).await?)
}

#[cfg(target_os = "linux")]
async fn run_bluez(
    config: &AppConfig,
    profile: HidProfile,
    input: impl LineSource,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<DictationSummary> {
    use btkbd_server::infrastructure::bluetooth::bluez::{BluezManager, L2capChannels};

    let manager = BluezManager::connect(&config.bluetooth.adapter).await?;
    let establisher = ConnectionEstablisher::new(manager, L2capChannels, profile);
    Ok(DictationLoop::new(establisher).run_until(input, shutdown).await?)
}

#[cfg(not(target_os = "linux"))]
async fn run_bluez(
    _config: &AppConfig,
    _profile: HidProfile,
    _input: impl LineSource,
    _shutdown: impl Future<Output = ()>,
) -> anyhow::Result<DictationSummary> {
    anyhow::bail!("the BlueZ stack is only available on Linux; use --dry-run")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
