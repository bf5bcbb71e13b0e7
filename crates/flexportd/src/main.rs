//! flexportd daemon entry point.
//!
//! Loads the platform description, builds every port group on the simulated
//! ASIC and keeps their lane modes in step with the `state` section of the
//! config file, re-reading it on every tick.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sonic_flexportd::config::DEFAULT_CONFIG_PATH;
use sonic_flexportd::{FlexPortConfig, FlexPortOrchConfig, PlatformConfig, SimulatedSwitch};

/// SONiC flex-port lane manager
#[derive(Parser, Debug)]
#[command(name = "flexportd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the platform and state config file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Apply the state once and exit
    #[arg(long)]
    once: bool,

    /// Config re-read interval in milliseconds
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Validate the config and state without touching hardware
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let layer = fmt::layer().with_target(true).with_thread_ids(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

fn load(path: &Path) -> anyhow::Result<FlexPortConfig> {
    let config = FlexPortConfig::load(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("validating config {}", path.display()))?;
    Ok(config)
}

fn build(platform: &PlatformConfig) -> anyhow::Result<SimulatedSwitch> {
    let switch = platform
        .build_simulated(FlexPortOrchConfig::default())
        .context("building port groups")?;
    info!(
        "Managing {} port groups: {:?}",
        switch.orch.group_count(),
        switch.orch.lane_modes()
    );
    Ok(switch)
}

fn dry_run(path: &Path) -> anyhow::Result<()> {
    let config = load(path)?;
    let switch = build(&config.platform)?;
    if !switch.orch.is_valid_state(&config.switch_state()) {
        bail!("switch state in {} cannot be realised", path.display());
    }
    info!("Config {} is valid", path.display());
    Ok(())
}

fn apply(switch: &mut SimulatedSwitch, config: &FlexPortConfig) -> anyhow::Result<()> {
    let summary = switch
        .orch
        .apply_state(&config.switch_state())
        .context("applying switch state")?;
    if !summary.is_noop() {
        info!("Lane modes now {:?}", switch.orch.lane_modes());
    }
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = load(&args.config)?;
    let mut switch = build(&config.platform)?;
    apply(&mut switch, &config)?;

    if args.once {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    ticker.tick().await;
    info!("Watching {} every {}ms", args.config.display(), args.interval_ms);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut platform_warned = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }

        let next = match load(&args.config) {
            Ok(next) => next,
            Err(e) => {
                warn!("Keeping previous state: {:#}", e);
                continue;
            }
        };
        if next.platform != config.platform && !platform_warned {
            platform_warned = true;
            warn!("Platform section changed; restart flexportd to pick it up");
        }
        if let Err(e) = apply(&mut switch, &next) {
            error!("{:#}", e);
        }
    }

    let stats = switch.orch.stats();
    info!(
        "Applied {} states, {} reconfigurations, {} rejected, {} hardware errors",
        stats.applies, stats.reconfigurations, stats.rejected_states, stats.hardware_errors
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.json_logs);

    info!("--- Starting flexportd ---");

    let result = if args.dry_run {
        dry_run(&args.config)
    } else {
        run(&args).await
    };

    match result {
        Ok(()) => {
            info!("flexportd exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("flexportd error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
