//! devprobe - list audio devices and probe the standard sample rates of the
//! default input and output devices.
//!
//! The report goes to standard output. Logs and error diagnostics go to
//! standard error (`RUST_LOG` controls verbosity, default `warn`).

use std::io;

use anyhow::Context;
use devprobe_audio::AudioSubsystem;
use tracing::info;
use tracing_subscriber::EnvFilter;

use devprobe::cli::{banner, Cli, Failure, BANNER_EXIT_CODE};
use devprobe::config::ProbeConfig;

fn main() {
    let cli = Cli::parse_args(std::env::args_os());
    if cli.wants_banner() {
        print!("{}", banner());
        std::process::exit(BANNER_EXIT_CODE);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(failure) = run() {
        eprint!("{}", failure.message);
        std::process::exit(failure.exit_code);
    }
}

fn run() -> std::result::Result<(), Failure> {
    let config = ProbeConfig::load()
        .context("Failed to load configuration")
        .map_err(|e| Failure::from_error(&e))?;
    info!("Configuration: {}", config.config_path.display());

    let mut subsystem = config.subsystem();
    let reporter = config.reporter();
    info!("Probing {} candidate rates as {}", reporter.catalog().len(), config.sample_format);

    let stdout = io::stdout();
    let summary = reporter
        .run(&mut subsystem, &mut stdout.lock())
        .map_err(|e| {
            let last_host_error = subsystem.last_host_error();
            Failure::with_last_host_error(&anyhow::Error::from(e), last_host_error)
        })?;
    info!(
        "Listed {} devices (default input: {:?}, default output: {:?})",
        summary.device_count, summary.default_input, summary.default_output
    );

    Ok(())
}
