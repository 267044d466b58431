//! CLI and configuration behavior without audio hardware

use std::io::Write;
use std::process::Command;

use devprobe::cli::Failure;
use devprobe::config::ProbeConfig;
use devprobe_audio::{AudioSubsystem, DeviceDescriptor, Reporter, SimulatedSubsystem};

#[test]
fn test_argument_prints_banner_and_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_devprobe"))
        .arg("--help")
        .output()
        .expect("Failed to run devprobe");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("devprobe usage:"));
    assert!(!stdout.contains("Number of devices"));
}

#[test]
fn test_double_dash_prints_banner() {
    let output = Command::new(env!("CARGO_BIN_EXE_devprobe"))
        .arg("--")
        .output()
        .expect("Failed to run devprobe");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("devprobe usage:"));
}

#[test]
fn test_missing_explicit_config_fails_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_devprobe"))
        .env("DEVPROBE_CONFIG", dir.path().join("missing.toml"))
        .output()
        .expect("Failed to run devprobe");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"));
}

#[test]
fn test_configured_catalog_drives_report() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "sample_format = \"int24\"").unwrap();
    writeln!(file, "candidate_rates = [48000.0, 44100.0, 0.0, 96000.0]").unwrap();
    let config = ProbeConfig::load_from(file.path()).unwrap();

    let mut sim = SimulatedSubsystem::new()
        .with_device(DeviceDescriptor::new("Interface", 0).with_channels(2, 0))
        .with_default_input(0)
        .supporting_rates(&[44100.0, 48000.0, 96000.0]);

    let report = config.reporter().render(&mut sim).unwrap();
    assert!(report.contains(
        "Supported standard sample rates (input, half-duplex, 24 bit, 2 channels) = 48000.00, 44100.00\n"
    ));
    assert_eq!(sim.calls().is_format_supported, 2);
}

#[test]
fn test_failed_initialize_reports_last_host_error() {
    let mut sim = SimulatedSubsystem::new()
        .fail_initialize("no sound server")
        .with_host_error("PulseAudio", "connection refused");

    let err = Reporter::default().render(&mut sim).unwrap_err();
    let failure = Failure::with_last_host_error(&anyhow::Error::from(err), sim.last_host_error());

    assert_eq!(failure.exit_code, -9985);
    assert_eq!(
        failure.message,
        "An error occurred while using the audio subsystem\n\
         Error number: -9985\n\
         Error message: Device unavailable\n\
         Host error: PulseAudio: connection refused\n"
    );
}
