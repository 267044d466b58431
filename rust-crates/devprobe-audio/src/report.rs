//! Device capability report
//!
//! Lists every device the subsystem exposes, then probes the standard sample
//! rates of the default input and output devices.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::device::{DeviceDescriptor, DeviceIndex, SampleFormat, StreamParameters};
use crate::error::Result;
use crate::probe::{probe_sample_rates, RateCatalog};
use crate::subsystem::{AudioSubsystem, Session};

const SEPARATOR: &str = "----------------------------------------------";

/// What a finished report covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub device_count: usize,
    pub default_input: Option<DeviceIndex>,
    pub default_output: Option<DeviceIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Input,
    Output,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Device capability reporter
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    catalog: RateCatalog,
    sample_format: SampleFormat,
}

impl Reporter {
    pub fn new(catalog: RateCatalog, sample_format: SampleFormat) -> Self {
        Self {
            catalog,
            sample_format,
        }
    }

    pub fn catalog(&self) -> &RateCatalog {
        &self.catalog
    }

    /// Initialize `subsystem`, write the report to `out` and terminate the
    /// subsystem again, on success and on failure alike.
    ///
    /// Text written before a failure stays written.
    pub fn run<S: AudioSubsystem, W: Write>(&self, subsystem: &mut S, out: &mut W) -> Result<ReportSummary> {
        let session = Session::open(subsystem)?;
        self.write_report(&*session, out)
    }

    /// Produce the whole report as a string.
    pub fn render<S: AudioSubsystem>(&self, subsystem: &mut S) -> Result<String> {
        let mut buffer = Vec::new();
        self.run(subsystem, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_report<S: AudioSubsystem, W: Write>(&self, subsystem: &S, out: &mut W) -> Result<ReportSummary> {
        let count = subsystem.device_count()?;
        info!("Found {} audio devices", count);

        let default_input = subsystem.default_input_device();
        let default_output = subsystem.default_output_device();

        writeln!(out, "Number of devices = {}", count)?;

        let mut devices = Vec::with_capacity(count);
        for index in 0..count {
            let device = subsystem.device_info(index)?;
            write_device_entry(
                subsystem,
                out,
                index,
                &device,
                default_input == Some(index),
                default_output == Some(index),
            )?;
            devices.push(device);
        }
        writeln!(out, "{}", SEPARATOR)?;

        let default_input = resolve_default(default_input, &devices, Direction::Input);
        let default_output = resolve_default(default_output, &devices, Direction::Output);

        if let Some(index) = default_input {
            self.write_default_section(subsystem, out, Direction::Input, index, &devices[index])?;
        }
        if let Some(index) = default_output {
            self.write_default_section(subsystem, out, Direction::Output, index, &devices[index])?;
        }

        if default_input.is_none() {
            writeln!(out, "No default input device available.")?;
        }
        if default_output.is_none() {
            writeln!(out, "No default output device available.")?;
        }

        writeln!(out, "{}", SEPARATOR)?;
        out.flush()?;

        Ok(ReportSummary {
            device_count: count,
            default_input,
            default_output,
        })
    }

    fn write_default_section<S: AudioSubsystem, W: Write>(
        &self,
        subsystem: &S,
        out: &mut W,
        direction: Direction,
        index: DeviceIndex,
        device: &DeviceDescriptor,
    ) -> Result<()> {
        let side = direction.label();
        let (channels, max_label) = match direction {
            Direction::Input => (device.max_input_channels, "Max input channels"),
            Direction::Output => (device.max_output_channels, "Max output channels"),
        };

        writeln!(out, "Default {} device = {}", side, device.name)?;
        writeln!(out, "Host API ({}) = {}", side, host_api_label(subsystem, device))?;
        writeln!(out, "{} = {}", max_label, channels)?;

        let input = StreamParameters::new(index, device.max_input_channels, self.sample_format);
        let output = StreamParameters::new(index, device.max_output_channels, self.sample_format);
        let bits = self.sample_format.bits();

        if channels > 0 {
            let half = match direction {
                Direction::Input => probe_sample_rates(subsystem, &self.catalog, Some(&input), None),
                Direction::Output => probe_sample_rates(subsystem, &self.catalog, None, Some(&output)),
            };
            writeln!(
                out,
                "Supported standard sample rates ({}, half-duplex, {} bit, {} channels) = {}",
                side, bits, channels, half
            )?;
        } else {
            debug!("Default {} device has no {} channels, skipping half-duplex probe", side, side);
        }

        if input.channel_count > 0 && output.channel_count > 0 {
            let full = probe_sample_rates(subsystem, &self.catalog, Some(&input), Some(&output));
            writeln!(
                out,
                "Supported standard sample rates ({}, full-duplex, {} bit, {} in / {} out channels) = {}",
                side, bits, input.channel_count, output.channel_count, full
            )?;
        }

        Ok(())
    }
}

fn write_device_entry<S: AudioSubsystem, W: Write>(
    subsystem: &S,
    out: &mut W,
    index: DeviceIndex,
    device: &DeviceDescriptor,
    is_default_input: bool,
    is_default_output: bool,
) -> Result<()> {
    write!(out, "{} #{}", SEPARATOR, index)?;
    if is_default_input {
        write!(out, " DefaultInput")?;
    }
    if is_default_output {
        write!(out, " DefaultOutput")?;
    }
    writeln!(out)?;

    writeln!(out, "Name                  = {}", device.name)?;
    writeln!(out, "Host API              = {}", host_api_label(subsystem, device))?;
    writeln!(
        out,
        "Max Inputs            = {}, Max Outputs = {}",
        device.max_input_channels, device.max_output_channels
    )?;

    match device.sample_rate_range {
        Some((min, max)) => writeln!(out, "Sample Rate Range     = {:.2} to {:.2} Hz", min, max)?,
        None => writeln!(out, "Sample Rate Range     = unknown")?,
    }
    if let Some(rate) = device.default_sample_rate {
        writeln!(out, "Default Sample Rate   = {:.2} Hz", rate)?;
    }

    if device.native_formats.is_empty() {
        writeln!(out, "Native Sample Formats = none reported")?;
    } else {
        let formats: Vec<&str> = device.native_formats.iter().map(|f| f.name()).collect();
        writeln!(out, "Native Sample Formats = {}", formats.join(", "))?;
    }

    Ok(())
}

fn host_api_label<S: AudioSubsystem>(subsystem: &S, device: &DeviceDescriptor) -> String {
    subsystem
        .host_api_name(device.host_api)
        .unwrap_or_else(|| format!("unknown host API {}", device.host_api))
}

/// Drop a default index that points past the device list.
fn resolve_default(
    index: Option<DeviceIndex>,
    devices: &[DeviceDescriptor],
    direction: Direction,
) -> Option<DeviceIndex> {
    match index {
        Some(i) if i < devices.len() => Some(i),
        Some(i) => {
            warn!(
                "Default {} device index {} is outside the device list ({} devices)",
                direction.label(),
                i,
                devices.len()
            );
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AudioError, ErrorCode};
    use crate::simulated::SimulatedSubsystem;

    fn entry_lines(report: &str) -> Vec<&str> {
        report
            .lines()
            .filter(|line| line.starts_with(&format!("{} #", SEPARATOR)))
            .collect()
    }

    #[test]
    fn test_empty_device_list() {
        let mut sim = SimulatedSubsystem::new();
        let report = Reporter::default().render(&mut sim).unwrap();

        assert!(report.starts_with("Number of devices = 0\n"));
        assert!(entry_lines(&report).is_empty());
        assert!(report.contains("No default input device available."));
        assert!(report.contains("No default output device available."));
        assert_eq!(sim.calls().terminate, 1);
    }

    #[test]
    fn test_negative_count_skips_descriptors() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(DeviceDescriptor::new("never listed", 0))
            .with_device_count(-1);

        let err = Reporter::default().render(&mut sim).unwrap_err();
        assert!(matches!(err, AudioError::Enumeration { .. }));
        assert_eq!(err.code(), ErrorCode(-1));
        assert_eq!(sim.calls().device_info, 0);
        assert_eq!(sim.calls().terminate, 1);
    }

    #[test]
    fn test_out_of_range_default_is_advisory() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(DeviceDescriptor::new("Only", 0).with_channels(1, 0))
            .with_default_input(5);
        let mut out = Vec::new();

        let summary = Reporter::default().run(&mut sim, &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert_eq!(summary.default_input, None);
        assert!(report.contains("No default input device available."));
        assert!(!report.contains("DefaultInput"));
    }

    #[test]
    fn test_sample_format_in_probe_label() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(DeviceDescriptor::new("Mic", 0).with_channels(1, 0))
            .with_default_input(0)
            .supporting_rates(&[48000.0]);

        let reporter = Reporter::new(RateCatalog::new([44100.0, 48000.0]), SampleFormat::Float32);
        let report = reporter.render(&mut sim).unwrap();
        assert!(report.contains(
            "Supported standard sample rates (input, half-duplex, 32 bit, 1 channels) = 48000.00"
        ));
    }
}
