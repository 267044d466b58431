//! Audio subsystem backed by cpal
//!
//! `initialize` walks every available cpal host, snapshots each device's
//! supported input and output configuration ranges and resolves the default
//! devices of the default host by name. All later queries are answered from
//! that snapshot until `terminate`.

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::{debug, info, warn};

use crate::device::{DeviceDescriptor, DeviceIndex, HostApiIndex, SampleFormat, StreamParameters};
use crate::error::{AudioError, ErrorCode, HostErrorInfo, Result};
use crate::subsystem::AudioSubsystem;

/// One supported configuration range of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRange {
    pub channels: u16,
    pub min_rate: u32,
    pub max_rate: u32,
    pub format: SampleFormat,
}

impl ConfigRange {
    fn from_cpal(range: &cpal::SupportedStreamConfigRange) -> Option<Self> {
        Some(Self {
            channels: range.channels(),
            min_rate: range.min_sample_rate().0,
            max_rate: range.max_sample_rate().0,
            format: map_sample_format(range.sample_format())?,
        })
    }

    fn contains_rate(&self, rate: u32) -> bool {
        self.min_rate <= rate && rate <= self.max_rate
    }
}

/// Names of every host API this build of cpal supports on the platform.
pub fn compiled_host_names() -> Vec<&'static str> {
    cpal::ALL_HOSTS.iter().map(|id| id.name()).collect()
}

fn map_sample_format(format: cpal::SampleFormat) -> Option<SampleFormat> {
    match format {
        cpal::SampleFormat::I8 => Some(SampleFormat::Int8),
        cpal::SampleFormat::U8 => Some(SampleFormat::UInt8),
        cpal::SampleFormat::I16 => Some(SampleFormat::Int16),
        cpal::SampleFormat::U16 => Some(SampleFormat::UInt16),
        cpal::SampleFormat::I32 => Some(SampleFormat::Int32),
        cpal::SampleFormat::U32 => Some(SampleFormat::UInt32),
        cpal::SampleFormat::I64 => Some(SampleFormat::Int64),
        cpal::SampleFormat::U64 => Some(SampleFormat::UInt64),
        cpal::SampleFormat::F32 => Some(SampleFormat::Float32),
        cpal::SampleFormat::F64 => Some(SampleFormat::Float64),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct DeviceSnapshot {
    descriptor: DeviceDescriptor,
    inputs: Vec<ConfigRange>,
    outputs: Vec<ConfigRange>,
}

impl DeviceSnapshot {
    fn new(
        name: String,
        host_api: HostApiIndex,
        inputs: Vec<ConfigRange>,
        outputs: Vec<ConfigRange>,
        default_sample_rate: Option<f64>,
    ) -> Self {
        fn max_channels(ranges: &[ConfigRange]) -> u16 {
            ranges.iter().map(|r| r.channels).max().unwrap_or(0)
        }
        let all = || inputs.iter().chain(outputs.iter());

        let mut descriptor = DeviceDescriptor::new(name, host_api)
            .with_channels(max_channels(&inputs), max_channels(&outputs))
            .with_formats(all().map(|r| r.format));

        let min_rate = all().map(|r| r.min_rate).min();
        let max_rate = all().map(|r| r.max_rate).max();
        if let (Some(min), Some(max)) = (min_rate, max_rate) {
            descriptor = descriptor.with_sample_rate_range(min as f64, max as f64);
        }
        descriptor.default_sample_rate = default_sample_rate;

        Self {
            descriptor,
            inputs,
            outputs,
        }
    }

    fn ranges(&self, input: bool) -> (&[ConfigRange], u16) {
        if input {
            (self.inputs.as_slice(), self.descriptor.max_input_channels)
        } else {
            (self.outputs.as_slice(), self.descriptor.max_output_channels)
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    host_apis: Vec<String>,
    devices: Vec<DeviceSnapshot>,
    default_input: Option<DeviceIndex>,
    default_output: Option<DeviceIndex>,
    enumeration_error: Option<HostErrorInfo>,
}

/// cpal-backed [`AudioSubsystem`]
#[derive(Debug)]
pub struct CpalSubsystem {
    host_filter: Vec<String>,
    format_conversion: bool,
    snapshot: Option<Snapshot>,
    last_host_error: Option<HostErrorInfo>,
}

impl CpalSubsystem {
    pub fn new() -> Self {
        Self {
            host_filter: Vec::new(),
            format_conversion: true,
            snapshot: None,
            last_host_error: None,
        }
    }

    /// Only enumerate hosts whose name matches one of `hosts`
    /// (case-insensitive). An empty list means every available host.
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.host_filter = hosts.into_iter().map(|h| h.into().to_lowercase()).collect();
        self
    }

    /// When enabled (the default), a probe accepts any sample format the
    /// device offers at the requested channel count and rate, since the
    /// host converts samples. When disabled the requested format must be
    /// native to the device.
    pub fn with_format_conversion(mut self, enabled: bool) -> Self {
        self.format_conversion = enabled;
        self
    }

    fn host_selected(&self, name: &str) -> bool {
        self.host_filter.is_empty() || self.host_filter.contains(&name.to_lowercase())
    }

    fn snapshot(&self) -> Result<&Snapshot> {
        self.snapshot.as_ref().ok_or(AudioError::NotInitialized)
    }

    fn check_side(&self, snapshot: &Snapshot, params: &StreamParameters, rate: u32, input: bool) -> Result<()> {
        let device = snapshot
            .devices
            .get(params.device)
            .ok_or(AudioError::InvalidDevice(params.device))?;
        let (ranges, max) = device.ranges(input);

        if params.channel_count == 0 || params.channel_count > max {
            return Err(AudioError::InvalidChannelCount {
                requested: params.channel_count,
                max,
            });
        }

        let format_ok = |r: &&ConfigRange| self.format_conversion || r.format == params.sample_format;
        if !ranges.iter().any(|r| format_ok(&r)) {
            return Err(AudioError::SampleFormatNotSupported(params.sample_format.to_string()));
        }

        let mut candidates = ranges
            .iter()
            .filter(format_ok)
            .filter(|r| r.channels == params.channel_count)
            .peekable();
        if candidates.peek().is_none() {
            return Err(AudioError::InvalidChannelCount {
                requested: params.channel_count,
                max,
            });
        }
        if candidates.any(|r| r.contains_rate(rate)) {
            Ok(())
        } else {
            Err(AudioError::InvalidSampleRate(rate as f64))
        }
    }
}

impl Default for CpalSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_ranges<I>(
    configs: std::result::Result<I, cpal::SupportedStreamConfigsError>,
    name: &str,
    side: &str,
) -> Vec<ConfigRange>
where
    I: Iterator<Item = cpal::SupportedStreamConfigRange>,
{
    match configs {
        Ok(configs) => configs.filter_map(|range| ConfigRange::from_cpal(&range)).collect(),
        Err(e) => {
            debug!("{}: no {} configurations ({})", name, side, e);
            Vec::new()
        }
    }
}

impl AudioSubsystem for CpalSubsystem {
    fn initialize(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Ok(());
        }

        let default_host_id = cpal::default_host().id();
        let mut snapshot = Snapshot::default();

        for host_id in cpal::available_hosts() {
            let host_name = host_id.name();
            if !self.host_selected(host_name) {
                debug!("Skipping host {}", host_name);
                continue;
            }

            let host = match cpal::host_from_id(host_id) {
                Ok(host) => host,
                Err(e) => {
                    warn!("Host {} unavailable: {}", host_name, e);
                    continue;
                }
            };
            let host_api = snapshot.host_apis.len();
            snapshot.host_apis.push(host_name.to_string());

            let devices = match host.devices() {
                Ok(devices) => devices,
                Err(e) => {
                    let info = HostErrorInfo {
                        host_api: host_name.to_string(),
                        text: e.to_string(),
                    };
                    warn!("Failed to enumerate devices of {}: {}", host_name, e);
                    snapshot.enumeration_error = Some(info.clone());
                    self.last_host_error = Some(info);
                    continue;
                }
            };

            let (default_input_name, default_output_name) = if host_id == default_host_id {
                (
                    host.default_input_device().and_then(|d| d.name().ok()),
                    host.default_output_device().and_then(|d| d.name().ok()),
                )
            } else {
                (None, None)
            };

            for device in devices {
                let index = snapshot.devices.len();
                let name = device
                    .name()
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));

                let inputs = collect_ranges(device.supported_input_configs(), &name, "input");
                let outputs = collect_ranges(device.supported_output_configs(), &name, "output");
                let default_sample_rate = device
                    .default_input_config()
                    .or_else(|_| device.default_output_config())
                    .ok()
                    .map(|c| c.sample_rate().0 as f64);

                if snapshot.default_input.is_none() && default_input_name.as_deref() == Some(name.as_str()) {
                    snapshot.default_input = Some(index);
                }
                if snapshot.default_output.is_none() && default_output_name.as_deref() == Some(name.as_str()) {
                    snapshot.default_output = Some(index);
                }

                snapshot
                    .devices
                    .push(DeviceSnapshot::new(name, host_api, inputs, outputs, default_sample_rate));
            }
        }

        if snapshot.host_apis.is_empty() {
            return Err(AudioError::subsystem("No audio host could be opened"));
        }

        info!(
            "Audio subsystem ready: {} hosts, {} devices",
            snapshot.host_apis.len(),
            snapshot.devices.len()
        );
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        if self.snapshot.take().is_none() {
            return Err(AudioError::NotInitialized);
        }
        Ok(())
    }

    fn device_count(&self) -> Result<usize> {
        let snapshot = self.snapshot()?;
        match &snapshot.enumeration_error {
            Some(info) => Err(AudioError::enumeration(
                ErrorCode::UNANTICIPATED_HOST_ERROR,
                Some(info.clone()),
            )),
            None => Ok(snapshot.devices.len()),
        }
    }

    fn device_info(&self, index: DeviceIndex) -> Result<DeviceDescriptor> {
        self.snapshot()?
            .devices
            .get(index)
            .map(|d| d.descriptor.clone())
            .ok_or(AudioError::InvalidDevice(index))
    }

    fn host_api_name(&self, host_api: HostApiIndex) -> Option<String> {
        self.snapshot.as_ref()?.host_apis.get(host_api).cloned()
    }

    fn default_input_device(&self) -> Option<DeviceIndex> {
        self.snapshot.as_ref()?.default_input
    }

    fn default_output_device(&self) -> Option<DeviceIndex> {
        self.snapshot.as_ref()?.default_output
    }

    fn is_format_supported(
        &self,
        input: Option<&StreamParameters>,
        output: Option<&StreamParameters>,
        sample_rate: f64,
    ) -> Result<()> {
        let snapshot = self.snapshot()?;
        if input.is_none() && output.is_none() {
            return Err(AudioError::subsystem("Format query without stream parameters"));
        }
        if !(sample_rate > 0.0 && sample_rate.fract() == 0.0 && sample_rate <= u32::MAX as f64) {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        let rate = sample_rate as u32;

        if let Some(params) = input {
            self.check_side(snapshot, params, rate, true)?;
        }
        if let Some(params) = output {
            self.check_side(snapshot, params, rate, false)?;
        }
        Ok(())
    }

    fn last_host_error(&self) -> Option<HostErrorInfo> {
        self.last_host_error.clone()
    }
}
