//! Device descriptors and stream parameters

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a device in the subsystem's device list.
pub type DeviceIndex = usize;

/// Position of a host API in the subsystem's host list.
pub type HostApiIndex = usize;

/// Sample formats a device may accept natively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Int8,
    UInt8,
    #[default]
    Int16,
    UInt16,
    Int24,
    PackedInt24,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl SampleFormat {
    /// Width of one sample in bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 => 16,
            Self::Int24 | Self::PackedInt24 => 24,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int24 => "Int24",
            Self::PackedInt24 => "PackedInt24",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static capability record for one audio device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub host_api: HostApiIndex,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    /// Sorted, without duplicates
    pub native_formats: Vec<SampleFormat>,
    /// Lowest and highest rate over all configurations, if any were reported
    pub sample_rate_range: Option<(f64, f64)>,
    /// Rate of the device's default stream configuration
    pub default_sample_rate: Option<f64>,
}

impl DeviceDescriptor {
    pub fn new<S: Into<String>>(name: S, host_api: HostApiIndex) -> Self {
        Self {
            name: name.into(),
            host_api,
            max_input_channels: 0,
            max_output_channels: 0,
            native_formats: Vec::new(),
            sample_rate_range: None,
            default_sample_rate: None,
        }
    }

    pub fn with_channels(mut self, inputs: u16, outputs: u16) -> Self {
        self.max_input_channels = inputs;
        self.max_output_channels = outputs;
        self
    }

    pub fn with_formats<I: IntoIterator<Item = SampleFormat>>(mut self, formats: I) -> Self {
        let mut formats: Vec<SampleFormat> = formats.into_iter().collect();
        formats.sort();
        formats.dedup();
        self.native_formats = formats;
        self
    }

    pub fn with_sample_rate_range(mut self, min: f64, max: f64) -> Self {
        self.sample_rate_range = Some((min, max));
        self
    }

    pub fn with_default_sample_rate(mut self, rate: f64) -> Self {
        self.default_sample_rate = Some(rate);
        self
    }
}

/// One side of a stream as seen by a format-support query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamParameters {
    pub device: DeviceIndex,
    pub channel_count: u16,
    pub sample_format: SampleFormat,
}

impl StreamParameters {
    pub fn new(device: DeviceIndex, channel_count: u16, sample_format: SampleFormat) -> Self {
        Self {
            device,
            channel_count,
            sample_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_sorted_and_deduplicated() {
        let device = DeviceDescriptor::new("hw:0", 0).with_formats([
            SampleFormat::Float32,
            SampleFormat::Int16,
            SampleFormat::Float32,
        ]);
        assert_eq!(device.native_formats, vec![SampleFormat::Int16, SampleFormat::Float32]);
    }

    #[test]
    fn test_sample_format_from_config_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: SampleFormat,
        }

        let parsed: Wrapper = toml::from_str("format = \"float32\"").unwrap();
        assert_eq!(parsed.format, SampleFormat::Float32);
        assert_eq!(parsed.format.bits(), 32);
        assert_eq!(SampleFormat::default().bits(), 16);
    }
}
