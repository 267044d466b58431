//! Standard sample-rate probing
//!
//! Walks a catalog of candidate rates in order and asks the subsystem whether
//! each one is usable with a given input/output parameter combination.
//!
//! A probe call that fails for a reason other than rejecting the parameters
//! (a host error, for example) is treated like an unsupported rate: the rate
//! is left out of the result and a warning is logged. One flaky rate never
//! aborts a report.

use std::fmt;

use tracing::{debug, warn};

use crate::device::StreamParameters;
use crate::subsystem::AudioSubsystem;

/// Rates checked when no catalog is configured, in Hz
pub const STANDARD_SAMPLE_RATES: [f64; 13] = [
    8000.0, 9600.0, 11025.0, 12000.0, 16000.0, 22050.0, 24000.0, 32000.0, 44100.0, 48000.0,
    88200.0, 96000.0, 192000.0,
];

/// Ordered candidate rates
#[derive(Debug, Clone, PartialEq)]
pub struct RateCatalog {
    rates: Vec<f64>,
}

impl RateCatalog {
    /// Build a catalog from `rates`, stopping at the first non-positive entry.
    pub fn new<I: IntoIterator<Item = f64>>(rates: I) -> Self {
        Self {
            rates: rates.into_iter().take_while(|rate| *rate > 0.0).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_SAMPLE_RATES)
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Rates accepted by a probe, in catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportedRates(Vec<f64>);

impl SupportedRates {
    pub fn rates(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SupportedRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("None");
        }
        for (i, rate) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:.2}", rate)?;
        }
        Ok(())
    }
}

/// Probe every rate of `catalog` against the given parameters.
pub fn probe_sample_rates<S: AudioSubsystem + ?Sized>(
    subsystem: &S,
    catalog: &RateCatalog,
    input: Option<&StreamParameters>,
    output: Option<&StreamParameters>,
) -> SupportedRates {
    let mut supported = Vec::new();

    for &rate in catalog.rates() {
        match subsystem.is_format_supported(input, output, rate) {
            Ok(()) => supported.push(rate),
            Err(e) if e.is_capability_rejection() => {
                debug!("{:.2} Hz rejected: {}", rate, e);
            }
            Err(e) => {
                warn!("Sample-rate probe at {:.2} Hz failed, treating as unsupported: {}", rate, e);
            }
        }
    }

    SupportedRates(supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceDescriptor, SampleFormat};
    use crate::error::AudioError;
    use crate::simulated::SimulatedSubsystem;
    use crate::subsystem::Session;

    fn params() -> StreamParameters {
        StreamParameters::new(0, 2, SampleFormat::Int16)
    }

    fn device() -> DeviceDescriptor {
        DeviceDescriptor::new("Built-in", 0).with_channels(2, 2)
    }

    #[test]
    fn test_single_supported_rate_has_no_separator_artifacts() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(device())
            .supporting_rates(&[16000.0]);
        let session = Session::open(&mut sim).unwrap();

        let catalog = RateCatalog::new([8000.0, 16000.0, 44100.0]);
        let rates = probe_sample_rates(&*session, &catalog, Some(&params()), None);
        assert_eq!(rates.to_string(), "16000.00");
    }

    #[test]
    fn test_nothing_supported_prints_none() {
        let mut sim = SimulatedSubsystem::new().with_device(device()).supporting_rates(&[]);
        let session = Session::open(&mut sim).unwrap();

        let rates = probe_sample_rates(&*session, &RateCatalog::standard(), None, Some(&params()));
        assert!(rates.is_empty());
        assert_eq!(rates.to_string(), "None");
    }

    #[test]
    fn test_catalog_order_is_kept() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(device())
            .supporting_rates(&[8000.0, 48000.0, 44100.0]);
        let session = Session::open(&mut sim).unwrap();

        let catalog = RateCatalog::new([48000.0, 8000.0, 44100.0]);
        let rates = probe_sample_rates(&*session, &catalog, Some(&params()), None);
        assert_eq!(rates.rates(), &[48000.0, 8000.0, 44100.0]);
        assert_eq!(rates.to_string(), "48000.00, 8000.00, 44100.00");
    }

    #[test]
    fn test_probe_errors_count_as_unsupported() {
        let mut sim = SimulatedSubsystem::new()
            .with_device(device())
            .with_support_rule(|_, _, rate| {
                if rate == 16000.0 {
                    Err(AudioError::host("Simulated", "device busy"))
                } else {
                    Ok(())
                }
            });
        let session = Session::open(&mut sim).unwrap();

        let catalog = RateCatalog::new([8000.0, 16000.0, 44100.0]);
        let rates = probe_sample_rates(&*session, &catalog, Some(&params()), None);
        assert_eq!(rates.to_string(), "8000.00, 44100.00");
        drop(session);
        assert_eq!(sim.calls().is_format_supported, 3);
    }

    #[test]
    fn test_catalog_stops_at_terminator() {
        let catalog = RateCatalog::new([8000.0, 16000.0, -1.0, 44100.0]);
        assert_eq!(catalog.rates(), &[8000.0, 16000.0]);
        assert!(RateCatalog::new([0.0, 8000.0]).is_empty());
        assert_eq!(RateCatalog::default().len(), 13);
    }
}
