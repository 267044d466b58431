//! In-memory audio subsystem
//!
//! Serves a fixed device table and a pluggable rate-support rule, and counts
//! every call so tests can check how the reporter drives the subsystem.

use std::cell::Cell;

use crate::device::{DeviceDescriptor, DeviceIndex, HostApiIndex, StreamParameters};
use crate::error::{AudioError, ErrorCode, HostErrorInfo, Result};
use crate::subsystem::AudioSubsystem;

type SupportRule = Box<dyn Fn(Option<&StreamParameters>, Option<&StreamParameters>, f64) -> Result<()>>;

/// Number of times each subsystem entry point was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub initialize: usize,
    pub terminate: usize,
    pub device_info: usize,
    pub is_format_supported: usize,
}

pub struct SimulatedSubsystem {
    host_apis: Vec<String>,
    devices: Vec<DeviceDescriptor>,
    count_override: Option<i32>,
    default_input: Option<DeviceIndex>,
    default_output: Option<DeviceIndex>,
    support: SupportRule,
    initialize_failure: Option<String>,
    terminate_fails: bool,
    initialized: bool,
    host_error: Option<HostErrorInfo>,
    initialize_calls: usize,
    terminate_calls: usize,
    device_info_calls: Cell<usize>,
    probe_calls: Cell<usize>,
}

impl SimulatedSubsystem {
    /// Empty subsystem with one host API; every probe is accepted.
    pub fn new() -> Self {
        Self {
            host_apis: vec!["Simulated".to_string()],
            devices: Vec::new(),
            count_override: None,
            default_input: None,
            default_output: None,
            support: Box::new(|_, _, _| Ok(())),
            initialize_failure: None,
            terminate_fails: false,
            initialized: false,
            host_error: None,
            initialize_calls: 0,
            terminate_calls: 0,
            device_info_calls: Cell::new(0),
            probe_calls: Cell::new(0),
        }
    }

    pub fn with_host_api<S: Into<String>>(mut self, name: S) -> Self {
        self.host_apis.push(name.into());
        self
    }

    pub fn with_device(mut self, device: DeviceDescriptor) -> Self {
        self.devices.push(device);
        self
    }

    /// Report `count` as the device count regardless of the table.
    /// A negative value makes enumeration fail with that code.
    pub fn with_device_count(mut self, count: i32) -> Self {
        self.count_override = Some(count);
        self
    }

    pub fn with_default_input(mut self, index: DeviceIndex) -> Self {
        self.default_input = Some(index);
        self
    }

    pub fn with_default_output(mut self, index: DeviceIndex) -> Self {
        self.default_output = Some(index);
        self
    }

    /// Accept exactly the rates in `rates`.
    pub fn supporting_rates(self, rates: &[f64]) -> Self {
        let rates = rates.to_vec();
        self.with_support_rule(move |_, _, rate| {
            if rates.contains(&rate) {
                Ok(())
            } else {
                Err(AudioError::InvalidSampleRate(rate))
            }
        })
    }

    pub fn with_support_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(Option<&StreamParameters>, Option<&StreamParameters>, f64) -> Result<()> + 'static,
    {
        self.support = Box::new(rule);
        self
    }

    pub fn with_host_error<A: Into<String>, S: Into<String>>(mut self, host_api: A, text: S) -> Self {
        self.host_error = Some(HostErrorInfo {
            host_api: host_api.into(),
            text: text.into(),
        });
        self
    }

    pub fn fail_initialize<S: Into<String>>(mut self, msg: S) -> Self {
        self.initialize_failure = Some(msg.into());
        self
    }

    pub fn fail_terminate(mut self) -> Self {
        self.terminate_fails = true;
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            initialize: self.initialize_calls,
            terminate: self.terminate_calls,
            device_info: self.device_info_calls.get(),
            is_format_supported: self.probe_calls.get(),
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(AudioError::NotInitialized)
        }
    }
}

impl Default for SimulatedSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSubsystem for SimulatedSubsystem {
    fn initialize(&mut self) -> Result<()> {
        self.initialize_calls += 1;
        if let Some(msg) = &self.initialize_failure {
            return Err(AudioError::subsystem(msg.clone()));
        }
        self.initialized = true;
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        self.terminate_calls += 1;
        self.initialized = false;
        if self.terminate_fails {
            return Err(AudioError::subsystem("terminate failed"));
        }
        Ok(())
    }

    fn device_count(&self) -> Result<usize> {
        self.ensure_initialized()?;
        match self.count_override {
            Some(count) if count < 0 => Err(AudioError::enumeration(
                ErrorCode(count),
                self.host_error.clone(),
            )),
            Some(count) => Ok(count as usize),
            None => Ok(self.devices.len()),
        }
    }

    fn device_info(&self, index: DeviceIndex) -> Result<DeviceDescriptor> {
        self.ensure_initialized()?;
        self.device_info_calls.set(self.device_info_calls.get() + 1);
        self.devices
            .get(index)
            .cloned()
            .ok_or(AudioError::InvalidDevice(index))
    }

    fn host_api_name(&self, host_api: HostApiIndex) -> Option<String> {
        self.host_apis.get(host_api).cloned()
    }

    fn default_input_device(&self) -> Option<DeviceIndex> {
        self.default_input
    }

    fn default_output_device(&self) -> Option<DeviceIndex> {
        self.default_output
    }

    fn is_format_supported(
        &self,
        input: Option<&StreamParameters>,
        output: Option<&StreamParameters>,
        sample_rate: f64,
    ) -> Result<()> {
        self.ensure_initialized()?;
        self.probe_calls.set(self.probe_calls.get() + 1);
        (self.support)(input, output, sample_rate)
    }

    fn last_host_error(&self) -> Option<HostErrorInfo> {
        self.host_error.clone()
    }
}
