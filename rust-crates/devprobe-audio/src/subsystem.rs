//! Audio subsystem interface and scoped session
//!
//! The subsystem must be initialized before any query and terminated exactly
//! once afterwards. [`Session`] owns that discipline: it initializes on open
//! and terminates on drop, so every exit path (including `?`) releases the
//! subsystem.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::device::{DeviceDescriptor, DeviceIndex, HostApiIndex, StreamParameters};
use crate::error::{HostErrorInfo, Result};

/// Query surface of an audio subsystem
pub trait AudioSubsystem {
    fn initialize(&mut self) -> Result<()>;

    fn terminate(&mut self) -> Result<()>;

    /// Number of devices, or the enumeration failure with its native code.
    fn device_count(&self) -> Result<usize>;

    fn device_info(&self, index: DeviceIndex) -> Result<DeviceDescriptor>;

    fn host_api_name(&self, host_api: HostApiIndex) -> Option<String>;

    fn default_input_device(&self) -> Option<DeviceIndex>;

    fn default_output_device(&self) -> Option<DeviceIndex>;

    /// `Ok(())` when a stream with these parameters could be opened at
    /// `sample_rate`. At least one side must be given.
    fn is_format_supported(
        &self,
        input: Option<&StreamParameters>,
        output: Option<&StreamParameters>,
        sample_rate: f64,
    ) -> Result<()>;

    /// Detail of the most recent host-level failure, if any.
    fn last_host_error(&self) -> Option<HostErrorInfo>;
}

/// Initialized subsystem handle, terminated on drop
pub struct Session<'a, S: AudioSubsystem> {
    subsystem: &'a mut S,
    open: bool,
}

impl<'a, S: AudioSubsystem> Session<'a, S> {
    /// Initialize the subsystem and take the handle.
    ///
    /// On failure the subsystem is still terminated (best effort) before the
    /// error is returned.
    pub fn open(subsystem: &'a mut S) -> Result<Self> {
        if let Err(e) = subsystem.initialize() {
            if let Err(te) = subsystem.terminate() {
                debug!("terminate after failed initialize: {}", te);
            }
            return Err(e);
        }
        debug!("audio subsystem initialized");

        Ok(Self {
            subsystem,
            open: true,
        })
    }

    /// Terminate now and report the result.
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.subsystem.terminate()
    }
}

impl<S: AudioSubsystem> Deref for Session<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.subsystem
    }
}

impl<S: AudioSubsystem> DerefMut for Session<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.subsystem
    }
}

impl<S: AudioSubsystem> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        match self.subsystem.terminate() {
            Ok(()) => debug!("audio subsystem terminated"),
            Err(e) => warn!("Failed to terminate audio subsystem: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::simulated::SimulatedSubsystem;

    #[test]
    fn test_drop_terminates_once() {
        let mut sim = SimulatedSubsystem::new();
        {
            let session = Session::open(&mut sim).unwrap();
            assert_eq!(session.device_count().unwrap(), 0);
        }
        assert_eq!(sim.calls().initialize, 1);
        assert_eq!(sim.calls().terminate, 1);
    }

    #[test]
    fn test_close_does_not_terminate_twice() {
        let mut sim = SimulatedSubsystem::new();
        let session = Session::open(&mut sim).unwrap();
        session.close().unwrap();
        assert_eq!(sim.calls().terminate, 1);
    }

    #[test]
    fn test_failed_initialize_still_terminates() {
        let mut sim = SimulatedSubsystem::new().fail_initialize("no hosts");
        let err = Session::open(&mut sim).err().unwrap();
        assert!(matches!(err, AudioError::Subsystem(_)));
        assert_eq!(sim.calls().terminate, 1);
    }

    #[test]
    fn test_terminate_failure_is_not_propagated_on_drop() {
        let mut sim = SimulatedSubsystem::new().fail_terminate();
        {
            let _session = Session::open(&mut sim).unwrap();
        }
        assert_eq!(sim.calls().terminate, 1);
    }
}
