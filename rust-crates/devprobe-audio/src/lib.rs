//! Devprobe Audio
//!
//! Enumerates the audio devices a platform exposes and probes which standard
//! sample rates the default input and output devices accept.
//!
//! ## Architecture
//!
//! ```text
//! Reporter
//!   │
//!   ├─> Session (initialize on open, terminate on drop)
//!   │     │
//!   │     └─> AudioSubsystem
//!   │           ├─> CpalSubsystem (every cpal host, snapshotted at initialize)
//!   │           └─> SimulatedSubsystem (in-memory, for tests)
//!   │
//!   └─> probe_sample_rates (RateCatalog, catalog order)
//! ```

pub mod cpal_backend;
pub mod device;
pub mod error;
pub mod probe;
pub mod report;
pub mod simulated;
pub mod subsystem;

pub use cpal_backend::CpalSubsystem;
pub use device::{DeviceDescriptor, DeviceIndex, HostApiIndex, SampleFormat, StreamParameters};
pub use error::{AudioError, ErrorCode, HostErrorInfo, Result};
pub use probe::{probe_sample_rates, RateCatalog, SupportedRates, STANDARD_SAMPLE_RATES};
pub use report::{ReportSummary, Reporter};
pub use simulated::SimulatedSubsystem;
pub use subsystem::{AudioSubsystem, Session};
