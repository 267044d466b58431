//! Error types for audio subsystem queries

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AudioError>;

/// Native error code reported by the audio subsystem.
///
/// Codes are negative, so a failed call can be told apart from a device
/// count or index at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const NOT_INITIALIZED: ErrorCode = ErrorCode(-10000);
    pub const UNANTICIPATED_HOST_ERROR: ErrorCode = ErrorCode(-9999);
    pub const INVALID_CHANNEL_COUNT: ErrorCode = ErrorCode(-9998);
    pub const INVALID_SAMPLE_RATE: ErrorCode = ErrorCode(-9997);
    pub const INVALID_DEVICE: ErrorCode = ErrorCode(-9996);
    pub const SAMPLE_FORMAT_NOT_SUPPORTED: ErrorCode = ErrorCode(-9994);
    pub const DEVICE_UNAVAILABLE: ErrorCode = ErrorCode(-9985);

    /// Fixed message text for this code.
    pub fn text(self) -> &'static str {
        match self {
            Self::NOT_INITIALIZED => "Audio subsystem not initialized",
            Self::UNANTICIPATED_HOST_ERROR => "Unanticipated host error",
            Self::INVALID_CHANNEL_COUNT => "Invalid number of channels",
            Self::INVALID_SAMPLE_RATE => "Invalid sample rate",
            Self::INVALID_DEVICE => "Invalid device",
            Self::SAMPLE_FORMAT_NOT_SUPPORTED => "Sample format not supported",
            Self::DEVICE_UNAVAILABLE => "Device unavailable",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-specific detail attached to a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostErrorInfo {
    /// Host API the error came from (e.g. "ALSA")
    pub host_api: String,
    pub text: String,
}

impl fmt::Display for HostErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host_api, self.text)
    }
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio subsystem error: {0}")]
    Subsystem(String),

    #[error("Device enumeration failed ({code}): {}", .code.text())]
    Enumeration {
        code: ErrorCode,
        host: Option<HostErrorInfo>,
    },

    #[error("Audio subsystem not initialized")]
    NotInitialized,

    #[error("Invalid device index {0}")]
    InvalidDevice(usize),

    #[error("Invalid channel count {requested} (device maximum {max})")]
    InvalidChannelCount { requested: u16, max: u16 },

    #[error("Sample format not supported: {0}")]
    SampleFormatNotSupported(String),

    #[error("Invalid sample rate {0:.2} Hz")]
    InvalidSampleRate(f64),

    #[error("Host error: {0}")]
    HostError(HostErrorInfo),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    pub fn subsystem<S: Into<String>>(msg: S) -> Self {
        Self::Subsystem(msg.into())
    }

    pub fn enumeration(code: ErrorCode, host: Option<HostErrorInfo>) -> Self {
        Self::Enumeration { code, host }
    }

    pub fn host<A: Into<String>, S: Into<String>>(host_api: A, text: S) -> Self {
        Self::HostError(HostErrorInfo {
            host_api: host_api.into(),
            text: text.into(),
        })
    }

    /// Native error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Subsystem(_) => ErrorCode::DEVICE_UNAVAILABLE,
            Self::Enumeration { code, .. } => *code,
            Self::NotInitialized => ErrorCode::NOT_INITIALIZED,
            Self::InvalidDevice(_) => ErrorCode::INVALID_DEVICE,
            Self::InvalidChannelCount { .. } => ErrorCode::INVALID_CHANNEL_COUNT,
            Self::SampleFormatNotSupported(_) => ErrorCode::SAMPLE_FORMAT_NOT_SUPPORTED,
            Self::InvalidSampleRate(_) => ErrorCode::INVALID_SAMPLE_RATE,
            Self::HostError(_) | Self::Io(_) => ErrorCode::UNANTICIPATED_HOST_ERROR,
        }
    }

    /// Host-specific detail, when the failure carries one.
    pub fn host_detail(&self) -> Option<&HostErrorInfo> {
        match self {
            Self::Enumeration { host, .. } => host.as_ref(),
            Self::HostError(info) => Some(info),
            _ => None,
        }
    }

    /// True when the subsystem rejected the stream parameters themselves,
    /// as opposed to failing to answer.
    pub fn is_capability_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidDevice(_)
                | Self::InvalidChannelCount { .. }
                | Self::SampleFormatNotSupported(_)
                | Self::InvalidSampleRate(_)
        )
    }
}
