//! Configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use devprobe_audio::{CpalSubsystem, RateCatalog, Reporter, SampleFormat, STANDARD_SAMPLE_RATES};
use serde::Deserialize;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DEVPROBE_CONFIG";

/// Probe configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Path the configuration was loaded from (or would be)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Sample format used for every probe (default: int16)
    pub sample_format: SampleFormat,

    /// Candidate rates in probe order. A non-positive entry ends the list.
    pub candidate_rates: Vec<f64>,

    /// Host APIs to enumerate, e.g. ["ALSA"]. Empty = all available hosts.
    pub hosts: Vec<String>,

    /// Only accept formats the device supports natively
    pub native_formats_only: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            sample_format: SampleFormat::Int16,
            candidate_rates: STANDARD_SAMPLE_RATES.to_vec(),
            hosts: Vec::new(),
            native_formats_only: false,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from `$DEVPROBE_CONFIG`, else from the default
    /// location, else use defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: ProbeConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn catalog(&self) -> RateCatalog {
        RateCatalog::new(self.candidate_rates.iter().copied())
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.catalog(), self.sample_format)
    }

    pub fn subsystem(&self) -> CpalSubsystem {
        CpalSubsystem::new()
            .with_hosts(self.hosts.iter().cloned())
            .with_format_conversion(!self.native_formats_only)
    }

    fn default_config_path() -> PathBuf {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("com.devprobe")
        } else {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("devprobe")
        };

        config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.sample_format, SampleFormat::Int16);
        assert_eq!(config.catalog(), RateCatalog::standard());
        assert!(config.hosts.is_empty());
        assert!(config.config_path.ends_with("config.toml"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sample_format = \"float32\"").unwrap();
        writeln!(file, "hosts = [\"ALSA\"]").unwrap();

        let config = ProbeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.sample_format, SampleFormat::Float32);
        assert_eq!(config.hosts, vec!["ALSA".to_string()]);
        assert_eq!(config.candidate_rates, STANDARD_SAMPLE_RATES.to_vec());
        assert_eq!(config.config_path, file.path());
    }

    #[test]
    fn test_catalog_terminator() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "candidate_rates = [44100.0, 48000.0, -1.0, 96000.0]").unwrap();

        let config = ProbeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.catalog().rates(), &[44100.0, 48000.0]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProbeConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_unknown_sample_format_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sample_format = \"int12\"").unwrap();

        let err = ProbeConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
