//! Version information and build metadata

use std::fmt;

/// Build metadata shown in the usage banner
pub struct VersionInfo {
    /// Package version from Cargo.toml
    pub version: &'static str,
    /// Target triple (e.g., x86_64-unknown-linux-gnu)
    pub target: &'static str,
    /// Build profile (debug or release)
    pub profile: &'static str,
    pub git_commit: Option<&'static str>,
    pub build_timestamp: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            target: env!("TARGET"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
            git_commit: option_env!("GIT_COMMIT_HASH"),
            build_timestamp: env!("BUILD_TIMESTAMP"),
        }
    }

    /// Names of the audio hosts compiled into this build
    pub fn audio_hosts(&self) -> Vec<&'static str> {
        devprobe_audio::cpal_backend::compiled_host_names()
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "devprobe {}", self.version)?;
        writeln!(f, "  Target:       {}", self.target)?;
        writeln!(f, "  Profile:      {}", self.profile)?;
        writeln!(f, "  Build Date:   {}", self.build_timestamp)?;

        if let Some(commit) = self.git_commit {
            writeln!(f, "  Git Commit:   {}", commit)?;
        }

        let hosts = self.audio_hosts();
        if !hosts.is_empty() {
            writeln!(f, "  Audio Hosts:  {}", hosts.join(", "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_block() {
        let text = VersionInfo::current().to_string();
        assert!(text.starts_with(&format!("devprobe {}", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains("Target:"));
        assert!(text.contains("Build Date:"));
    }
}
