//! Command-line surface
//!
//! The tool takes no options. Any argument at all prints the usage and
//! license banner and exits with [`BANNER_EXIT_CODE`].

use std::ffi::OsString;

use clap::Parser;
use devprobe_audio::{AudioError, HostErrorInfo};

use crate::version::VersionInfo;

/// Exit code after printing the banner
pub const BANNER_EXIT_CODE: i32 = 1;

/// Exit code for failures that carry no native audio error code
pub const GENERIC_FAILURE_EXIT_CODE: i32 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "devprobe",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse `args` (program name first). Every raw argument counts, so
    /// input clap refuses or swallows (a lone `--`) still selects the banner.
    pub fn parse_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let raw: Vec<String> = args
            .iter()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        match Self::try_parse_from(args.iter().cloned()) {
            Ok(cli) if cli.args.len() == raw.len() => cli,
            _ => Self { args: raw },
        }
    }

    pub fn wants_banner(&self) -> bool {
        !self.args.is_empty()
    }
}

/// Usage, sample-rate note, license and build information.
pub fn banner() -> String {
    let mut text = String::new();
    text.push_str("devprobe usage:\n");
    text.push_str(
        "'devprobe' lists the audio devices of this computer and displays the properties \
         of the default devices for sound input and output.\n\n",
    );
    text.push_str(
        "Note: the list of supported sample rates reflects the 'standard' rates offered by the \
         operating system or the driver software of the sound device. This is not necessarily \
         identical to the rates supported natively by the hardware itself, as the operating \
         system or the driver may convert sample rates. The list may also be incomplete because \
         only 'standard' rates are checked, so other rates may still work with the device.\n\n",
    );
    text.push_str(
        "The candidate rates, the probe sample format and the audio hosts to enumerate can be \
         set in a TOML config file (see DEVPROBE_CONFIG). Set RUST_LOG=debug for diagnostics \
         on standard error.\n\n",
    );
    text.push_str(
        "devprobe is free software; you can redistribute it and/or modify it under the terms \
         of the GNU General Public License as published by the Free Software Foundation; \
         either version 2 of the License, or (at your option) any later version.\n\n",
    );
    text.push_str(
        "devprobe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; \
         without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR \
         PURPOSE. See the GNU General Public License for more details.\n\n",
    );
    text.push_str(&VersionInfo::current().to_string());
    text
}

/// Standard-error text and exit code for a failed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub exit_code: i32,
    pub message: String,
}

impl Failure {
    /// Build the diagnostic for `err`.
    ///
    /// Audio subsystem failures anywhere in the chain report their native
    /// error number, message text and host detail, and exit with the native
    /// code. Anything else exits with [`GENERIC_FAILURE_EXIT_CODE`].
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::with_last_host_error(err, None)
    }

    /// Like [`Failure::from_error`], falling back to the subsystem's last
    /// host error when the failure itself carries no host detail.
    pub fn with_last_host_error(err: &anyhow::Error, last_host_error: Option<HostErrorInfo>) -> Self {
        let audio = err.chain().find_map(|e| e.downcast_ref::<AudioError>());

        match audio {
            Some(audio) => {
                let code = audio.code();
                let mut message = String::from("An error occurred while using the audio subsystem\n");
                message.push_str(&format!("Error number: {}\n", code));
                message.push_str(&format!("Error message: {}\n", code.text()));
                if let Some(host) = audio.host_detail().cloned().or(last_host_error) {
                    message.push_str(&format!("Host error: {}\n", host));
                }
                Self {
                    exit_code: code.0,
                    message,
                }
            }
            None => Self {
                exit_code: GENERIC_FAILURE_EXIT_CODE,
                message: format!("Error: {:#}\n", err),
            },
        }
    }
}
