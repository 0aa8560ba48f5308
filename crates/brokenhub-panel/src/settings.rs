//! Process-wide settings, resolved once at startup.
//!
//! Precedence: command-line flags / environment, then the optional TOML
//! settings file, then built-in defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Path the daemon reads its configuration from.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/brokenhub.conf";
/// Control script accepting a `reload` argument.
pub const DEFAULT_CONTROL_COMMAND: &str = "/etc/init.d/brokenhub";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5001";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub listen_addr: SocketAddr,
    pub config_path: PathBuf,
    pub control_command: PathBuf,
    /// Kill the control command after this many seconds. Unset waits forever.
    pub reload_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 5001))),
            config_path: DEFAULT_CONFIG_PATH.into(),
            control_command: DEFAULT_CONTROL_COMMAND.into(),
            reload_timeout_secs: None,
        }
    }
}

/// Values given explicitly on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen_addr: Option<SocketAddr>,
    pub config_path: Option<PathBuf>,
    pub control_command: Option<PathBuf>,
    pub reload_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        if input.trim().is_empty() {
            return Ok(Settings::default());
        }
        toml::from_str(input).context("invalid settings TOML")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&input)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(addr) = overrides.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(path) = overrides.config_path {
            self.config_path = path;
        }
        if let Some(command) = overrides.control_command {
            self.control_command = command;
        }
        if let Some(secs) = overrides.reload_timeout_secs {
            self.reload_timeout_secs = Some(secs);
        }
        self
    }

    /// `0` means no timeout.
    pub fn reload_timeout(&self) -> Option<Duration> {
        self.reload_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
