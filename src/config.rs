// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform and controller configuration.
//!
//! The hub hands the platform a JSON block such as:
//!
//! ```json
//! {
//!   "platform": "wled-ws",
//!   "name": "WLED",
//!   "logging": false,
//!   "controllers": [
//!     {
//!       "name": "Desk",
//!       "address": "192.168.1.20",
//!       "presets": "Relax,Party",
//!       "showRealTimeModeButton": true,
//!       "resetRealTimeModeAfterStream": false
//!     }
//!   ]
//! }
//! ```
//!
//! Controller entries are immutable once loaded and keyed by address.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Delay between a transport error and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Top-level platform configuration.
///
/// # Examples
///
/// ```
/// use wled_bridge::config::PlatformConfig;
///
/// let config = PlatformConfig::from_json_str(
///     r#"{ "platform": "wled-ws", "controllers": [
///          { "name": "Desk", "address": "10.0.0.5", "presets": "Relax, Party" } ] }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.controllers.len(), 1);
/// assert_eq!(config.controllers[0].preset_names(), vec!["Relax", "Party"]);
/// assert!(!config.logging);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform identifier registered with the hub.
    #[serde(default)]
    pub platform: String,

    /// Display name of the platform instance.
    #[serde(default)]
    pub name: Option<String>,

    /// Include received device payloads in log lines.
    #[serde(default)]
    pub logging: bool,

    /// Configured controllers.
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
}

impl PlatformConfig {
    /// Parses the platform block from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the JSON is malformed or a controller
    /// entry lacks a required field.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the platform block from a file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Json` if its contents are invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Configuration for one physical controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Display name of the accessory.
    pub name: String,

    /// Network address of the controller (host or IP).
    pub address: String,

    /// Comma-separated names of the presets to expose as switches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<String>,

    /// Expose a switch toggling live data (ambilight) mode.
    #[serde(default)]
    pub show_real_time_mode_button: bool,

    /// When leaving live mode, stop ignoring live data once the stream ends
    /// instead of until the controller reboots.
    #[serde(default)]
    pub reset_real_time_mode_after_stream: bool,
}

impl ControllerConfig {
    /// Creates a controller entry with no presets and no live switch.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Sets the comma-separated preset list.
    #[must_use]
    pub fn with_presets(mut self, presets: impl Into<String>) -> Self {
        self.presets = Some(presets.into());
        self
    }

    /// Enables the live mode switch.
    #[must_use]
    pub fn with_live_switch(mut self) -> Self {
        self.show_real_time_mode_button = true;
        self
    }

    /// Sets whether live mode resets after the stream ends.
    #[must_use]
    pub fn with_reset_after_stream(mut self, reset: bool) -> Self {
        self.reset_real_time_mode_after_stream = reset;
        self
    }

    /// Returns the configured preset names, trimmed, without empty entries.
    ///
    /// A controller without a `presets` option has no preset names.
    #[must_use]
    pub fn preset_names(&self) -> Vec<&str> {
        self.presets
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Checks that the entry names a controller.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if the address or name is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::MissingField("address"));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("name"));
        }
        Ok(())
    }
}

/// Reconnection policy applied after a transport error.
///
/// The delay is fixed: there is no backoff and no retry limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the next connection attempt.
    pub delay: Duration,
}

impl ReconnectPolicy {
    /// Creates a policy with a custom delay.
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}
