// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payloads pushed by the device client.
//!
//! Field names accept both the controller's JSON API keys (`bri`, `lor`,
//! `ps`, `seg[].col`, ...) and the long names used by client libraries
//! (`brightness`, `liveDataOverride`, `presetId`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::RgbColor;

/// Sentinel id meaning "no preset" or "no playlist".
pub const NO_PRESET: i32 = -1;

fn no_preset() -> i32 {
    NO_PRESET
}

/// Current state of a controller.
///
/// # Examples
///
/// ```
/// use wled_bridge::client::DeviceState;
///
/// let state = DeviceState::from_json(
///     r#"{"on":true,"bri":128,"lor":0,"ps":3,"pl":-1,"seg":[{"col":[[255,0,0]]}]}"#,
/// )
/// .unwrap();
///
/// assert!(state.on);
/// assert!(state.is_live());
/// assert_eq!(state.preset_id, 3);
/// assert_eq!(state.primary_color().unwrap().red(), 255);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Whether the strip is on.
    #[serde(default)]
    pub on: bool,

    /// Master brightness on the device scale (0-255).
    #[serde(default, alias = "bri")]
    pub brightness: u8,

    /// Live data override; `0` means live data is being shown.
    #[serde(default, alias = "lor", skip_serializing_if = "Option::is_none")]
    pub live_data_override: Option<u8>,

    /// Active preset id, `-1` if none.
    #[serde(default = "no_preset", alias = "ps")]
    pub preset_id: i32,

    /// Active playlist id, `-1` if none.
    #[serde(default = "no_preset", alias = "pl")]
    pub playlist_id: i32,

    /// LED segments.
    #[serde(default, alias = "seg")]
    pub segments: Vec<Segment>,
}

impl DeviceState {
    /// Parses a state payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload is not a valid state object.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns true if the controller is currently showing live data.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live_data_override == Some(0)
    }

    /// Returns the first color of the first segment.
    #[must_use]
    pub fn primary_color(&self) -> Option<RgbColor> {
        self.segments.first()?.colors.first()?.to_rgb()
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            on: false,
            brightness: 0,
            live_data_override: None,
            preset_id: NO_PRESET,
            playlist_id: NO_PRESET,
            segments: Vec::new(),
        }
    }
}

/// One LED segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Primary, secondary and tertiary colors.
    #[serde(default, alias = "col")]
    pub colors: Vec<ColorSlot>,
}

impl Segment {
    /// Creates a segment whose primary color is `color`.
    #[must_use]
    pub fn with_color(color: RgbColor) -> Self {
        Self {
            colors: vec![ColorSlot::Channels(color.to_array().to_vec())],
        }
    }
}

/// A segment color as channel values or a hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSlot {
    /// `[r, g, b]` or `[r, g, b, w]`.
    Channels(Vec<u8>),
    /// `"RRGGBB"` or `"RRGGBBWW"`.
    Hex(String),
}

impl ColorSlot {
    /// Returns the RGB part of this slot, if it is well formed.
    #[must_use]
    pub fn to_rgb(&self) -> Option<RgbColor> {
        match self {
            Self::Channels(channels) => RgbColor::from_channels(channels),
            Self::Hex(hex) => RgbColor::from_hex(hex).ok(),
        }
    }
}

/// Identity and hardware description of a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Manufacturer brand.
    #[serde(default)]
    pub brand: String,

    /// Product name.
    #[serde(default)]
    pub product: String,

    /// Firmware version.
    #[serde(default, alias = "ver")]
    pub version: String,

    /// MAC address, used as the serial number.
    #[serde(default)]
    pub mac: String,

    /// LED hardware description.
    #[serde(default)]
    pub leds: LedsInfo,
}

impl DeviceInfo {
    /// Parses an info payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload is not a valid info object.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// LED hardware description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedsInfo {
    /// Raw light capability value.
    #[serde(default, alias = "lc")]
    pub light_capabilities: u8,
}

/// Presets and playlists stored on the controller, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable(BTreeMap<String, PresetEntry>);

impl PresetTable {
    /// Parses a preset table payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload is not an object of entries.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Inserts an entry under `id`.
    pub fn insert(&mut self, id: i32, entry: PresetEntry) {
        self.0.insert(id.to_string(), entry);
    }

    /// Iterates over entries whose key is a numeric id.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &PresetEntry)> {
        self.0
            .iter()
            .filter_map(|(key, entry)| key.parse().ok().map(|id| (id, entry)))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A stored preset or playlist.
///
/// Presets carry segment data; an entry without segments is a playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    /// Display name, absent for the empty slot 0.
    #[serde(default, alias = "n", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Segment data of a preset.
    #[serde(default, alias = "seg", skip_serializing_if = "Option::is_none")]
    pub segments: Option<serde_json::Value>,

    /// Playlist definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<serde_json::Value>,
}

impl PresetEntry {
    /// Creates a named preset with an empty segment list.
    #[must_use]
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            segments: Some(serde_json::Value::Array(Vec::new())),
            playlist: None,
        }
    }

    /// Creates a named playlist.
    #[must_use]
    pub fn playlist(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            segments: None,
            playlist: Some(serde_json::Value::Object(serde_json::Map::new())),
        }
    }

    /// Returns true if this entry is a playlist.
    #[must_use]
    pub fn is_playlist(&self) -> bool {
        self.segments.is_none()
    }
}
