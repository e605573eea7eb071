// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirrored state of one controller.

use crate::capabilities::LightCapability;
use crate::client::{DeviceState, NO_PRESET};
use crate::types::{Brightness, RgbColor, hsv_to_rgb};

use super::StateChange;

/// Last known good light state, in hub units.
///
/// Hue is kept in degrees (0-360); saturation and value in percent
/// (0-100). Defaults mirror a strip that has not reported yet: off, full
/// brightness, no preset or playlist, on/off capability only.
#[derive(Debug, Clone, PartialEq)]
pub struct LedState {
    on: bool,
    live: bool,
    brightness: Brightness,
    hue: f64,
    saturation: f64,
    value: f64,
    active_preset_id: i32,
    active_playlist_id: i32,
    light_capability: LightCapability,
}

impl LedState {
    /// Creates the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on: false,
            live: false,
            brightness: Brightness::MAX,
            hue: 0.0,
            saturation: 0.0,
            value: 0.0,
            active_preset_id: NO_PRESET,
            active_playlist_id: NO_PRESET,
            light_capability: LightCapability::OnOff,
        }
    }

    // ========== Getters ==========

    /// Returns whether the strip is on.
    #[must_use]
    pub fn on(&self) -> bool {
        self.on
    }

    /// Returns whether live data mode is active.
    #[must_use]
    pub fn live(&self) -> bool {
        self.live
    }

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Returns the hue in degrees.
    #[must_use]
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Returns the saturation in percent.
    #[must_use]
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Returns the color value in percent.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the active preset id, `-1` if none.
    #[must_use]
    pub fn active_preset_id(&self) -> i32 {
        self.active_preset_id
    }

    /// Returns the active playlist id, `-1` if none.
    #[must_use]
    pub fn active_playlist_id(&self) -> i32 {
        self.active_playlist_id
    }

    /// Returns the latched light capability.
    #[must_use]
    pub fn light_capability(&self) -> LightCapability {
        self.light_capability
    }

    // ========== Hub-driven Writes ==========

    /// Latches the light capability reported by the controller.
    pub fn set_light_capability(&mut self, capability: LightCapability) {
        self.light_capability = capability;
    }

    /// Stores a hue written by the hub.
    pub fn set_hue(&mut self, hue: f64) {
        self.hue = hue;
    }

    /// Stores a saturation written by the hub.
    pub fn set_saturation(&mut self, saturation: f64) {
        self.saturation = saturation;
    }

    /// Returns the device color for the stored hue, saturation and
    /// brightness.
    #[must_use]
    pub fn target_color(&self) -> RgbColor {
        let (r, g, b) = hsv_to_rgb(
            self.hue / 360.0,
            self.saturation / 100.0,
            self.brightness.as_fraction(),
        );
        RgbColor::new(r, g, b)
    }

    // ========== State Changes ==========

    /// Applies a change and returns whether the state actually changed.
    #[allow(clippy::float_cmp)]
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Power(on) => replace(&mut self.on, *on),
            StateChange::Live(live) => replace(&mut self.live, *live),
            StateChange::Brightness(brightness) => replace(&mut self.brightness, *brightness),
            StateChange::Color(hsv) => {
                let (hue, saturation, value) =
                    (hsv.hub_hue(), hsv.hub_saturation(), hsv.hub_value());
                if self.hue == hue && self.saturation == saturation && self.value == value {
                    false
                } else {
                    self.hue = hue;
                    self.saturation = saturation;
                    self.value = value;
                    true
                }
            }
            StateChange::Preset { current, .. } => replace(&mut self.active_preset_id, *current),
            StateChange::Playlist { current, .. } => {
                replace(&mut self.active_playlist_id, *current)
            }
        }
    }

    /// Diffs a device-pushed state against the mirror.
    ///
    /// Brightness is only compared when the capability allows dimming and
    /// the color only when it allows hue and saturation. Every returned
    /// change has already been applied.
    pub fn reconcile(&mut self, state: &DeviceState) -> Vec<StateChange> {
        let mut candidates = vec![
            StateChange::Power(state.on),
            StateChange::Live(state.is_live()),
        ];

        if self.light_capability.supports_brightness() {
            candidates.push(StateChange::Brightness(Brightness::from_device(
                state.brightness,
            )));
        }

        if self.light_capability.supports_color()
            && let Some(color) = state.primary_color()
        {
            candidates.push(StateChange::Color(color.to_hsv()));
        }

        candidates.push(StateChange::Preset {
            previous: self.active_preset_id,
            current: state.preset_id,
        });
        candidates.push(StateChange::Playlist {
            previous: self.active_playlist_id,
            current: state.playlist_id,
        });

        candidates
            .into_iter()
            .filter(|change| self.apply(change))
            .collect()
    }
}

impl Default for LedState {
    fn default() -> Self {
        Self::new()
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
