// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light capability reported by the controller.
//!
//! The controller describes which color channels its LED strip supports
//! with a small integer in its info payload (`leds.lc`). The capability
//! decides which hub characteristics the primary light service exposes:
//!
//! | Value | Capability | Brightness | Hue/Saturation |
//! |-------|------------|------------|----------------|
//! | 0     | On/off     | no         | no             |
//! | 1     | RGB        | yes        | yes            |
//! | 2     | White      | yes        | no             |
//! | 3     | RGBW       | yes        | yes            |
//!
//! Any other value is rejected rather than guessed.

use std::fmt;

use crate::error::ValueError;

/// Color channels supported by a controller's LED strip.
///
/// # Examples
///
/// ```
/// use wled_bridge::LightCapability;
///
/// let rgbw = LightCapability::try_from(3).unwrap();
/// assert!(rgbw.supports_brightness());
/// assert!(rgbw.supports_color());
///
/// assert!(LightCapability::try_from(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LightCapability {
    /// Power only.
    #[default]
    OnOff = 0,
    /// Red, green and blue channels.
    Rgb = 1,
    /// A single white channel.
    White = 2,
    /// Red, green, blue and white channels.
    Rgbw = 3,
}

impl LightCapability {
    /// Returns true if the strip can be dimmed.
    #[must_use]
    pub const fn supports_brightness(self) -> bool {
        !matches!(self, Self::OnOff)
    }

    /// Returns true if the strip can show a hue and saturation.
    #[must_use]
    pub const fn supports_color(self) -> bool {
        matches!(self, Self::Rgb | Self::Rgbw)
    }
}

impl TryFrom<u8> for LightCapability {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::OnOff),
            1 => Ok(Self::Rgb),
            2 => Ok(Self::White),
            3 => Ok(Self::Rgbw),
            other => Err(ValueError::UnknownCapability(other)),
        }
    }
}

impl fmt::Display for LightCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnOff => "on/off",
            Self::Rgb => "RGB",
            Self::White => "white",
            Self::Rgbw => "RGBW",
        };
        f.write_str(name)
    }
}
