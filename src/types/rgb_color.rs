// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with hex parsing and HSV conversion.
//!
//! The controller reports and accepts colors as RGB triples while the hub
//! models color as hue and saturation. [`RgbColor`] is the device side of
//! that conversion; see [`HsvColor`] for the hub side.

use std::fmt;

use crate::error::ValueError;

use super::HsvColor;
use super::hsv_color::rgb_to_hsv;

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use wled_bridge::types::RgbColor;
///
/// let color = RgbColor::new(255, 128, 0);
/// assert_eq!(color.red(), 255);
/// assert_eq!(color.to_string(), "255,128,0");
///
/// let red = RgbColor::from_hex("#FF0000").unwrap();
/// assert_eq!(red.to_array(), [255, 0, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses an RGB color from a hex string.
    ///
    /// Accepts `#RRGGBB`, `RRGGBB`, and `RRGGBBWW` (the white byte of an
    /// RGBW color is ignored), with or without the hash.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHexColor` if the string is not valid hex.
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let hex = hex.trim_start_matches('#');
        if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
            return Err(ValueError::InvalidHexColor(hex.to_string()));
        }
        let r = parse_hex_pair(&hex[0..2])?;
        let g = parse_hex_pair(&hex[2..4])?;
        let b = parse_hex_pair(&hex[4..6])?;
        Ok(Self::new(r, g, b))
    }

    /// Creates a color from the leading channels of a device color entry.
    ///
    /// Device color entries hold three (RGB) or four (RGBW) channels.
    /// Returns `None` if fewer than three channels are present.
    #[must_use]
    pub fn from_channels(channels: &[u8]) -> Option<Self> {
        match channels {
            [r, g, b, ..] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the channels as `[r, g, b]`, the shape `setColor` expects.
    #[must_use]
    pub const fn to_array(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Converts this color to fractional HSV.
    ///
    /// # Examples
    ///
    /// ```
    /// use wled_bridge::types::RgbColor;
    ///
    /// let hsv = RgbColor::new(255, 0, 0).to_hsv();
    /// assert_eq!(hsv.hue(), 0.0);
    /// assert_eq!(hsv.saturation(), 1.0);
    /// assert_eq!(hsv.value(), 1.0);
    /// ```
    #[must_use]
    pub fn to_hsv(&self) -> HsvColor {
        let (h, s, v) = rgb_to_hsv(self.red, self.green, self.blue);
        HsvColor::new(h, s, v)
    }

    /// Creates a black color.
    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.red, self.green, self.blue)
    }
}

impl From<RgbColor> for [u8; 3] {
    fn from(color: RgbColor) -> Self {
        color.to_array()
    }
}

fn parse_hex_pair(s: &str) -> Result<u8, ValueError> {
    u8::from_str_radix(s, 16).map_err(|_| ValueError::InvalidHexColor(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hsv_to_rgb;

    fn from_hsv(hsv: &HsvColor) -> RgbColor {
        let (r, g, b) = hsv_to_rgb(hsv.hue(), hsv.saturation(), hsv.value());
        RgbColor::new(r, g, b)
    }

    #[test]
    fn rgb_from_hex_full() {
        let color = RgbColor::from_hex("#FF5733").unwrap();
        assert_eq!(color, RgbColor::new(255, 87, 51));

        let color = RgbColor::from_hex("00FF00").unwrap();
        assert_eq!(color, RgbColor::new(0, 255, 0));
    }

    #[test]
    fn rgb_from_hex_ignores_white_byte() {
        let color = RgbColor::from_hex("102030FF").unwrap();
        assert_eq!(color, RgbColor::new(0x10, 0x20, 0x30));
    }

    #[test]
    fn rgb_from_hex_invalid() {
        assert!(RgbColor::from_hex("#GG0000").is_err());
        assert!(RgbColor::from_hex("#FF00").is_err());
        assert!(RgbColor::from_hex("").is_err());
    }

    #[test]
    fn rgb_from_channels() {
        assert_eq!(
            RgbColor::from_channels(&[1, 2, 3]),
            Some(RgbColor::new(1, 2, 3))
        );
        assert_eq!(
            RgbColor::from_channels(&[1, 2, 3, 200]),
            Some(RgbColor::new(1, 2, 3))
        );
        assert_eq!(RgbColor::from_channels(&[1, 2]), None);
    }

    #[test]
    fn rgb_to_hsv_primaries() {
        let red = RgbColor::new(255, 0, 0).to_hsv();
        assert!(red.hue().abs() < 1e-9);
        assert!((red.saturation() - 1.0).abs() < 1e-9);
        assert!((red.value() - 1.0).abs() < 1e-9);

        let green = RgbColor::new(0, 255, 0).to_hsv();
        assert!((green.hue() - 1.0 / 3.0).abs() < 1e-9);

        let blue = RgbColor::new(0, 0, 255).to_hsv();
        assert!((blue.hue() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rgb_to_hsv_achromatic() {
        let gray = RgbColor::new(128, 128, 128).to_hsv();
        assert_eq!(gray.hue(), 0.0);
        assert_eq!(gray.saturation(), 0.0);

        let black = RgbColor::black().to_hsv();
        assert_eq!(black.saturation(), 0.0);
        assert_eq!(black.value(), 0.0);
    }

    #[test]
    fn hsv_to_rgb_red() {
        let rgb = from_hsv(&HsvColor::new(0.0, 1.0, 1.0));
        assert_eq!(rgb, RgbColor::new(255, 0, 0));
    }

    #[test]
    fn rgb_display_and_array() {
        let color = RgbColor::new(255, 128, 0);
        assert_eq!(color.to_string(), "255,128,0");
        assert_eq!(<[u8; 3]>::from(color), [255, 128, 0]);
    }

    #[test]
    fn roundtrip_within_one_step() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(17) {
                for b in (0..=255u8).step_by(5) {
                    let original = RgbColor::new(r, g, b);
                    let back = from_hsv(&original.to_hsv());
                    assert!(
                        original.red().abs_diff(back.red()) <= 1
                            && original.green().abs_diff(back.green()) <= 1
                            && original.blue().abs_diff(back.blue()) <= 1,
                        "{original:?} came back as {back:?}"
                    );
                }
            }
        }
    }
}
