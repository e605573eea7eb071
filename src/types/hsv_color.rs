// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fractional HSV color and the RGB/HSV colorspace converter.
//!
//! All three HSV components are fractions in `[0, 1]`. The hub ranges are
//! derived from them: hue in degrees (`× 360`) and saturation/value in
//! percent (`× 100`).

/// HSV color with fractional components.
///
/// # Examples
///
/// ```
/// use wled_bridge::types::HsvColor;
///
/// let hsv = HsvColor::new(0.5, 0.5, 1.0);
/// assert_eq!(hsv.hub_hue(), 180.0);
/// assert_eq!(hsv.hub_saturation(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HsvColor {
    hue: f64,
    saturation: f64,
    value: f64,
}

impl HsvColor {
    /// Creates a color from fractional components.
    #[must_use]
    pub const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Returns the fractional hue.
    #[must_use]
    pub const fn hue(&self) -> f64 {
        self.hue
    }

    /// Returns the fractional saturation.
    #[must_use]
    pub const fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Returns the fractional value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the hue in degrees (0-360).
    #[must_use]
    pub fn hub_hue(&self) -> f64 {
        self.hue * 360.0
    }

    /// Returns the saturation in percent (0-100).
    #[must_use]
    pub fn hub_saturation(&self) -> f64 {
        self.saturation * 100.0
    }

    /// Returns the value in percent (0-100).
    #[must_use]
    pub fn hub_value(&self) -> f64 {
        self.value * 100.0
    }
}

/// Converts 8-bit RGB channels to fractional `(h, s, v)`.
///
/// Gray levels (`max == min`) have hue 0.
///
/// # Examples
///
/// ```
/// use wled_bridge::types::rgb_to_hsv;
///
/// assert_eq!(rgb_to_hsv(255, 0, 0), (0.0, 1.0, 1.0));
/// ```
#[allow(clippy::many_single_char_names, clippy::float_cmp)]
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    let s = if max == 0.0 { 0.0 } else { (max - min) / max };

    if max == min {
        return (0.0, s, v);
    }

    let delta = max - min;
    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (h / 6.0, s, v)
}

/// Converts fractional `(h, s, v)` to 8-bit RGB channels, rounded.
///
/// A hue outside `[0, 1]` wraps around; saturation and value are clamped.
///
/// # Examples
///
/// ```
/// use wled_bridge::types::hsv_to_rgb;
///
/// assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
/// assert_eq!(hsv_to_rgb(1.5, 1.0, 1.0), hsv_to_rgb(0.5, 1.0, 1.0));
/// ```
#[allow(
    clippy::many_single_char_names,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let hue = if (0.0..=1.0).contains(&h) {
        h
    } else {
        h.rem_euclid(1.0)
    };
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let sector = (hue * 6.0).floor();
    let f = hue * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    let to_channel = |c: f64| (c * 255.0).round() as u8;
    (to_channel(r), to_channel(g), to_channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_to_hsv_pure_red() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0.0, 1.0, 1.0));
    }

    #[test]
    fn rgb_to_hsv_wraps_negative_red_hue() {
        // max is red and green < blue: the +6 correction keeps hue in [0, 1)
        let (h, s, v) = rgb_to_hsv(255, 0, 128);
        assert!(h > 0.9 && h < 1.0, "hue {h}");
        assert!((s - 1.0).abs() < 1e-9);
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rgb_to_hsv_gray_has_zero_hue() {
        let (h, s, v) = rgb_to_hsv(51, 51, 51);
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((v - 0.2).abs() < 1e-9);
    }

    #[test]
    fn hsv_to_rgb_sectors() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 6.0, 1.0, 1.0), (255, 255, 0));
        assert_eq!(hsv_to_rgb(2.0 / 6.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(3.0 / 6.0, 1.0, 1.0), (0, 255, 255));
        assert_eq!(hsv_to_rgb(4.0 / 6.0, 1.0, 1.0), (0, 0, 255));
        assert_eq!(hsv_to_rgb(5.0 / 6.0, 1.0, 1.0), (255, 0, 255));
    }

    #[test]
    fn hsv_to_rgb_full_turn_is_red() {
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), (255, 0, 0));
    }

    #[test]
    fn hsv_to_rgb_wraps_out_of_range_hue() {
        assert_eq!(hsv_to_rgb(1.25, 1.0, 1.0), hsv_to_rgb(0.25, 1.0, 1.0));
        assert_eq!(hsv_to_rgb(-0.75, 1.0, 1.0), hsv_to_rgb(0.25, 1.0, 1.0));
    }

    #[test]
    fn hsv_to_rgb_clamps_saturation_and_value() {
        assert_eq!(hsv_to_rgb(0.0, 2.0, 2.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(0.3, 0.0, -1.0), (0, 0, 0));
    }

    #[test]
    fn every_rgb_triple_roundtrips_within_one() {
        for r in 0..=255u8 {
            for g in (0..=255u8).step_by(3) {
                for b in (0..=255u8).step_by(7) {
                    let (h, s, v) = rgb_to_hsv(r, g, b);
                    let (r2, g2, b2) = hsv_to_rgb(h, s, v);
                    assert!(
                        r.abs_diff(r2) <= 1 && g.abs_diff(g2) <= 1 && b.abs_diff(b2) <= 1,
                        "({r},{g},{b}) -> ({r2},{g2},{b2})"
                    );
                }
            }
        }
    }

    #[test]
    fn hub_ranges() {
        let hsv = HsvColor::new(0.5, 0.25, 1.0);
        assert_eq!(hsv.hub_hue(), 180.0);
        assert_eq!(hsv.hub_saturation(), 25.0);
        assert_eq!(hsv.hub_value(), 100.0);
    }
}
