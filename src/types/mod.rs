// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the hub and device sides of the bridge.
//!
//! # Types
//!
//! - [`RgbColor`] - Device color as 8-bit RGB channels
//! - [`HsvColor`] - Fractional HSV color, scaled to hub ranges on demand
//! - [`Brightness`] - Hub brightness (0-100%) with device rescaling
//!
//! The colorspace converter itself is exposed as [`rgb_to_hsv`] and
//! [`hsv_to_rgb`].

mod brightness;
mod hsv_color;
mod rgb_color;

pub use brightness::Brightness;
pub use hsv_color::{HsvColor, hsv_to_rgb, rgb_to_hsv};
pub use rgb_color::RgbColor;
