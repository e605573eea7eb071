// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A change is produced either by the reconciler from a device-pushed
//! state or by a hub-driven write, and applied to
//! [`LedState`](super::LedState).

use crate::types::{Brightness, HsvColor};

/// A discrete change of the mirrored light state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateChange {
    /// The strip was turned on or off.
    Power(bool),

    /// Live data mode was entered or left.
    Live(bool),

    /// Brightness changed.
    Brightness(Brightness),

    /// Primary color changed.
    Color(HsvColor),

    /// Another preset became active.
    Preset {
        /// Previously active preset id.
        previous: i32,
        /// Newly active preset id, `-1` if none.
        current: i32,
    },

    /// Another playlist became active.
    Playlist {
        /// Previously active playlist id.
        previous: i32,
        /// Newly active playlist id, `-1` if none.
        current: i32,
    },
}
