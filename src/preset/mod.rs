// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset and playlist switches.
//!
//! Every configured preset or playlist that exists on the controller is
//! exposed as a switch linked under the primary light service. The
//! [`PresetSynchronizer`] creates those switches lazily when the preset
//! table arrives, mirrors their on flags, and reclaims switches whose
//! preset was renamed, deleted or dropped from the configuration.

mod descriptor;
mod synchronizer;

pub use descriptor::{PresetDescriptor, PresetSwitch};
pub use synchronizer::{PresetSynchronizer, SyncReport};
