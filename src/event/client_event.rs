// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events reported by a device client.

use crate::client::{DeviceInfo, DeviceState, PresetTable};
use crate::error::ClientError;

/// Something a device client observed on its connection.
///
/// `Open`, `Close` and `Error` drive the connection lifecycle; the update
/// variants carry the latest payload of their kind.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The connection is established.
    Open,

    /// The connection was closed.
    Close,

    /// The controller state changed.
    State(DeviceState),

    /// The preset table was (re)loaded.
    Presets(PresetTable),

    /// The effect list was (re)loaded.
    Effects(serde_json::Value),

    /// The controller configuration was (re)loaded.
    Config(serde_json::Value),

    /// The controller identity was (re)loaded.
    Info(DeviceInfo),

    /// The connection failed.
    Error(ClientError),
}

impl ClientEvent {
    /// Returns the event name used in log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::State(_) => "update:state",
            Self::Presets(_) => "update:presets",
            Self::Effects(_) => "update:effects",
            Self::Config(_) => "update:config",
            Self::Info(_) => "update:info",
            Self::Error(_) => "error",
        }
    }
}
