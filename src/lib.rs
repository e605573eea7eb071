// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `wled_bridge` - Expose WLED LED controllers as hub light accessories.
//!
//! Each configured controller becomes one accessory with a primary light
//! service, an optional live mode (ambilight) switch and one switch per
//! configured preset or playlist. Device-pushed state is mirrored onto the
//! hub, and hub writes are translated into device commands.
//!
//! The hub framework and the device client are collaborators behind
//! traits:
//!
//! - [`hub::AccessoryHandle`] and [`hub::PlatformApi`] for the hub side
//! - [`client::WledClient`] and [`client::ClientFactory`] for the device side
//!
//! # Supported Features
//!
//! - **Power and live mode**: on/off, live data allow/ignore
//! - **Light control**: brightness, hue and saturation, gated by the
//!   controller's light capability
//! - **Presets**: switches for configured presets and playlists, created and
//!   reclaimed as the controller's preset table changes
//! - **Reconnection**: fixed-delay reconnect after transport errors
//!
//! # Quick Start
//!
//! ```
//! use wled_bridge::client::DeviceState;
//! use wled_bridge::config::ControllerConfig;
//! use wled_bridge::event::{AccessoryId, ClientEvent};
//! use wled_bridge::testing::{MemoryAccessory, RecordingFactory};
//! use wled_bridge::{AccessoryOptions, WledAccessory};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let controller = ControllerConfig::new("Desk", "192.168.1.20");
//! let factory = RecordingFactory::new();
//! let hub = MemoryAccessory::new("Desk", AccessoryId::from_address("192.168.1.20"));
//!
//! let accessory = WledAccessory::new(controller, factory.clone(), hub, AccessoryOptions::default());
//! accessory.connect(false).await;
//!
//! // Writes fail fast until the client reports an open connection
//! assert!(accessory.set_on(true).is_err());
//!
//! let client = factory.latest().unwrap();
//! client.emit(ClientEvent::Open);
//! client.emit(ClientEvent::State(DeviceState::default()));
//! # tokio::task::yield_now().await;
//! # }
//! ```

mod accessory;
mod capabilities;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod hub;
mod platform;
pub mod preset;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use accessory::{AccessoryOptions, WledAccessory};
pub use capabilities::LightCapability;
pub use error::{ClientError, ConfigError, Error, HapStatus, ParseError, Result, ValueError};
pub use platform::Platform;
pub use types::{Brightness, HsvColor, RgbColor};

/// Platform identifier registered with the hub.
pub const PLATFORM_NAME: &str = "wled-ws";

/// Plugin name reported as accessory model until the controller identifies
/// itself.
pub const PLUGIN_NAME: &str = "homebridge-wled-ws";

/// Plugin author reported as accessory manufacturer until the controller
/// identifies itself.
pub const PLUGIN_AUTHOR: &str = "smhex";
