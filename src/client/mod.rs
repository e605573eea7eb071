// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client boundary.
//!
//! The bridge does not speak the controller's wire protocol. A
//! [`WledClient`] implementation owns one connection to one controller,
//! accepts fire-and-forget commands and reports what happens on the
//! connection by emitting [`ClientEvent`](crate::event::ClientEvent)s into
//! the [`EventSink`] it was created with.
//!
//! A fresh client is created through a [`ClientFactory`] on every
//! connection attempt; handles are never reused across reconnects.

mod payload;

pub use payload::{
    ColorSlot, DeviceInfo, DeviceState, LedsInfo, NO_PRESET, PresetEntry, PresetTable, Segment,
};

use std::future::Future;

use crate::error::ClientError;
use crate::event::EventSink;
use crate::types::RgbColor;

/// A connection to one controller.
///
/// Command methods return immediately; their effect is observed through
/// later `State` events.
pub trait WledClient: Send + Sync + 'static {
    /// Performs the asynchronous initialization of the connection.
    ///
    /// Completion does not imply the connection is open; that is signaled
    /// by an `Open` event.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InitFailed` if the controller cannot be reached.
    fn init(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Turns the strip on.
    fn turn_on(&self);

    /// Turns the strip off.
    fn turn_off(&self);

    /// Sets the master brightness on the device scale (0-255).
    fn set_brightness(&self, value: u8);

    /// Sets the primary color of the main segment.
    fn set_color(&self, color: RgbColor);

    /// Activates a stored preset or playlist.
    fn set_preset(&self, id: i32);

    /// Lets incoming live data drive the LEDs.
    fn allow_live_data(&self);

    /// Ignores live data, either until the controller reboots or until the
    /// current stream ends.
    fn ignore_live_data(&self, until_reboot: bool);

    /// Requests the preset table again.
    fn refresh_presets(&self);

    /// Requests the effect list again.
    fn refresh_effects(&self);

    /// Closes the connection.
    fn disconnect(&self);

    /// Returns the most recent device info received on this connection.
    fn info(&self) -> Option<DeviceInfo>;
}

/// Creates clients bound to a controller address.
pub trait ClientFactory: Send + Sync + 'static {
    /// The client type produced by this factory.
    type Client: WledClient;

    /// Creates a new, not yet initialized client for `address`.
    ///
    /// Every event the client observes must be emitted into `events`.
    fn create(&self, address: &str, events: EventSink) -> Self::Client;
}
