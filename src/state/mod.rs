// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mirrored light state and the state reconciler.
//!
//! [`LedState`] is the last known good state of one controller as the hub
//! sees it. Device-pushed state is diffed against it by
//! [`LedState::reconcile`], which yields only the [`StateChange`]s that
//! actually differ, so the hub is not notified of values it already has.
//!
//! # Examples
//!
//! ```
//! use wled_bridge::client::DeviceState;
//! use wled_bridge::state::{LedState, StateChange};
//!
//! let mut led = LedState::new();
//! let pushed = DeviceState { on: true, ..DeviceState::default() };
//!
//! assert_eq!(led.reconcile(&pushed), vec![StateChange::Power(true)]);
//! assert!(led.reconcile(&pushed).is_empty());
//! ```

mod led_state;
mod state_change;

pub use led_state::LedState;
pub use state_change::StateChange;
