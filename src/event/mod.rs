// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events flowing from a device client into its accessory.
//!
//! Each connection gets its own channel: the client holds the
//! [`EventSink`] and the accessory drains the receiving end in a task
//! tied to that connection. Every [`ClientEvent`] is one input symbol of
//! the connection state machine or one payload for the reconciler.
//!
//! # Examples
//!
//! ```
//! use wled_bridge::event::{self, ClientEvent};
//!
//! let (sink, mut events) = event::channel();
//! sink.emit(ClientEvent::Open);
//!
//! assert!(matches!(events.try_recv(), Ok(ClientEvent::Open)));
//! ```

mod accessory_id;
mod client_event;
mod event_sink;

pub use accessory_id::AccessoryId;
pub use client_event::ClientEvent;
pub use event_sink::{EventSink, EventStream, channel};
