// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle of one controller.
//!
//! ```text
//!              Connect            Open
//! Disconnected ───────> Connecting ────> Connected
//!      ^                    ^                │
//!      │ Close              │ Connect        │ Error
//!      └────────────────────┴── Reconnecting <┘
//!
//! any state ── Shutdown ──> Closed (terminal)
//! ```
//!
//! [`ConnectionState`] is the pure transition table. [`Connection`] owns
//! the resources of the current attempt: the client handle, the task
//! draining its events, the generation number that tags them, and the
//! single pending reconnect timer.

mod handle;
mod state;

pub use handle::Connection;
pub use state::{ConnectionInput, ConnectionState};
