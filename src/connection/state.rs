// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection state machine.

use std::fmt;

/// Lifecycle state of a controller connection.
///
/// # Examples
///
/// ```
/// use wled_bridge::connection::{ConnectionInput, ConnectionState};
///
/// let state = ConnectionState::Disconnected
///     .next(ConnectionInput::Connect)
///     .next(ConnectionInput::Open);
/// assert!(state.is_established());
///
/// let closed = state.next(ConnectionInput::Shutdown);
/// assert_eq!(closed.next(ConnectionInput::Connect), ConnectionState::Closed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// No connection attempt is in progress.
    #[default]
    Disconnected,
    /// A client was created and is initializing.
    Connecting,
    /// The client reported an open connection.
    Connected,
    /// The connection failed and a reconnect is scheduled.
    Reconnecting,
    /// Shut down; no further connection attempts are made.
    Closed,
}

/// Input symbols of the connection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionInput {
    /// A new client is being created.
    Connect,
    /// The client opened its connection.
    Open,
    /// The client closed its connection.
    Close,
    /// The client reported a transport error.
    Error,
    /// The host is shutting down.
    Shutdown,
}

impl ConnectionState {
    /// Returns the state reached by applying `input`.
    #[must_use]
    pub const fn next(self, input: ConnectionInput) -> Self {
        match (self, input) {
            (Self::Closed, _) | (_, ConnectionInput::Shutdown) => Self::Closed,
            (_, ConnectionInput::Connect) => Self::Connecting,
            (_, ConnectionInput::Open) => Self::Connected,
            (_, ConnectionInput::Error) => Self::Reconnecting,
            // a close following an error leaves the scheduled reconnect in charge
            (Self::Reconnecting, ConnectionInput::Close) => Self::Reconnecting,
            (_, ConnectionInput::Close) => Self::Disconnected,
        }
    }

    /// Returns true if hub-driven commands may be sent.
    #[must_use]
    pub const fn is_established(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the connection was shut down.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
