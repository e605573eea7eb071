// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resources of the current connection attempt.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::{Error, Result};

use super::{ConnectionInput, ConnectionState};

/// The current connection of one accessory.
///
/// Exactly one client handle is authoritative at a time. Replacing it bumps
/// the generation; events tagged with an older generation must be dropped.
/// At most one reconnect timer is pending.
#[derive(Debug)]
pub struct Connection<C> {
    state: ConnectionState,
    client: Option<Arc<C>>,
    generation: u64,
    pump: Option<JoinHandle<()>>,
    timer: Option<PendingTimer>,
    next_timer_id: u64,
}

#[derive(Debug)]
struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

impl<C> Connection<C> {
    /// Creates a connection with no client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            client: None,
            generation: 0,
            pump: None,
            timer: None,
            next_timer_id: 0,
        }
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the generation of the current client.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if `generation` tags the current client.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        !self.state.is_closed() && generation == self.generation
    }

    /// Returns true if the connection was shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Returns true if the client reported an open connection.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.state.is_established()
    }

    /// Returns the current client, established or not.
    #[must_use]
    pub fn client(&self) -> Option<Arc<C>> {
        self.client.clone()
    }

    /// Returns the client if commands may be sent to it.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` unless the connection is established.
    pub fn established_client(&self) -> Result<Arc<C>> {
        match (&self.client, self.state.is_established()) {
            (Some(client), true) => Ok(Arc::clone(client)),
            _ => Err(Error::NotConnected),
        }
    }

    // ========== Lifecycle ==========

    /// Installs a freshly created client and returns its generation.
    ///
    /// The previous client is dropped and its event task aborted. Returns
    /// `None` once the connection has been shut down.
    pub fn begin(&mut self, client: Arc<C>) -> Option<u64> {
        if self.is_closed() {
            return None;
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.client = Some(client);
        self.generation += 1;
        self.state = self.state.next(ConnectionInput::Connect);
        Some(self.generation)
    }

    /// Records the task draining events of the current client.
    pub fn attach_pump(&mut self, pump: JoinHandle<()>) {
        if let Some(previous) = self.pump.replace(pump) {
            previous.abort();
        }
    }

    /// Applies an `Open` event.
    pub fn on_open(&mut self) {
        self.state = self.state.next(ConnectionInput::Open);
    }

    /// Applies a `Close` event.
    pub fn on_close(&mut self) {
        self.state = self.state.next(ConnectionInput::Close);
    }

    /// Applies an `Error` event and cancels any pending reconnect timer.
    ///
    /// Returns true if a new reconnect should be scheduled.
    pub fn on_error(&mut self) -> bool {
        self.state = self.state.next(ConnectionInput::Error);
        self.cancel_timer();
        !self.is_closed()
    }

    /// Shuts the connection down.
    ///
    /// Returns true on the first call only. Pending timers and the event
    /// task are cancelled; the client is kept so it can be told to close.
    pub fn shutdown(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = self.state.next(ConnectionInput::Shutdown);
        self.cancel_timer();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        true
    }

    // ========== Reconnect Timer ==========

    /// Reserves the id of the next reconnect timer.
    pub fn next_timer_id(&mut self) -> u64 {
        self.next_timer_id += 1;
        self.next_timer_id
    }

    /// Stores a spawned reconnect timer, cancelling any previous one.
    pub fn schedule_timer(&mut self, id: u64, handle: JoinHandle<()>) {
        self.cancel_timer();
        self.timer = Some(PendingTimer { id, handle });
    }

    /// Called by a timer when it fires.
    ///
    /// Returns true if the timer is still the pending one and the
    /// connection is not closed; the timer is then no longer pending.
    pub fn timer_fired(&mut self, id: u64) -> bool {
        match &self.timer {
            Some(timer) if timer.id == id => {
                // dropping the handle detaches the running task
                self.timer = None;
                !self.is_closed()
            }
            _ => false,
        }
    }

    /// Returns true if a reconnect timer is pending.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Cancels the pending reconnect timer, if any.
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

impl<C> Default for Connection<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Drop for Connection<C> {
    fn drop(&mut self) {
        self.cancel_timer();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_task() -> JoinHandle<()> {
        tokio::spawn(std::future::pending())
    }

    #[test]
    fn begin_bumps_generation() {
        let mut connection = Connection::new();
        assert_eq!(connection.begin(Arc::new("first")), Some(1));
        assert_eq!(connection.begin(Arc::new("second")), Some(2));

        assert!(connection.is_current(2));
        assert!(!connection.is_current(1));
        assert_eq!(connection.state(), ConnectionState::Connecting);
        assert_eq!(connection.client().as_deref(), Some(&"second"));
    }

    #[test]
    fn client_is_available_only_once_open() {
        let mut connection = Connection::new();
        connection.begin(Arc::new(7));
        assert!(matches!(
            connection.established_client(),
            Err(Error::NotConnected)
        ));

        connection.on_open();
        assert_eq!(*connection.established_client().unwrap(), 7);

        connection.on_close();
        assert!(connection.established_client().is_err());
    }

    #[test]
    fn shutdown_happens_once() {
        let mut connection: Connection<u8> = Connection::new();
        assert!(connection.shutdown());
        assert!(!connection.shutdown());
        assert!(connection.is_closed());
        assert_eq!(connection.begin(Arc::new(1)), None);
    }

    #[test]
    fn error_after_shutdown_does_not_reschedule() {
        let mut connection: Connection<u8> = Connection::new();
        connection.begin(Arc::new(1));
        assert!(connection.on_error());

        connection.shutdown();
        assert!(!connection.on_error());
    }

    #[tokio::test]
    async fn new_timer_cancels_previous() {
        let mut connection: Connection<u8> = Connection::new();
        let first = connection.next_timer_id();
        connection.schedule_timer(first, idle_task());
        let second = connection.next_timer_id();
        connection.schedule_timer(second, idle_task());

        assert!(!connection.timer_fired(first));
        assert!(connection.has_pending_timer());
        assert!(connection.timer_fired(second));
        assert!(!connection.has_pending_timer());
    }

    #[tokio::test]
    async fn error_cancels_pending_timer() {
        let mut connection: Connection<u8> = Connection::new();
        let id = connection.next_timer_id();
        connection.schedule_timer(id, idle_task());

        connection.on_error();
        assert!(!connection.has_pending_timer());
        assert!(!connection.timer_fired(id));
    }

    #[tokio::test]
    async fn stale_generation_after_shutdown() {
        let mut connection = Connection::new();
        let generation = connection.begin(Arc::new(1u8)).unwrap();
        connection.attach_pump(idle_task());

        assert!(connection.shutdown());
        assert!(!connection.is_current(generation));
    }
}
