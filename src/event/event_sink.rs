// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-connection event channel.

use tokio::sync::mpsc;

use super::ClientEvent;

/// Receiving end of a connection's event channel.
pub type EventStream = mpsc::UnboundedReceiver<ClientEvent>;

/// Creates the event channel for one connection.
#[must_use]
pub fn channel() -> (EventSink, EventStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventSink { sender }, receiver)
}

/// Sending end handed to a device client.
///
/// Emitting never blocks. Once the accessory has dropped the connection
/// the receiving end is gone and further events are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::UnboundedSender<ClientEvent>,
}

impl EventSink {
    /// Emits an event to the accessory.
    pub fn emit(&self, event: ClientEvent) {
        // The receiver is gone once the connection has been replaced
        let _ = self.sender.send(event);
    }

    /// Returns true if nobody listens on this connection anymore.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_delivers_in_order() {
        let (sink, mut events) = channel();
        sink.emit(ClientEvent::Open);
        sink.emit(ClientEvent::Close);

        assert!(matches!(events.recv().await, Some(ClientEvent::Open)));
        assert!(matches!(events.recv().await, Some(ClientEvent::Close)));
    }

    #[test]
    fn emit_after_receiver_dropped_is_discarded() {
        let (sink, events) = channel();
        drop(events);

        assert!(sink.is_closed());
        sink.emit(ClientEvent::Open);
    }

    #[test]
    fn clones_share_the_channel() {
        let (sink, mut events) = channel();
        let other = sink.clone();
        other.emit(ClientEvent::Open);

        assert!(!sink.is_closed());
        assert!(matches!(events.try_recv(), Ok(ClientEvent::Open)));
    }
}
