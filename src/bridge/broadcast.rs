// ABOUTME: Broadcast-channel adapter exposing an internal subsystem as an EventSource
// ABOUTME: Pumps a tokio broadcast receiver into observer callbacks on a background task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sse_bridge developers

use super::source::{EventObserver, EventSource, Subscription};
use std::sync::Arc;
use tokio::sync::broadcast;

/// An [`EventSource`] backed by a tokio broadcast channel.
///
/// The producing subsystem publishes events through [`BroadcastSource::publish`];
/// every subscriber gets its own receiver pumped into its observer by a background
/// task. A subscriber that falls behind the channel capacity loses the oldest events
/// (the channel's native behavior) but keeps its subscription.
pub struct BroadcastSource<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> BroadcastSource<E> {
    /// Create a source with the given channel capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers reached; 0 when nobody is listening.
    pub fn publish(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of active subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone + Send + 'static> EventSource<E> for BroadcastSource<E> {
    /// Subscribe by spawning a pump task; requires a tokio runtime.
    fn subscribe(&self, observer: Arc<dyn EventObserver<E>>) -> Subscription {
        let mut receiver = self.sender.subscribe();
        let pump = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => observer.on_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("event subscriber lagged, {skipped} events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        observer.on_complete();
                        break;
                    }
                }
            }
        });

        Subscription::new(move || pump.abort())
    }
}
