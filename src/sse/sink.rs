// ABOUTME: Channel-backed SSE sink decoupling bridge writes from the HTTP response
// ABOUTME: Tracks the Open/Completed/Failed/TimedOut state machine and fires callbacks once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sse_bridge developers

use crate::bridge::{StreamSink, TerminationCallback, TransportError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// Lifecycle state of an [`SseSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SinkState {
    /// Accepting writes
    Open = 0,
    /// Ended normally (source completion or client disconnect)
    Completed = 1,
    /// Ended with a source error
    Failed = 2,
    /// Ended by the idle timeout
    TimedOut = 3,
}

impl SinkState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Open,
            1 => Self::Completed,
            2 => Self::Failed,
            _ => Self::TimedOut,
        }
    }
}

/// Frames carried from the sink to the HTTP response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkFrame {
    /// A wire event payload
    Event(String),
    /// The stream ended normally
    Complete,
    /// The stream ended with an error message
    Error(String),
}

/// A [`StreamSink`] that hands frames to the HTTP layer over an unbounded channel.
///
/// Every terminal transition is a compare-and-swap from `Open`, so exactly one
/// terminal reason wins no matter how signals race. Timeout fires the timeout
/// callbacks; every other terminal reason fires the completion callbacks. Each
/// registered callback runs at most once.
pub struct SseSink {
    tx: mpsc::UnboundedSender<SinkFrame>,
    state: AtomicU8,
    completion_callbacks: Mutex<Vec<TerminationCallback>>,
    timeout_callbacks: Mutex<Vec<TerminationCallback>>,
}

impl SseSink {
    /// Create a sink and the receiving half the HTTP response consumes
    #[must_use]
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<SinkFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(Self {
            tx,
            state: AtomicU8::new(SinkState::Open as u8),
            completion_callbacks: Mutex::new(Vec::new()),
            timeout_callbacks: Mutex::new(Vec::new()),
        });
        (sink, rx)
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SinkState {
        SinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the sink still accepts writes
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == SinkState::Open
    }

    /// The idle timeout elapsed; fires the timeout callbacks.
    ///
    /// Called by the transport layer when no frame arrived within the configured
    /// window. No frame is emitted: the response is already being torn down.
    pub fn expire(&self) {
        if self.transition(SinkState::TimedOut) {
            self.fire(&self.timeout_callbacks);
        }
    }

    /// The client side of the connection is gone; fires the completion callbacks.
    ///
    /// Called by the transport layer when the response stream is dropped. No frame
    /// is emitted: nobody is reading anymore.
    pub fn disconnected(&self) {
        if self.transition(SinkState::Completed) {
            self.fire(&self.completion_callbacks);
        }
    }

    fn transition(&self, to: SinkState) -> bool {
        self.state
            .compare_exchange(
                SinkState::Open as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn fire(&self, callbacks: &Mutex<Vec<TerminationCallback>>) {
        let drained =
            std::mem::take(&mut *callbacks.lock().unwrap_or_else(PoisonError::into_inner));
        for callback in drained {
            callback();
        }
    }

    /// Registers under the lock; a callback arriving after its terminal state has
    /// already been reached runs immediately instead of waiting forever.
    fn register(
        &self,
        slot: &Mutex<Vec<TerminationCallback>>,
        fires_on: &[SinkState],
        callback: TerminationCallback,
    ) {
        let mut callbacks = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if fires_on.contains(&self.state()) {
            drop(callbacks);
            callback();
        } else {
            callbacks.push(callback);
        }
    }
}

impl StreamSink<String> for SseSink {
    fn write(&self, event: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.tx
            .send(SinkFrame::Event(event))
            .map_err(|_| TransportError::Disconnected)
    }

    fn complete(&self) {
        if self.transition(SinkState::Completed) {
            let _ = self.tx.send(SinkFrame::Complete);
            self.fire(&self.completion_callbacks);
        }
    }

    fn complete_with_error(&self, error: anyhow::Error) {
        if self.transition(SinkState::Failed) {
            let _ = self.tx.send(SinkFrame::Error(error.to_string()));
            self.fire(&self.completion_callbacks);
        }
    }

    fn on_completion(&self, callback: TerminationCallback) {
        self.register(
            &self.completion_callbacks,
            &[SinkState::Completed, SinkState::Failed],
            callback,
        );
    }

    fn on_timeout(&self, callback: TerminationCallback) {
        self.register(&self.timeout_callbacks, &[SinkState::TimedOut], callback);
    }
}
