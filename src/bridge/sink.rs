// ABOUTME: Outbound streaming sink abstraction written to by the bridge
// ABOUTME: Defines the write/complete surface, termination callbacks, and transport errors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

use thiserror::Error;

/// One-shot callback registered for a sink's terminal transitions
pub type TerminationCallback = Box<dyn FnOnce() + Send>;

/// A single write to the sink failed.
///
/// Write failures are recoverable from the bridge's point of view: they are reported
/// through the write-failure hook and forwarding continues. The sink's own
/// completion/timeout callbacks remain the authoritative termination signal.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The sink already reached a terminal state
    #[error("stream sink already reached a terminal state")]
    Closed,
    /// The client side of the connection is gone
    #[error("client side of the stream is gone")]
    Disconnected,
}

/// The outbound connection handle the bridge writes to.
///
/// Lifecycle: Open, then exactly one of completed, failed, or timed out. Once
/// terminal, the sink accepts no further writes. Callbacks registered through
/// [`StreamSink::on_completion`] and [`StreamSink::on_timeout`] each fire at most
/// once, and at most one of the two kinds fires for a given sink.
pub trait StreamSink<W>: Send + Sync {
    /// Write one wire event to the connection
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the sink is terminal or the client is gone.
    fn write(&self, event: W) -> Result<(), TransportError>;

    /// End the stream normally
    fn complete(&self);

    /// End the stream with an error frame carrying the source failure
    fn complete_with_error(&self, error: anyhow::Error);

    /// Register a callback for normal termination (completion or client disconnect)
    fn on_completion(&self, callback: TerminationCallback);

    /// Register a callback for idle-timeout termination
    fn on_timeout(&self, callback: TerminationCallback);
}
