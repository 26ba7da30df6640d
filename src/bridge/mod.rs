// ABOUTME: Lifecycle coupling between push-based event sources and streaming sinks
// ABOUTME: Provides the EventBridge core plus the source/sink abstractions it connects
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

/// Broadcast-channel adapter implementing [`EventSource`]
pub mod broadcast;
/// The bridge core coupling a subscription to a sink
pub mod forwarder;
/// Outbound sink abstraction and transport errors
pub mod sink;
/// Event source abstraction, observers, and subscriptions
pub mod source;

pub use broadcast::BroadcastSource;
pub use forwarder::{EventBridge, WriteFailureHook};
pub use sink::{StreamSink, TerminationCallback, TransportError};
pub use source::{EventObserver, EventSource, Subscription};
