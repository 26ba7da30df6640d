// ABOUTME: Main library entry point for the sse_bridge event streaming crate
// ABOUTME: Couples internal push-based event sources to client-facing SSE connections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sse_bridge developers

#![deny(unsafe_code)]

//! # sse_bridge
//!
//! Bridges an internal, push-based event stream (events produced asynchronously by
//! some subsystem, e.g. a rate limiter or circuit breaker) to an external long-lived
//! streaming connection consumed by a client over Server-Sent Events.
//!
//! The hard part is lifecycle management: the subscription to the internal stream and
//! the external connection are coupled so that either side terminating (client
//! disconnect, timeout, stream completion, or stream error) reliably tears down the
//! other side, with no leaked subscriptions and no writes attempted on a closed
//! connection.
//!
//! ## Architecture
//!
//! - **bridge**: the generic lifecycle coupler ([`bridge::EventBridge`]) and the two
//!   abstractions it connects, [`bridge::EventSource`] and [`bridge::StreamSink`]
//! - **sse**: concrete collaborators for axum: the channel-backed
//!   [`sse::SseSink`], the [`sse::StreamManager`] connection registry, and the
//!   [`sse::EventStreamRoutes`] router
//! - **config**, **logging**, **errors**: environment-driven settings, tracing
//!   setup, and the unified error surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sse_bridge::{BroadcastSource, EventStreamRoutes, StreamSettings};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = Arc::new(BroadcastSource::<String>::new(1000));
//! let app = EventStreamRoutes::router(
//!     Arc::clone(&source),
//!     |event| event,
//!     StreamSettings::default(),
//! );
//! // Mount `app` into an axum server, then publish from anywhere:
//! source.publish("hello".to_owned());
//! # let _ = app;
//! # }
//! ```

/// Lifecycle coupling between event sources and stream sinks
pub mod bridge;

/// Stream settings loaded from the environment
pub mod config;

/// Unified error handling and HTTP error responses
pub mod errors;

/// Logging configuration and structured tracing setup
pub mod logging;

/// Server-Sent Events integration for axum
pub mod sse;

pub use bridge::{
    BroadcastSource, EventBridge, EventObserver, EventSource, StreamSink, Subscription,
    TerminationCallback, TransportError,
};
pub use config::StreamSettings;
pub use errors::{AppError, AppResult, ErrorCode};
pub use logging::LoggingConfig;
pub use sse::{EventStreamRoutes, SinkFrame, SinkState, SseSink, StreamManager};
