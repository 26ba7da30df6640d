// ABOUTME: Server-Sent Events integration coupling bridges to axum responses
// ABOUTME: Provides the channel-backed sink, connection registry, and route handlers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

/// Connection registry for monitoring active streams
pub mod manager;
/// HTTP route handlers for the SSE endpoints
pub mod routes;
/// Channel-backed stream sink with an explicit terminal-state machine
pub mod sink;

pub use manager::{ConnectionMetadata, StreamManager};
pub use routes::EventStreamRoutes;
pub use sink::{SinkFrame, SinkState, SseSink};
