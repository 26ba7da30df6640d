// ABOUTME: Registry of active event stream connections for monitoring
// ABOUTME: Tracks per-connection metadata surfaced by the status endpoint
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// Metadata tracked for each live connection
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionMetadata {
    /// When the client connected
    pub connected_at: DateTime<Utc>,
    /// Number of wire events delivered so far
    pub events_sent: u64,
}

/// Registry of active event stream connections.
///
/// Registration and removal happen on the connection path (removal from a sync drop
/// guard), so the map must not require an async context.
#[derive(Default)]
pub struct StreamManager {
    connections: DashMap<Uuid, ConnectionMetadata>,
}

impl StreamManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection
    pub fn register(&self, connection_id: Uuid) {
        self.connections.insert(
            connection_id,
            ConnectionMetadata {
                connected_at: Utc::now(),
                events_sent: 0,
            },
        );
        tracing::info!("event stream connection registered: {connection_id}");
    }

    /// Remove a connection when the client goes away
    pub fn unregister(&self, connection_id: &Uuid) {
        self.connections.remove(connection_id);
        tracing::info!("event stream connection unregistered: {connection_id}");
    }

    /// Record one delivered event for a connection
    pub fn record_event(&self, connection_id: &Uuid) {
        if let Some(mut metadata) = self.connections.get_mut(connection_id) {
            metadata.events_sent += 1;
        }
    }

    /// Number of live connections
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.connections.len()
    }

    /// Snapshot of all live connections for monitoring
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Uuid, ConnectionMetadata)> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
