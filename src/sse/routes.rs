// ABOUTME: Axum route handlers exposing event streams over Server-Sent Events
// ABOUTME: Wires a bridge per connection with keep-alive, idle timeout, and cleanup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

use crate::bridge::{BroadcastSource, EventBridge, StreamSink};
use crate::config::StreamSettings;
use crate::sse::manager::StreamManager;
use crate::sse::sink::{SinkFrame, SseSink};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state behind the event stream endpoints
struct EventStreamState<E> {
    source: Arc<BroadcastSource<E>>,
    to_wire: Arc<dyn Fn(E) -> String + Send + Sync>,
    manager: Arc<StreamManager>,
    settings: StreamSettings,
}

impl<E> Clone for EventStreamState<E> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            to_wire: Arc::clone(&self.to_wire),
            manager: Arc::clone(&self.manager),
            settings: self.settings.clone(),
        }
    }
}

/// Route builders for the event stream endpoints
pub struct EventStreamRoutes;

impl EventStreamRoutes {
    /// Build a router exposing `GET /events/stream` and `GET /events/status`.
    ///
    /// Each client connection gets its own subscription on `source`, bridged to an
    /// SSE response. `to_wire` maps a domain event to its wire payload and must be
    /// total; callers with fallible mappings should pre-map upstream.
    #[must_use]
    pub fn router<E>(
        source: Arc<BroadcastSource<E>>,
        to_wire: impl Fn(E) -> String + Send + Sync + 'static,
        settings: StreamSettings,
    ) -> Router
    where
        E: Clone + Send + 'static,
    {
        let state = EventStreamState {
            source,
            to_wire: Arc::new(to_wire),
            manager: Arc::new(StreamManager::new()),
            settings,
        };

        Router::new()
            .route("/events/stream", get(stream_events::<E>))
            .route("/events/status", get(stream_status::<E>))
            .with_state(state)
    }
}

/// Registers the connection on creation and tears everything down when the response
/// stream is dropped, whether the stream ended normally or the client vanished
/// mid-transfer. The bridge handle lives here so it outlives the drop hook.
struct ConnectionGuard {
    sink: Arc<SseSink>,
    manager: Arc<StreamManager>,
    connection_id: Uuid,
    #[allow(dead_code)]
    bridge: Arc<EventBridge<String>>,
}

impl ConnectionGuard {
    fn new(
        sink: Arc<SseSink>,
        manager: Arc<StreamManager>,
        connection_id: Uuid,
        bridge: Arc<EventBridge<String>>,
    ) -> Self {
        manager.register(connection_id);
        Self {
            sink,
            manager,
            connection_id,
            bridge,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.sink.disconnected();
        self.manager.unregister(&self.connection_id);
        tracing::info!("event stream connection closed: {}", self.connection_id);
    }
}

/// Handle a new SSE client connection
async fn stream_events<E>(
    State(state): State<EventStreamState<E>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    E: Clone + Send + 'static,
{
    let connection_id = Uuid::new_v4();
    tracing::info!("new event stream connection: {connection_id}");

    let (sink, mut frames) = SseSink::channel();
    let to_wire = Arc::clone(&state.to_wire);
    let bridge = EventBridge::attach(
        state.source.as_ref(),
        move |event| (to_wire)(event),
        Arc::clone(&sink) as Arc<dyn StreamSink<String>>,
    );

    let guard = ConnectionGuard::new(
        Arc::clone(&sink),
        Arc::clone(&state.manager),
        connection_id,
        bridge,
    );
    let idle_timeout = state.settings.idle_timeout();
    let keepalive_interval = state.settings.keepalive_interval();

    let stream = async_stream::stream! {
        let guard = guard;
        let mut event_id: u64 = 0;

        event_id += 1;
        yield Ok::<_, Infallible>(Event::default()
            .id(event_id.to_string())
            .event("connection")
            .data("connected"));

        loop {
            let frame = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, frames.recv()).await {
                    Ok(frame) => frame,
                    Err(_) => {
                        tracing::info!(
                            "event stream connection timed out: {}",
                            guard.connection_id
                        );
                        sink.expire();
                        break;
                    }
                },
                None => frames.recv().await,
            };

            match frame {
                Some(SinkFrame::Event(payload)) => {
                    event_id += 1;
                    guard.manager.record_event(&guard.connection_id);
                    yield Ok(Event::default()
                        .id(event_id.to_string())
                        .event("message")
                        .data(payload));
                }
                Some(SinkFrame::Complete) => {
                    event_id += 1;
                    yield Ok(Event::default()
                        .id(event_id.to_string())
                        .event("complete")
                        .data("stream completed"));
                    break;
                }
                Some(SinkFrame::Error(message)) => {
                    event_id += 1;
                    yield Ok(Event::default()
                        .id(event_id.to_string())
                        .event("error")
                        .data(message));
                    break;
                }
                None => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(keepalive_interval)
            .text("keepalive"),
    )
}

/// One live connection in the status payload
#[derive(Debug, Serialize)]
struct ConnectionStatus {
    id: Uuid,
    connected_at: DateTime<Utc>,
    events_sent: u64,
}

/// Monitoring snapshot returned by `GET /events/status`
#[derive(Debug, Serialize)]
struct StreamStatusResponse {
    active_connections: usize,
    subscribers: usize,
    connections: Vec<ConnectionStatus>,
}

/// Report active connections and subscriber counts
async fn stream_status<E>(
    State(state): State<EventStreamState<E>>,
) -> Json<StreamStatusResponse>
where
    E: Clone + Send + 'static,
{
    let connections = state
        .manager
        .snapshot()
        .into_iter()
        .map(|(id, metadata)| ConnectionStatus {
            id,
            connected_at: metadata.connected_at,
            events_sent: metadata.events_sent,
        })
        .collect();

    Json(StreamStatusResponse {
        active_connections: state.manager.active_connections(),
        subscribers: state.source.subscriber_count(),
        connections,
    })
}
