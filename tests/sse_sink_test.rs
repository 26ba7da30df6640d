// ABOUTME: Tests for the channel-backed SSE sink state machine
// ABOUTME: Validates terminal transitions, frame emission, and one-shot callbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sse_bridge developers

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use anyhow::anyhow;
use sse_bridge::bridge::{BroadcastSource, EventBridge, StreamSink, TransportError};
use sse_bridge::sse::{SinkFrame, SinkState, SseSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
    let count = Arc::new(AtomicUsize::new(0));
    let cloned = Arc::clone(&count);
    let make = move || {
        let counted = Arc::clone(&cloned);
        Box::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        }) as Box<dyn FnOnce() + Send>
    };
    (count, make)
}

// =============================================================================
// Writes and frames
// =============================================================================

#[test]
fn test_write_delivers_event_frame() {
    let (sink, mut frames) = SseSink::channel();

    sink.write("payload".to_owned()).unwrap();

    assert_eq!(
        frames.try_recv().unwrap(),
        SinkFrame::Event("payload".to_owned())
    );
    assert!(sink.is_open());
}

#[test]
fn test_write_after_complete_is_rejected() {
    let (sink, mut frames) = SseSink::channel();

    sink.complete();
    let error = sink.write("late".to_owned()).unwrap_err();

    assert!(matches!(error, TransportError::Closed));
    assert_eq!(frames.try_recv().unwrap(), SinkFrame::Complete);
    assert!(frames.try_recv().is_err());
}

#[test]
fn test_write_after_receiver_dropped_is_rejected() {
    let (sink, frames) = SseSink::channel();
    drop(frames);

    let error = sink.write("nobody home".to_owned()).unwrap_err();
    assert!(matches!(error, TransportError::Disconnected));
}

// =============================================================================
// Terminal transitions
// =============================================================================

#[test]
fn test_complete_emits_one_frame_and_fires_callbacks_once() {
    let (sink, mut frames) = SseSink::channel();
    let (count, make) = counter();
    sink.on_completion(make());
    sink.on_completion(make());

    sink.complete();
    sink.complete();

    assert_eq!(sink.state(), SinkState::Completed);
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(frames.try_recv().unwrap(), SinkFrame::Complete);
    assert!(frames.try_recv().is_err());
}

#[test]
fn test_complete_with_error_emits_error_frame() {
    let (sink, mut frames) = SseSink::channel();
    let (count, make) = counter();
    sink.on_completion(make());

    sink.complete_with_error(anyhow!("source exploded"));

    assert_eq!(sink.state(), SinkState::Failed);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(
        frames.try_recv().unwrap(),
        SinkFrame::Error("source exploded".to_owned())
    );
}

#[test]
fn test_expire_fires_timeout_callbacks_only() {
    let (sink, mut frames) = SseSink::channel();
    let (completions, make_completion) = counter();
    let (timeouts, make_timeout) = counter();
    sink.on_completion(make_completion());
    sink.on_timeout(make_timeout());

    sink.expire();

    assert_eq!(sink.state(), SinkState::TimedOut);
    assert_eq!(timeouts.load(Ordering::SeqCst), 1);
    assert_eq!(completions.load(Ordering::SeqCst), 0);
    assert!(frames.try_recv().is_err());
}

#[test]
fn test_disconnected_fires_completion_without_frame() {
    let (sink, mut frames) = SseSink::channel();
    let (count, make) = counter();
    sink.on_completion(make());

    sink.disconnected();

    assert_eq!(sink.state(), SinkState::Completed);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(frames.try_recv().is_err());
}

#[test]
fn test_first_terminal_transition_wins() {
    let (sink, mut frames) = SseSink::channel();

    sink.complete_with_error(anyhow!("boom"));
    sink.complete();
    sink.expire();
    sink.disconnected();

    assert_eq!(sink.state(), SinkState::Failed);
    assert_eq!(
        frames.try_recv().unwrap(),
        SinkFrame::Error("boom".to_owned())
    );
    assert!(frames.try_recv().is_err());
}

// =============================================================================
// Late callback registration
// =============================================================================

#[test]
fn test_completion_callback_after_complete_runs_immediately() {
    let (sink, _frames) = SseSink::channel();
    sink.complete();

    let (count, make) = counter();
    sink.on_completion(make());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_timeout_callback_after_expire_runs_immediately() {
    let (sink, _frames) = SseSink::channel();
    sink.expire();

    let (count, make) = counter();
    sink.on_timeout(make());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_completion_callback_after_timeout_never_fires() {
    let (sink, _frames) = SseSink::channel();
    sink.expire();

    let (count, make) = counter();
    sink.on_completion(make());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

// =============================================================================
// End to end: broadcast source -> bridge -> sink frames
// =============================================================================

#[tokio::test]
async fn test_bridge_delivers_frames_end_to_end() {
    let source = BroadcastSource::<u32>::new(16);
    let (sink, mut frames) = SseSink::channel();
    let bridge = EventBridge::attach(
        &source,
        |n: u32| format!("n={n}"),
        Arc::clone(&sink) as Arc<dyn StreamSink<String>>,
    );

    source.publish(1);
    source.publish(2);

    let first = tokio::time::timeout(Duration::from_secs(1), frames.recv())
        .await
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(Duration::from_secs(1), frames.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, SinkFrame::Event("n=1".to_owned()));
    assert_eq!(second, SinkFrame::Event("n=2".to_owned()));

    // Dropping the source closes the channel: completion flows through the bridge
    drop(source);
    let last = tokio::time::timeout(Duration::from_secs(1), frames.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last, SinkFrame::Complete);
    assert_eq!(sink.state(), SinkState::Completed);
    assert!(bridge.is_closed());
}
