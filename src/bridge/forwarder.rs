// ABOUTME: The EventBridge core coupling one source subscription to one stream sink
// ABOUTME: Guarantees one-shot teardown no matter which side terminates first
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

use super::sink::{StreamSink, TransportError};
use super::source::{EventObserver, EventSource, Subscription};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Hook invoked when a single write to the sink fails.
///
/// The failure is non-fatal; the hook exists so the embedding system can route it to
/// its own logs or metrics.
pub type WriteFailureHook = Box<dyn Fn(&TransportError) + Send + Sync>;

/// Couples a subscription on an [`EventSource`] to a [`StreamSink`].
///
/// Each domain event is mapped through the supplied function and written to the sink.
/// Whichever terminal signal arrives first (sink completion, sink timeout, source
/// error, or source completion) closes the bridge and disposes the subscription
/// exactly once. Events delivered after the bridge closed are silently dropped.
pub struct EventBridge<W> {
    sink: Arc<dyn StreamSink<W>>,
    subscription: Mutex<Option<Subscription>>,
    closed: AtomicBool,
    on_write_failure: WriteFailureHook,
}

impl<W> EventBridge<W> {
    /// Attach a bridge between `source` and `sink`.
    ///
    /// Termination callbacks are registered on the sink first, then the source is
    /// subscribed synchronously, before this returns. Event delivery is
    /// asynchronous relative to the return. Write failures are logged as warnings;
    /// use [`EventBridge::attach_with_hook`] to route them elsewhere.
    ///
    /// The mapping must be total: a panicking `to_wire` is a caller bug. Callers with
    /// fallible mappings should pre-map into a `Result` upstream and surface mapping
    /// failure as a source error.
    pub fn attach<E, S, F>(source: &S, to_wire: F, sink: Arc<dyn StreamSink<W>>) -> Arc<Self>
    where
        E: Send + 'static,
        W: Send + 'static,
        S: EventSource<E> + ?Sized,
        F: Fn(E) -> W + Send + Sync + 'static,
    {
        Self::attach_with_hook(
            source,
            to_wire,
            sink,
            Box::new(|error| {
                tracing::warn!("failed to forward event to stream sink: {error}");
            }),
        )
    }

    /// Attach a bridge with a custom write-failure hook.
    pub fn attach_with_hook<E, S, F>(
        source: &S,
        to_wire: F,
        sink: Arc<dyn StreamSink<W>>,
        on_write_failure: WriteFailureHook,
    ) -> Arc<Self>
    where
        E: Send + 'static,
        W: Send + 'static,
        S: EventSource<E> + ?Sized,
        F: Fn(E) -> W + Send + Sync + 'static,
    {
        let bridge = Arc::new(Self {
            sink: Arc::clone(&sink),
            subscription: Mutex::new(None),
            closed: AtomicBool::new(false),
            on_write_failure,
        });

        // Weak references keep the sink's callback registry from holding the
        // bridge (and through it the sink itself) alive after the connection ends.
        let weak = Arc::downgrade(&bridge);
        sink.on_completion(Box::new(move || {
            if let Some(bridge) = weak.upgrade() {
                bridge.teardown();
            }
        }));
        let weak = Arc::downgrade(&bridge);
        sink.on_timeout(Box::new(move || {
            if let Some(bridge) = weak.upgrade() {
                bridge.teardown();
            }
        }));

        let observer = BridgeObserver {
            bridge: Arc::clone(&bridge),
            to_wire,
            _events: PhantomData,
        };
        let mut subscription = source.subscribe(Arc::new(observer));

        // A terminal signal may have fired while subscribe was in flight; checked
        // under the mutex so it cannot race with teardown's take.
        let mut slot = bridge
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if bridge.closed.load(Ordering::Acquire) {
            subscription.dispose();
        } else {
            *slot = Some(subscription);
        }
        drop(slot);

        bridge
    }

    /// Whether the bridge has reached its terminal state
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// One-shot teardown: flips the closed flag and disposes the subscription.
    ///
    /// Safe to invoke from any number of racing terminal signals; only the first
    /// invocation has effect.
    fn teardown(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut subscription) = subscription {
            subscription.dispose();
        }
        tracing::debug!("event bridge closed, subscription disposed");
    }
}

struct BridgeObserver<E, W, F> {
    bridge: Arc<EventBridge<W>>,
    to_wire: F,
    _events: PhantomData<fn(E)>,
}

impl<E, W, F> EventObserver<E> for BridgeObserver<E, W, F>
where
    E: Send + 'static,
    W: Send + 'static,
    F: Fn(E) -> W + Send + Sync + 'static,
{
    fn on_event(&self, event: E) {
        if self.bridge.closed.load(Ordering::Acquire) {
            return;
        }
        let wire = (self.to_wire)(event);
        if let Err(error) = self.bridge.sink.write(wire) {
            (self.bridge.on_write_failure)(&error);
        }
    }

    fn on_error(&self, error: anyhow::Error) {
        self.bridge.sink.complete_with_error(error);
        self.bridge.teardown();
    }

    fn on_complete(&self) {
        self.bridge.sink.complete();
        self.bridge.teardown();
    }
}
