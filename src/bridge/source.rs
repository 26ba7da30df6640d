// ABOUTME: Event source abstraction for push-based domain event streams
// ABOUTME: Defines the observer callbacks, the subscribe seam, and subscription handles
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 sse_bridge developers

use std::fmt;

/// Callbacks invoked by an event source as it produces events and terminates.
///
/// Implementations must tolerate concurrent invocation: sources deliver events and
/// terminal signals from arbitrary executing contexts.
pub trait EventObserver<E>: Send + Sync {
    /// A domain event was produced
    fn on_event(&self, event: E);

    /// The source terminated abnormally; no further callbacks will follow
    fn on_error(&self, error: anyhow::Error);

    /// The source completed normally; no further callbacks will follow
    fn on_complete(&self);
}

/// A push-based source of domain events
pub trait EventSource<E>: Send + Sync {
    /// Register interest in this source's events.
    ///
    /// After [`Subscription::dispose`] is called, no further observer callbacks occur.
    /// Callbacks already in flight at disposal time may still land; observers must
    /// tolerate that brief race.
    fn subscribe(&self, observer: std::sync::Arc<dyn EventObserver<E>>) -> Subscription;
}

/// Handle for an active registration with an [`EventSource`].
///
/// Disposal is idempotent and also happens on drop, so an abandoned subscription
/// cannot leak its registration.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription whose disposal runs the given cancel action
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Release the registration; only the first call has effect
    pub fn dispose(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether this subscription has been disposed
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_dispose_runs_cancel_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let mut subscription = Subscription::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!subscription.is_disposed());
        subscription.dispose();
        subscription.dispose();

        assert!(subscription.is_disposed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        {
            let _subscription = Subscription::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispose_then_drop_cancels_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        {
            let mut subscription = Subscription::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
            subscription.dispose();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
