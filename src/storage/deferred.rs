//! Deferred Result Module
//!
//! A future that hands back a value computed at call time, but only after
//! yielding once to the executor.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

// == Deferred ==
/// Result of a deferred cache operation.
///
/// The state mutation behind the operation has already happened when a
/// `Deferred` is created; awaiting it only delays the notification to a
/// later scheduler turn. A `get` issued right after a `put` therefore sees
/// the new value even if the put's `Deferred` was never awaited.
#[derive(Debug)]
#[must_use = "a Deferred does nothing unless awaited; use the *_sync form to ignore it"]
pub struct Deferred<T> {
    value: Option<T>,
    yielded: bool,
}

impl<T> Deferred<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: Some(value),
            yielded: false,
        }
    }
}

// No field is ever pinned structurally.
impl<T> Unpin for Deferred<T> {}

impl<T> Future for Deferred<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        Poll::Ready(
            self.value
                .take()
                .expect("Deferred polled after completion"),
        )
    }
}
