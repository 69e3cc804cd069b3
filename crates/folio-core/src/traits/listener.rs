//! Change listener streams.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::Result;

/// A stream of snapshots pushed by a store.
///
/// The first item is the current state; later items follow each change.
/// Dropping the listener releases everything it holds.
pub trait Listener<T>: Stream<Item = Result<T>> + Send + Unpin {}

impl<S, T> Listener<T> for S where S: Stream<Item = Result<T>> + Send + Unpin {}

/// A boxed listener, usable wherever a concrete listener type is needed.
pub struct ListenerStream<T> {
    inner: Pin<Box<dyn Stream<Item = Result<T>> + Send>>,
}

impl<T> ListenerStream<T> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl<T> Stream for ListenerStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl<T> fmt::Debug for ListenerStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerStream").finish_non_exhaustive()
    }
}
