//! Single-slot result mailbox
//!
//! `wait` hands the opener a future; window logic later calls `resolve` from
//! an event handler. The slot remembers one resolver at a time. Waiting again
//! before the first resolution rejects the earlier future with
//! [`ResultError::Superseded`], and tearing the form down rejects a pending
//! future with [`ResultError::Abandoned`].

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use thiserror::Error;

type Delivery = Result<Box<dyn Any>, ResultError>;

/// Why a result future finished without a value
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResultError {
    /// A later `wait` replaced this one
    #[error("Result wait was superseded by a newer wait")]
    Superseded,

    /// The form was destroyed before producing a result
    #[error("Form was destroyed before producing a result")]
    Abandoned,

    /// The delivered value was not of the awaited type
    #[error("Result value has an unexpected type")]
    TypeMismatch,
}

/// Future returned by `wait`, resolving to the value passed to `resolve`
#[must_use = "futures do nothing unless awaited"]
pub struct ResultFuture<V> {
    receiver: oneshot::Receiver<Delivery>,
    _marker: PhantomData<fn() -> V>,
}

impl<V: 'static> Future for ResultFuture<V> {
    type Output = Result<V, ResultError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(ResultError::Abandoned)),
            Poll::Ready(Ok(Err(e))) => Poll::Ready(Err(e)),
            Poll::Ready(Ok(Ok(value))) => Poll::Ready(
                value
                    .downcast::<V>()
                    .map(|value| *value)
                    .map_err(|_| ResultError::TypeMismatch),
            ),
        }
    }
}

/// Holder of the single outstanding resolver
#[derive(Default)]
pub struct ResultSlot {
    sender: Option<oneshot::Sender<Delivery>>,
}

impl ResultSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh resolver and return its future
    pub fn wait<V: 'static>(&mut self) -> ResultFuture<V> {
        let (sender, receiver) = oneshot::channel();
        if let Some(previous) = self.sender.replace(sender) {
            if previous.send(Err(ResultError::Superseded)).is_ok() {
                log::debug!("Pending result wait superseded");
            }
        }
        ResultFuture {
            receiver,
            _marker: PhantomData,
        }
    }

    /// Deliver `value` to the stored resolver
    ///
    /// Returns whether a waiter received it. The resolver is consumed either
    /// way, so a second call returns false.
    pub fn resolve<V: 'static>(&mut self, value: V) -> bool {
        self.sender
            .take()
            .is_some_and(|sender| sender.send(Ok(Box::new(value))).is_ok())
    }

    /// Whether a resolver is stored and its future is still alive
    pub fn is_pending(&self) -> bool {
        self.sender.as_ref().is_some_and(|sender| !sender.is_canceled())
    }

    /// Reject the pending future, if any, as abandoned
    pub fn abandon(&mut self) {
        if let Some(sender) = self.sender.take() {
            if sender.send(Err(ResultError::Abandoned)).is_ok() {
                log::debug!("Pending result abandoned");
            }
        }
    }
}

impl fmt::Debug for ResultSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSlot")
            .field("pending", &self.is_pending())
            .finish()
    }
}
