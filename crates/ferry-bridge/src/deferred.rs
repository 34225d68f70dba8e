//! Single-assignment result handle shared by a caller and one worker.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::{BridgeError, BridgeResult};

type Outcome = BridgeResult<String>;

/// Observable state of a [`Deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    /// Not settled yet.
    Pending,
    /// Settled with a result.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

/// Caller side of an invocation.
///
/// Await it, or call [`wait`](Self::wait) from outside an async runtime.
/// Once settled it never changes state.
#[derive(Debug)]
pub struct Deferred {
    receiver: Option<oneshot::Receiver<Outcome>>,
    settled: Option<Outcome>,
}

/// Worker side of an invocation.
///
/// Settling consumes the settler, so a second settlement cannot be written.
/// Dropping it unsettled rejects the handle with [`BridgeError::WorkerLost`].
#[derive(Debug)]
pub struct Settler {
    sender: oneshot::Sender<Outcome>,
}

/// Create a connected settler and pending handle.
#[must_use]
pub fn deferred() -> (Settler, Deferred) {
    let (sender, receiver) = oneshot::channel();
    (
        Settler { sender },
        Deferred {
            receiver: Some(receiver),
            settled: None,
        },
    )
}

impl Settler {
    /// Fulfill the handle.
    pub fn resolve(self, value: String) {
        self.settle(Ok(value));
    }

    /// Reject the handle.
    pub fn reject(self, error: BridgeError) {
        self.settle(Err(error));
    }

    fn settle(self, outcome: Outcome) {
        if self.sender.send(outcome).is_err() {
            tracing::trace!("Caller dropped the deferred before it settled");
        }
    }
}

impl Deferred {
    /// A handle that is already rejected.
    #[must_use]
    pub fn rejected(error: BridgeError) -> Self {
        Self {
            receiver: None,
            settled: Some(Err(error)),
        }
    }

    /// A handle that is already fulfilled.
    #[must_use]
    pub fn fulfilled(value: String) -> Self {
        Self {
            receiver: None,
            settled: Some(Ok(value)),
        }
    }

    /// Peek at the state without blocking.
    pub fn state(&mut self) -> DeferredState {
        if self.settled.is_none() {
            if let Some(receiver) = self.receiver.as_mut() {
                match receiver.try_recv() {
                    Ok(outcome) => self.settled = Some(outcome),
                    Err(TryRecvError::Empty) => return DeferredState::Pending,
                    Err(TryRecvError::Closed) => {
                        self.settled = Some(Err(BridgeError::WorkerLost));
                    },
                }
                self.receiver = None;
            }
        }

        match &self.settled {
            Some(Ok(_)) => DeferredState::Fulfilled,
            Some(Err(_)) => DeferredState::Rejected,
            None => DeferredState::Pending,
        }
    }

    /// Block the current thread until the handle settles.
    ///
    /// # Errors
    ///
    /// The rejection error, if the invocation was rejected.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; await
    /// the handle there instead.
    pub fn wait(mut self) -> Outcome {
        if let Some(outcome) = self.settled.take() {
            return outcome;
        }
        match self.receiver.take() {
            Some(receiver) => receiver.blocking_recv().unwrap_or(Err(BridgeError::WorkerLost)),
            None => Err(BridgeError::WorkerLost),
        }
    }
}

impl Future for Deferred {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.settled.take() {
            return Poll::Ready(outcome);
        }
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Ready(Err(BridgeError::WorkerLost));
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Ready(result) => {
                self.receiver = None;
                Poll::Ready(result.unwrap_or(Err(BridgeError::WorkerLost)))
            },
            Poll::Pending => Poll::Pending,
        }
    }
}
