//! Single-resolution async results.
//!
//! `slot()` returns a [`Resolver`] and an [`AsyncResultSlot`]. The resolver is
//! consumed when it settles, so a slot is resolved or rejected at most once; a
//! resolver dropped without settling rejects the slot, so it is never left
//! pending by a lost worker.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{ArkError, ArkResult};

pub const RESOLVER_DROPPED: &str = "Operation was dropped before it completed";

pub fn slot<T>() -> (Resolver<T>, AsyncResultSlot<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx: Some(tx) }, AsyncResultSlot { rx })
}

pub struct Resolver<T> {
    tx: Option<oneshot::Sender<ArkResult<T>>>,
}

impl<T> Resolver<T> {
    pub fn settle(mut self, result: ArkResult<T>) {
        if let Some(tx) = self.tx.take() {
            // The receiver may be gone: the caller stopped awaiting. Nothing to do.
            let _ = tx.send(result);
        }
    }

    pub fn resolve(self, value: T) {
        self.settle(Ok(value))
    }

    pub fn reject(self, err: ArkError) {
        self.settle(Err(err))
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!("resolver dropped without settling; rejecting");
            let _ = tx.send(Err(ArkError::new(RESOLVER_DROPPED)));
        }
    }
}

/// The in-flight result of one bridged call.
#[must_use = "an AsyncResultSlot does nothing unless awaited"]
pub struct AsyncResultSlot<T> {
    rx: oneshot::Receiver<ArkResult<T>>,
}

impl<T> AsyncResultSlot<T> {
    /// A slot that is already rejected, for failures caught before dispatch.
    pub fn rejected(err: ArkError) -> Self {
        let (resolver, slot) = slot();
        resolver.reject(err);
        slot
    }

    pub fn resolved(value: T) -> Self {
        let (resolver, slot) = slot();
        resolver.resolve(value);
        slot
    }

    /// Transform the success value without another dispatch.
    pub fn map<U, F>(self, f: F) -> impl Future<Output = ArkResult<U>>
    where
        F: FnOnce(T) -> U,
    {
        async move { self.await.map(f) }
    }
}

impl<T> Future for AsyncResultSlot<T> {
    type Output = ArkResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|r| match r {
            Ok(result) => result,
            // Unreachable in practice, the resolver's drop always sends first.
            Err(_) => Err(ArkError::new(RESOLVER_DROPPED)),
        })
    }
}
