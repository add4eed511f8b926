// SPDX-License-Identifier: MIT
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cooperative cancellation signal shared between the orchestrator (the
/// source of a cancellation) and the workflow engine's suspension points
/// (the LLM call and each tool invocation).
///
/// Cloning shares the same underlying flag — every clone observes the same
/// `cancel()` call.
#[derive(Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)), notify: Arc::new(Notify::new()) }
    }

    /// Signal cancellation to every current and future waiter.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve immediately if already cancelled, otherwise suspend until
    /// `cancel()` is called. Intended for `tokio::select!` against a
    /// suspension point (an LLM call, a tool invocation).
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_immediately_once_cancel_called_first() {
        let handle = CancelHandle::new();
        handle.cancel();
        assert!(handle.is_cancelled());
        handle.cancelled().await;
    }

    #[tokio::test]
    async fn cancel_wakes_a_pending_waiter() {
        let handle = CancelHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::task::yield_now().await;
        handle.cancel();
        task.await.unwrap();
    }

    #[test]
    fn fresh_handle_is_not_cancelled() {
        assert!(!CancelHandle::new().is_cancelled());
    }
}
