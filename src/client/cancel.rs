// ABOUTME: Handle for interrupting a blocking client call from another thread
// ABOUTME: Wakes the operation in progress, which then fails with SmppError::Cancelled

use std::sync::Arc;
use tokio::sync::Notify;

/// Cloneable handle returned by `SmppClient::cancel_handle`.
///
/// `cancel` only affects an operation that is already waiting; a call made
/// after `cancel` runs normally.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.notify.notify_waiters();
    }

    /// Completes when `cancel` is called.
    pub(crate) async fn cancelled(&self) {
        self.notify.notified().await;
    }
}
