//! Change-notification listener.
//!
//! Each subscription is drained on its own task. A notification is only a
//! hint that something changed; handlers re-fetch rather than merge the
//! payload. Dropping the listener aborts every task, which releases the
//! underlying subscriptions.

use crate::board::ports::{ChangeNotification, ChangeSubscription};
use std::future::Future;
use std::ops::ControlFlow;
use tokio::task::JoinHandle;
use tracing::debug;

/// Owns the tasks draining a set of change subscriptions.
#[derive(Debug, Default)]
pub struct ChangeListener {
    handles: Vec<JoinHandle<()>>,
}

impl ChangeListener {
    /// Spawns one task per subscription, invoking `handler` for every
    /// notification until the feed closes or the handler breaks.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn<F, Fut>(subscriptions: Vec<ChangeSubscription>, handler: F) -> Self
    where
        F: Fn(ChangeNotification) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let handles = subscriptions
            .into_iter()
            .map(|mut subscription| {
                let on_change = handler.clone();
                tokio::spawn(async move {
                    let table = subscription.table();
                    debug!(%table, "change subscription started");
                    while let Some(notification) = subscription.next().await {
                        if on_change(notification).await.is_break() {
                            break;
                        }
                    }
                    debug!(%table, "change subscription stopped");
                })
            })
            .collect();
        Self { handles }
    }

    /// Aborts every subscription task.
    pub fn shutdown(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}
