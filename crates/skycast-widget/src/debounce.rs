//! Trailing-edge debounce: a burst of triggers runs the action once, after
//! the burst has been quiet for the configured delay.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
    /// Task of the most recent trigger
    latest: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
            latest: Mutex::new(None),
        }
    }

    /// Restart the timer. `action` runs after `delay` unless another trigger
    /// arrives first, in which case it is dropped without running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!("Debounced action superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    action.await;
                }
            }
        });
        *self.latest.lock() = Some(task);
    }

    /// Wait until the most recent trigger has run its action or been
    /// superseded. Returns at once when nothing was triggered.
    pub async fn settled(&self) {
        let task = self.latest.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("Debounced action did not complete: {}", e);
            }
        }
    }

    /// Drop any pending action
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
