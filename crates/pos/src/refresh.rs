//! Delayed catalog refresh (pull-to-refresh).
//!
//! The refresh runs once after a fixed delay on the tokio runtime. The
//! returned [`PendingRefresh`] aborts the task when cancelled or dropped, so
//! a refresh never fires into a view that has already gone away.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Delay between the pull gesture and the refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(800);

/// Schedules one-shot delayed refreshes.
#[derive(Debug, Clone, Copy)]
pub struct RefreshTimer {
    delay: Duration,
}

impl Default for RefreshTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_DELAY)
    }
}

impl RefreshTimer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once after the configured delay.
    ///
    /// Must be called from within a tokio runtime. Keep the returned handle
    /// alive for as long as the refresh should still happen.
    #[must_use = "dropping the handle cancels the refresh"]
    pub fn schedule<F>(&self, task: F) -> PendingRefresh
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = self.delay;
        debug!(?delay, "Refresh scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Refresh firing");
            task();
        });
        PendingRefresh { handle }
    }
}

/// Handle to a scheduled refresh.
#[derive(Debug)]
pub struct PendingRefresh {
    handle: JoinHandle<()>,
}

impl PendingRefresh {
    /// Abort the refresh if it has not fired yet.
    pub fn cancel(self) {
        // Drop aborts.
    }

    /// Returns true once the refresh has run or was aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PendingRefresh {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("Refresh cancelled");
            self.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = Arc::clone(&count);
        (count, move || {
            task_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_fires_after_delay() {
        let (count, task) = counter();
        let pending = RefreshTimer::default().schedule(task);

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(pending.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_refresh_never_fires() {
        let (count, task) = counter();
        let pending = RefreshTimer::new(Duration::from_millis(100)).schedule(task);
        pending.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_cancels() {
        let (count, task) = counter();
        drop(RefreshTimer::new(Duration::from_millis(100)).schedule(task));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(RefreshTimer::default().delay(), Duration::from_millis(800));
    }
}
