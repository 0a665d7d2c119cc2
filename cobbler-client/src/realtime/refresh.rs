//! Delayed re-fetch that folds a burst of change events into one refresh

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Wait after a change event before re-fetching
pub const REFRESH_DELAY: Duration = Duration::from_millis(300);

/// Runs a re-fetch shortly after the last change event
///
/// Each [`schedule`](Self::schedule) restarts the timer, so a burst of events
/// triggers one refresh. A refresh that already started is left to finish.
pub struct DelayedRefresh<F> {
    delay: Duration,
    action: Arc<F>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<F, Fut> DelayedRefresh<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    pub fn new(action: F) -> Self {
        Self::with_delay(REFRESH_DELAY, action)
    }

    pub fn with_delay(delay: Duration, action: F) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    /// (Re)start the timer; must be called within a Tokio runtime
    pub fn schedule(&self) {
        let action = Arc::clone(&self.action);
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action());
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop a pending refresh
    pub fn cancel(&self) {
        if let Some(timer) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            timer.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl<F> Drop for DelayedRefresh<F> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Arc<AtomicUsize>, DelayedRefresh<impl Fn() -> std::future::Ready<()>>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let refresh = DelayedRefresh::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        });
        (runs, refresh)
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
        // let the spawned action run
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let (runs, refresh) = counting();
        refresh.schedule();
        assert!(refresh.is_pending());

        settle(Duration::from_millis(299)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        settle(Duration::from_millis(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!refresh.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_event_restarts_timer() {
        let (runs, refresh) = counting();
        refresh.schedule();
        settle(Duration::from_millis(200)).await;
        refresh.schedule();
        settle(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        settle(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (runs, refresh) = counting();
        refresh.schedule();
        refresh.cancel();
        settle(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
