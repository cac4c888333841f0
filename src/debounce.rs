// Trailing-edge debouncer
//
// Collapses a burst of calls into a single callback invocation carrying
// the last value, delivered after a quiet window. Watch events from the
// virtual filesystem go through this before they become configuration
// patches.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A trailing-edge debouncer for values of type `T`.
///
/// Each `call` replaces any pending delivery, so only the last value of a
/// burst reaches the callback. Clones share the pending slot: a call on
/// one clone reschedules a run started on another.
///
/// Scheduling spawns onto the ambient tokio runtime, so `call` must be
/// made from within one. There is no implicit cancel-on-drop; the owner
/// decides when pending work dies via [`cancel`](Self::cancel).
pub struct Debouncer<T> {
    window: Duration,
    callback: Callback<T>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer delivering to `callback` after `window` of quiet.
    pub fn new<F>(window: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            window,
            callback: Arc::new(callback),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule `value` for delivery, replacing any pending run.
    pub fn call(&self, value: T) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(task) = pending.take() {
            task.abort();
        }

        let callback = Arc::clone(&self.callback);
        let window = self.window;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            callback(value);
        }));
    }

    /// Abort the pending run, if any.
    ///
    /// Returns whether a not-yet-delivered run was aborted.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.take() {
            Some(task) => {
                let was_pending = !task.is_finished();
                task.abort();
                was_pending
            }
            None => false,
        }
    }
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            callback: Arc::clone(&self.callback),
            pending: Arc::clone(&self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collecting(window: Duration) -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::new(window, move |value: u32| {
            sink.lock().unwrap().push(value);
        });
        (debouncer, seen)
    }

    #[tokio::test]
    async fn test_burst_collapses_to_last_value() {
        let (debouncer, seen) = collecting(Duration::from_millis(50));

        // No await between calls, so none of these can fire early
        debouncer.call(1);
        debouncer.call(2);
        debouncer.call(3);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_spaced_calls_each_deliver() {
        let (debouncer, seen) = collecting(Duration::from_millis(20));

        debouncer.call(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.call(2);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_cancel_prevents_delivery() {
        let (debouncer, seen) = collecting(Duration::from_millis(50));

        debouncer.call(7);
        assert!(debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().unwrap().is_empty());
        // Nothing left to cancel
        assert!(!debouncer.cancel());
    }

    #[tokio::test]
    async fn test_clones_share_the_pending_run() {
        let (debouncer, seen) = collecting(Duration::from_millis(50));
        let clone = debouncer.clone();

        debouncer.call(1);
        clone.call(2);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }
}
