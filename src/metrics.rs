// Performance metrics module
//
// Provides lightweight metrics tracking for monitoring the state-sync core

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared performance metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// One instance is created per [`StateStore`](crate::state::StateStore)
/// and shared with its collaborators; counters are logged on shutdown for
/// performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Number of committed configuration updates (echoes excluded)
    pub state_updates: AtomicU64,

    /// Number of in-place URL fragment replacements
    pub url_replaces: AtomicU64,

    /// Number of full reloads requested for tool-version changes
    pub reload_requests: AtomicU64,

    /// Number of persisted-subset writes
    pub storage_writes: AtomicU64,

    /// Number of state change events broadcast
    pub events_broadcast: AtomicU64,

    /// Number of raw filesystem watch callbacks received
    pub watch_events: AtomicU64,

    /// Number of watch deliveries suppressed as echoes of our own writes
    pub echoes_suppressed: AtomicU64,

    /// Number of watch deliveries that became configuration patches
    pub document_patches: AtomicU64,

    /// Number of pending debounced runs aborted on disposal
    pub debounce_cancels: AtomicU64,

    /// Store creation time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            state_updates: AtomicU64::new(0),
            url_replaces: AtomicU64::new(0),
            reload_requests: AtomicU64::new(0),
            storage_writes: AtomicU64::new(0),
            events_broadcast: AtomicU64::new(0),
            watch_events: AtomicU64::new(0),
            echoes_suppressed: AtomicU64::new(0),
            document_patches: AtomicU64::new(0),
            debounce_cancels: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a committed configuration update
    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an in-place URL replacement
    pub fn record_url_replace(&self) {
        self.url_replaces.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a requested full reload
    pub fn record_reload_request(&self) {
        self.reload_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a persisted-subset write
    pub fn record_storage_write(&self) {
        self.storage_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a broadcast state change event
    pub fn record_event_broadcast(&self) {
        self.events_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a raw watch callback
    pub fn record_watch_event(&self) {
        self.watch_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch delivery suppressed as an echo
    pub fn record_echo_suppressed(&self) {
        self.echoes_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch delivery that patched the configuration
    pub fn record_document_patch(&self) {
        self.document_patches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pending debounced run aborted on disposal
    pub fn record_debounce_cancel(&self) {
        self.debounce_cancels.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let uptime = self.uptime();
        tracing::info!("=== Playground Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", uptime.as_secs_f64());
        tracing::info!(
            "State: {} updates, {} events broadcast, {} storage writes",
            self.state_updates.load(Ordering::Relaxed),
            self.events_broadcast.load(Ordering::Relaxed),
            self.storage_writes.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Navigation: {} URL replacements, {} reload requests",
            self.url_replaces.load(Ordering::Relaxed),
            self.reload_requests.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Documents: {} watch events, {} patches applied, {} echoes suppressed, {} cancelled runs",
            self.watch_events.load(Ordering::Relaxed),
            self.document_patches.load(Ordering::Relaxed),
            self.echoes_suppressed.load(Ordering::Relaxed),
            self.debounce_cancels.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.state_updates.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.watch_events.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_state_operations() {
        let metrics = Metrics::new();

        metrics.record_state_update();
        metrics.record_state_update();
        metrics.record_url_replace();
        metrics.record_reload_request();
        metrics.record_storage_write();
        metrics.record_event_broadcast();

        assert_eq!(metrics.state_updates.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.url_replaces.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.reload_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.storage_writes.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.events_broadcast.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_document_operations() {
        let metrics = Metrics::new();

        metrics.record_watch_event();
        metrics.record_watch_event();
        metrics.record_echo_suppressed();
        metrics.record_document_patch();
        metrics.record_debounce_cancel();

        assert_eq!(metrics.watch_events.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.echoes_suppressed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.document_patches.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.debounce_cancels.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
