// Document synchronization
//
// Keeps the virtual filesystem and the configuration in lockstep: every
// committed configuration change is written to the fixed playground files,
// and watched file changes come back as debounced configuration patches.
// The write side and the watch side meet in the middle: a watch delivery
// whose content already equals the mirrored configuration field is an echo
// of our own write and is suppressed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, trace};

use super::{Document, PlaygroundFs, WatchHandle};
use crate::debounce::Debouncer;
use crate::metrics::Metrics;
use crate::state::StateStore;

/// Quiet window for watched file changes.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Bridge between the configuration store and the engine filesystem.
///
/// Construction seeds the filesystem from the current configuration and
/// registers a root watch. From then on, [`sync_documents`](Self::sync_documents)
/// pushes configuration changes out, while edits arriving through the
/// filesystem flow back in as patches after the debounce window.
///
/// Watch deliveries use a single shared debouncer, so a burst touching
/// several files collapses to the last changed path.
pub struct DocumentSync {
    store: StateStore,
    fs: Arc<dyn PlaygroundFs>,
    watch: Mutex<Option<WatchHandle>>,
    debouncer: Debouncer<Utf8PathBuf>,
    metrics: Arc<Metrics>,
}

impl DocumentSync {
    /// Create a sync with the standard debounce window.
    pub fn new(store: StateStore, fs: Arc<dyn PlaygroundFs>) -> Self {
        Self::with_debounce(store, fs, WATCH_DEBOUNCE)
    }

    /// Create a sync with a custom debounce window.
    ///
    /// The initial document write happens before the watch is registered,
    /// so construction itself never schedules debounced work.
    pub fn with_debounce(
        store: StateStore,
        fs: Arc<dyn PlaygroundFs>,
        window: Duration,
    ) -> Self {
        let metrics = store.metrics();

        write_documents(&store, fs.as_ref());

        let patch_store = store.clone();
        let patch_fs = Arc::clone(&fs);
        let patch_metrics = Arc::clone(&metrics);
        let debouncer = Debouncer::new(window, move |path: Utf8PathBuf| {
            apply_file_change(&patch_store, patch_fs.as_ref(), &patch_metrics, &path);
        });

        let watch_debouncer = debouncer.clone();
        let watch_metrics = Arc::clone(&metrics);
        let handle = fs.watch_directory(
            Utf8Path::new("/"),
            Box::new(move |path| {
                watch_metrics.record_watch_event();
                watch_debouncer.call(path.to_owned());
            }),
        );

        Self {
            store,
            fs,
            watch: Mutex::new(Some(handle)),
            debouncer,
            metrics,
        }
    }

    /// Push every configuration document into the filesystem.
    ///
    /// Called after each committed configuration change. The writes fan
    /// back through the watcher and are suppressed as echoes.
    pub fn sync_documents(&self) {
        write_documents(&self.store, self.fs.as_ref());
    }

    /// Stop watching and drop any pending debounced delivery.
    ///
    /// Idempotent; also runs on drop. After disposal, file changes no
    /// longer reach the configuration.
    pub fn dispose(&self) {
        if let Some(handle) = self.watch.lock().unwrap().take() {
            handle.close();
            debug!("document sync disposed");
        }
        if self.debouncer.cancel() {
            self.metrics.record_debounce_cancel();
        }
    }
}

impl Drop for DocumentSync {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn write_documents(store: &StateStore, fs: &dyn PlaygroundFs) {
    let config = store.snapshot();
    for document in Document::ALL {
        fs.write_file(document.path(), document.read_from(&config));
    }
    trace!("wrote {} playground documents", Document::ALL.len());
}

fn apply_file_change(
    store: &StateStore,
    fs: &dyn PlaygroundFs,
    metrics: &Metrics,
    path: &Utf8Path,
) {
    let Some(document) = Document::from_path(path) else {
        trace!("ignoring change to unmanaged file {}", path);
        return;
    };
    let Some(content) = fs.read_file(path) else {
        return;
    };

    let unchanged = store.read(|config| document.read_from(config) == content);
    if unchanged {
        metrics.record_echo_suppressed();
        trace!("suppressed echo for {}", path);
        return;
    }

    metrics.record_document_patch();
    debug!("editor change in {} became a configuration patch", path);
    store.update(document.patch_with(content));
}
