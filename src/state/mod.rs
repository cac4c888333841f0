// State management module
//
// This module provides the StateStore which wraps ConfigModel with
// thread-safe access using Arc<RwLock<T>>, reconciles the three state
// sources (defaults, persisted subset, URL fragment), and republishes
// every change back to the URL and storage while emitting change events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::codec;
use crate::metrics::Metrics;
use crate::models::{AstView, ConfigModel, ConfigPatch, FileType, SourceType};
use crate::storage::{self, StoragePort};

/// Change events emitted when the configuration is modified
///
/// These events are emitted to notify interested parties (the document
/// sync, the viewer, the tab strips) about state changes without requiring
/// them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateEvent {
    /// One or more editor documents changed (code, scratch, lint config,
    /// compiler config)
    DocumentsChanged,

    /// File type or source kind changed
    ParseSettingsChanged {
        file_type: FileType,
        source_type: SourceType,
    },

    /// The detail view selection changed
    ViewChanged {
        view: AstView,
    },

    /// An analyzed tool version changed
    ToolVersionsChanged {
        ts: String,
        tse: String,
    },

    /// The URL fragment was replaced in place
    UrlReplaced {
        fragment: String,
    },

    /// A full reload was requested to reinitialize the analysis engine
    ReloadRequested {
        fragment: String,
    },
}

/// Host location contract: the current URL fragment plus the two ways the
/// playground navigates.
///
/// `replace_fragment` swaps the fragment without a reload (history
/// replacement); `reload_with_fragment` navigates to the new fragment and
/// reinitializes the page, which is the only way to swap the analysis
/// engine underneath the playground.
pub trait LocationPort: Send + Sync {
    /// The current fragment, without the leading `#`.
    fn fragment(&self) -> String;

    /// Replace the fragment in place, leaving the page alive.
    fn replace_fragment(&self, fragment: &str);

    /// Navigate to the fragment with a full reload.
    fn reload_with_fragment(&self, fragment: &str);
}

/// In-memory [`LocationPort`] used by tests and the CLI.
///
/// Counts replacements and reloads so tests can assert which navigation
/// path was taken.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    fragment: RwLock<String>,
    replace_count: AtomicU64,
    reload_count: AtomicU64,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a location already pointing at `fragment`.
    pub fn with_fragment(fragment: &str) -> Self {
        Self {
            fragment: RwLock::new(fragment.to_string()),
            ..Default::default()
        }
    }

    /// Number of in-place fragment replacements performed.
    pub fn replace_count(&self) -> u64 {
        self.replace_count.load(Ordering::Relaxed)
    }

    /// Number of full reloads performed.
    pub fn reload_count(&self) -> u64 {
        self.reload_count.load(Ordering::Relaxed)
    }
}

impl LocationPort for MemoryLocation {
    fn fragment(&self) -> String {
        self.fragment.read().unwrap().clone()
    }

    fn replace_fragment(&self, fragment: &str) {
        *self.fragment.write().unwrap() = fragment.to_string();
        self.replace_count.fetch_add(1, Ordering::Relaxed);
    }

    fn reload_with_fragment(&self, fragment: &str) {
        *self.fragment.write().unwrap() = fragment.to_string();
        self.reload_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Thread-safe configuration store with event emission
///
/// This is the central state management component that:
/// - Builds the initial [`ConfigModel`] by layering the persisted subset
///   and the URL fragment over the provided defaults
/// - Applies [`ConfigPatch`] updates, detects what changed, and emits
///   [`StateEvent`]s
/// - Republishes every committed change to storage and the URL, choosing
///   between an in-place fragment replacement and a full reload
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always mutate through the store instead of holding the model directly:
/// - [`read()`](Self::read) for reading state without cloning
/// - [`update()`](Self::update) for mutations with automatic publication
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// # Related Types
///
/// - [`crate::models::ConfigModel`]: The underlying state structure
/// - [`StateEvent`]: Event types emitted on state mutations
/// - [`crate::vfs::DocumentSync`]: Keeps analysis input files in lockstep
/// - [`crate::ui::PlaygroundController`]: Primary consumer of state events
pub struct StateStore {
    /// The configuration protected by RwLock for thread-safe access
    state: Arc<RwLock<ConfigModel>>,

    /// Persistence for the safe subset of the configuration
    storage: Arc<dyn StoragePort>,

    /// Host URL fragment access and navigation
    location: Arc<dyn LocationPort>,

    /// Broadcast channel for emitting state change events
    events_tx: broadcast::Sender<StateEvent>,

    /// Shared counters for observability
    metrics: Arc<Metrics>,
}

impl StateStore {
    /// Create a store by layering the persisted subset and the current URL
    /// fragment over `defaults`, lowest priority first.
    ///
    /// No events are emitted for the initial merge; subscribers observe
    /// only changes made after construction.
    pub fn new(
        defaults: ConfigModel,
        storage: Arc<dyn StoragePort>,
        location: Arc<dyn LocationPort>,
    ) -> Self {
        let mut state = defaults;

        if let Some(stored) = storage::load_stored_config(storage.as_ref()) {
            state = stored.merged_into(&state);
            debug!("applied stored configuration subset");
        }

        let fragment = location.fragment();
        if !fragment.is_empty() {
            state = codec::decode(&fragment).merged_into(&state);
            debug!("applied URL fragment overrides ({} bytes)", fragment.len());
        }

        let (events_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(state)),
            storage,
            location,
            events_tx,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Get a clone of the current configuration
    ///
    /// This clones the entire state, so it's safe to use without holding
    /// locks. For checking individual fields, prefer `read()` with a closure.
    pub fn snapshot(&self) -> ConfigModel {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the configuration
    ///
    /// # Example
    /// ```ignore
    /// let view = store.read(|config| config.show_ast);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ConfigModel) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// The canonical fragment encoding of the current configuration.
    pub fn canonical_fragment(&self) -> String {
        codec::encode(&self.state.read().unwrap())
    }

    /// Apply a patch and republish the configuration
    ///
    /// This is the single mutation path. It:
    /// 1. Merges the patch over the current state
    /// 2. Re-encodes the canonical fragment; if it matches the current
    ///    location, the update is an echo and nothing happens
    /// 3. Persists the safe subset and commits the new state
    /// 4. Emits events for what changed
    /// 5. Replaces the URL fragment in place, or requests a full reload
    ///    when the patch carries a tool version
    ///
    /// # Arguments
    /// * `patch` - The fields to change; absent fields keep their values
    ///
    /// # Returns
    /// The events that were emitted, empty for echoes
    ///
    /// # Example
    /// ```ignore
    /// store.update(ConfigPatch {
    ///     show_ast: Some(AstView::Es),
    ///     ..Default::default()
    /// });
    /// ```
    pub fn update(&self, patch: ConfigPatch) -> Vec<StateEvent> {
        debug!("applying configuration patch");

        let mut state = self.state.write().unwrap();
        let old = state.clone();
        let merged = patch.merged_into(&old);
        let fragment = codec::encode(&merged);

        if self.location.fragment() == fragment {
            trace!("canonical fragment unchanged, nothing to publish");
            return Vec::new();
        }

        storage::save_config(self.storage.as_ref(), &merged);
        self.metrics.record_storage_write();

        *state = merged.clone();
        drop(state);

        self.metrics.record_state_update();
        let mut changes = self.detect_changes(&old, &merged);

        if patch.touches_tool_version() {
            info!("tool version changed, requesting reload");
            self.metrics.record_reload_request();
            self.location.reload_with_fragment(&fragment);
            changes.push(StateEvent::ReloadRequested { fragment });
        } else {
            self.metrics.record_url_replace();
            self.location.replace_fragment(&fragment);
            changes.push(StateEvent::UrlReplaced { fragment });
        }

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.events_tx.send(change.clone());
            self.metrics.record_event_broadcast();
        }

        changes
    }

    /// Merge the current URL fragment into the state
    ///
    /// Called when the host reports a fragment change (back/forward
    /// navigation, manual edit). The fragment is decoded and overlaid on
    /// the current state without being republished: the location is
    /// already what the user asked for.
    ///
    /// # Returns
    /// The events that were emitted, empty when the fragment is empty or
    /// changes nothing
    pub fn on_fragment_change(&self) -> Vec<StateEvent> {
        let fragment = self.location.fragment();
        info!("fragment change detected ({} bytes)", fragment.len());

        if fragment.is_empty() {
            return Vec::new();
        }

        let patch = codec::decode(&fragment);
        let mut state = self.state.write().unwrap();
        let old = state.clone();
        let merged = patch.merged_into(&old);
        *state = merged.clone();
        drop(state);

        let changes = self.detect_changes(&old, &merged);
        for change in &changes {
            let _ = self.events_tx.send(change.clone());
            self.metrics.record_event_broadcast();
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state
    /// changes. Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events_tx.subscribe()
    }

    /// Shared metrics counters for this store and its collaborators.
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Detect what changed between two configurations and generate events
    ///
    /// This is called internally after a merge to determine which events
    /// to emit.
    fn detect_changes(&self, old: &ConfigModel, new: &ConfigModel) -> Vec<StateEvent> {
        let mut changes = Vec::new();

        // Editor document changes
        if old.code != new.code
            || old.code2 != new.code2
            || old.eslintrc != new.eslintrc
            || old.tsconfig != new.tsconfig
        {
            changes.push(StateEvent::DocumentsChanged);
        }

        // Parse setting changes
        if old.file_type != new.file_type || old.source_type != new.source_type {
            changes.push(StateEvent::ParseSettingsChanged {
                file_type: new.file_type,
                source_type: new.source_type,
            });
        }

        // Detail view changes
        if old.show_ast != new.show_ast {
            changes.push(StateEvent::ViewChanged {
                view: new.show_ast,
            });
        }

        // Tool version changes
        if old.ts != new.ts || old.tse != new.tse {
            changes.push(StateEvent::ToolVersionsChanged {
                ts: new.ts.clone(),
                tse: new.tse.clone(),
            });
        }

        changes
    }
}

// Make StateStore cloneable for sharing across threads
impl Clone for StateStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            storage: Arc::clone(&self.storage),
            location: Arc::clone(&self.location),
            events_tx: self.events_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}
