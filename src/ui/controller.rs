// Playground controller - wires state, documents, and the inspector
//
// This module contains the PlaygroundController which coordinates between:
// - StateStore (shareable configuration state)
// - DocumentSync (virtual workspace mirroring)
// - AstViewer (tree inspector model)
// - TabStrip rows (editor files and detail views)
//
// It handles:
// - Front-end mutations → configuration patches
// - Subscribing to state events → keeping documents and tabs in step
// - Routing analysis results and cursor movement into the inspector

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::ast::SelectorEngine;
use crate::models::{AstView, ConfigPatch};
use crate::state::{StateEvent, StateStore};
use crate::ui::tabs::{TabStrip, detail_tabs, editor_tabs};
use crate::ui::viewer::AstViewer;
use crate::vfs::{Document, DocumentSync, PlaygroundFs, WATCH_DEBOUNCE};

/// Coordinator for the playground front end.
///
/// This is the main entry point for embedding the playground. It:
/// - Owns the document sync so committed changes reach the workspace
/// - Subscribes to state events and keeps tabs and inspector in step
/// - Exposes the mutation surface the widgets call into
///
/// Mutations apply their local effect synchronously and then go through
/// [`StateStore::update`]; the event pump picks up changes arriving from
/// anywhere else (fragment navigation, watched file edits) so every path
/// converges on the same reactions.
///
/// # Example
/// ```ignore
/// let store = StateStore::new(ConfigModel::default(), storage, location);
/// let controller = PlaygroundController::new(store, fs, Arc::new(TypeListEngine::new()));
/// controller.start();  // Requires a tokio runtime
///
/// controller.select_detail_view(AstView::Es);
/// controller.apply_analysis(tree);
/// ```
pub struct PlaygroundController {
    /// Shared configuration store
    store: StateStore,

    /// Keeps the virtual workspace mirroring the configuration
    sync: Arc<DocumentSync>,

    /// Tree inspector model
    viewer: Arc<Mutex<AstViewer>>,

    /// Editor file row
    editor_tabs: Mutex<TabStrip<Document>>,

    /// Detail view row, shared with the event pump
    detail_tabs: Arc<Mutex<TabStrip<AstView>>>,

    /// Running event pump, if started
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl PlaygroundController {
    /// Create a controller with the standard watch debounce window.
    pub fn new(
        store: StateStore,
        fs: Arc<dyn PlaygroundFs>,
        engine: Arc<dyn SelectorEngine>,
    ) -> Self {
        Self::with_debounce(store, fs, engine, WATCH_DEBOUNCE)
    }

    /// Create a controller with a custom watch debounce window.
    ///
    /// Constructing the controller seeds the workspace files from the
    /// current configuration and aligns the tab rows and inspector with
    /// it. No events are consumed until [`start`](Self::start) is called.
    pub fn with_debounce(
        store: StateStore,
        fs: Arc<dyn PlaygroundFs>,
        engine: Arc<dyn SelectorEngine>,
        window: Duration,
    ) -> Self {
        let sync = Arc::new(DocumentSync::with_debounce(store.clone(), fs, window));

        let view = store.read(|config| config.show_ast);
        let mut viewer = AstViewer::new(engine);
        viewer.set_tab(view);

        info!("playground controller initialized");

        Self {
            store,
            sync,
            viewer: Arc::new(Mutex::new(viewer)),
            editor_tabs: Mutex::new(editor_tabs()),
            detail_tabs: Arc::new(Mutex::new(detail_tabs(view))),
            pump: Mutex::new(None),
        }
    }

    /// Start the event pump.
    ///
    /// Spawns a task that listens for state events and keeps the
    /// dependent pieces in step: document changes reach the workspace,
    /// view changes move the detail tab and the inspector. Must be called
    /// within a tokio runtime. Calling it twice is a no-op.
    pub fn start(&self) {
        let mut pump = self.pump.lock().unwrap();
        if pump.is_some() {
            warn!("event pump already running");
            return;
        }

        let mut rx = self.store.subscribe();
        let sync = Arc::clone(&self.sync);
        let viewer = Arc::clone(&self.viewer);
        let detail_tabs = Arc::clone(&self.detail_tabs);

        *pump = Some(tokio::spawn(async move {
            debug!("event pump started");

            loop {
                match rx.recv().await {
                    Ok(event) => handle_event(&event, &sync, &viewer, &detail_tabs),
                    Err(RecvError::Closed) => {
                        info!("state channel closed - stopping event pump");
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            "event pump lagged - {} events were skipped, resyncing documents",
                            skipped
                        );
                        // A skipped DocumentsChanged would leave stale files
                        sync.sync_documents();
                    }
                }
            }

            debug!("event pump terminated gracefully");
        }));
    }

    /// Switch the editor to `document`.
    ///
    /// Returns false when it was already active.
    pub fn select_file(&self, document: Document) -> bool {
        self.editor_tabs.lock().unwrap().select(&document)
    }

    /// The document currently open in the editor.
    pub fn active_file(&self) -> Document {
        *self.editor_tabs.lock().unwrap().active()
    }

    /// Switch the detail pane to `view` and publish the change.
    ///
    /// # Returns
    /// The state events the change produced, empty when nothing changed
    pub fn select_detail_view(&self, view: AstView) -> Vec<StateEvent> {
        self.detail_tabs.lock().unwrap().select(&view);
        self.viewer.lock().unwrap().set_tab(view);
        self.store.update(ConfigPatch {
            show_ast: Some(view),
            ..Default::default()
        })
    }

    /// The detail view currently shown.
    pub fn active_detail_view(&self) -> AstView {
        *self.detail_tabs.lock().unwrap().active()
    }

    /// Feed a fresh analysis tree from the engine host into the inspector.
    pub fn apply_analysis(&self, tree: Value) {
        self.viewer.lock().unwrap().set_value(tree);
    }

    /// Set or clear the inspector's selector filter.
    pub fn set_selector_filter(&self, selector: Option<String>) {
        self.viewer.lock().unwrap().set_selector(selector);
    }

    /// Track the editor cursor offset for node highlighting.
    pub fn set_cursor(&self, offset: Option<usize>) {
        self.viewer.lock().unwrap().set_cursor(offset);
    }

    /// The tree as the detail pane currently shows it.
    pub fn viewer_model(&self) -> Value {
        self.viewer.lock().unwrap().model()
    }

    /// Dotted path of the inspector row the cursor lands on.
    pub fn selected_path(&self) -> String {
        self.viewer.lock().unwrap().selected_path()
    }

    /// The underlying configuration store.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Stop the event pump and detach from the workspace.
    ///
    /// Idempotent; also runs on drop. Pending debounced file deliveries
    /// are cancelled.
    pub fn dispose(&self) {
        if let Some(pump) = self.pump.lock().unwrap().take() {
            pump.abort();
            debug!("event pump stopped");
        }
        self.sync.dispose();
    }
}

impl Drop for PlaygroundController {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Apply one state event to the pieces the pump keeps in step.
fn handle_event(
    event: &StateEvent,
    sync: &DocumentSync,
    viewer: &Mutex<AstViewer>,
    detail_tabs: &Mutex<TabStrip<AstView>>,
) {
    trace!("state event received: {:?}", event);

    match event {
        StateEvent::DocumentsChanged => {
            sync.sync_documents();
        }

        StateEvent::ViewChanged { view } => {
            detail_tabs.lock().unwrap().select(view);
            viewer.lock().unwrap().set_tab(*view);
        }

        StateEvent::ParseSettingsChanged {
            file_type,
            source_type,
        } => {
            debug!(
                "parse settings changed: fileType={}, sourceType={}",
                file_type.as_token(),
                source_type.as_token()
            );
        }

        StateEvent::ToolVersionsChanged { ts, tse } => {
            info!("tool versions changed: ts={}, tse={}", ts, tse);
        }

        StateEvent::UrlReplaced { .. } => {
            // The location was already updated by the store
        }

        StateEvent::ReloadRequested { fragment } => {
            info!(
                "engine reload requested ({} byte fragment)",
                fragment.len()
            );
        }
    }
}
