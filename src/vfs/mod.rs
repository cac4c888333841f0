// Virtual filesystem module
//
// The analysis engine host reads its input from a tiny virtual filesystem
// with four fixed paths. This module defines the read/write/watch contract
// this core consumes ([`PlaygroundFs`]), the fixed playground documents
// ([`Document`]), and an in-memory implementation used by tests and the
// CLI. The engine-facing synchronization logic lives in [`sync`].

pub mod sync;

pub use sync::{DocumentSync, WATCH_DEBOUNCE};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::trace;

use crate::models::{ConfigModel, ConfigPatch};

/// The fixed files the playground exposes to the analysis engine.
///
/// Each document mirrors exactly one configuration field; the pairing is
/// what lets [`sync::DocumentSync`] tell an echo of its own write apart
/// from a real editor change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    /// `/file.ts`, the primary source; mirrors `code`
    Source,
    /// `/demo.tsx`, the scratch source; mirrors `code2`
    Demo,
    /// `/.eslintrc`, the lint configuration; mirrors `eslintrc`
    LintConfig,
    /// `/tsconfig.json`, the compiler configuration; mirrors `tsconfig`
    CompilerConfig,
}

impl Document {
    /// Every playground document, in editor-tab order.
    pub const ALL: [Document; 4] = [
        Document::Source,
        Document::Demo,
        Document::LintConfig,
        Document::CompilerConfig,
    ];

    /// Fixed virtual path of this document.
    pub fn path(self) -> &'static Utf8Path {
        Utf8Path::new(match self {
            Document::Source => "/file.ts",
            Document::Demo => "/demo.tsx",
            Document::LintConfig => "/.eslintrc",
            Document::CompilerConfig => "/tsconfig.json",
        })
    }

    /// Resolve a virtual path back to its document, if it is one of ours.
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.as_str() {
            "/file.ts" => Some(Document::Source),
            "/demo.tsx" => Some(Document::Demo),
            "/.eslintrc" => Some(Document::LintConfig),
            "/tsconfig.json" => Some(Document::CompilerConfig),
            _ => None,
        }
    }

    /// Tab label: the file name without the leading slash.
    pub fn label(self) -> &'static str {
        &self.path().as_str()[1..]
    }

    /// Whether this document offers a visual (form-based) editor in
    /// addition to the text editor. Only the JSON config documents do.
    pub fn has_visual_editor(self) -> bool {
        matches!(self, Document::LintConfig | Document::CompilerConfig)
    }

    /// The configuration field this document mirrors.
    pub fn read_from(self, config: &ConfigModel) -> &str {
        match self {
            Document::Source => &config.code,
            Document::Demo => &config.code2,
            Document::LintConfig => &config.eslintrc,
            Document::CompilerConfig => &config.tsconfig,
        }
    }

    /// A patch setting this document's configuration field to `text`.
    pub fn patch_with(self, text: String) -> ConfigPatch {
        let mut patch = ConfigPatch::default();
        match self {
            Document::Source => patch.code = Some(text),
            Document::Demo => patch.code2 = Some(text),
            Document::LintConfig => patch.eslintrc = Some(text),
            Document::CompilerConfig => patch.tsconfig = Some(text),
        }
        patch
    }
}

/// Callback invoked with the path of a changed file.
pub type WatchCallback = Box<dyn Fn(&Utf8Path) + Send + Sync>;

/// The filesystem contract the engine host provides.
///
/// Reads and writes are whole-file and synchronous; watching a directory
/// delivers the changed path for every write under it, including writes
/// made through this same interface.
pub trait PlaygroundFs: Send + Sync {
    /// Read the full content of `path`, if the file exists.
    fn read_file(&self, path: &Utf8Path) -> Option<String>;

    /// Create or replace `path` with `content`, notifying watchers.
    fn write_file(&self, path: &Utf8Path, content: &str);

    /// Watch every file under `dir`. The returned handle unregisters the
    /// watcher when closed or dropped.
    fn watch_directory(&self, dir: &Utf8Path, callback: WatchCallback) -> WatchHandle;
}

/// Disposer for a directory watch.
///
/// `close` is idempotent, and dropping an unclosed handle closes it.
pub struct WatchHandle {
    closer: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl WatchHandle {
    /// Wrap the unregister action for one watcher.
    pub fn new<F>(closer: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            closer: Mutex::new(Some(Box::new(closer))),
        }
    }

    /// Unregister the watcher. Further calls do nothing.
    pub fn close(&self) {
        if let Some(close) = self.closer.lock().unwrap().take() {
            close();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.close();
    }
}

struct DirectoryWatcher {
    dir: Utf8PathBuf,
    callback: Arc<dyn Fn(&Utf8Path) + Send + Sync>,
}

/// In-memory [`PlaygroundFs`] with synchronous watch delivery.
///
/// Watchers are notified in registration order, outside the internal
/// locks, so callbacks may re-enter the filesystem.
#[derive(Default)]
pub struct MemoryFs {
    files: RwLock<IndexMap<Utf8PathBuf, String>>,
    watchers: Arc<Mutex<IndexMap<u64, DirectoryWatcher>>>,
    next_watcher_id: AtomicU64,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaygroundFs for MemoryFs {
    fn read_file(&self, path: &Utf8Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    fn write_file(&self, path: &Utf8Path, content: &str) {
        self.files
            .write()
            .unwrap()
            .insert(path.to_owned(), content.to_string());
        trace!("wrote {} ({} bytes)", path, content.len());

        let interested: Vec<Arc<dyn Fn(&Utf8Path) + Send + Sync>> = {
            let watchers = self.watchers.lock().unwrap();
            watchers
                .values()
                .filter(|watcher| path.starts_with(&watcher.dir))
                .map(|watcher| Arc::clone(&watcher.callback))
                .collect()
        };
        for callback in interested {
            callback(path);
        }
    }

    fn watch_directory(&self, dir: &Utf8Path, callback: WatchCallback) -> WatchHandle {
        let id = self.next_watcher_id.fetch_add(1, Ordering::Relaxed);
        self.watchers.lock().unwrap().insert(
            id,
            DirectoryWatcher {
                dir: dir.to_owned(),
                callback: Arc::from(callback),
            },
        );

        let watchers = Arc::clone(&self.watchers);
        WatchHandle::new(move || {
            watchers.lock().unwrap().shift_remove(&id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_paths_round_trip() {
        for document in Document::ALL {
            assert_eq!(Document::from_path(document.path()), Some(document));
        }
        assert_eq!(Document::from_path(Utf8Path::new("/other.ts")), None);
    }

    #[test]
    fn test_document_labels() {
        assert_eq!(Document::Source.label(), "file.ts");
        assert_eq!(Document::LintConfig.label(), ".eslintrc");
    }

    #[test]
    fn test_only_config_documents_have_visual_editors() {
        assert!(!Document::Source.has_visual_editor());
        assert!(!Document::Demo.has_visual_editor());
        assert!(Document::LintConfig.has_visual_editor());
        assert!(Document::CompilerConfig.has_visual_editor());
    }

    #[test]
    fn test_document_field_mapping() {
        let config = ConfigModel {
            code: "a".to_string(),
            code2: "b".to_string(),
            eslintrc: "c".to_string(),
            tsconfig: "d".to_string(),
            ..Default::default()
        };

        assert_eq!(Document::Source.read_from(&config), "a");
        assert_eq!(Document::Demo.read_from(&config), "b");
        assert_eq!(Document::LintConfig.read_from(&config), "c");
        assert_eq!(Document::CompilerConfig.read_from(&config), "d");

        let patch = Document::Demo.patch_with("changed".to_string());
        assert_eq!(patch.code2.as_deref(), Some("changed"));
        assert!(patch.code.is_none());
    }

    #[test]
    fn test_read_write_files() {
        let fs = MemoryFs::new();
        assert!(fs.read_file(Utf8Path::new("/file.ts")).is_none());

        fs.write_file(Utf8Path::new("/file.ts"), "let a = 1;");
        assert_eq!(
            fs.read_file(Utf8Path::new("/file.ts")).as_deref(),
            Some("let a = 1;")
        );

        fs.write_file(Utf8Path::new("/file.ts"), "let b = 2;");
        assert_eq!(
            fs.read_file(Utf8Path::new("/file.ts")).as_deref(),
            Some("let b = 2;")
        );
    }

    #[test]
    fn test_root_watcher_sees_all_writes() {
        let fs = MemoryFs::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _handle = fs.watch_directory(
            Utf8Path::new("/"),
            Box::new(move |path| sink.lock().unwrap().push(path.to_owned())),
        );

        fs.write_file(Utf8Path::new("/file.ts"), "x");
        fs.write_file(Utf8Path::new("/tsconfig.json"), "{}");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), ["/file.ts", "/tsconfig.json"]);
    }

    #[test]
    fn test_watcher_scope_filters_paths() {
        let fs = MemoryFs::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _handle = fs.watch_directory(
            Utf8Path::new("/file.ts"),
            Box::new(move |path| sink.lock().unwrap().push(path.to_owned())),
        );

        fs.write_file(Utf8Path::new("/file.ts"), "x");
        fs.write_file(Utf8Path::new("/demo.tsx"), "y");

        assert_eq!(seen.lock().unwrap().as_slice(), ["/file.ts"]);
    }

    #[test]
    fn test_closed_watcher_stops_receiving() {
        let fs = MemoryFs::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = fs.watch_directory(
            Utf8Path::new("/"),
            Box::new(move |path| sink.lock().unwrap().push(path.to_owned())),
        );

        fs.write_file(Utf8Path::new("/file.ts"), "x");
        handle.close();
        handle.close();
        fs.write_file(Utf8Path::new("/file.ts"), "y");

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_handle_unregisters() {
        let fs = MemoryFs::new();
        let count = Arc::new(Mutex::new(0usize));
        {
            let sink = Arc::clone(&count);
            let _handle = fs.watch_directory(
                Utf8Path::new("/"),
                Box::new(move |_| *sink.lock().unwrap() += 1),
            );
            fs.write_file(Utf8Path::new("/file.ts"), "x");
        }
        fs.write_file(Utf8Path::new("/file.ts"), "y");

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_watchers_notified_in_registration_order() {
        let fs = MemoryFs::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = fs.watch_directory(
            Utf8Path::new("/"),
            Box::new(move |_| first.lock().unwrap().push("first")),
        );
        let second = Arc::clone(&order);
        let _b = fs.watch_directory(
            Utf8Path::new("/"),
            Box::new(move |_| second.lock().unwrap().push("second")),
        );

        fs.write_file(Utf8Path::new("/file.ts"), "x");
        assert_eq!(order.lock().unwrap().as_slice(), ["first", "second"]);
    }
}
