//! End-to-end tests for the playground controller
//!
//! These tests verify:
//! - Editor changes flowing through the watch debounce into the link
//! - Committed configuration changes reaching the workspace files
//! - External fragment navigation moving the detail view
//! - Disposal detaching the controller from the workspace
//! - A shared link seeding a complete session

use camino::Utf8Path;
use lintpad::ast::TypeListEngine;
use lintpad::codec;
use lintpad::models::{AstView, ConfigModel, ConfigPatch};
use lintpad::state::{LocationPort, MemoryLocation, StateStore};
use lintpad::storage::MemoryStorage;
use lintpad::ui::PlaygroundController;
use lintpad::vfs::{MemoryFs, PlaygroundFs};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const WINDOW: Duration = Duration::from_millis(40);
const SETTLE: Duration = Duration::from_millis(250);

fn playground(fragment: &str) -> (PlaygroundController, Arc<MemoryFs>, Arc<MemoryLocation>) {
    let location = Arc::new(MemoryLocation::with_fragment(fragment));
    let store = StateStore::new(
        ConfigModel::default(),
        Arc::new(MemoryStorage::new()),
        location.clone(),
    );
    let fs = Arc::new(MemoryFs::new());
    let controller = PlaygroundController::with_debounce(
        store,
        fs.clone(),
        Arc::new(TypeListEngine::new()),
        WINDOW,
    );
    (controller, fs, location)
}

#[tokio::test]
async fn test_editor_change_flows_into_the_link() {
    let (controller, fs, location) = playground("");
    controller.start();

    fs.write_file(Utf8Path::new("/file.ts"), "let shared = 1;");
    tokio::time::sleep(SETTLE).await;

    assert_eq!(controller.store().snapshot().code, "let shared = 1;");
    assert_eq!(location.fragment(), controller.store().canonical_fragment());

    let patch = codec::decode(&location.fragment());
    assert_eq!(patch.code.as_deref(), Some("let shared = 1;"));
}

#[tokio::test]
async fn test_committed_change_reaches_the_workspace() {
    let (controller, fs, _location) = playground("");
    controller.start();

    controller.store().update(ConfigPatch {
        eslintrc: Some(r#"{ "rules": { "semi": "error" } }"#.to_string()),
        ..Default::default()
    });
    tokio::time::sleep(SETTLE).await;

    assert_eq!(
        fs.read_file(Utf8Path::new("/.eslintrc")).as_deref(),
        Some(r#"{ "rules": { "semi": "error" } }"#)
    );
}

#[tokio::test]
async fn test_external_navigation_moves_the_detail_view() {
    let (controller, _fs, location) = playground("");
    controller.start();
    assert_eq!(controller.active_detail_view(), AstView::Off);

    location.replace_fragment("showAST=scope");
    controller.store().on_fragment_change();
    tokio::time::sleep(SETTLE).await;

    assert_eq!(controller.active_detail_view(), AstView::Scope);
}

#[tokio::test]
async fn test_dispose_detaches_from_the_workspace() {
    let (controller, fs, _location) = playground("");
    controller.start();
    controller.dispose();

    // Editor changes no longer flow in
    fs.write_file(Utf8Path::new("/file.ts"), "let after = 1;");
    tokio::time::sleep(SETTLE).await;
    assert_ne!(controller.store().snapshot().code, "let after = 1;");

    // Committed changes no longer flow out
    controller.store().update(ConfigPatch {
        code: Some("let via_store = 1;".to_string()),
        ..Default::default()
    });
    tokio::time::sleep(SETTLE).await;
    assert_eq!(
        fs.read_file(Utf8Path::new("/file.ts")).as_deref(),
        Some("let after = 1;")
    );
}

#[test]
fn test_shared_link_seeds_a_complete_session() {
    let linked = ConfigModel {
        code: "let session = 1;\n".to_string(),
        show_ast: AstView::Es,
        ..Default::default()
    };
    let (controller, fs, location) = playground(&codec::encode(&linked));

    // The workspace and tabs come up in the linked state without the
    // event pump running
    assert_eq!(
        fs.read_file(Utf8Path::new("/file.ts")).as_deref(),
        Some("let session = 1;\n")
    );
    assert_eq!(controller.active_detail_view(), AstView::Es);

    controller.apply_analysis(json!({
        "type": "Program",
        "range": [0, 17],
        "body": [{ "type": "VariableDeclaration", "range": [0, 16] }]
    }));
    controller.set_cursor(Some(4));
    assert_eq!(controller.selected_path(), "ast.body.0");

    let events = controller.select_detail_view(AstView::Types);
    assert!(!events.is_empty());
    assert!(location.fragment().contains("showAST=types"));
}
