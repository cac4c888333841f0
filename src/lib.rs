// Lintpad - shareable state core for an interactive lint playground
//
// This is the library crate containing the state, codec, and sync logic.
// The binary crate (main.rs) provides a link-inspector CLI entry point.

pub mod ast;
pub mod codec;
pub mod debounce;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod vfs;

// Re-export commonly used types for convenience
pub use models::{AstView, ConfigModel, ConfigPatch, FileType, SourceType};
pub use state::{LocationPort, StateEvent, StateStore};
pub use ui::PlaygroundController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
