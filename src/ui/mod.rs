// UI module - front-end view models and coordination
//
// This module contains:
// - TabStrip: Generic tab row used for editor files and detail views
// - AstViewer: Tree inspector model (filtering, selection, node summaries)
// - PlaygroundController: Main coordinator that wires state, documents,
//   and the inspector together

pub mod controller;
pub mod tabs;
pub mod viewer;

pub use controller::PlaygroundController;
pub use tabs::{Tab, TabStrip, detail_tabs, editor_tabs};
pub use viewer::{AstViewer, NodeSummary, ViewerPorts};
