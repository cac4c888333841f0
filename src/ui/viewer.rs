// AST viewer model
//
// Headless view model for the tree inspector: holds the last analysis
// tree, the active detail tab, the selector filter, and the editor
// cursor, and derives what the detail pane shows from them. Node labels
// and tooltips come through pluggable resolvers so tree flavors
// (ESTree, TypeScript, scope, types) can render their own vocabulary.

use std::sync::Arc;

use serde_json::Value;

use crate::ast::{SelectorEngine, find_selection_path, node_range, try_apply_filter};
use crate::models::AstView;

/// Resolve a display name for a node; `None` renders as a plain value.
pub type TypeNameResolver = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Resolve a hover tooltip for property `key` holding `node`.
pub type TooltipResolver = Arc<dyn Fn(&Value, &str) -> Option<String> + Send + Sync>;

/// Pluggable label and tooltip resolution for rendered rows.
#[derive(Clone)]
pub struct ViewerPorts {
    pub type_name: TypeNameResolver,
    pub tooltip: TooltipResolver,
}

impl Default for ViewerPorts {
    fn default() -> Self {
        Self {
            type_name: Arc::new(|node| {
                node.get("type").and_then(Value::as_str).map(str::to_string)
            }),
            tooltip: Arc::new(|_, _| None),
        }
    }
}

/// Everything needed to render one `key: node` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub type_name: Option<String>,
    pub tooltip: Option<String>,
    pub range: Option<(usize, usize)>,
}

/// View model for the tree inspector.
pub struct AstViewer {
    value: Value,
    tab: AstView,
    selector: Option<String>,
    cursor: Option<usize>,
    engine: Arc<dyn SelectorEngine>,
    ports: ViewerPorts,
}

impl AstViewer {
    pub fn new(engine: Arc<dyn SelectorEngine>) -> Self {
        Self::with_ports(engine, ViewerPorts::default())
    }

    pub fn with_ports(engine: Arc<dyn SelectorEngine>, ports: ViewerPorts) -> Self {
        Self {
            value: Value::Null,
            tab: AstView::Off,
            selector: None,
            cursor: None,
            engine,
            ports,
        }
    }

    /// Replace the displayed tree with a fresh analysis result.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn set_tab(&mut self, tab: AstView) {
        self.tab = tab;
    }

    pub fn tab(&self) -> AstView {
        self.tab
    }

    /// Set or clear the selector filter. The filter only applies while
    /// the ESTree tab is shown; it is kept (not cleared) across tab
    /// switches.
    pub fn set_selector(&mut self, selector: Option<String>) {
        self.selector = selector;
    }

    /// Track the editor cursor offset, or `None` when the editor has no
    /// cursor.
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    /// The tree as displayed: filtered on the ESTree tab, raw elsewhere.
    pub fn model(&self) -> Value {
        let selector = if self.tab == AstView::Es {
            self.selector.as_deref()
        } else {
            None
        };
        try_apply_filter(&self.value, selector, self.engine.as_ref())
    }

    /// Dotted path of the row the editor cursor lands on, rooted at
    /// `ast`. Without a cursor, or with nothing tree-shaped to show, the
    /// root row is selected.
    pub fn selected_path(&self) -> String {
        let model = self.model();
        match self.cursor {
            Some(offset) if model.is_object() || model.is_array() => {
                find_selection_path(&model, offset).dotted("ast")
            }
            _ => "ast".to_string(),
        }
    }

    /// Summary used to render one `key: node` row.
    pub fn summarize(&self, key: &str, node: &Value) -> NodeSummary {
        NodeSummary {
            type_name: (self.ports.type_name)(node),
            tooltip: (self.ports.tooltip)(node, key),
            range: node_range(node),
        }
    }
}
