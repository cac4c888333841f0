// Tab strips
//
// Generic one-of-N tab selection plus the two fixed strips the playground
// renders: the editor files and the detail views.

use crate::models::AstView;
use crate::vfs::Document;

/// A labelled tab value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab<T> {
    pub value: T,
    pub label: String,
}

/// An ordered strip of tabs with exactly one active value.
#[derive(Debug, Clone)]
pub struct TabStrip<T> {
    tabs: Vec<Tab<T>>,
    active: T,
}

impl<T: Clone + PartialEq> TabStrip<T> {
    /// Create a strip. `active` should be the value of one of `tabs`.
    pub fn new(tabs: Vec<Tab<T>>, active: T) -> Self {
        Self { tabs, active }
    }

    pub fn tabs(&self) -> &[Tab<T>] {
        &self.tabs
    }

    pub fn active(&self) -> &T {
        &self.active
    }

    pub fn is_active(&self, value: &T) -> bool {
        self.active == *value
    }

    /// Activate `value`.
    ///
    /// Returns whether the active tab changed; selecting the current tab
    /// or a value not in the strip is a no-op.
    pub fn select(&mut self, value: &T) -> bool {
        if self.active == *value {
            return false;
        }
        if !self.tabs.iter().any(|tab| tab.value == *value) {
            return false;
        }
        self.active = value.clone();
        true
    }
}

/// The editor file strip, primary source first.
pub fn editor_tabs() -> TabStrip<Document> {
    let tabs = Document::ALL
        .iter()
        .map(|document| Tab {
            value: *document,
            label: document.label().to_string(),
        })
        .collect();
    TabStrip::new(tabs, Document::Source)
}

/// The detail view strip: lint messages first, then the tree views.
pub fn detail_tabs(active: AstView) -> TabStrip<AstView> {
    let tabs = vec![
        Tab {
            value: AstView::Off,
            label: "Errors".to_string(),
        },
        Tab {
            value: AstView::Es,
            label: "ESTree".to_string(),
        },
        Tab {
            value: AstView::Ts,
            label: "TypeScript".to_string(),
        },
        Tab {
            value: AstView::Scope,
            label: "Scope".to_string(),
        },
        Tab {
            value: AstView::Types,
            label: "Types".to_string(),
        },
    ];
    TabStrip::new(tabs, active)
}
