// AST inspection module
//
// Cursor-to-node selection over engine-produced trees, and optional
// selector filtering for the ESTree view. Trees arrive as plain JSON
// values from the analysis engine; insertion order of object properties
// is preserved end to end, which the traversal rules depend on.

pub mod filter;
pub mod selection;

pub use filter::{SelectorEngine, SelectorError, TypeListEngine, try_apply_filter};
pub use selection::{SelectionPath, SelectionStep, find_selection_path, node_range};
