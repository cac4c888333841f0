// Selection path resolution
//
// Maps an editor cursor offset to the deepest tree node whose source range
// contains it, recording the property and index steps taken from the root.

use std::fmt;

use serde_json::Value;

/// One step in a selection path: an object property or an array element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for SelectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStep::Key(key) => f.write_str(key),
            SelectionStep::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Result of a selection search: the steps taken from the root and the
/// node they land on.
#[derive(Debug)]
pub struct SelectionPath<'a> {
    pub steps: Vec<SelectionStep>,
    pub node: &'a Value,
}

impl SelectionPath<'_> {
    /// Dotted form used to address rendered tree rows, e.g. `ast.body.1`.
    pub fn dotted(&self, root_label: &str) -> String {
        let mut out = String::from(root_label);
        for step in &self.steps {
            out.push('.');
            out.push_str(&step.to_string());
        }
        out
    }
}

/// Read a node's `[start, end)` source range, if it carries one.
pub fn node_range(value: &Value) -> Option<(usize, usize)> {
    let range = value.get("range")?.as_array()?;
    if range.len() != 2 {
        return None;
    }
    let start = range[0].as_u64()? as usize;
    let end = range[1].as_u64()? as usize;
    Some((start, end))
}

/// Walk from `root` to the deepest node whose range contains `offset`.
///
/// At each level the children are scanned in insertion order: object
/// children with a containing range and object elements of array children
/// are candidates, and the first hit wins even if a later sibling range
/// also contains the offset. The walk descends only into the hit; when no
/// child contains the offset the current node is the result, so an offset
/// outside every range resolves to the root alone. Ranges are half-open:
/// an offset equal to `end` is outside.
pub fn find_selection_path(root: &Value, offset: usize) -> SelectionPath<'_> {
    let mut steps = Vec::new();
    let mut node = root;
    while let Some((mut hit_steps, child)) = first_containing_child(node, offset) {
        steps.append(&mut hit_steps);
        node = child;
    }
    SelectionPath { steps, node }
}

fn first_containing_child<'a>(
    node: &'a Value,
    offset: usize,
) -> Option<(Vec<SelectionStep>, &'a Value)> {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::Object(_) => {
                        if contains_offset(child, offset) {
                            return Some((vec![SelectionStep::Key(key.clone())], child));
                        }
                    }
                    Value::Array(items) => {
                        for (index, item) in items.iter().enumerate() {
                            if contains_offset(item, offset) {
                                return Some((
                                    vec![
                                        SelectionStep::Key(key.clone()),
                                        SelectionStep::Index(index),
                                    ],
                                    item,
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if contains_offset(item, offset) {
                    return Some((vec![SelectionStep::Index(index)], item));
                }
            }
            None
        }
        _ => None,
    }
}

fn contains_offset(value: &Value, offset: usize) -> bool {
    node_range(value).is_some_and(|(start, end)| start <= offset && offset < end)
}
