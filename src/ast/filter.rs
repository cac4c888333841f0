// Selector filtering
//
// The ESTree view can be narrowed by a node selector. Evaluation is
// behind the SelectorEngine port: the host may plug in a full selector
// library, while this crate ships a minimal type-list engine. A filter
// that cannot be evaluated falls back to the unfiltered tree.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors from selector evaluation.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported selector syntax: `{0}`")]
    Unsupported(String),

    #[error("selector evaluation failed: {0}")]
    Evaluation(String),
}

/// Node-selector evaluation contract.
///
/// `query` returns every node of `tree` matched by `selector`, in
/// traversal order.
#[cfg_attr(test, mockall::automock)]
pub trait SelectorEngine: Send + Sync {
    fn query(&self, tree: &Value, selector: &str) -> Result<Vec<Value>, SelectorError>;
}

/// Minimal built-in engine: a comma-separated list of node type names,
/// with `*` matching every typed node.
///
/// Anything using richer selector syntax (combinators, attributes,
/// pseudo-classes) is rejected as unsupported rather than silently
/// mis-evaluated; hosts wanting that plug in a real engine.
#[derive(Debug, Default)]
pub struct TypeListEngine;

impl TypeListEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SelectorEngine for TypeListEngine {
    fn query(&self, tree: &Value, selector: &str) -> Result<Vec<Value>, SelectorError> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        for c in trimmed.chars() {
            let allowed =
                c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '$' | '*' | ',');
            if !allowed {
                return Err(SelectorError::Unsupported(trimmed.to_string()));
            }
        }

        let names: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut matches = Vec::new();
        collect_matches(tree, &names, &mut matches);
        Ok(matches)
    }
}

fn collect_matches(value: &Value, names: &[&str], out: &mut Vec<Value>) {
    match value {
        Value::Object(map) => {
            if let Some(node_type) = map.get("type").and_then(Value::as_str)
                && names.iter().any(|name| *name == "*" || *name == node_type)
            {
                out.push(value.clone());
            }
            for child in map.values() {
                collect_matches(child, names, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_matches(item, names, out);
            }
        }
        _ => {}
    }
}

/// Apply `selector` to `value` through `engine`, falling back to the
/// unfiltered tree when evaluation fails.
///
/// A filter error must never take the inspector down; the worst outcome
/// of a bad selector is seeing the whole tree again.
pub fn try_apply_filter(value: &Value, selector: Option<&str>, engine: &dyn SelectorEngine) -> Value {
    let Some(selector) = selector else {
        return value.clone();
    };
    match engine.query(value, selector) {
        Ok(matches) => Value::Array(matches),
        Err(err) => {
            warn!("selector filter failed, showing unfiltered tree: {}", err);
            value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "type": "Program",
            "range": [0, 20],
            "body": [
                {
                    "type": "VariableDeclaration",
                    "range": [0, 10],
                    "declarations": [
                        { "type": "Identifier", "name": "a", "range": [4, 5] }
                    ]
                },
                { "type": "EmptyStatement", "range": [10, 11] }
            ]
        })
    }

    #[test]
    fn test_type_list_matches_nested_nodes() {
        let engine = TypeListEngine::new();
        let matches = engine.query(&tree(), "Identifier").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["name"], "a");
    }

    #[test]
    fn test_comma_list_matches_multiple_types() {
        let engine = TypeListEngine::new();
        let matches = engine
            .query(&tree(), "EmptyStatement, VariableDeclaration")
            .unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_wildcard_matches_every_typed_node() {
        let engine = TypeListEngine::new();
        let matches = engine.query(&tree(), "*").unwrap();
        assert_eq!(matches.len(), 4);
    }

    #[test]
    fn test_no_hits_is_an_empty_match_list() {
        let engine = TypeListEngine::new();
        let matches = engine.query(&tree(), "ForStatement").unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_selector_is_rejected() {
        let engine = TypeListEngine::new();
        assert!(matches!(
            engine.query(&tree(), "   "),
            Err(SelectorError::Empty)
        ));
        assert!(matches!(
            engine.query(&tree(), ", ,"),
            Err(SelectorError::Empty)
        ));
    }

    #[test]
    fn test_rich_syntax_is_rejected() {
        let engine = TypeListEngine::new();
        assert!(matches!(
            engine.query(&tree(), "Program > Identifier"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(matches!(
            engine.query(&tree(), "Identifier[name='a']"),
            Err(SelectorError::Unsupported(_))
        ));
    }

    #[test]
    fn test_filter_absent_returns_tree_unchanged() {
        let engine = TypeListEngine::new();
        let value = tree();
        assert_eq!(try_apply_filter(&value, None, &engine), value);
    }

    #[test]
    fn test_filter_wraps_matches_in_array() {
        let engine = TypeListEngine::new();
        let filtered = try_apply_filter(&tree(), Some("Identifier"), &engine);
        let matches = filtered.as_array().unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_failed_filter_falls_back_to_unfiltered() {
        let mut engine = MockSelectorEngine::new();
        engine
            .expect_query()
            .times(1)
            .returning(|_, _| Err(SelectorError::Evaluation("engine exploded".to_string())));

        let value = tree();
        let shown = try_apply_filter(&value, Some("Identifier"), &engine);
        assert_eq!(shown, value);
    }
}
