//! Helpers for reading and writing nested JSON document trees.
//!
//! A tree is `Option<Value>`: `None` is an absent node. Nulls and empty
//! objects are never stored, so removing the last child of a node removes
//! the node itself.

use serde_json::{Map, Value};

use super::StorePath;

/// Node at `segments` below `root`.
pub fn value_at<'a>(root: Option<&'a Value>, segments: &[String]) -> Option<&'a Value> {
    let mut current = root?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Drops nulls and empty objects, recursively.
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k, v)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        other => Some(other),
    }
}

/// Replaces the node at `segments` with `new` and returns what was there.
///
/// Intermediate nodes are created as objects, replacing any scalar in the
/// way. Ancestors left empty by a removal are pruned.
pub fn write_at(root: &mut Option<Value>, segments: &[String], new: Option<Value>) -> Option<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return std::mem::replace(root, new);
    };

    if !matches!(root, Some(Value::Object(_))) {
        if new.is_none() {
            return None;
        }
        *root = Some(Value::Object(Map::new()));
    }

    let mut previous = None;
    if let Some(Value::Object(map)) = root {
        let mut child = map.remove(head);
        previous = write_at(&mut child, rest, new);
        if let Some(child) = child {
            map.insert(head.clone(), child);
        }
        if map.is_empty() {
            *root = None;
        }
    }
    previous
}

/// Every leaf under `value`, addressed from `base`.
pub fn flatten(base: &StorePath, value: &Value) -> Vec<(StorePath, Value)> {
    let mut leaves = Vec::new();
    collect_leaves(base, value, &mut leaves);
    leaves
}

fn collect_leaves(path: &StorePath, value: &Value, out: &mut Vec<(StorePath, Value)>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(&path.child(key), child, out);
            }
        }
        leaf => out.push((path.clone(), leaf.clone())),
    }
}

/// Rebuilds the subtree at `base` from leaves. Leaves outside `base` are ignored.
pub fn assemble<I>(base: &StorePath, leaves: I) -> Option<Value>
where
    I: IntoIterator<Item = (StorePath, Value)>,
{
    let mut tree = None;
    for (path, value) in leaves {
        if let Some(relative) = path.relative_to(base) {
            write_at(&mut tree, relative, Some(value));
        }
    }
    tree
}
