// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path operations over nested JSON objects.
//!
//! These helpers are shared by the store, the loaders and the indirection pass.

use serde_json::{Map, Value};

/// Looks up a nested value. Object nodes are indexed by name, array nodes by a
/// numeric segment.
pub fn lookup<'v, S: AsRef<str>>(root: &'v Map<String, Value>, segments: &[S]) -> Option<&'v Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(first.as_ref())?;
    for segment in rest {
        current = match current {
            Value::Object(map) => map.get(segment.as_ref())?,
            Value::Array(items) => items.get(segment.as_ref().parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at the given path, creating (or replacing non-object)
/// intermediate nodes as needed. An empty path is ignored.
pub fn insert_path<S: AsRef<str>>(root: &mut Map<String, Value>, segments: &[S], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        let entry = current
            .entry(segment.as_ref())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.as_ref().to_string(), value);
}

/// Deep-merges `lower` underneath `base`: keys already present in `base` win,
/// nested objects present on both sides are merged recursively.
pub fn merge_under(base: &mut Map<String, Value>, lower: &Map<String, Value>) {
    for (key, lower_value) in lower {
        if !base.contains_key(key) {
            base.insert(key.clone(), lower_value.clone());
            continue;
        }
        if let (Some(Value::Object(base_obj)), Value::Object(lower_obj)) =
            (base.get_mut(key), lower_value)
        {
            merge_under(base_obj, lower_obj);
        }
    }
}

/// Enumerates the leaf paths of an object, depth first. Object nodes are not
/// leaves; every other value (arrays included) is.
pub fn leaf_paths(root: &Map<String, Value>) -> Vec<Vec<String>> {
    fn walk(map: &Map<String, Value>, base: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        for (key, value) in map {
            base.push(key.clone());
            match value {
                Value::Object(child) => walk(child, base, out),
                _ => out.push(base.clone()),
            }
            base.pop();
        }
    }

    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}
