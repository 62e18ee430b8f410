//! Path-keyed data store shared between framers and their acts.
//!
//! The runtime itself only writes the per-framer state mirror
//! (`framer.<name>.state.{elapsed,recurred,active,human}`). Acts read and
//! write arbitrary paths. Writes are last-writer-wins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{FramingError, FramingResult};

static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*(\.[A-Za-z0-9_\-]+)*$").expect("valid store path regex")
});

/// Fields mirrored for every running framer.
pub const STATE_FIELDS: [&str; 4] = ["elapsed", "recurred", "active", "human"];

/// Return the mirror path for `field` of the framer called `framer`.
pub fn state_path(framer: &str, field: &str) -> String {
    format!("framer.{}.state.{}", framer, field)
}

/// True if `path` is a well-formed dotted store path.
pub fn is_valid_path(path: &str) -> bool {
    PATH_RE.is_match(path)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    stamp: f64,
    shares: BTreeMap<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current store time in seconds.
    pub fn stamp(&self) -> f64 {
        self.stamp
    }

    /// Advance store time. Negative deltas are ignored.
    pub fn advance(&mut self, delta: f64) {
        if delta > 0.0 {
            self.stamp += delta;
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.shares.get(path)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> FramingResult<()> {
        if !is_valid_path(path) {
            return Err(FramingError::Store(path.to_string()));
        }
        self.shares.insert(path.to_string(), value.into());
        Ok(())
    }

    /// Nested JSON rendering of the store, splitting paths on `.`.
    ///
    /// A value stored at a path that is also a prefix of a longer path is kept
    /// under the key `"value"` of that node.
    pub fn snapshot(&self) -> Value {
        let mut root = Map::new();
        for (path, value) in &self.shares {
            let parts: Vec<&str> = path.split('.').collect();
            insert_nested(&mut root, &parts, value.clone());
        }
        Value::Object(root)
    }
}

fn insert_nested(node: &mut Map<String, Value>, parts: &[&str], value: Value) {
    let Some((part, rest)) = parts.split_first() else {
        return;
    };
    if rest.is_empty() {
        match node.get_mut(*part) {
            Some(Value::Object(children)) => {
                children.insert("value".to_string(), value);
            }
            _ => {
                node.insert(part.to_string(), value);
            }
        }
        return;
    }

    let entry = node
        .entry(part.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        let previous = std::mem::replace(entry, Value::Object(Map::new()));
        if let Value::Object(children) = &mut *entry {
            children.insert("value".to_string(), previous);
        }
    }
    if let Value::Object(children) = &mut *entry {
        insert_nested(children, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_returns_value() {
        let mut store = Store::new();
        store.set("door.open", true).expect("set");
        assert_eq!(store.get("door.open"), Some(&json!(true)));
    }

    #[test]
    fn set_rejects_malformed_paths() {
        let mut store = Store::new();
        for path in ["", ".a", "a..b", "a.", "a b"] {
            assert!(store.set(path, 1).is_err(), "accepted {path:?}");
        }
    }

    #[test]
    fn advance_ignores_negative_delta() {
        let mut store = Store::new();
        store.advance(0.5);
        store.advance(-2.0);
        assert_eq!(store.stamp(), 0.5);
    }

    #[test]
    fn state_path_matches_mirror_layout() {
        assert_eq!(state_path("mission", "elapsed"), "framer.mission.state.elapsed");
    }

    #[test]
    fn snapshot_nests_paths() {
        let mut store = Store::new();
        store.set("a.b", 1).expect("set");
        store.set("a.c.d", "x").expect("set");
        store.set("a.c", 2).expect("set");
        assert_eq!(
            store.snapshot(),
            json!({"a": {"b": 1, "c": {"d": "x", "value": 2}}})
        );
    }
}
