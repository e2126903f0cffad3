//! Nested configuration tree and dotted-path helpers

use serde_json::{Map, Value};
use std::fmt;

/// A nested mapping of string keys to scalars, sequences or further mappings.
///
/// Used both for the per-source normalized trees and for the merged result.
pub type ConfigTree = Map<String, Value>;

/// An ordered sequence of path segments, e.g. `server.host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DottedPath(Vec<String>);

impl DottedPath {
    /// Parse a dot-separated path, discarding empty segments.
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').filter(|s| !s.is_empty()).map(str::to_string).collect())
    }

    pub fn single(segment: &str) -> Self {
        Self(vec![segment.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// First segment: the top-level section this path lives under.
    pub fn section(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Write `value` at `path`, creating intermediate mappings as needed.
///
/// A non-mapping value sitting where an intermediate level is required is
/// replaced by a fresh mapping.
pub fn insert_path(tree: &mut ConfigTree, path: &DottedPath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut node = tree;
    for segment in parents {
        let slot = node.entry(segment.clone()).or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        node = map;
    }
    node.insert(last.clone(), value);
}

/// Read the value at a dotted path such as `"server.port"`.
pub fn get_path<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a Value> {
    let path = DottedPath::parse(path);
    let (first, rest) = path.segments().split_first()?;
    let mut current = tree.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_creates_intermediate_levels() {
        let mut tree = ConfigTree::new();
        insert_path(&mut tree, &DottedPath::parse("storage.dataDir"), json!("/var/loom"));
        assert_eq!(Value::Object(tree), json!({"storage": {"dataDir": "/var/loom"}}));
    }

    #[test]
    fn insert_keeps_siblings() {
        let mut tree = ConfigTree::new();
        insert_path(&mut tree, &DottedPath::parse("server.host"), json!("a"));
        insert_path(&mut tree, &DottedPath::parse("server.port"), json!(1));
        assert_eq!(Value::Object(tree), json!({"server": {"host": "a", "port": 1}}));
    }

    #[test]
    fn insert_replaces_scalar_in_the_way() {
        let mut tree = ConfigTree::new();
        tree.insert("db".into(), json!("sqlite"));
        insert_path(&mut tree, &DottedPath::parse("db.host"), json!("localhost"));
        assert_eq!(Value::Object(tree), json!({"db": {"host": "localhost"}}));
    }

    #[test]
    fn get_path_walks_nested_maps() {
        let tree = json!({"server": {"port": 80}}).as_object().cloned().expect("object");
        assert_eq!(get_path(&tree, "server.port"), Some(&json!(80)));
        assert_eq!(get_path(&tree, "server.host"), None);
        assert_eq!(get_path(&tree, "server.port.x"), None);
    }

    #[test]
    fn parse_ignores_empty_segments() {
        assert_eq!(DottedPath::parse("server..host.").segments(), ["server", "host"]);
        assert_eq!(DottedPath::parse("db.db").to_string(), "db.db");
    }
}
