use crate::error::LayoutError;
use crate::node::Node;
use serde_json::Value as JsonValue;
use std::path::Path;

/// Reads a JSON file and converts it into an attribute tree.
///
/// The file stem becomes the root node's name. Objects map to named
/// children, arrays to unnamed children (rows, texture paths), scalars to
/// values. The layout and tile loaders only ever see the resulting tree.
pub fn load_node_file(path: &str) -> Result<Node, LayoutError> {
    let p = Path::new(path);
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(LayoutError::UnsupportedFormat(path.to_owned()));
    }

    let txt = std::fs::read_to_string(p).map_err(|source| LayoutError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    let json: JsonValue = serde_json::from_str(&txt).map_err(|source| LayoutError::Json {
        path: p.to_path_buf(),
        source,
    })?;

    let name = p.file_stem().and_then(|s| s.to_str()).unwrap_or("root");
    Ok(node_from_json(name, &json))
}

/// Converts one JSON value into a node with the given name.
pub fn node_from_json(name: &str, json: &JsonValue) -> Node {
    let mut node = Node {
        name: name.to_owned(),
        ..Node::default()
    };
    match json {
        JsonValue::Object(fields) => {
            for (key, value) in fields {
                node.children.push(node_from_json(key, value));
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                node.children.push(node_from_json("", item));
            }
        }
        JsonValue::String(s) => node.value = s.clone(),
        JsonValue::Null => {}
        other => node.value = other.to_string(),
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("mq_blockmap_nodes_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn maps_objects_arrays_and_scalars() {
        let dir = temp_dir();
        let path = dir.join("cavern.json");
        let json = r#"{
          "cell_size": 16,
          "key": {
            "d": { "slopes": true, "color": "1 1 1 1" }
          },
          "middleground": ["ddd", "d d"]
        }"#;
        fs::write(&path, json).expect("failed to write layout");

        let root = load_node_file(path.to_str().expect("path utf8")).expect("load");
        assert_eq!(root.name, "cavern");
        assert_eq!(root.child("cell_size").and_then(|c| c.as_f32()), Some(16.0));

        let dirt = root
            .child("key")
            .and_then(|k| k.child("d"))
            .expect("key entry");
        assert!(dirt.child("slopes").is_some_and(|c| c.as_bool()));

        let rows = root.child("middleground").expect("layer");
        assert_eq!(rows.children.len(), 2);
        assert_eq!(rows.children[0].value, "ddd");
        assert!(rows.children[0].name.is_empty());
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let dir = temp_dir();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").expect("failed to write layout");

        let err = load_node_file(path.to_str().expect("path utf8"))
            .err()
            .expect("expected load error");
        assert!(matches!(err, LayoutError::Json { .. }));
    }

    #[test]
    fn rejects_non_json_extensions() {
        let err = load_node_file("layout.node").err().expect("expected load error");
        assert!(matches!(err, LayoutError::UnsupportedFormat(_)));
    }

    #[test]
    fn returns_typed_error_for_missing_file() {
        let dir = temp_dir();
        let path = dir.join("absent.json");
        let err = load_node_file(path.to_str().expect("path utf8"))
            .err()
            .expect("expected load error");
        assert!(matches!(err, LayoutError::Io { .. }));
    }
}
