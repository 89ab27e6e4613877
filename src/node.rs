//! Generic attribute tree describing tiles and layouts.
//!
//! Loaders consume [`Node`]s rather than raw JSON so the description format
//! stays independent of its on-disk carrier. See [`crate::load_node_file`]
//! for the JSON bridge.

use crate::error::LayoutError;

/// A named node carrying an optional scalar value and any number of children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Node name. Children built from JSON arrays have empty names.
    pub name: String,
    /// Scalar payload, empty when the node only carries children.
    pub value: String,
    /// Child nodes in carrier order.
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with a value and no children.
    pub fn leaf(name: &str, value: &str) -> Node {
        Node {
            name: name.to_owned(),
            value: value.to_owned(),
            children: Vec::new(),
        }
    }

    /// Creates a node with children and no value.
    pub fn branch(name: &str, children: Vec<Node>) -> Node {
        Node {
            name: name.to_owned(),
            value: String::new(),
            children,
        }
    }

    /// First child with the given name, if any.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child with the given name, or a typed error naming both parties.
    pub fn need_child(&self, name: &str) -> Result<&Node, LayoutError> {
        self.child(name).ok_or_else(|| LayoutError::MissingChild {
            node: self.name.clone(),
            child: name.to_owned(),
        })
    }

    /// Value parsed as an `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        self.value.trim().parse().ok()
    }

    /// Value parsed as a `u32`.
    pub fn as_u32(&self) -> Option<u32> {
        self.value.trim().parse().ok()
    }

    /// Value read as a boolean. Anything but `true` (case-insensitive) is
    /// false, so absent or malformed flags never fail.
    pub fn as_bool(&self) -> bool {
        self.value.trim().eq_ignore_ascii_case("true")
    }
}
