use std::collections::HashMap;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identity of a connected extension process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionNode {
    pub name: String,
    pub unique_id: String,
    pub address: SocketAddr,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub version: String,
    pub minimum_compatible_version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl ExtensionNode {
    pub fn id(&self) -> &str {
        &self.unique_id
    }
}

/// Resolves an extension identifier to its node descriptor.
pub trait ExtensionDirectory: Send + Sync + 'static {
    fn lookup(&self, extension_id: &str) -> Option<ExtensionNode>;
}

impl ExtensionDirectory for HashMap<String, ExtensionNode> {
    fn lookup(&self, extension_id: &str) -> Option<ExtensionNode> {
        self.get(extension_id).cloned()
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid extension directory json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("unable to resolve extension list from blob")]
    UnsupportedBlob,
    #[error("extension '{0}' is listed more than once")]
    DuplicateExtension(String),
}

/// Fixed set of extensions known at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    extensions: HashMap<String, ExtensionNode>,
}

impl StaticDirectory {
    pub fn new(nodes: impl IntoIterator<Item = ExtensionNode>) -> Result<Self, DirectoryError> {
        let mut extensions = HashMap::new();
        for node in nodes {
            if extensions.contains_key(&node.unique_id) {
                return Err(DirectoryError::DuplicateExtension(node.unique_id));
            }
            extensions.insert(node.unique_id.clone(), node);
        }
        Ok(Self { extensions })
    }

    /// Accepts either `{"extensions": [...]}` or a bare array of nodes.
    pub fn from_json(blob: &str) -> Result<Self, DirectoryError> {
        let value: Value = serde_json::from_str(blob)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, DirectoryError> {
        if value.get("extensions").is_some() {
            let doc: DirectoryDocument = serde_json::from_value(value)?;
            return Self::new(doc.extensions);
        }

        if value.is_array() {
            let nodes: Vec<ExtensionNode> = serde_json::from_value(value)?;
            return Self::new(nodes);
        }

        Err(DirectoryError::UnsupportedBlob)
    }

    /// Nodes sorted by unique id.
    pub fn nodes(&self) -> Vec<&ExtensionNode> {
        let mut nodes: Vec<&ExtensionNode> = self.extensions.values().collect();
        nodes.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        nodes
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl ExtensionDirectory for StaticDirectory {
    fn lookup(&self, extension_id: &str) -> Option<ExtensionNode> {
        self.extensions.get(extension_id).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryDocument {
    extensions: Vec<ExtensionNode>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node_json(unique_id: &str, port: u16) -> Value {
        json!({
            "name": "firstExtension",
            "uniqueId": unique_id,
            "address": format!("127.0.0.1:{port}"),
            "version": "3.0.0",
            "minimumCompatibleVersion": "3.0.0"
        })
    }

    #[test]
    fn parses_document_form() {
        let blob = json!({ "extensions": [node_json("uniqueid1", 9300)] }).to_string();
        let directory = StaticDirectory::from_json(&blob).expect("parse directory");
        let node = directory.lookup("uniqueid1").expect("node present");
        assert_eq!(node.name, "firstExtension");
        let expected: SocketAddr = "127.0.0.1:9300".parse().expect("addr");
        assert_eq!(node.address, expected);
        assert!(node.attributes.is_empty());
        assert!(node.dependencies.is_empty());
        assert!(directory.lookup("missing").is_none());
    }

    #[test]
    fn parses_bare_array_form() {
        let blob = json!([node_json("b", 9301), node_json("a", 9300)]).to_string();
        let directory = StaticDirectory::from_json(&blob).expect("parse directory");
        let ids: Vec<&str> = directory.nodes().into_iter().map(ExtensionNode::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let blob = json!([node_json("a", 9300), node_json("a", 9301)]).to_string();
        let err = StaticDirectory::from_json(&blob).expect_err("duplicate id");
        assert!(matches!(err, DirectoryError::DuplicateExtension(id) if id == "a"));
    }

    #[test]
    fn rejects_unknown_shape() {
        let err = StaticDirectory::from_json(r#"{"nodes": []}"#).expect_err("bad shape");
        assert!(matches!(err, DirectoryError::UnsupportedBlob));
        let err = StaticDirectory::from_json("not json").expect_err("bad json");
        assert!(matches!(err, DirectoryError::InvalidJson(_)));
    }
}
