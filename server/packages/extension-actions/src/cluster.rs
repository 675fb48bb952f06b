use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the host's built-in cluster-state read action.
pub const CLUSTER_STATE_ACTION: &str = "cluster:monitor/state";

/// Selects which sections of the cluster state to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterStateRequest {
    pub routing_table: bool,
    pub nodes: bool,
    pub metadata: bool,
    pub blocks: bool,
    pub customs: bool,
    pub indices: Vec<String>,
    pub local: bool,
}

impl Default for ClusterStateRequest {
    fn default() -> Self {
        Self {
            routing_table: true,
            nodes: true,
            metadata: true,
            blocks: true,
            customs: true,
            indices: Vec::new(),
            local: false,
        }
    }
}

impl ClusterStateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self) -> Self {
        self.routing_table = true;
        self.nodes = true;
        self.metadata = true;
        self.blocks = true;
        self.customs = true;
        self.indices.clear();
        self
    }

    pub fn clear(mut self) -> Self {
        self.routing_table = false;
        self.nodes = false;
        self.metadata = false;
        self.blocks = false;
        self.customs = false;
        self.indices.clear();
        self
    }

    pub fn nodes(mut self, nodes: bool) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStateResponse {
    pub cluster_name: String,
    pub state: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_then_select_sections() {
        let request = ClusterStateRequest::new().clear().nodes(true);
        assert!(request.nodes);
        assert!(!request.metadata);
        assert!(!request.routing_table);

        let request = request.all();
        assert!(request.metadata && request.blocks && request.customs);

        let request = ClusterStateRequest::new().clear().metadata(true);
        assert!(request.metadata);
        assert!(!request.nodes && !request.blocks);
    }

    #[test]
    fn missing_fields_default_to_all_sections() {
        let request: ClusterStateRequest =
            serde_json::from_str(r#"{"local": true}"#).expect("parse request");
        assert!(request.local);
        assert!(request.nodes && request.routing_table);
    }
}
