//! Collaborator stand-ins for exercising the dispatcher without a network.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use extension_gateway_error::GatewayError;
use serde_json::json;

use crate::cluster::{ClusterStateRequest, ClusterStateResponse};
use crate::directory::ExtensionNode;
use crate::host::{ExtensionAction, InternalClient};
use crate::messages::{
    ExtensionActionRequest, ExtensionActionResponse, ExtensionHandleTransportRequest,
    RemoteExtensionActionResponse,
};
use crate::transport::{Transport, TransportError};

pub fn test_extension_node(unique_id: &str) -> ExtensionNode {
    ExtensionNode {
        name: "firstExtension".to_string(),
        unique_id: unique_id.to_string(),
        address: ([127, 0, 0, 0], 9300).into(),
        attributes: HashMap::new(),
        version: "3.0.0".to_string(),
        minimum_compatible_version: "3.0.0".to_string(),
        dependencies: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub node_id: String,
    pub transport_action: String,
    pub request: ExtensionHandleTransportRequest,
}

/// Transport that only reaches nodes explicitly marked connected. Every other
/// node reports `NodeNotConnected`.
#[derive(Debug, Default)]
pub struct StubTransport {
    connected: HashMap<String, Vec<u8>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl StubTransport {
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Marks `node_id` connected; it answers every request with `response`.
    pub fn connect(mut self, node_id: &str, response: impl Into<Vec<u8>>) -> Self {
        self.connected.insert(node_id.to_string(), response.into());
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StubTransport {
    fn send_request(
        &self,
        node: &ExtensionNode,
        transport_action: &str,
        request: ExtensionHandleTransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExtensionActionResponse, TransportError>> + Send + '_>>
    {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRequest {
                node_id: node.unique_id.clone(),
                transport_action: transport_action.to_string(),
                request,
            });
        let outcome = match self.connected.get(&node.unique_id) {
            Some(response) => Ok(ExtensionActionResponse::new(response.clone())),
            None => Err(TransportError::NodeNotConnected {
                node_id: node.unique_id.clone(),
                address: node.address.to_string(),
            }),
        };
        Box::pin(async move { outcome })
    }
}

/// Internal client that records every call it receives.
#[derive(Debug)]
pub struct RecordingClient {
    cluster_name: String,
    extension_outcome: Result<RemoteExtensionActionResponse, GatewayError>,
    cluster_state_calls: Mutex<Vec<ClusterStateRequest>>,
    extension_calls: Mutex<Vec<(ExtensionAction, ExtensionActionRequest)>>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self {
            cluster_name: "test".to_string(),
            extension_outcome: Ok(RemoteExtensionActionResponse::success(Vec::new())),
            cluster_state_calls: Mutex::new(Vec::new()),
            extension_calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension_outcome(
        mut self,
        outcome: Result<RemoteExtensionActionResponse, GatewayError>,
    ) -> Self {
        self.extension_outcome = outcome;
        self
    }

    pub fn cluster_state_calls(&self) -> Vec<ClusterStateRequest> {
        self.cluster_state_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn extension_calls(&self) -> Vec<(ExtensionAction, ExtensionActionRequest)> {
        self.extension_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl InternalClient for RecordingClient {
    fn cluster_state(
        &self,
        request: ClusterStateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ClusterStateResponse, GatewayError>> + Send + '_>>
    {
        self.cluster_state_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let response = ClusterStateResponse {
            cluster_name: self.cluster_name.clone(),
            state: json!({}),
        };
        Box::pin(async move { Ok(response) })
    }

    fn execute_extension_action(
        &self,
        action: ExtensionAction,
        request: ExtensionActionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RemoteExtensionActionResponse, GatewayError>> + Send + '_>>
    {
        self.extension_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((action, request));
        let outcome = self.extension_outcome.clone();
        Box::pin(async move { outcome })
    }
}
