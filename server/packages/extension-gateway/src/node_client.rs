use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, Weak};

use extension_actions::{
    ClusterStateRequest, ClusterStateResponse, DynamicActionRegistry, ExtensionAction,
    ExtensionActionRequest, ExtensionTransportActionsHandler, InternalClient,
    RemoteExtensionActionResponse, StaticDirectory,
};
use extension_gateway_error::GatewayError;
use serde_json::{json, Map, Value};

/// In-process client of the gateway host.
///
/// Extension actions are executed by handing them back to the dispatcher's
/// outbound path. The dispatcher owns this client, so the back-reference is
/// weak.
pub struct LocalNodeClient {
    cluster_name: String,
    directory: Arc<StaticDirectory>,
    dynamic_actions: Arc<dyn DynamicActionRegistry>,
    dispatcher: OnceLock<Weak<ExtensionTransportActionsHandler>>,
}

impl LocalNodeClient {
    pub fn new(
        cluster_name: String,
        directory: Arc<StaticDirectory>,
        dynamic_actions: Arc<dyn DynamicActionRegistry>,
    ) -> Self {
        Self {
            cluster_name,
            directory,
            dynamic_actions,
            dispatcher: OnceLock::new(),
        }
    }

    pub fn bind(&self, dispatcher: &Arc<ExtensionTransportActionsHandler>) {
        if self.dispatcher.set(Arc::downgrade(dispatcher)).is_err() {
            tracing::warn!("local node client is already bound to a dispatcher");
        }
    }

    fn dispatcher(&self) -> Result<Arc<ExtensionTransportActionsHandler>, GatewayError> {
        self.dispatcher
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| GatewayError::Internal {
                message: "extension dispatcher is not running".to_string(),
            })
    }

    fn build_state(&self, request: &ClusterStateRequest) -> Value {
        let mut state = Map::new();
        state.insert(
            "clusterName".to_string(),
            Value::String(self.cluster_name.clone()),
        );

        if request.nodes {
            let nodes: Map<String, Value> = self
                .directory
                .nodes()
                .into_iter()
                .map(|node| {
                    (
                        node.unique_id.clone(),
                        json!({
                            "name": node.name,
                            "address": node.address.to_string(),
                            "version": node.version,
                            "minimumCompatibleVersion": node.minimum_compatible_version,
                            "attributes": node.attributes,
                        }),
                    )
                })
                .collect();
            state.insert("nodes".to_string(), Value::Object(nodes));
        }
        if request.metadata {
            state.insert("metadata".to_string(), json!({ "indices": {} }));
        }
        if request.routing_table {
            state.insert("routingTable".to_string(), json!({ "indices": {} }));
        }
        if request.blocks {
            state.insert("blocks".to_string(), json!({}));
        }
        if request.customs {
            state.insert("customs".to_string(), json!({}));
        }

        Value::Object(state)
    }
}

impl InternalClient for LocalNodeClient {
    fn cluster_state(
        &self,
        request: ClusterStateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ClusterStateResponse, GatewayError>> + Send + '_>>
    {
        Box::pin(async move {
            Ok(ClusterStateResponse {
                cluster_name: self.cluster_name.clone(),
                state: self.build_state(&request),
            })
        })
    }

    fn execute_extension_action(
        &self,
        action: ExtensionAction,
        request: ExtensionActionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RemoteExtensionActionResponse, GatewayError>> + Send + '_>>
    {
        Box::pin(async move {
            if self.dynamic_actions.get(&action.action).as_ref() != Some(&action) {
                return Err(GatewayError::ActionNotFound {
                    action: action.action,
                });
            }
            let dispatcher = self.dispatcher()?;
            let response = dispatcher.send_transport_request_to_extension(request).await?;
            Ok(RemoteExtensionActionResponse::success(response.response_bytes))
        })
    }
}

#[cfg(test)]
mod tests {
    use extension_actions::testing::test_extension_node;
    use extension_actions::InMemoryDynamicActionRegistry;

    use super::*;

    fn client() -> LocalNodeClient {
        let directory = StaticDirectory::new([test_extension_node("uniqueid1")]).expect("directory");
        LocalNodeClient::new(
            "test".to_string(),
            Arc::new(directory),
            Arc::new(InMemoryDynamicActionRegistry::new()),
        )
    }

    #[tokio::test]
    async fn cluster_state_honours_sections() {
        let client = client();
        let response = client
            .cluster_state(ClusterStateRequest::new().clear().nodes(true))
            .await
            .expect("cluster state");
        assert_eq!(response.cluster_name, "test");
        assert_eq!(response.state["nodes"]["uniqueid1"]["address"], "127.0.0.0:9300");
        assert!(response.state.get("metadata").is_none());
        assert!(response.state.get("routingTable").is_none());
    }

    #[tokio::test]
    async fn unknown_extension_action_is_not_found() {
        let client = client();
        let err = client
            .execute_extension_action(
                ExtensionAction::new("uniqueid1", "test-action"),
                ExtensionActionRequest::new("test-action", "bytes"),
            )
            .await
            .expect_err("not registered");
        assert!(matches!(err, GatewayError::ActionNotFound { .. }));
    }

    #[tokio::test]
    async fn unbound_client_reports_internal_error() {
        let client = client();
        client
            .dynamic_actions
            .register_dynamic_action(ExtensionAction::new("uniqueid1", "test-action"))
            .expect("register");
        let err = client
            .execute_extension_action(
                ExtensionAction::new("uniqueid1", "test-action"),
                ExtensionActionRequest::new("test-action", "bytes"),
            )
            .await
            .expect_err("no dispatcher");
        assert!(matches!(err, GatewayError::Internal { .. }));
    }
}
