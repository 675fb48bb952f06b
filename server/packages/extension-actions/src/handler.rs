use std::sync::Arc;

use extension_gateway_error::GatewayError;

use crate::cluster::{ClusterStateRequest, ClusterStateResponse, CLUSTER_STATE_ACTION};
use crate::directory::{ExtensionDirectory, ExtensionNode};
use crate::host::{DynamicActionRegistry, ExtensionAction, InternalClient};
use crate::messages::{
    AcknowledgedResponse, ExtensionActionRequest, ExtensionActionResponse,
    RegisterTransportActionsRequest, RemoteExtensionActionResponse,
    TransportActionRequestFromExtension, REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION,
};
use crate::registry::ActionRegistry;
use crate::transport::Transport;

/// Routes transport actions between the host and its extensions.
///
/// Host-side callers get typed errors. Extension-side callers always get a
/// structured response, so a failed lookup never loses its pairing with the
/// request that caused it.
pub struct ExtensionTransportActionsHandler {
    directory: Arc<dyn ExtensionDirectory>,
    transport: Arc<dyn Transport>,
    client: Arc<dyn InternalClient>,
    dynamic_actions: Arc<dyn DynamicActionRegistry>,
    actions: ActionRegistry,
}

impl ExtensionTransportActionsHandler {
    pub fn new(
        directory: Arc<dyn ExtensionDirectory>,
        transport: Arc<dyn Transport>,
        client: Arc<dyn InternalClient>,
        dynamic_actions: Arc<dyn DynamicActionRegistry>,
    ) -> Self {
        Self {
            directory,
            transport,
            client,
            dynamic_actions,
            actions: ActionRegistry::new(),
        }
    }

    /// Claims `action` for `extension_id` and exposes it to the host's dynamic
    /// action registry. The claim is recorded only if the host accepts the
    /// action.
    pub fn register_action(&self, action: &str, extension_id: &str) -> Result<(), GatewayError> {
        if self.directory.lookup(extension_id).is_none() {
            return Err(GatewayError::ExtensionNotFound {
                extension_id: extension_id.to_string(),
            });
        }

        let claimed = self.actions.register_with(action, extension_id, || {
            self.dynamic_actions
                .register_dynamic_action(ExtensionAction::new(extension_id, action))
        });
        if let Err(err) = claimed {
            tracing::warn!(
                action = %action,
                extension_id = %extension_id,
                error = %err,
                "rejected action registration"
            );
            return Err(err);
        }

        tracing::info!(
            action = %action,
            extension_id = %extension_id,
            "registered extension action"
        );
        Ok(())
    }

    /// The extension that owns `action`, if any.
    pub fn get_extension(&self, action: &str) -> Option<ExtensionNode> {
        self.actions
            .resolve(action)
            .and_then(|extension_id| self.directory.lookup(&extension_id))
    }

    pub fn registered_actions(&self, extension_id: &str) -> Vec<String> {
        self.actions.actions_for(extension_id)
    }

    /// Acknowledges only when every requested name was newly claimed. Names
    /// claimed before a later one fails stay claimed.
    pub fn handle_register_transport_actions_request(
        &self,
        request: &RegisterTransportActionsRequest,
    ) -> AcknowledgedResponse {
        if self.directory.lookup(&request.unique_id).is_none() {
            tracing::warn!(
                extension_id = %request.unique_id,
                "registration request from unknown extension"
            );
            return AcknowledgedResponse::new(false);
        }

        let mut all_claimed = true;
        for action in &request.transport_actions {
            if let Err(err) = self.register_action(action, &request.unique_id) {
                tracing::debug!(
                    action = %action,
                    extension_id = %request.unique_id,
                    error = %err,
                    "transport action not claimed"
                );
                all_claimed = false;
            }
        }

        AcknowledgedResponse::new(all_claimed)
    }

    /// Runs an action on behalf of an extension. Never fails: misses and
    /// downstream errors come back as `success == false` with a message.
    pub async fn handle_transport_action_request_from_extension(
        &self,
        request: TransportActionRequestFromExtension,
    ) -> RemoteExtensionActionResponse {
        let extension_id = match self.resolve_action(&request.action) {
            Ok(extension_id) => extension_id,
            Err(_) => {
                tracing::debug!(
                    action = %request.action,
                    sender = %request.unique_id,
                    "inbound request for unregistered action"
                );
                return RemoteExtensionActionResponse::failure(format!(
                    "Request failed: action [{}] is not registered for any extension.",
                    request.action
                ));
            }
        };

        tracing::debug!(
            action = %request.action,
            sender = %request.unique_id,
            owner = %extension_id,
            "executing extension action for extension"
        );
        let action = ExtensionAction::new(extension_id, request.action.clone());
        let forwarded = ExtensionActionRequest::new(request.action, request.request_bytes);
        match self.client.execute_extension_action(action, forwarded).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    sender = %request.unique_id,
                    error = %err,
                    "extension action failed"
                );
                RemoteExtensionActionResponse::failure(err.to_string())
            }
        }
    }

    /// Forwards a host request to the extension that owns its action.
    pub async fn send_transport_request_to_extension(
        &self,
        request: ExtensionActionRequest,
    ) -> Result<ExtensionActionResponse, GatewayError> {
        let extension_id = self.resolve_action(&request.action)?;
        let node = self
            .directory
            .lookup(&extension_id)
            .ok_or_else(|| GatewayError::ExtensionNotFound {
                extension_id: extension_id.clone(),
            })?;

        let action = request.action.clone();
        tracing::debug!(
            action = %action,
            extension_id = %extension_id,
            address = %node.address,
            bytes = request.request_bytes.len(),
            "sending transport request to extension"
        );

        self.transport
            .send_request(&node, REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION, request.into())
            .await
            .map_err(|err| {
                tracing::warn!(
                    action = %action,
                    extension_id = %extension_id,
                    error = %err,
                    "transport request to extension failed"
                );
                GatewayError::from(err)
            })
    }

    /// Passes a cluster-state read straight to the host's client. The action
    /// registry is not consulted.
    pub async fn handle_cluster_state_request(
        &self,
        request: ClusterStateRequest,
    ) -> Result<ClusterStateResponse, GatewayError> {
        tracing::debug!(action = CLUSTER_STATE_ACTION, "proxying cluster state request");
        self.client.cluster_state(request).await
    }

    fn resolve_action(&self, action: &str) -> Result<String, GatewayError> {
        self.actions
            .resolve(action)
            .ok_or_else(|| GatewayError::ActionNotFound {
                action: action.to_string(),
            })
    }
}
