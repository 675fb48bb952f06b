use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{PoisonError, RwLock};

use extension_gateway_error::GatewayError;
use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterStateRequest, ClusterStateResponse};
use crate::messages::{ExtensionActionRequest, RemoteExtensionActionResponse};

/// An action implemented by an extension, as the host's action registry sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAction {
    pub extension_id: String,
    pub action: String,
}

impl ExtensionAction {
    pub fn new(extension_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            action: action.into(),
        }
    }
}

/// The host's registry of callable actions that are not compiled into it.
pub trait DynamicActionRegistry: Send + Sync + 'static {
    fn register_dynamic_action(&self, action: ExtensionAction) -> Result<(), GatewayError>;

    fn get(&self, action: &str) -> Option<ExtensionAction>;
}

#[derive(Debug, Default)]
pub struct InMemoryDynamicActionRegistry {
    actions: RwLock<HashMap<String, ExtensionAction>>,
}

impl InMemoryDynamicActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DynamicActionRegistry for InMemoryDynamicActionRegistry {
    fn register_dynamic_action(&self, action: ExtensionAction) -> Result<(), GatewayError> {
        let mut actions = self.actions.write().unwrap_or_else(PoisonError::into_inner);
        if actions.contains_key(&action.action) {
            return Err(GatewayError::DuplicateRegistration {
                action: action.action,
            });
        }
        actions.insert(action.action.clone(), action);
        Ok(())
    }

    fn get(&self, action: &str) -> Option<ExtensionAction> {
        self.actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(action)
            .cloned()
    }
}

/// The host's in-process client for executing actions it knows about.
pub trait InternalClient: Send + Sync + 'static {
    /// Runs the built-in cluster-state read action.
    fn cluster_state(
        &self,
        request: ClusterStateRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ClusterStateResponse, GatewayError>> + Send + '_>>;

    /// Runs an action registered by an extension through the host's action
    /// pipeline.
    fn execute_extension_action(
        &self,
        action: ExtensionAction,
        request: ExtensionActionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RemoteExtensionActionResponse, GatewayError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_registry_rejects_duplicates() {
        let registry = InMemoryDynamicActionRegistry::new();
        registry
            .register_dynamic_action(ExtensionAction::new("ext1", "test-action"))
            .expect("first registration");
        let err = registry
            .register_dynamic_action(ExtensionAction::new("ext2", "test-action"))
            .expect_err("duplicate");
        assert!(matches!(err, GatewayError::DuplicateRegistration { .. }));
        assert_eq!(
            registry.get("test-action"),
            Some(ExtensionAction::new("ext1", "test-action"))
        );
        assert_eq!(registry.get("other"), None);
    }
}
