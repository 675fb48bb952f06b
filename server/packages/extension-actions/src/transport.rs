use std::future::Future;
use std::pin::Pin;

use extension_gateway_error::GatewayError;
use thiserror::Error;

use crate::directory::ExtensionNode;
use crate::messages::{ExtensionActionResponse, ExtensionHandleTransportRequest};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("[{node_id}][{address}] Node not connected")]
    NodeNotConnected { node_id: String, address: String },
    #[error("timed out waiting for [{node_id}] to respond to [{action}]")]
    Timeout { node_id: String, action: String },
    #[error("remote node failed to handle request: {message}")]
    Remote { message: String },
    #[error("transport io failure: {message}")]
    Io { message: String },
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NodeNotConnected { node_id, address } => {
                GatewayError::NodeNotConnected {
                    extension_id: node_id,
                    address,
                }
            }
            TransportError::Timeout { .. } => GatewayError::Timeout {
                message: Some(err.to_string()),
            },
            TransportError::Remote { .. } | TransportError::Io { .. } => {
                GatewayError::Transport {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Request/response delivery to a named extension node.
///
/// Implementations own connection management and timeouts; the dispatcher
/// only forwards whatever terminal outcome they report.
pub trait Transport: Send + Sync + 'static {
    fn send_request(
        &self,
        node: &ExtensionNode,
        transport_action: &str,
        request: ExtensionHandleTransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExtensionActionResponse, TransportError>> + Send + '_>>;
}
