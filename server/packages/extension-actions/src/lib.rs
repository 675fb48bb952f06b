//! Routing of transport actions between a host process and its extensions.
//!
//! Extensions claim action names over the wire; the host later invokes those
//! actions through [`ExtensionTransportActionsHandler`], which resolves the
//! owning extension and forwards the request over an injected [`Transport`].

pub mod cluster;
pub mod directory;
pub mod handler;
pub mod host;
pub mod messages;
pub mod registry;
pub mod testing;
pub mod transport;

pub use cluster::{ClusterStateRequest, ClusterStateResponse, CLUSTER_STATE_ACTION};
pub use directory::{DirectoryError, ExtensionDirectory, ExtensionNode, StaticDirectory};
pub use extension_gateway_error::GatewayError;
pub use handler::ExtensionTransportActionsHandler;
pub use host::{
    DynamicActionRegistry, ExtensionAction, InMemoryDynamicActionRegistry, InternalClient,
};
pub use messages::{
    AcknowledgedResponse, ExtensionActionRequest, ExtensionActionResponse,
    ExtensionHandleTransportRequest, RegisterTransportActionsRequest,
    RemoteExtensionActionResponse, TransportActionRequestFromExtension,
    REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION,
};
pub use registry::ActionRegistry;
pub use transport::{Transport, TransportError};
