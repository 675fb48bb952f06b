use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    InvalidRequest,
    DuplicateRegistration,
    ActionNotFound,
    ExtensionNotFound,
    NodeNotConnected,
    TransportError,
    Timeout,
    Internal,
}

impl ErrorType {
    pub fn as_urn(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "urn:extension-gateway:error:invalid_request",
            Self::DuplicateRegistration => "urn:extension-gateway:error:duplicate_registration",
            Self::ActionNotFound => "urn:extension-gateway:error:action_not_found",
            Self::ExtensionNotFound => "urn:extension-gateway:error:extension_not_found",
            Self::NodeNotConnected => "urn:extension-gateway:error:node_not_connected",
            Self::TransportError => "urn:extension-gateway:error:transport_error",
            Self::Timeout => "urn:extension-gateway:error:timeout",
            Self::Internal => "urn:extension-gateway:error:internal",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid Request",
            Self::DuplicateRegistration => "Duplicate Registration",
            Self::ActionNotFound => "Action Not Found",
            Self::ExtensionNotFound => "Extension Not Found",
            Self::NodeNotConnected => "Node Not Connected",
            Self::TransportError => "Transport Error",
            Self::Timeout => "Timeout",
            Self::Internal => "Internal Error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::DuplicateRegistration => 409,
            Self::ActionNotFound => 404,
            Self::ExtensionNotFound => 404,
            Self::NodeNotConnected => 502,
            Self::TransportError => 502,
            Self::Timeout => 504,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl ProblemDetails {
    pub fn new(error_type: ErrorType, detail: Option<String>) -> Self {
        Self {
            type_: error_type.as_urn().to_string(),
            title: error_type.title().to_string(),
            status: error_type.status_code(),
            detail,
            instance: None,
            extensions: Map::new(),
        }
    }
}

/// Failure conditions surfaced by the extension action dispatcher.
///
/// Every variant is recoverable from the dispatcher's point of view; the caller
/// decides whether to retry, re-resolve, or give up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
    #[error("The action [{action}] you are trying to register is already registered")]
    DuplicateRegistration { action: String },
    #[error("No handler for action [{action}]")]
    ActionNotFound { action: String },
    #[error("extension not found: {extension_id}")]
    ExtensionNotFound { extension_id: String },
    #[error("[{extension_id}][{address}] Node not connected")]
    NodeNotConnected {
        extension_id: String,
        address: String,
    },
    #[error("{message}")]
    Transport { message: String },
    #[error("timeout: {}", .message.as_deref().unwrap_or("no detail"))]
    Timeout { message: Option<String> },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::InvalidRequest { .. } => ErrorType::InvalidRequest,
            Self::DuplicateRegistration { .. } => ErrorType::DuplicateRegistration,
            Self::ActionNotFound { .. } => ErrorType::ActionNotFound,
            Self::ExtensionNotFound { .. } => ErrorType::ExtensionNotFound,
            Self::NodeNotConnected { .. } => ErrorType::NodeNotConnected,
            Self::Transport { .. } => ErrorType::TransportError,
            Self::Timeout { .. } => ErrorType::Timeout,
            Self::Internal { .. } => ErrorType::Internal,
        }
    }

    fn details(&self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            Self::DuplicateRegistration { action } | Self::ActionNotFound { action } => {
                map.insert("action".to_string(), Value::String(action.clone()));
            }
            Self::ExtensionNotFound { extension_id } => {
                map.insert(
                    "extensionId".to_string(),
                    Value::String(extension_id.clone()),
                );
            }
            Self::NodeNotConnected {
                extension_id,
                address,
            } => {
                map.insert(
                    "extensionId".to_string(),
                    Value::String(extension_id.clone()),
                );
                map.insert("address".to_string(), Value::String(address.clone()));
            }
            Self::Timeout {
                message: Some(message),
            } => {
                map.insert("message".to_string(), Value::String(message.clone()));
            }
            Self::InvalidRequest { .. }
            | Self::Transport { .. }
            | Self::Timeout { message: None }
            | Self::Internal { .. } => {}
        }
        map
    }

    pub fn to_problem_details(&self) -> ProblemDetails {
        let mut problem = ProblemDetails::new(self.error_type(), Some(self.to_string()));
        let details = self.details();
        if !details.is_empty() {
            problem
                .extensions
                .insert("details".to_string(), Value::Object(details));
        }
        problem
    }
}

impl From<GatewayError> for ProblemDetails {
    fn from(value: GatewayError) -> Self {
        value.to_problem_details()
    }
}

impl From<&GatewayError> for ProblemDetails {
    fn from(value: &GatewayError) -> Self {
        value.to_problem_details()
    }
}
