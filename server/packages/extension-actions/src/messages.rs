use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Transport action under which the host asks an extension to handle a request.
pub const REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION: &str =
    "internal:extensions/handle-transportaction";

/// Sent by an extension to claim the transport actions it implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTransportActionsRequest {
    pub unique_id: String,
    pub transport_actions: BTreeSet<String>,
}

impl RegisterTransportActionsRequest {
    pub fn new<I, S>(unique_id: impl Into<String>, transport_actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique_id: unique_id.into(),
            transport_actions: transport_actions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgedResponse {
    pub status: bool,
}

impl AcknowledgedResponse {
    pub fn new(status: bool) -> Self {
        Self { status }
    }
}

/// An extension asking the host to run an action on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportActionRequestFromExtension {
    pub action: String,
    #[serde(with = "base64_bytes")]
    pub request_bytes: Vec<u8>,
    pub unique_id: String,
}

impl TransportActionRequestFromExtension {
    pub fn new(
        action: impl Into<String>,
        request_bytes: impl Into<Vec<u8>>,
        unique_id: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            request_bytes: request_bytes.into(),
            unique_id: unique_id.into(),
        }
    }
}

/// Result handed back across the extension boundary. Failures travel as a value
/// with `success == false` and a UTF-8 message in `response_bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExtensionActionResponse {
    pub success: bool,
    #[serde(with = "base64_bytes")]
    pub response_bytes: Vec<u8>,
}

impl RemoteExtensionActionResponse {
    pub fn success(response_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            response_bytes: response_bytes.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response_bytes: message.into().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn response_bytes_as_string(&self) -> String {
        String::from_utf8_lossy(&self.response_bytes).into_owned()
    }
}

/// Host-side request to invoke an action some extension implements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionActionRequest {
    pub action: String,
    #[serde(with = "base64_bytes")]
    pub request_bytes: Vec<u8>,
}

impl ExtensionActionRequest {
    pub fn new(action: impl Into<String>, request_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            action: action.into(),
            request_bytes: request_bytes.into(),
        }
    }
}

/// Payload delivered to the owning extension under
/// [`REQUEST_EXTENSION_HANDLE_TRANSPORT_ACTION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionHandleTransportRequest {
    pub action: String,
    #[serde(with = "base64_bytes")]
    pub request_bytes: Vec<u8>,
}

impl From<ExtensionActionRequest> for ExtensionHandleTransportRequest {
    fn from(request: ExtensionActionRequest) -> Self {
        Self {
            action: request.action,
            request_bytes: request.request_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionActionResponse {
    #[serde(with = "base64_bytes")]
    pub response_bytes: Vec<u8>,
}

impl ExtensionActionResponse {
    pub fn new(response_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            response_bytes: response_bytes.into(),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
