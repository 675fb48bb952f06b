use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use extension_actions::{
    ExtensionActionResponse, ExtensionHandleTransportRequest, ExtensionNode, Transport,
    TransportError,
};
use reqwest::Client;

/// Header carrying the transport action name on requests to an extension.
pub const TRANSPORT_ACTION_HEADER: &str = "x-transport-action";

/// Delivers requests to extensions as JSON over HTTP at
/// `http://<address>/v1/transport`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            request_timeout,
        })
    }
}

impl Transport for HttpTransport {
    fn send_request(
        &self,
        node: &ExtensionNode,
        transport_action: &str,
        request: ExtensionHandleTransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExtensionActionResponse, TransportError>> + Send + '_>>
    {
        let node_id = node.unique_id.clone();
        let address = node.address.to_string();
        let transport_action = transport_action.to_string();
        Box::pin(async move {
            let url = format!("http://{address}/v1/transport");
            tracing::debug!(
                node_id = %node_id,
                url = %url,
                transport_action = %transport_action,
                action = %request.action,
                "posting transport request to extension"
            );

            let response = self
                .client
                .post(&url)
                .header(TRANSPORT_ACTION_HEADER, &transport_action)
                .json(&request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_connect() {
                        TransportError::NodeNotConnected {
                            node_id: node_id.clone(),
                            address: address.clone(),
                        }
                    } else if err.is_timeout() {
                        tracing::warn!(
                            node_id = %node_id,
                            timeout = ?self.request_timeout,
                            "extension did not answer in time"
                        );
                        TransportError::Timeout {
                            node_id: node_id.clone(),
                            action: request.action.clone(),
                        }
                    } else {
                        TransportError::Io {
                            message: err.to_string(),
                        }
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::Remote {
                    message: format!("[{node_id}] responded with {status}: {body}"),
                });
            }

            response
                .json::<ExtensionActionResponse>()
                .await
                .map_err(|err| TransportError::Remote {
                    message: format!("[{node_id}] sent an unreadable response: {err}"),
                })
        })
    }
}
