use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use app::build_router;
use extension_actions::{
    DynamicActionRegistry, ExtensionTransportActionsHandler, InMemoryDynamicActionRegistry,
    StaticDirectory, Transport,
};
use node_client::LocalNodeClient;
use transport::HttpTransport;

pub mod app;
pub mod node_client;
pub mod transport;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub extensions_path: Option<PathBuf>,
    pub cluster_name: String,
    pub request_timeout: Duration,
}

/// Wires the dispatcher to a local node client and the given transport.
pub fn build_dispatcher(
    directory: StaticDirectory,
    transport: Arc<dyn Transport>,
    cluster_name: String,
) -> Arc<ExtensionTransportActionsHandler> {
    let directory = Arc::new(directory);
    let dynamic_actions: Arc<dyn DynamicActionRegistry> =
        Arc::new(InMemoryDynamicActionRegistry::new());
    let client = Arc::new(LocalNodeClient::new(
        cluster_name,
        directory.clone(),
        dynamic_actions.clone(),
    ));
    let dispatcher = Arc::new(ExtensionTransportActionsHandler::new(
        directory,
        transport,
        client.clone(),
        dynamic_actions,
    ));
    client.bind(&dispatcher);
    dispatcher
}

pub async fn run_server(
    config: GatewayConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let directory = match &config.extensions_path {
        Some(path) => {
            let blob = tokio::fs::read_to_string(path).await?;
            StaticDirectory::from_json(&blob)?
        }
        None => StaticDirectory::default(),
    };
    tracing::info!(extensions = directory.len(), "loaded extension directory");

    let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
    let dispatcher = build_dispatcher(directory, transport, config.cluster_name.clone());
    run_server_with_dispatcher(config.host, config.port, dispatcher).await
}

pub async fn run_server_with_dispatcher(
    host: String,
    port: u16,
    dispatcher: Arc<ExtensionTransportActionsHandler>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(dispatcher);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "extension-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down extension-gateway");
}
