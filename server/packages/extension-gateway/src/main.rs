use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use extension_gateway::{run_server, GatewayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "extension-gateway")]
#[command(about = "Routes transport actions between a host and its extensions", version)]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 9350)]
    port: u16,

    /// JSON file listing the extensions this host may talk to.
    #[arg(long)]
    extensions: Option<PathBuf>,

    #[arg(long, default_value = "extension-gateway")]
    cluster_name: String,

    #[arg(long, default_value_t = 10_000)]
    request_timeout_ms: u64,
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "extension-gateway failed");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_logfmt::builder()
                .layer()
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    run_server(GatewayConfig {
        host: cli.host,
        port: cli.port,
        extensions_path: cli.extensions,
        cluster_name: cli.cluster_name,
        request_timeout: Duration::from_millis(cli.request_timeout_ms),
    })
    .await
}
