//! signoz-mcp-server - MCP gateway for SigNoz
//!
//! Serves the tool catalog over HTTP (`POST /mcp`) or stdio and turns
//! each tool call into SigNoz API requests.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use signoz_mcp_utils::{init_logging_with_config, GatewayError, LogConfig, Result};

mod cli;
mod config;
mod mcp;
mod query;
mod signoz;
mod transport;

use cli::Cli;
use config::{AppConfig, ConfigLoader, Transport};
use mcp::{McpServer, ToolContext};
use signoz::SignozClient;

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    ConfigLoader::validate(&config)?;
    Ok(config)
}

fn build_server(config: &AppConfig) -> Result<McpServer> {
    let client = SignozClient::new(&config.signoz).map_err(|e| GatewayError::upstream(e.to_string()))?;
    let tools = ToolContext::new(Arc::new(client), &config.signoz);
    Ok(McpServer::new(tools, config.server.session_mode))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // stdout belongs to the protocol in stdio mode
    let log_config = match config.server.transport {
        Transport::Http => LogConfig::server(config.server.debug, config.server.log_file),
        Transport::Stdio => LogConfig::stdio(config.server.debug, config.server.log_file),
    };
    init_logging_with_config(log_config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?config.server.transport,
        session_mode = ?config.server.session_mode,
        "starting signoz-mcp-server"
    );
    match config.signoz.base_url() {
        Some(host) => info!(host, ssl_verify = config.signoz.verify_tls(), "SigNoz upstream"),
        None => warn!("SIGNOZ_HOST is not set; tools will report errors until it is configured"),
    }

    let server = build_server(&config)?;

    match config.server.transport {
        Transport::Http => {
            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .map_err(|e| GatewayError::config(format!("invalid listen address: {e}")))?;
            transport::run_http_server(addr, Arc::new(server)).await
        }
        Transport::Stdio => transport::run_stdio_server(&server).await,
    }
}
