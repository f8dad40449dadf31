//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, Transport};

/// MCP gateway for the SigNoz observability platform
#[derive(Parser, Debug)]
#[command(name = "signoz-mcp-server")]
#[command(about = "Expose SigNoz dashboards, APM metrics and queries as MCP tools")]
#[command(version)]
pub struct Cli {
    /// Transport to serve MCP over
    #[arg(short, long, value_enum)]
    pub transport: Option<Transport>,

    /// Port for the HTTP transport
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address for the HTTP transport
    #[arg(long)]
    pub host: Option<String>,

    /// Path to a YAML config file
    ///
    /// Defaults to config.yaml in the user config directory when present.
    #[arg(short, long, env = "SIGNOZ_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Also write logs to the state directory
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Flags win over both the file and the environment
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(transport) = self.transport {
            config.server.transport = transport;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if self.debug {
            config.server.debug = true;
        }
        if self.log_file {
            config.server.log_file = true;
        }
    }
}
