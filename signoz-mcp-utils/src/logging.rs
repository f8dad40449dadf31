//! Logging infrastructure for the gateway
//!
//! Provides unified logging setup using the tracing ecosystem. Everything
//! goes to stderr or a file; stdout belongs to the stdio transport.

use std::fs::File;

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{paths, GatewayError, Result};

/// Environment variable holding an explicit log filter
pub const LOG_ENV_VAR: &str = "SIGNOZ_MCP_LOG";

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr
    Stderr,
    /// Log to file under the state directory
    File,
    /// Log to both stderr and file
    Both,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g., "info", "debug", "signoz_mcp_server=debug,hyper=warn")
    pub filter: String,
    /// Include file/line in logs
    pub file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            file_line: false,
        }
    }
}

impl LogConfig {
    /// Config for the HTTP transport
    ///
    /// `SIGNOZ_MCP_LOG` wins; otherwise the debug flag picks the level.
    /// With `log_file` set, records are also appended to the state log.
    pub fn server(debug: bool, log_file: bool) -> Self {
        Self {
            output: if log_file { LogOutput::Both } else { LogOutput::Stderr },
            filter: filter_from_env(debug),
            file_line: debug,
        }
    }

    /// Config for the stdio transport (never stdout)
    ///
    /// With `log_file` set, stderr stays quiet and records go to the file.
    pub fn stdio(debug: bool, log_file: bool) -> Self {
        Self {
            output: if log_file { LogOutput::File } else { LogOutput::Stderr },
            filter: filter_from_env(debug),
            file_line: false,
        }
    }
}

fn filter_from_env(debug: bool) -> String {
    std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| {
        if debug {
            "debug".into()
        } else {
            "info".into()
        }
    })
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| GatewayError::config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    let fmt_layer = if config.file_line {
        fmt_layer.with_file(true).with_line_number(true)
    } else {
        fmt_layer.with_file(false).with_line_number(false)
    };

    match config.output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| GatewayError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::File => {
            let file = open_log_file()?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(file).with_ansi(false))
                .try_init()
                .map_err(|e| GatewayError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::Both => {
            let file = open_log_file()?;

            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::io::stderr))
                .with(file_layer)
                .try_init()
                .map_err(|e| GatewayError::internal(format!("Failed to init logging: {}", e)))?;
        }
    }

    Ok(())
}

fn open_log_file() -> Result<File> {
    let log_dir = paths::log_dir();
    std::fs::create_dir_all(&log_dir).map_err(|e| GatewayError::FileWrite {
        path: log_dir.clone(),
        source: e,
    })?;

    let log_path = log_dir.join("signoz-mcp.log");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| GatewayError::FileWrite {
            path: log_path,
            source: e,
        })
}
