//! Configuration loader
//!
//! Sources are layered: YAML file, then environment, then command-line
//! flags (applied by the caller).

use std::path::Path;

use signoz_mcp_utils::{config_file, GatewayError, Result};
use tracing::debug;

use super::AppConfig;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an explicit path or the default location,
    /// then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        let mut config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let path = config_file();
                if path.exists() {
                    Self::load_from_path(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    AppConfig::default()
                }
            }
        };

        Self::apply_env(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| GatewayError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    /// Parse configuration from string
    pub fn parse(content: &str, path: &Path) -> Result<AppConfig> {
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        serde_yaml::from_str(content).map_err(|e| GatewayError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Overlay environment variables; empty values count as unset
    pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("SIGNOZ_HOST") {
            config.signoz.host = Some(host);
        }
        if let Some(key) = var("SIGNOZ_API_KEY") {
            config.signoz.api_key = Some(key);
        }
        if let Some(verify) = var("SIGNOZ_SSL_VERIFY") {
            config.signoz.ssl_verify = verify;
        }
        if let Some(port) = var("MCP_SERVER_PORT") {
            config.server.port = port
                .trim()
                .parse()
                .map_err(|_| GatewayError::config(format!("MCP_SERVER_PORT is not a port: {port}")))?;
        }
        if let Some(debug) = var("MCP_SERVER_DEBUG") {
            config.server.debug = truthy(&debug);
        }
        if let Some(log_file) = var("MCP_LOG_FILE") {
            config.server.log_file = truthy(&log_file);
        }
        if let Some(transport) = var("MCP_TRANSPORT") {
            config.server.transport = transport
                .parse()
                .map_err(|e| GatewayError::config(format!("MCP_TRANSPORT: {e}")))?;
        }
        if let Some(mode) = var("MCP_SESSION_MODE") {
            config.server.session_mode = mode
                .parse()
                .map_err(|e| GatewayError::config(format!("MCP_SESSION_MODE: {e}")))?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(GatewayError::config("server port must be between 1 and 65535"));
        }

        if let Some(host) = config.signoz.host.as_deref() {
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(GatewayError::config(format!(
                    "signoz host must start with http:// or https://, got '{host}'"
                )));
            }
        }

        Ok(())
    }
}

fn truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
