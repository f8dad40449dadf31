//! Configuration schema structs

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub signoz: SignozConfig,
    pub server: ServerConfig,
}

/// Upstream SigNoz connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignozConfig {
    /// Base URL, e.g. `https://signoz.example.com`
    pub host: Option<String>,
    /// Sent as `SIGNOZ-API-KEY` when set
    pub api_key: Option<String>,
    /// Kept as written ("true"/"false"); only a case-insensitive "false"
    /// disables certificate checks
    #[serde(deserialize_with = "bool_or_string")]
    pub ssl_verify: String,
}

impl Default for SignozConfig {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            ssl_verify: "true".into(),
        }
    }
}

impl SignozConfig {
    pub fn verify_tls(&self) -> bool {
        !self.ssl_verify.trim().eq_ignore_ascii_case("false")
    }

    /// Host without a trailing slash
    pub fn base_url(&self) -> Option<&str> {
        self.host
            .as_deref()
            .map(|h| h.trim_end_matches('/'))
            .filter(|h| !h.is_empty())
    }
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP transport
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Also append logs to `signoz-mcp.log` under the state directory
    pub log_file: bool,
    pub transport: Transport,
    pub session_mode: SessionMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            debug: false,
            log_file: false,
            transport: Transport::Http,
            session_mode: SessionMode::Stateless,
        }
    }
}

/// How JSON-RPC reaches the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Stdio,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "stdio" => Ok(Self::Stdio),
            other => Err(format!("unknown transport '{other}' (expected http or stdio)")),
        }
    }
}

/// Whether `initialize` gates the other methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Every call stands alone
    #[default]
    Stateless,
    /// One process-wide initialized flag shared by all callers
    Stateful,
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" => Ok(Self::Stateless),
            "stateful" => Ok(Self::Stateful),
            other => Err(format!(
                "unknown session mode '{other}' (expected stateless or stateful)"
            )),
        }
    }
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b.to_string(),
        Raw::Text(s) => s,
    })
}
