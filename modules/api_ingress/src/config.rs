use serde::{Deserialize, Serialize};

/// HTTP host configuration (`modules.api_ingress`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port` to listen on; falls back to `server.host`/`server.port` when unset.
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub enable_docs: bool,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: false,
            cors_enabled: true,
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    /// Explicit `bind_addr`, or `host:port` from the server section.
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> String {
        match self.bind_addr.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => addr.to_string(),
            _ => format!("{host}:{port}"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}
