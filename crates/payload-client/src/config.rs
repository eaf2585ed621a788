use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Connection and paging settings handed to [`PayloadApiClient`](crate::PayloadApiClient).
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// service_uri = "https://payloads.example.net"
/// credential_scope = "payloads/.default"
/// page_size = 250
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Address of the backing store.
    pub service_uri: String,
    /// Credential scope requested when authenticating against the store.
    pub credential_scope: Option<String>,
    /// Items requested per chunk on paged reads.
    pub page_size: usize,
    /// Category stamped on payloads and metadata items created by this client.
    pub default_category: String,
    /// Upper bound on chunks fetched by one paged read. `None` means unbounded.
    pub max_chunks: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_uri: "memory://local".into(),
            credential_scope: None,
            page_size: 100,
            default_category: "default".into(),
            max_chunks: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.service_uri.trim().is_empty() {
            return Err(ClientError::Config("service_uri must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(ClientError::Config("page_size must be positive".into()));
        }
        if self.default_category.trim().is_empty() {
            return Err(ClientError::Config("default_category must not be empty".into()));
        }
        if self.max_chunks == Some(0) {
            return Err(ClientError::Config("max_chunks must be positive when set".into()));
        }
        Ok(())
    }
}
