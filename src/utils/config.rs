use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Load test configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadConfig {
    /// Target authority of the authentication service ("host:port" or URL)
    pub target: String,

    /// Encrypt the transport (plaintext otherwise)
    pub tls: bool,

    /// Concurrent simulated users
    pub users: u32,

    /// Scenario iterations per user
    pub iterations: u32,

    /// Known-good login email
    pub email: String,

    /// Known-good login password
    pub password: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            target: "localhost:50001".to_string(),
            tls: false,
            users: 1,
            iterations: 1,
            email: "admin@admin.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl LoadConfig {
    /// Load configuration from a YAML file; absent fields keep defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}
