//! Endpoint configuration, loadable from a JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OscError;

/// Listen and target endpoints. Every field has a default, so a config file
/// only needs to name what it overrides:
///
/// ```json
/// { "listen_port": 9001, "target_host": "192.168.1.20" }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub listen_host: String,
    pub listen_port: u16,
    pub target_host: String,
    pub target_port: u16,
}

impl Default for OscConfig {
    fn default() -> Self {
        OscConfig {
            listen_host: "0.0.0.0".to_string(),
            listen_port: 9001,
            target_host: "127.0.0.1".to_string(),
            target_port: 9000,
        }
    }
}

impl OscConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OscError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn target_addr(&self) -> String {
        format!("{}:{}", self.target_host, self.target_port)
    }
}
