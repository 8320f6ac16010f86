use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Issuance configuration loaded from a YAML document.
///
/// Every key has a default except `clients`, whose absence is only an error
/// once client certificates are actually issued.
#[derive(Debug, Deserialize, Clone)]
pub struct IssuerConfig {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default = "default_locality")]
    pub locality: String,
    #[serde(default = "default_certs_dir")]
    pub certs_dir: PathBuf,
    #[serde(default = "default_ca_file_name")]
    pub ca_file_name: String,
    pub clients: Option<Vec<String>>,
}

fn default_domain() -> String {
    "test.co".to_string()
}

fn default_country() -> String {
    "IR".to_string()
}

fn default_state() -> String {
    "Tehran".to_string()
}

fn default_locality() -> String {
    "Tehran".to_string()
}

fn default_certs_dir() -> PathBuf {
    PathBuf::from("certs")
}

fn default_ca_file_name() -> String {
    "root-ca".to_string()
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            country: default_country(),
            state: default_state(),
            locality: default_locality(),
            certs_dir: default_certs_dir(),
            ca_file_name: default_ca_file_name(),
            clients: None,
        }
    }
}

impl IssuerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&raw)
    }

    /// Parse configuration from a YAML string
    pub fn from_str(raw: &str) -> Result<Self> {
        let config: IssuerConfig =
            serde_yaml::from_str(raw).context("Failed to parse config file")?;
        Ok(config)
    }
}
