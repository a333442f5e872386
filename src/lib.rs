//! Client adapter for the GUS BIR1 (REGON) business registry SOAP service
//!
//! Provides session login/logout, record search, full report download and
//! service value lookup over SOAP 1.2 with WS-Addressing headers.
//!
//! ```no_run
//! use gus_bir_client::{RegistryAdapter, SearchParameters, SoapAdapter, constants};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let adapter = SoapAdapter::new(constants::TEST_URL, constants::TEST_URL, None)?;
//!     let sid = adapter.login(constants::TEST_USER_KEY).await?;
//!
//!     let mut params = SearchParameters::new();
//!     params.insert(constants::search::NIP.into(), "5261040828".into());
//!     let record = adapter.search(&sid, &params).await?;
//!     println!("{:?}", record.child("Nazwa").map(|n| n.text()));
//!
//!     adapter.logout(&sid).await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod operation;
pub mod soap;
mod utils;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use adapter::{RegistryAdapter, SoapAdapter};
pub use operation::{Operation, OperationRequest, SearchParameters};
pub use soap::{
    HeaderContext, HttpTransport, ResultNode, SoapTransport, TransportError, TransportOptions,
    TransportResult, XmlError,
};
pub use utils::constants;
pub use utils::{AdapterError, AdapterResult, redact};

/// Connection settings for the registry service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL requests are posted to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Destination sent in the WS-Addressing `To` header
    #[serde(default = "default_address")]
    pub address: String,

    /// User key issued by GUS; the CLI falls back to it when no key is given
    #[serde(default)]
    pub user_key: Option<String>,

    #[serde(default)]
    pub transport: TransportOptions,
}

fn default_base_url() -> String {
    constants::TEST_URL.to_string()
}

fn default_address() -> String {
    constants::TEST_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            address: default_address(),
            user_key: None,
            transport: TransportOptions::default(),
        }
    }
}

impl Config {
    /// Settings for the production service
    pub fn production(user_key: impl Into<String>) -> Self {
        Self {
            base_url: constants::PRODUCTION_URL.to_string(),
            address: constants::PRODUCTION_URL.to_string(),
            user_key: Some(user_key.into()),
            transport: TransportOptions::default(),
        }
    }
}

/// Default config location: `<config dir>/gus-bir/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gus-bir").join("config.yaml"))
}

/// Load config from YAML
///
/// An explicit `path` must exist. Without one, the default location is
/// tried and a missing file yields [`Config::default`] (test environment).
pub fn load_yaml_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config.yaml found, using default configuration");
                return Ok(Config::default());
            }
        },
    };

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid config {}", config_path.display()))?;
    Ok(config)
}
