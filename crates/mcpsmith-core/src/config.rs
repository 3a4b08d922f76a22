//! Configuration for MCP server generation

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Artifacts the sibling HTTP client emitter can produce.
///
/// # Examples
///
/// ```
/// use mcpsmith_core::config::ClientInclude;
/// use std::str::FromStr;
///
/// let include = ClientInclude::from_str("types").unwrap();
/// assert_eq!(include, ClientInclude::Types);
/// assert_eq!(include.as_str(), "types");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientInclude {
    /// Typed request/response models
    Types,
    /// A typed HTTP client for the upstream API
    HttpClient,
}

impl ClientInclude {
    /// Returns the include tag as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Types => "types",
            Self::HttpClient => "httpclient",
        }
    }

    /// Returns an iterator over all include tags
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Types, Self::HttpClient].iter().copied()
    }
}

impl FromStr for ClientInclude {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "types" => Ok(Self::Types),
            "httpclient" => Ok(Self::HttpClient),
            other => Err(Error::config(format!(
                "unknown client include '{other}' (expected 'types' or 'httpclient')"
            ))),
        }
    }
}

impl fmt::Display for ClientInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for MCP server generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Path or URL of the OpenAPI specification file
    pub schema_path: String,

    /// Name of the package the generated sources belong to
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Whether to run strict validation on the parsed specification
    #[serde(default)]
    pub validate: bool,

    /// Artifacts for the sibling HTTP client emitter; `None` skips client
    /// emission entirely
    #[serde(default)]
    pub client_includes: Option<Vec<ClientInclude>>,
}

fn default_package_name() -> String {
    "mcp_server".to_string()
}

impl GeneratorConfig {
    /// Create a new config with default values
    pub fn new(schema_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            schema_path: schema_path.into(),
            package_name: default_package_name(),
            output_dir: output_dir.into(),
            validate: false,
            client_includes: None,
        }
    }

    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)?;
        let config = if path_ref.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a YAML or JSON file, chosen by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = if path.as_ref().extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}
