//! Error handling for the mcpsmith code generation library.
//!
//! This module defines the main error type `Error` used throughout the
//! library, along with a convenient `Result` type alias. It uses `thiserror`
//! for easy error handling and implements conversions from common error
//! types.
//!
//! # Examples
//!
//! ```
//! use mcpsmith_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     // Operations that might fail...
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type for mcpsmith generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcpsmith generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template engine error
    #[error("template engine error: {0}")]
    Template(#[from] tera::Error),

    /// The specification is missing, malformed, or uses a construct the
    /// pipeline rejects
    #[error("invalid OpenAPI specification: {0}")]
    Spec(String),

    /// A schema lowering broke an internal contract
    #[error("schema lowering error: {0}")]
    Schema(String),

    /// Rendering, parsing, or formatting of generated source failed
    #[error("emission error: {0}")]
    Emit(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new specification error
    pub fn spec<S: Into<String>>(msg: S) -> Self {
        Self::Spec(msg.into())
    }

    /// Create a new schema lowering error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new emission error
    pub fn emit<S: Into<String>>(msg: S) -> Self {
        Self::Emit(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Self::Emit(format!("failed to parse generated source: {err}"))
    }
}
