//! Core library for generating MCP servers from OpenAPI specifications.
//!
//! The pipeline is a pure function from a specification plus a
//! [`GeneratorConfig`] to file-system writes:
//!
//! 1. [`openapi`] loads the document and inlines every `$ref`.
//! 2. [`schema`] normalizes OpenAPI schemas into a strict IR and lowers the
//!    IR into JSON Schema Draft 7.
//! 3. [`convert`] builds one [`model::Tool`] per operation, including its
//!    input schema and Markdown response templates.
//! 4. [`emit`] renders per-tool Rust modules and the registry file,
//!    preserving user-authored handler bodies across regenerations, and only
//!    writes files whose content changed.
//!
//! Two runs against the same input produce byte-identical output, and the
//! second run performs zero writes.

pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod generate;
pub mod model;
pub mod openapi;
pub mod schema;
pub mod utils;

pub use config::{ClientInclude, GeneratorConfig};
pub use error::{Error, Result};
pub use generate::{generate, GenerationSummary};
pub use model::{Arg, ArgSource, Header, McpConfig, RequestTemplate, ResponseTemplate, Tool};
