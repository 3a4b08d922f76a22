//! OpenAPI specification ingestion: document model, loading, and reference
//! resolution.

pub mod document;
mod parser;
mod resolve;

pub use parser::{Parser, ResolvedSpec};
