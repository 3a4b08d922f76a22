//! Parser adapter over the serde document model.
//!
//! Loads an OpenAPI 3.0 specification from a local path or an HTTP(S) URL,
//! optionally applies strict validation, and hands the rest of the pipeline
//! a fully `$ref`-inlined document. The raw JSON value is retained alongside
//! the typed document so the sibling HTTP client emitter can feed it to an
//! external generator unchanged.

use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::openapi::document::Document;
use crate::openapi::resolve::resolve_document;

/// A parsed specification with every reference inlined.
#[derive(Debug, Clone)]
pub struct ResolvedSpec {
    /// The typed document, reference-free
    pub document: Document,
    /// The specification exactly as parsed, for external generators
    pub raw: Value,
}

/// Thin adapter that turns spec bytes into a [`ResolvedSpec`].
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    validate: bool,
}

impl Parser {
    /// Create a parser; `validate` enables strict structural validation
    pub fn new(validate: bool) -> Self {
        Self { validate }
    }

    /// Parse a specification from a file or an HTTP(S) URL
    pub async fn parse_file_or_url(&self, location: &str) -> Result<ResolvedSpec> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return self.parse_url(location).await;
        }
        self.parse_file(location).await
    }

    /// Parse a specification from a local file (JSON or YAML)
    pub async fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ResolvedSpec> {
        let path = path.as_ref();
        info!("loading OpenAPI specification from {}", path.display());
        let content = fs::read_to_string(path).await?;
        self.parse_content(&content)
            .map_err(|e| Error::spec(format!("{}: {e}", path.display())))
    }

    /// Parse a specification fetched from a URL (JSON or YAML)
    pub async fn parse_url(&self, url: &str) -> Result<ResolvedSpec> {
        info!("fetching OpenAPI specification from {url}");
        let response = reqwest::get(url)
            .await
            .map_err(|e| Error::spec(format!("failed to fetch {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::spec(format!(
                "failed to fetch {url}: HTTP {}",
                response.status()
            )));
        }
        let content = response
            .text()
            .await
            .map_err(|e| Error::spec(format!("failed to read response from {url}: {e}")))?;
        self.parse_content(&content)
            .map_err(|e| Error::spec(format!("{url}: {e}")))
    }

    /// Parse specification content that is either JSON or YAML
    pub fn parse_content(&self, content: &str) -> Result<ResolvedSpec> {
        let raw = content_to_value(content)?;
        let document: Document = serde_json::from_value(raw.clone())
            .map_err(|e| Error::spec(format!("document does not match OpenAPI 3.0: {e}")))?;

        if self.validate {
            validate_document(&document)?;
        }

        let document = resolve_document(document)?;
        debug!(
            paths = document.paths.len(),
            "specification parsed and resolved"
        );
        Ok(ResolvedSpec { document, raw })
    }
}

/// Parse content as JSON first, falling back to YAML.
fn content_to_value(content: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(value) => yaml_to_json(value),
        Err(_) => Err(Error::spec(
            "content is neither valid JSON nor YAML".to_string(),
        )),
    }
}

/// Convert a YAML value into a JSON value, stringifying scalar mapping keys
/// (YAML allows `200:` where JSON requires `"200":`).
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            let json = if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                return Err(Error::spec(format!("unrepresentable number {n:?}")));
            };
            Ok(json)
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => {
            let items = seq.into_iter().map(yaml_to_json).collect::<Result<_>>()?;
            Ok(Value::Array(items))
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(Error::spec(format!(
                            "unsupported mapping key {other:?} (keys must be scalars)"
                        )))
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Strict structural validation of a parsed document.
fn validate_document(document: &Document) -> Result<()> {
    if !document.openapi.starts_with("3.") {
        return Err(Error::spec(format!(
            "unsupported OpenAPI version '{}' (only 3.x is supported)",
            document.openapi
        )));
    }
    if document.info.title.is_empty() {
        return Err(Error::spec("API title is required".to_string()));
    }
    if document.paths.is_empty() {
        return Err(Error::spec("at least one path is required".to_string()));
    }
    debug!("specification validation passed");
    Ok(())
}
