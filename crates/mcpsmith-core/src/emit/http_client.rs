//! Sibling HTTP client emission.
//!
//! Typed client code is not rendered by this crate: the raw specification is
//! handed to `progenitor`, the ecosystem's OpenAPI client generator, and its
//! output is written next to the generated tools. No preservation applies;
//! the file is owned by the generator.

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::config::ClientInclude;
use crate::emit::writer::write_if_changed;
use crate::error::{Error, Result};

/// File the delegated client code is written to.
pub const CLIENT_FILE_NAME: &str = "http_client.rs";

/// Generate typed client code from the raw specification.
///
/// `includes` selects the requested artifacts (`types`, `httpclient`) and
/// must name at least one; the delegate emits both in a single module.
pub async fn emit_http_client(
    raw: &Value,
    includes: &[ClientInclude],
    output_dir: &Path,
) -> Result<bool> {
    if includes.is_empty() {
        return Err(Error::config(
            "no valid includes specified (must include 'types', 'httpclient', or both)",
        ));
    }

    let spec: openapiv3::OpenAPI = serde_json::from_value(raw.clone())
        .map_err(|e| Error::spec(format!("specification rejected by client generator: {e}")))?;

    let mut generator = progenitor::Generator::default();
    let tokens = generator
        .generate_tokens(&spec)
        .map_err(|e| Error::emit(format!("client generation failed: {e}")))?;
    let file: syn::File = syn::parse2(tokens)?;
    let content = prettyplease::unparse(&file);

    let wrote = write_if_changed(output_dir, CLIENT_FILE_NAME, content.as_bytes()).await?;
    info!(
        includes = %includes
            .iter()
            .map(ClientInclude::as_str)
            .collect::<Vec<_>>()
            .join(","),
        wrote,
        "emitted HTTP client"
    );
    Ok(wrote)
}
