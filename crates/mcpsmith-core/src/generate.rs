//! Main entry point for code generation.

use std::path::Path;

use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::convert;
use crate::emit::{self, Emitter};
use crate::error::Result;
use crate::openapi::Parser;

/// What a generation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Tools built from the specification
    pub tools: usize,
    /// Files whose content actually changed on disk
    pub files_written: usize,
}

/// Run the whole pipeline for one configuration.
pub async fn generate(config: &GeneratorConfig) -> Result<GenerationSummary> {
    // 1. Load and resolve the specification.
    let parser = Parser::new(config.validate);
    let spec = parser.parse_file_or_url(&config.schema_path).await?;

    // 2. Build the tool model.
    let mcp = convert::build_config(&spec)?;
    info!(tools = mcp.tools.len(), "built tool model");

    // 3. Emit tool files and the registry.
    let output_dir = Path::new(&config.output_dir);
    let emitter = Emitter::new()?;
    let mut files_written = emitter.emit(&mcp, &config.package_name, output_dir).await?;

    // 4. Optionally emit the sibling HTTP client.
    if let Some(includes) = &config.client_includes {
        let wrote =
            emit::http_client::emit_http_client(&spec.raw, includes, output_dir).await?;
        files_written += usize::from(wrote);
    }

    match emit::tools_import_path(output_dir) {
        Ok(import_path) => info!(%import_path, "generated tools module"),
        Err(err) => debug!(%err, "tools module import path not resolvable"),
    }

    info!(files_written, "generation complete");
    Ok(GenerationSummary {
        tools: mcp.tools.len(),
        files_written,
    })
}
