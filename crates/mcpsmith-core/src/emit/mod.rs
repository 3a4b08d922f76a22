//! Code emission: per-tool source files and the registry file, with
//! handler-body preservation across regenerations.
//!
//! Each tool renders through an embedded Tera template into a Rust module
//! under `<output_dir>/mcptools/`. If a previous rendition of the file
//! exists, the user's handler body and extra imports are spliced into the
//! fresh output before the canonical formatting pass.

pub mod http_client;
mod modpath;
mod preserve;
mod writer;

pub use modpath::tools_import_path;
pub use preserve::{extract, format_source, render_tool_file, PreservedParts};
pub use writer::write_if_changed;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::model::{McpConfig, Tool};
use crate::utils::{
    escape_rust_string, raw_string_literal, to_screaming_snake_case, to_snake_case,
};

const TOOL_TEMPLATE: &str = include_str!("templates/tool.rs.tera");
const SERVER_TEMPLATE: &str = include_str!("templates/server.rs.tera");

/// Subdirectory of the output directory holding the generated tool modules.
pub const TOOLS_DIR: &str = "mcptools";

/// The registration file, doubling as the module root of the tools
/// directory.
pub const REGISTRY_FILE_NAME: &str = "mod.rs";

/// The minimum import set every generated tool file needs.
const REQUIRED_TOOL_IMPORTS: &[&str] = &[
    "std::sync::Arc",
    "rmcp::RoleServer",
    "rmcp::model::CallToolRequestParam",
    "rmcp::model::CallToolResult",
    "rmcp::model::ErrorData",
    "rmcp::model::JsonObject",
    "rmcp::model::Tool",
    "rmcp::service::RequestContext",
];

#[derive(Serialize)]
struct HeaderContext {
    name: String,
    value: String,
}

#[derive(Serialize)]
struct ResponseTemplateContext {
    const_name: String,
    status_label: String,
    content_type: String,
    literal: String,
}

#[derive(Serialize)]
struct ToolContext {
    name: String,
    name_str: String,
    description: String,
    url: String,
    method: String,
    headers: Vec<HeaderContext>,
    input_schema_const: String,
    schema_literal: String,
    factory_name: String,
    handler_name: String,
    response_templates: Vec<ResponseTemplateContext>,
}

#[derive(Serialize)]
struct RegistryToolContext {
    name_str: String,
    module: String,
    factory_name: String,
    handler_name: String,
}

/// Renders tool and registry files from the embedded templates.
pub struct Emitter {
    tera: Tera,
}

impl Emitter {
    /// Create an emitter with the embedded templates registered.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("tool.rs", TOOL_TEMPLATE),
            ("server.rs", SERVER_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    /// Emit every tool file plus the registry into
    /// `<output_dir>/mcptools/`. Returns the number of files written.
    pub async fn emit(
        &self,
        mcp: &McpConfig,
        package_name: &str,
        output_dir: &Path,
    ) -> Result<usize> {
        let tools_dir = output_dir.join(TOOLS_DIR);
        let mut written = 0;

        for tool in &mcp.tools {
            if self.emit_tool(tool, &tools_dir).await? {
                written += 1;
            }
        }
        if self.emit_registry(mcp, package_name, &tools_dir).await? {
            written += 1;
        }

        Ok(written)
    }

    /// Path of the generated file for a tool.
    pub fn tool_file_path(output_dir: &Path, tool_name: &str) -> PathBuf {
        output_dir
            .join(TOOLS_DIR)
            .join(format!("{}.rs", to_snake_case(tool_name)))
    }

    async fn emit_tool(&self, tool: &Tool, tools_dir: &Path) -> Result<bool> {
        let snake = to_snake_case(&tool.name);
        let screaming = to_screaming_snake_case(&tool.name);
        let handler_name = format!("{snake}_handler");
        let file_name = format!("{snake}.rs");

        let context = ToolContext {
            name: tool.name.clone(),
            name_str: escape_rust_string(&tool.name),
            description: escape_rust_string(&tool.description),
            url: tool.request_template.url.clone(),
            method: tool.request_template.method.clone(),
            headers: tool
                .request_template
                .headers
                .iter()
                .map(|header| HeaderContext {
                    name: header.name.clone(),
                    value: header.value.clone(),
                })
                .collect(),
            input_schema_const: format!("{screaming}_INPUT_SCHEMA"),
            schema_literal: raw_string_literal(&tool.raw_input_schema),
            factory_name: format!("{snake}_tool"),
            handler_name: handler_name.clone(),
            response_templates: tool
                .response_templates
                .iter()
                .map(|template| ResponseTemplateContext {
                    const_name: format!(
                        "{screaming}_RESPONSE_TEMPLATE_{}",
                        template.suffix
                    ),
                    status_label: if template.status_code == 0 {
                        "default".to_string()
                    } else {
                        template.status_code.to_string()
                    },
                    content_type: template.content_type.clone(),
                    literal: raw_string_literal(&template.prepend_body),
                })
                .collect(),
        };

        // Pull the user's handler body and imports out of the previous
        // rendition, if one exists.
        let preserved = match fs::read_to_string(tools_dir.join(&file_name)).await {
            Ok(existing) => preserve::extract(&existing, &handler_name),
            Err(_) => PreservedParts::default(),
        };
        if preserved.handler_body.is_some() {
            debug!(tool = %tool.name, "preserving existing handler body");
        }

        let rendered = self
            .tera
            .render("tool.rs", &Context::from_serialize(&context)?)?;
        let source = preserve::render_tool_file(
            &rendered,
            &handler_name,
            REQUIRED_TOOL_IMPORTS,
            &preserved,
        )?;

        write_if_changed(tools_dir, &file_name, source.as_bytes()).await
    }

    async fn emit_registry(
        &self,
        mcp: &McpConfig,
        package_name: &str,
        tools_dir: &Path,
    ) -> Result<bool> {
        let tools: Vec<RegistryToolContext> = mcp
            .tools
            .iter()
            .map(|tool| {
                let snake = to_snake_case(&tool.name);
                RegistryToolContext {
                    name_str: escape_rust_string(&tool.name),
                    module: snake.clone(),
                    factory_name: format!("{snake}_tool"),
                    handler_name: format!("{snake}_handler"),
                }
            })
            .collect();

        let mut context = Context::new();
        context.insert("package_name", package_name);
        context.insert("server_name", &escape_rust_string(&mcp.server_name));
        context.insert("server_version", &escape_rust_string(&mcp.server_version));
        context.insert("tools", &tools);

        let rendered = self.tera.render("server.rs", &context)?;
        let source = preserve::format_source(&rendered)?;

        write_if_changed(tools_dir, REGISTRY_FILE_NAME, source.as_bytes()).await
    }
}
