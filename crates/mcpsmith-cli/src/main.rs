//! mcpsmith CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use mcpsmith_core::{ClientInclude, GeneratorConfig};

#[derive(Parser)]
#[command(name = "mcpsmith")]
#[command(about = "Generate MCP servers from OpenAPI specs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate MCP server code from an OpenAPI spec
    Generate {
        /// Path or URL to the OpenAPI spec (YAML or JSON)
        #[arg(long)]
        schema_path: String,

        /// Output directory for generated code
        #[arg(long, default_value = "generated")]
        output_dir: PathBuf,

        /// Name of the package the generated sources belong to
        #[arg(long, default_value = "mcp_server")]
        package_name: String,

        /// Run strict validation on the parsed spec
        #[arg(long)]
        validate: bool,

        /// Also emit HTTP client code; repeat for each artifact
        /// (types, httpclient)
        #[arg(long = "include", value_name = "ARTIFACT")]
        includes: Vec<String>,
    },

    /// Parse and validate an OpenAPI spec without generating code
    Check {
        /// Path or URL to the OpenAPI spec (YAML or JSON)
        schema_path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    match cli.command {
        Commands::Generate {
            schema_path,
            output_dir,
            package_name,
            validate,
            includes,
        } => {
            let client_includes = if includes.is_empty() {
                None
            } else {
                Some(
                    includes
                        .iter()
                        .map(|tag| tag.parse::<ClientInclude>())
                        .collect::<Result<Vec<_>, _>>()
                        .context("invalid --include value")?,
                )
            };

            let config = GeneratorConfig {
                schema_path,
                package_name,
                output_dir: output_dir.to_string_lossy().to_string(),
                validate,
                client_includes,
            };

            let summary = mcpsmith_core::generate(&config)
                .await
                .context("generation failed")?;
            println!(
                "✅ Generated {} tool(s) into {} ({} file(s) written)",
                summary.tools,
                output_dir.display(),
                summary.files_written
            );
        }
        Commands::Check { schema_path } => {
            let parser = mcpsmith_core::openapi::Parser::new(true);
            let spec = parser
                .parse_file_or_url(&schema_path)
                .await
                .context("specification check failed")?;
            let mcp = mcpsmith_core::convert::build_config(&spec)
                .context("specification check failed")?;
            println!(
                "✅ {} v{}: {} operation(s) convert cleanly",
                mcp.server_name,
                mcp.server_version,
                mcp.tools.len()
            );
        }
    }

    Ok(())
}
