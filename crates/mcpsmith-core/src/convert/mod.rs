//! Building the tool model from a resolved specification.

mod args;
mod response;

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Header, McpConfig, RequestTemplate, Tool};
use crate::openapi::document::{HttpMethod, Operation};
use crate::openapi::ResolvedSpec;
use crate::schema::draft7;

pub use args::{convert_parameters, convert_request_body};
pub use response::response_templates;

/// Build the [`McpConfig`] for a resolved specification, one tool per
/// operation in document order.
pub fn build_config(spec: &ResolvedSpec) -> Result<McpConfig> {
    let document = &spec.document;
    let base_url = document.first_server_url().unwrap_or_default();

    let mut seen = HashSet::new();
    let mut tools = Vec::new();
    for (path, item) in &document.paths {
        for (method, operation) in item.operations() {
            let tool = build_tool(base_url, path, method, operation)
                .map_err(|e| Error::spec(format!("{method} {path}: {e}")))?;
            if !seen.insert(tool.name.clone()) {
                return Err(Error::spec(format!(
                    "duplicate operationId '{}' ({method} {path})",
                    tool.name
                )));
            }
            debug!(tool = %tool.name, args = tool.args.len(), "built tool");
            tools.push(tool);
        }
    }

    Ok(McpConfig {
        server_name: document.info.title.clone(),
        server_version: document.info.version.clone(),
        tools,
    })
}

fn build_tool(
    base_url: &str,
    path: &str,
    method: HttpMethod,
    operation: &Operation,
) -> Result<Tool> {
    let name = operation
        .operation_id
        .clone()
        .ok_or_else(|| Error::spec("operation has no operationId".to_string()))?;

    let mut args = convert_parameters(&operation.parameters)?;
    let body = convert_request_body(operation.request_body.as_ref())?;

    // A single statically-known content type becomes a fixed header.
    let mut headers = Vec::new();
    if let Some(body) = &body {
        if let Some((content_type, _)) = body.content_types.first() {
            if body.content_types.len() == 1 {
                headers.push(Header {
                    name: "Content-Type".to_string(),
                    value: content_type.clone(),
                });
            }
        }
    }
    if let Some(body) = body {
        args.push(body);
    }

    let raw_input_schema = draft7::input_schema(&args)?;
    let response_templates = response_templates(operation)?;

    Ok(Tool {
        name,
        description: describe(operation),
        args,
        request_template: RequestTemplate {
            url: format!("{base_url}{path}"),
            method: method.as_str().to_string(),
            headers,
        },
        response_templates,
        raw_input_schema,
    })
}

/// Summary, description, or `"Summary - Description"` when both are present.
fn describe(operation: &Operation) -> String {
    let summary = operation.summary.as_deref().unwrap_or_default();
    let description = operation.description.as_deref().unwrap_or_default();
    match (summary.is_empty(), description.is_empty()) {
        (false, false) => format!("{summary} - {description}"),
        (false, true) => summary.to_string(),
        _ => description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArgSource;
    use crate::openapi::Parser;

    fn spec(json: &str) -> ResolvedSpec {
        Parser::new(false).parse_content(json).unwrap()
    }

    const TODO_SPEC: &str = r#"{
        "openapi": "3.0.3",
        "info": { "title": "Todo API", "version": "1.2.0" },
        "servers": [{ "url": "https://api.example.com/v1" }],
        "paths": {
            "/todos": {
                "post": {
                    "operationId": "createTodo",
                    "summary": "Create a new todo item",
                    "description": "Adds a new item to the todo list.",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "type": "object" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Created.",
                            "content": {
                                "application/json": { "schema": { "type": "object" } }
                            }
                        }
                    }
                },
                "get": {
                    "operationId": "listTodos",
                    "summary": "List todos",
                    "parameters": [
                        { "name": "status", "in": "query", "schema": { "type": "string" } }
                    ],
                    "responses": {}
                }
            }
        }
    }"#;

    #[test]
    fn test_build_config_iterates_operations_in_order() {
        let config = build_config(&spec(TODO_SPEC)).unwrap();
        assert_eq!(config.server_name, "Todo API");
        assert_eq!(config.server_version, "1.2.0");
        // Fixed method order puts GET before POST within a path item.
        let names: Vec<_> = config.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["listTodos", "createTodo"]);
    }

    #[test]
    fn test_request_template_carries_url_method_and_content_type() {
        let config = build_config(&spec(TODO_SPEC)).unwrap();
        let create = config
            .tools
            .iter()
            .find(|t| t.name == "createTodo")
            .unwrap();
        assert_eq!(
            create.request_template.url,
            "https://api.example.com/v1/todos"
        );
        assert_eq!(create.request_template.method, "POST");
        assert_eq!(
            create.request_template.headers,
            vec![Header {
                name: "Content-Type".to_string(),
                value: "application/json".to_string(),
            }]
        );
        assert_eq!(
            create.description,
            "Create a new todo item - Adds a new item to the todo list."
        );
    }

    #[test]
    fn test_body_arg_is_last() {
        let config = build_config(&spec(TODO_SPEC)).unwrap();
        let create = config
            .tools
            .iter()
            .find(|t| t.name == "createTodo")
            .unwrap();
        assert_eq!(create.args.last().unwrap().source, ArgSource::Body);
        assert!(create.raw_input_schema.contains("\"body\""));
    }

    #[test]
    fn test_operation_without_id_is_rejected() {
        let err = build_config(&spec(
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "t", "version": "1" },
                "paths": {
                    "/todos": { "get": { "responses": {} } }
                }
            }"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("no operationId"));
        assert!(err.to_string().contains("GET /todos"));
    }

    #[test]
    fn test_duplicate_operation_ids_are_rejected() {
        let err = build_config(&spec(
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "t", "version": "1" },
                "paths": {
                    "/a": { "get": { "operationId": "dup", "responses": {} } },
                    "/b": { "get": { "operationId": "dup", "responses": {} } }
                }
            }"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate operationId"));
    }

    #[test]
    fn test_multi_content_type_body_has_no_content_type_header() {
        let config = build_config(&spec(
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "t", "version": "1" },
                "paths": {
                    "/import": {
                        "post": {
                            "operationId": "importTodos",
                            "requestBody": {
                                "content": {
                                    "application/json": { "schema": { "type": "object" } },
                                    "application/xml": { "schema": { "type": "object" } }
                                }
                            },
                            "responses": {}
                        }
                    }
                }
            }"#,
        ))
        .unwrap();
        let import = &config.tools[0];
        assert!(import.request_template.headers.is_empty());
        assert!(import.raw_input_schema.contains("oneOf"));
    }
}
