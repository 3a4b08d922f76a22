//! Markdown response-template rendering.
//!
//! Every (status code, content type) pair with a usable schema becomes one
//! [`ResponseTemplate`]: a fixed preamble, the status/content-type fields,
//! an optional block-quoted description, and a recursive walk of the
//! response structure. Templates are ordered numerically-then-lexically and
//! suffixed `A`, `B`, ... in that order.

use std::cmp::Ordering;
use std::fmt::Write as _;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::ResponseTemplate;
use crate::openapi::document::Operation;
use crate::schema::ir::{BaseType, Schema};
use crate::schema::normalize;

/// Single-letter suffixes cap the templates per tool.
const MAX_TEMPLATES: usize = 26;

/// Render the ordered response templates for an operation.
pub fn response_templates(operation: &Operation) -> Result<Vec<ResponseTemplate>> {
    let mut codes: Vec<&String> = operation.responses.keys().collect();
    // Numeric codes ascending, then non-numeric codes (e.g. `default`)
    // lexicographically; the sort is stable so equal keys keep input order.
    codes.sort_by(|a, b| match (a.parse::<u16>(), b.parse::<u16>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.as_str().cmp(b.as_str()),
    });

    let mut templates = Vec::new();
    for code in codes {
        let response = &operation.responses[code];
        let status_code = code.parse::<u16>().unwrap_or(0);

        let mut content_types: Vec<&String> = response.content.keys().collect();
        content_types.sort();

        for content_type in content_types {
            let Some(source) = &response.content[content_type].schema else {
                continue;
            };
            let schema = normalize(source).map_err(|e| {
                Error::spec(format!("response '{code}' content '{content_type}': {e}"))
            })?;

            let mut body = String::new();
            body.push_str("# API Response Information\n\n");
            body.push_str("Below is the response template for this API endpoint.\n\n");
            body.push_str(
                "The template shows a possible response, including its status code and \
                 content type, to help you understand and generate correct outputs.\n\n",
            );
            let _ = writeln!(body, "**Status Code:** {code}\n");
            let _ = writeln!(body, "**Content-Type:** {content_type}\n");
            if let Some(description) = response.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(body, "> {description}\n");
            }
            body.push_str("## Response Structure\n\n");
            write_schema_markdown(&mut body, &schema, 0, None);

            templates.push(ResponseTemplate {
                status_code,
                content_type: content_type.clone(),
                prepend_body: body,
                suffix: 'A',
            });
        }
    }

    if templates.len() > MAX_TEMPLATES {
        return Err(Error::spec(format!(
            "{} response templates exceed the {MAX_TEMPLATES} single-letter suffixes",
            templates.len()
        )));
    }
    for (i, template) in templates.iter_mut().enumerate() {
        template.suffix = (b'A' + i as u8) as char;
    }
    Ok(templates)
}

/// Recursively document a schema node as a Markdown bullet tree.
fn write_schema_markdown(out: &mut String, schema: &Schema, indent: usize, label: Option<&str>) {
    let ind = "  ".repeat(indent);
    let type_desc = type_desc(schema);

    match (label, schema.description.as_deref()) {
        (Some(name), Some(desc)) => {
            let _ = writeln!(out, "{ind}- **{name}**: {desc} (Type: {type_desc}):");
        }
        (Some(name), None) => {
            let _ = writeln!(out, "{ind}- **{name}** (Type: {type_desc}):");
        }
        (None, Some(desc)) => {
            let _ = writeln!(out, "{ind}- {desc} (Type: {type_desc}):");
        }
        (None, None) => {
            let _ = writeln!(out, "{ind}- Structure (Type: {type_desc}):");
        }
    }

    write_schema_details(out, schema, indent + 2);

    if let Some(object) = &schema.object {
        if !object.properties.is_empty() {
            // Property order is unspecified in the source; sort for
            // deterministic output.
            let mut names: Vec<&String> = object.properties.keys().collect();
            names.sort();
            for name in names {
                write_schema_markdown(out, &object.properties[name], indent + 1, Some(name));
            }
        }
    }

    if let Some(array) = &schema.array {
        if let Some(items) = &array.items {
            write_schema_markdown(out, items, indent + 1, Some("Items"));
        }
    }

    if !schema.one_of.is_empty() {
        let _ = writeln!(out, "{ind}  - **One Of the following structures**:");
        for (i, branch) in schema.one_of.iter().enumerate() {
            let label = format!("Option {}", i + 1);
            write_schema_markdown(out, branch, indent + 2, Some(&label));
        }
    }
    if !schema.any_of.is_empty() {
        let _ = writeln!(out, "{ind}  - **Any Of the following structures**:");
        for (i, branch) in schema.any_of.iter().enumerate() {
            let label = format!("Option {}", i + 1);
            write_schema_markdown(out, branch, indent + 2, Some(&label));
        }
    }
    if !schema.all_of.is_empty() {
        let _ = writeln!(out, "{ind}  - **Combines All Of the following structures**:");
        for (i, branch) in schema.all_of.iter().enumerate() {
            let label = format!("Part {}", i + 1);
            write_schema_markdown(out, branch, indent + 2, Some(&label));
        }
    }
    if let Some(not) = &schema.not {
        let _ = writeln!(out, "{ind}  - **Not**: Cannot be the following structure:");
        write_schema_markdown(out, not, indent + 2, Some("Forbidden Structure"));
    }

    if let Some(object) = &schema.object {
        match &object.additional_properties {
            Some(extra) if !extra.is_empty() => {
                let _ = writeln!(out, "{ind}  - **Additional Properties**:");
                write_schema_markdown(out, extra, indent + 2, Some("property value"));
            }
            Some(_) => {
                let _ = writeln!(out, "{ind}  - **Allows Additional Properties**");
            }
            None => {}
        }
    }
}

/// Validation facts as further-indented bullets under the node's main line.
fn write_schema_details(out: &mut String, schema: &Schema, indent: usize) {
    let mut details = Vec::new();

    if let Some(string) = &schema.string {
        if string.min_length > 0 {
            details.push(format!("Min Length: {}", string.min_length));
        }
        if let Some(max_length) = string.max_length.filter(|len| *len > 0) {
            details.push(format!("Max Length: {max_length}"));
        }
        if let Some(pattern) = &string.pattern {
            details.push(format!("Pattern: '{}'", pattern.replace('`', "'")));
        }
    }

    if let Some(number) = &schema.number {
        if let Some(minimum) = number.minimum {
            if number.exclusive_minimum {
                details.push(format!("Minimum (exclusive): {minimum}"));
            } else {
                details.push(format!("Minimum: {minimum}"));
            }
        }
        if let Some(maximum) = number.maximum {
            if number.exclusive_maximum {
                details.push(format!("Maximum (exclusive): {maximum}"));
            } else {
                details.push(format!("Maximum: {maximum}"));
            }
        }
        if let Some(multiple_of) = number.multiple_of {
            details.push(format!("Multiple Of: {multiple_of}"));
        }
    }

    if let Some(array) = &schema.array {
        if array.min_items > 0 {
            details.push(format!("Min Items: {}", array.min_items));
        }
        if let Some(max_items) = array.max_items {
            details.push(format!("Max Items: {max_items}"));
        }
        if array.unique_items {
            details.push("Unique Items: true".to_string());
        }
    }

    if let Some(default) = &schema.default {
        details.push(format!("Default: '{}'", format_value(default, schema)));
    }
    if let Some(example) = &schema.example {
        details.push(format!("Example: '{}'", format_value(example, schema)));
    }
    if !schema.enum_values.is_empty() {
        let entries: Vec<String> = schema
            .enum_values
            .iter()
            .map(|value| format!("'{}'", format_value(value, schema)))
            .collect();
        details.push(format!("Enum: [{}]", entries.join(", ")));
    }

    let ind = "  ".repeat(indent);
    for detail in details {
        let _ = writeln!(out, "{ind}- {detail}");
    }
}

/// Comma-joined base types plus format, or a placeholder for pure
/// composition / unknown nodes.
fn type_desc(schema: &Schema) -> String {
    let mut parts: Vec<&str> = schema.types.iter().map(BaseType::as_str).collect();
    if let Some(format) = &schema.format {
        parts.push(format);
    }
    if parts.is_empty() {
        if schema.has_composition() {
            "Combinator".to_string()
        } else {
            "unknown".to_string()
        }
    } else {
        parts.join(", ")
    }
}

/// JSON-serialize a value for the Markdown body. String-typed values lose
/// their JSON quotes, and backticks become single quotes so the result stays
/// safe inside a raw-string literal in the emitted code.
fn format_value(value: &Value, schema: &Schema) -> String {
    let mut text = serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
    if schema.types.first() == Some(&BaseType::String)
        && text.starts_with('"')
        && text.ends_with('"')
        && text.len() >= 2
    {
        text = text[1..text.len() - 1].to_string();
    }
    text.replace('`', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(json: &str) -> Operation {
        serde_json::from_str(json).unwrap()
    }

    const THREE_RESPONSES: &str = r#"{
        "operationId": "createTodo",
        "responses": {
            "default": {
                "description": "Unexpected error.",
                "content": {
                    "application/json": { "schema": { "type": "object" } }
                }
            },
            "400": {
                "description": "Validation failed.",
                "content": {
                    "application/json": { "schema": { "type": "object" } }
                }
            },
            "200": {
                "description": "The created todo.",
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": {
                                "title": {
                                    "type": "string",
                                    "description": "The main content of the todo item."
                                }
                            }
                        }
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_ordering_and_suffixes() {
        let templates = response_templates(&operation(THREE_RESPONSES)).unwrap();
        assert_eq!(templates.len(), 3);

        let order: Vec<_> = templates
            .iter()
            .map(|t| (t.status_code, t.suffix))
            .collect();
        assert_eq!(order, vec![(200, 'A'), (400, 'B'), (0, 'C')]);
    }

    #[test]
    fn test_preamble_contains_status_and_content_type() {
        let templates = response_templates(&operation(THREE_RESPONSES)).unwrap();
        let first = &templates[0];
        assert!(first.prepend_body.contains("**Status Code:** 200"));
        assert!(first
            .prepend_body
            .contains("**Content-Type:** application/json"));
        assert!(first.prepend_body.contains("> The created todo."));
        assert!(first.prepend_body.contains("## Response Structure"));
        assert!(first.prepend_body.contains(
            "  - **title**: The main content of the todo item. (Type: string):"
        ));

        let default = &templates[2];
        assert!(default.prepend_body.contains("**Status Code:** default"));
    }

    #[test]
    fn test_content_types_sorted_within_status() {
        let templates = response_templates(&operation(
            r#"{
                "operationId": "exportTodos",
                "responses": {
                    "200": {
                        "description": "ok",
                        "content": {
                            "text/csv": { "schema": { "type": "string" } },
                            "application/json": { "schema": { "type": "object" } }
                        }
                    }
                }
            }"#,
        ))
        .unwrap();
        let order: Vec<_> = templates
            .iter()
            .map(|t| (t.content_type.as_str(), t.suffix))
            .collect();
        assert_eq!(order, vec![("application/json", 'A'), ("text/csv", 'B')]);
    }

    #[test]
    fn test_schema_less_content_is_skipped() {
        let templates = response_templates(&operation(
            r#"{
                "operationId": "deleteTodoById",
                "responses": {
                    "204": { "description": "Deleted." },
                    "404": {
                        "description": "Not found.",
                        "content": {
                            "application/json": { "schema": { "type": "object" } }
                        }
                    }
                }
            }"#,
        ))
        .unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].status_code, 404);
        assert_eq!(templates[0].suffix, 'A');
    }

    #[test]
    fn test_more_than_26_templates_rejected() {
        let mut responses = Vec::new();
        for code in 200..227 {
            responses.push(format!(
                r#""{code}": {{
                    "description": "r",
                    "content": {{ "application/json": {{ "schema": {{ "type": "object" }} }} }}
                }}"#
            ));
        }
        let json = format!(
            r#"{{ "operationId": "big", "responses": {{ {} }} }}"#,
            responses.join(",")
        );
        let err = response_templates(&operation(&json)).unwrap_err();
        assert!(err.to_string().contains("single-letter suffixes"));
    }

    #[test]
    fn test_validation_details_and_backtick_replacement() {
        let templates = response_templates(&operation(
            r#"{
                "operationId": "getTodoById",
                "responses": {
                    "200": {
                        "description": "ok",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "status": {
                                            "type": "string",
                                            "enum": ["pending", "done"],
                                            "default": "pending",
                                            "example": "uses `ticks`"
                                        },
                                        "count": {
                                            "type": "integer",
                                            "minimum": 0,
                                            "maximum": 100,
                                            "exclusiveMaximum": true
                                        },
                                        "tags": {
                                            "type": "array",
                                            "uniqueItems": true,
                                            "items": { "type": "string" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }"#,
        ))
        .unwrap();
        let body = &templates[0].prepend_body;
        assert!(body.contains("- Enum: ['pending', 'done']"));
        assert!(body.contains("- Default: 'pending'"));
        assert!(body.contains("- Example: 'uses 'ticks''"));
        assert!(body.contains("- Minimum: 0"));
        assert!(body.contains("- Maximum (exclusive): 100"));
        assert!(body.contains("- Unique Items: true"));
        assert!(body.contains("- **Items** (Type: string):"));
        assert!(!body.contains('`'));
    }

    #[test]
    fn test_combinator_labels() {
        let templates = response_templates(&operation(
            r#"{
                "operationId": "searchTodos",
                "responses": {
                    "200": {
                        "description": "ok",
                        "content": {
                            "application/json": {
                                "schema": {
                                    "oneOf": [
                                        { "type": "object" },
                                        { "type": "string" }
                                    ],
                                    "not": { "type": "boolean" }
                                }
                            }
                        }
                    }
                }
            }"#,
        ))
        .unwrap();
        let body = &templates[0].prepend_body;
        assert!(body.contains("- Structure (Type: Combinator):"));
        assert!(body.contains("- **One Of the following structures**:"));
        assert!(body.contains("- **Option 1** (Type: object):"));
        assert!(body.contains("- **Option 2** (Type: string):"));
        assert!(body.contains("- **Not**: Cannot be the following structure:"));
        assert!(body.contains("- **Forbidden Structure** (Type: boolean):"));
    }
}
