//! `$ref` inlining for parsed documents.
//!
//! The rest of the pipeline works on a tree: every reference is replaced by a
//! clone of its target before normalization runs. A reference chain that
//! revisits a component is rejected here, so the normalizer never has to
//! guard against cycles. Only local `#/components/...` pointers are
//! supported.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::openapi::document::{
    AdditionalProperties, Components, Document, MediaType, Operation, Parameter, RequestBody,
    Response, Schema,
};

/// Inline every `$ref` in `document`, merging path-level parameters into
/// each operation along the way.
pub fn resolve_document(mut document: Document) -> Result<Document> {
    let components = document.components.clone().unwrap_or_default();
    let resolver = Resolver {
        components: &components,
    };

    for (path, item) in document.paths.iter_mut() {
        let shared = item
            .parameters
            .iter()
            .map(|param| resolver.resolve_parameter(param))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_context(path))?;
        item.parameters = shared.clone();

        for operation in item.operations_mut() {
            resolver
                .resolve_operation(operation, &shared)
                .map_err(|e| e.with_context(path))?;
        }
    }

    Ok(document)
}

impl Error {
    fn with_context(self, path: &str) -> Self {
        match self {
            Error::Spec(msg) => Error::spec(format!("path '{path}': {msg}")),
            other => other,
        }
    }
}

struct Resolver<'a> {
    components: &'a Components,
}

impl Resolver<'_> {
    fn resolve_operation(&self, operation: &mut Operation, shared: &[Parameter]) -> Result<()> {
        let mut parameters = operation
            .parameters
            .iter()
            .map(|param| self.resolve_parameter(param))
            .collect::<Result<Vec<_>>>()?;

        // Path-level parameters apply to every operation unless the
        // operation redeclares the same (name, location) pair.
        for param in shared {
            let shadowed = parameters
                .iter()
                .any(|own| own.name == param.name && own.location == param.location);
            if !shadowed {
                parameters.push(param.clone());
            }
        }
        operation.parameters = parameters;

        if let Some(body) = operation.request_body.take() {
            operation.request_body = Some(self.resolve_request_body(&body)?);
        }

        let mut responses = IndexMap::new();
        for (code, response) in &operation.responses {
            let resolved = self
                .resolve_response(response)
                .map_err(|e| e.with_context(&format!("response '{code}'")))?;
            responses.insert(code.clone(), resolved);
        }
        operation.responses = responses;

        Ok(())
    }

    fn resolve_parameter(&self, parameter: &Parameter) -> Result<Parameter> {
        let mut parameter = match &parameter.reference {
            Some(pointer) => {
                let name = component_name(pointer, "parameters")?;
                let target = self.components.parameters.get(name).ok_or_else(|| {
                    Error::spec(format!("unresolved parameter reference '{pointer}'"))
                })?;
                if target.reference.is_some() {
                    return Err(Error::spec(format!(
                        "parameter component '{name}' is itself a reference"
                    )));
                }
                target.clone()
            }
            None => parameter.clone(),
        };

        if let Some(schema) = parameter.schema.take() {
            let mut stack = Vec::new();
            parameter.schema = Some(
                self.resolve_schema(&schema, &mut stack)
                    .map_err(|e| e.with_context(&format!("parameter '{}'", parameter.name)))?,
            );
        }
        Ok(parameter)
    }

    fn resolve_request_body(&self, body: &RequestBody) -> Result<RequestBody> {
        let mut body = match &body.reference {
            Some(pointer) => {
                let name = component_name(pointer, "requestBodies")?;
                let target = self.components.request_bodies.get(name).ok_or_else(|| {
                    Error::spec(format!("unresolved request body reference '{pointer}'"))
                })?;
                if target.reference.is_some() {
                    return Err(Error::spec(format!(
                        "request body component '{name}' is itself a reference"
                    )));
                }
                target.clone()
            }
            None => body.clone(),
        };
        body.content = self.resolve_content(&body.content)?;
        Ok(body)
    }

    fn resolve_response(&self, response: &Response) -> Result<Response> {
        let mut response = match &response.reference {
            Some(pointer) => {
                let name = component_name(pointer, "responses")?;
                let target = self.components.responses.get(name).ok_or_else(|| {
                    Error::spec(format!("unresolved response reference '{pointer}'"))
                })?;
                if target.reference.is_some() {
                    return Err(Error::spec(format!(
                        "response component '{name}' is itself a reference"
                    )));
                }
                target.clone()
            }
            None => response.clone(),
        };
        response.content = self.resolve_content(&response.content)?;
        Ok(response)
    }

    fn resolve_content(
        &self,
        content: &IndexMap<String, MediaType>,
    ) -> Result<IndexMap<String, MediaType>> {
        let mut resolved = IndexMap::new();
        for (content_type, media) in content {
            let schema = match &media.schema {
                Some(schema) => {
                    let mut stack = Vec::new();
                    Some(
                        self.resolve_schema(schema, &mut stack)
                            .map_err(|e| e.with_context(&format!("content '{content_type}'")))?,
                    )
                }
                None => None,
            };
            resolved.insert(content_type.clone(), MediaType { schema });
        }
        Ok(resolved)
    }

    fn resolve_schema(&self, schema: &Schema, stack: &mut Vec<String>) -> Result<Schema> {
        if let Some(pointer) = &schema.reference {
            let name = component_name(pointer, "schemas")?;
            if stack.iter().any(|seen| seen == name) {
                return Err(Error::spec(format!(
                    "schema reference cycle detected: {} -> {name}",
                    stack.join(" -> ")
                )));
            }
            let target = self
                .components
                .schemas
                .get(name)
                .ok_or_else(|| Error::spec(format!("unresolved schema reference '{pointer}'")))?;
            stack.push(name.to_string());
            let resolved = self.resolve_schema(target, stack)?;
            stack.pop();
            return Ok(resolved);
        }

        let mut resolved = schema.clone();

        if let Some(items) = &schema.items {
            resolved.items = Some(Box::new(self.resolve_schema(items, stack)?));
        }
        if let Some(properties) = &schema.properties {
            let mut out = IndexMap::new();
            for (name, prop) in properties {
                let prop = self
                    .resolve_schema(prop, stack)
                    .map_err(|e| e.with_context(&format!("property '{name}'")))?;
                out.insert(name.clone(), prop);
            }
            resolved.properties = Some(out);
        }
        if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
            resolved.additional_properties = Some(AdditionalProperties::Schema(Box::new(
                self.resolve_schema(extra, stack)?,
            )));
        }
        if let Some(branches) = &schema.one_of {
            resolved.one_of = Some(self.resolve_branches(branches, stack)?);
        }
        if let Some(branches) = &schema.any_of {
            resolved.any_of = Some(self.resolve_branches(branches, stack)?);
        }
        if let Some(branches) = &schema.all_of {
            resolved.all_of = Some(self.resolve_branches(branches, stack)?);
        }
        if let Some(not) = &schema.not {
            resolved.not = Some(Box::new(self.resolve_schema(not, stack)?));
        }

        Ok(resolved)
    }

    fn resolve_branches(&self, branches: &[Schema], stack: &mut Vec<String>) -> Result<Vec<Schema>> {
        branches
            .iter()
            .map(|branch| self.resolve_schema(branch, stack))
            .collect()
    }
}

/// Extract the component name from a local pointer of the given section,
/// e.g. `#/components/schemas/Todo` -> `Todo`.
fn component_name<'a>(pointer: &'a str, section: &str) -> Result<&'a str> {
    let prefix = format!("#/components/{section}/");
    pointer
        .strip_prefix(prefix.as_str())
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .ok_or_else(|| {
            Error::spec(format!(
                "unsupported reference '{pointer}' (expected '#/components/{section}/<name>')"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_inlines_schema_references() {
        let document = doc(r##"{
            "openapi": "3.0.0",
            "info": { "title": "t", "version": "1" },
            "paths": {
                "/todos": {
                    "get": {
                        "operationId": "listTodos",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Todo" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Todo": {
                        "type": "object",
                        "properties": { "title": { "type": "string" } }
                    }
                }
            }
        }"##);

        let resolved = resolve_document(document).unwrap();
        let op = resolved.paths["/todos"].get.as_ref().unwrap();
        let schema = op.responses["200"].content["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert!(schema.reference.is_none());
        assert!(schema.properties.as_ref().unwrap().contains_key("title"));
    }

    #[test]
    fn test_rejects_reference_cycles() {
        let document = doc(r##"{
            "openapi": "3.0.0",
            "info": { "title": "t", "version": "1" },
            "paths": {
                "/a": {
                    "get": {
                        "operationId": "getA",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/A" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "A": {
                        "type": "object",
                        "properties": { "b": { "$ref": "#/components/schemas/B" } }
                    },
                    "B": {
                        "type": "object",
                        "properties": { "a": { "$ref": "#/components/schemas/A" } }
                    }
                }
            }
        }"##);

        let err = resolve_document(document).unwrap_err();
        assert!(err.to_string().contains("cycle"), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_unknown_reference() {
        let document = doc(r##"{
            "openapi": "3.0.0",
            "info": { "title": "t", "version": "1" },
            "paths": {
                "/a": {
                    "get": {
                        "operationId": "getA",
                        "parameters": [
                            { "name": "q", "in": "query", "schema": { "$ref": "#/components/schemas/Missing" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }"##);

        let err = resolve_document(document).unwrap_err();
        assert!(
            err.to_string().contains("unresolved schema reference"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_merges_path_level_parameters() {
        let document = doc(r##"{
            "openapi": "3.0.0",
            "info": { "title": "t", "version": "1" },
            "paths": {
                "/todos/{todoId}": {
                    "parameters": [
                        { "name": "todoId", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "get": {
                        "operationId": "getTodoById",
                        "parameters": [
                            { "name": "verbose", "in": "query", "schema": { "type": "boolean" } }
                        ],
                        "responses": {}
                    }
                }
            }
        }"##);

        let resolved = resolve_document(document).unwrap();
        let op = resolved.paths["/todos/{todoId}"].get.as_ref().unwrap();
        let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["verbose", "todoId"]);
    }
}
