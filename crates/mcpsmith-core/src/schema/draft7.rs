//! Lowering of the IR into JSON Schema Draft 7.
//!
//! The tool input schema is a single object whose properties are the tool's
//! args. Multi-content-type bodies compose into a `oneOf` where every branch
//! is tagged with its media type so it stays self-describing.

use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::model::{Arg, ArgSource};
use crate::schema::ir::Schema;

/// Lower a list of args into a pretty-printed Draft 7 document.
pub fn input_schema(args: &[Arg]) -> Result<String> {
    let mut root = Map::new();
    root.insert("type".to_string(), json!("object"));

    let mut properties = Map::new();
    let mut required = Vec::new();

    for arg in args {
        if arg.deprecated {
            continue;
        }
        let Some(prop) = property_schema(arg)? else {
            continue;
        };
        properties.insert(arg.name.clone(), Value::Object(prop));
        if arg.required {
            required.push(Value::String(arg.name.clone()));
        }
    }

    if !properties.is_empty() {
        root.insert("properties".to_string(), Value::Object(properties));
    }
    if !required.is_empty() {
        root.insert("required".to_string(), Value::Array(required));
    }

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

/// Build the property schema for one arg; `None` skips the property.
fn property_schema(arg: &Arg) -> Result<Option<Map<String, Value>>> {
    let mut prop = match arg.source {
        ArgSource::Body => match body_schema(arg)? {
            Some(prop) => prop,
            None => return Ok(None),
        },
        _ => match &arg.schema {
            Some(schema) => lower(schema)?,
            None => return Ok(None),
        },
    };

    if !arg.description.is_empty() {
        let missing = match prop.get("description") {
            None => true,
            Some(Value::String(existing)) => existing.is_empty(),
            Some(_) => false,
        };
        if missing {
            prop.insert("description".to_string(), json!(arg.description));
        }
    }

    Ok(Some(prop))
}

/// Lower the body arg: a single content type is used directly, two or more
/// compose into a tagged `oneOf`.
fn body_schema(arg: &Arg) -> Result<Option<Map<String, Value>>> {
    match arg.content_types.first() {
        None => return Ok(None),
        Some((_, schema)) if arg.content_types.len() == 1 => return lower(schema).map(Some),
        _ => {}
    }

    let mut branches = Vec::new();
    for (content_type, schema) in &arg.content_types {
        let mut branch = lower(schema).map_err(|e| {
            Error::schema(format!(
                "body schema branch for content type '{content_type}': {e}"
            ))
        })?;
        add_content_type_info(&mut branch, content_type);
        branches.push(Value::Object(branch));
    }

    let mut prop = Map::new();
    prop.insert("oneOf".to_string(), Value::Array(branches));
    Ok(Some(prop))
}

/// Tag a `oneOf` branch with its media type via description or title.
fn add_content_type_info(schema: &mut Map<String, Value>, content_type: &str) {
    let description = schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(description) = description {
        let tagged = format!("[{content_type}] {description}");
        schema.insert("description".to_string(), json!(tagged));
        return;
    }
    let title = schema.get("title").and_then(Value::as_str).map(str::to_string);
    if let Some(title) = title {
        let tagged = format!("[{content_type}] {title}");
        schema.insert("title".to_string(), json!(tagged));
        return;
    }
    schema.insert(
        "title".to_string(),
        json!(format!("Schema for {content_type}")),
    );
}

/// Lower one IR schema node into a Draft 7 map.
pub fn lower(schema: &Schema) -> Result<Map<String, Value>> {
    let mut out = Map::new();

    add_metadata(&mut out, schema);
    add_type(&mut out, schema);
    add_string_validation(&mut out, schema);
    add_number_validation(&mut out, schema);
    add_combinators(&mut out, schema)?;
    add_array_validation(&mut out, schema)?;
    add_object_validation(&mut out, schema)?;

    Ok(out)
}

fn add_metadata(out: &mut Map<String, Value>, schema: &Schema) {
    if let Some(title) = &schema.title {
        out.insert("title".to_string(), json!(title));
    }
    if let Some(description) = &schema.description {
        out.insert("description".to_string(), json!(description));
    }
    if let Some(format) = &schema.format {
        out.insert("format".to_string(), json!(format));
    }
    if let Some(default) = &schema.default {
        out.insert("default".to_string(), default.clone());
    }
    if let Some(example) = &schema.example {
        // Draft 7 `examples` is an array; a held example becomes its sole
        // element.
        out.insert("examples".to_string(), Value::Array(vec![example.clone()]));
    }
    if !schema.enum_values.is_empty() {
        out.insert("enum".to_string(), Value::Array(schema.enum_values.clone()));
    }
    if schema.read_only {
        out.insert("readOnly".to_string(), json!(true));
    }
    if schema.write_only {
        out.insert("writeOnly".to_string(), json!(true));
    }
}

fn add_type(out: &mut Map<String, Value>, schema: &Schema) {
    match schema.types.as_slice() {
        [] => {}
        [single] => {
            out.insert("type".to_string(), json!(single.as_str()));
        }
        many => {
            let names: Vec<Value> = many.iter().map(|t| json!(t.as_str())).collect();
            out.insert("type".to_string(), Value::Array(names));
        }
    }
}

fn add_string_validation(out: &mut Map<String, Value>, schema: &Schema) {
    let Some(string) = &schema.string else {
        return;
    };
    if string.min_length > 0 {
        out.insert("minLength".to_string(), json!(string.min_length));
    }
    if let Some(max_length) = string.max_length {
        out.insert("maxLength".to_string(), json!(max_length));
    }
    if let Some(pattern) = &string.pattern {
        out.insert("pattern".to_string(), json!(pattern));
    }
}

fn add_number_validation(out: &mut Map<String, Value>, schema: &Schema) {
    let Some(number) = &schema.number else {
        return;
    };
    if let Some(minimum) = number.minimum {
        // Draft 7 exclusive bounds are numeric, not the Draft 4 boolean
        // companion form.
        if number.exclusive_minimum {
            out.insert("exclusiveMinimum".to_string(), json!(minimum));
        } else {
            out.insert("minimum".to_string(), json!(minimum));
        }
    }
    if let Some(maximum) = number.maximum {
        if number.exclusive_maximum {
            out.insert("exclusiveMaximum".to_string(), json!(maximum));
        } else {
            out.insert("maximum".to_string(), json!(maximum));
        }
    }
    if let Some(multiple_of) = number.multiple_of {
        out.insert("multipleOf".to_string(), json!(multiple_of));
    }
}

fn add_combinators(out: &mut Map<String, Value>, schema: &Schema) -> Result<()> {
    if !schema.one_of.is_empty() {
        out.insert(
            "oneOf".to_string(),
            Value::Array(lower_branches(&schema.one_of, "oneOf")?),
        );
    }
    if !schema.any_of.is_empty() {
        out.insert(
            "anyOf".to_string(),
            Value::Array(lower_branches(&schema.any_of, "anyOf")?),
        );
    }
    if !schema.all_of.is_empty() {
        out.insert(
            "allOf".to_string(),
            Value::Array(lower_branches(&schema.all_of, "allOf")?),
        );
    }
    if let Some(not) = &schema.not {
        let lowered = lower(not).map_err(|e| Error::schema(format!("not sub-schema: {e}")))?;
        out.insert("not".to_string(), Value::Object(lowered));
    }
    Ok(())
}

fn lower_branches(branches: &[Schema], keyword: &str) -> Result<Vec<Value>> {
    branches
        .iter()
        .enumerate()
        .map(|(i, branch)| {
            lower(branch)
                .map(Value::Object)
                .map_err(|e| Error::schema(format!("{keyword} sub-schema at index {i}: {e}")))
        })
        .collect()
}

fn add_array_validation(out: &mut Map<String, Value>, schema: &Schema) -> Result<()> {
    let Some(array) = &schema.array else {
        return Ok(());
    };
    if let Some(items) = &array.items {
        let lowered = lower(items).map_err(|e| Error::schema(format!("array items: {e}")))?;
        out.insert("items".to_string(), Value::Object(lowered));
    }
    if array.min_items > 0 {
        out.insert("minItems".to_string(), json!(array.min_items));
    }
    if let Some(max_items) = array.max_items {
        out.insert("maxItems".to_string(), json!(max_items));
    }
    if array.unique_items {
        out.insert("uniqueItems".to_string(), json!(true));
    }
    Ok(())
}

fn add_object_validation(out: &mut Map<String, Value>, schema: &Schema) -> Result<()> {
    let Some(object) = &schema.object else {
        return Ok(());
    };
    if !object.properties.is_empty() {
        let mut properties = Map::new();
        for (name, prop) in &object.properties {
            let lowered = lower(prop).map_err(|e| Error::schema(format!("property '{name}': {e}")))?;
            properties.insert(name.clone(), Value::Object(lowered));
        }
        out.insert("properties".to_string(), Value::Object(properties));
    }
    if !object.required.is_empty() {
        let required: Vec<Value> = object.required.iter().map(|name| json!(name)).collect();
        out.insert("required".to_string(), Value::Array(required));
    }
    if object.min_properties > 0 {
        out.insert("minProperties".to_string(), json!(object.min_properties));
    }
    if let Some(max_properties) = object.max_properties {
        out.insert("maxProperties".to_string(), json!(max_properties));
    }
    if object.disallow_additional_properties {
        out.insert("additionalProperties".to_string(), json!(false));
    } else if let Some(extra) = &object.additional_properties {
        let lowered =
            lower(extra).map_err(|e| Error::schema(format!("additionalProperties: {e}")))?;
        // An empty lowering means "any value allowed" and is emitted as `{}`.
        out.insert("additionalProperties".to_string(), Value::Object(lowered));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::normalize::normalize;
    use indexmap::IndexMap;

    fn ir(json: &str) -> Schema {
        normalize(&serde_json::from_str(json).unwrap()).unwrap()
    }

    fn body_arg(content: Vec<(&str, Schema)>) -> Arg {
        let mut content_types = IndexMap::new();
        for (ct, schema) in content {
            content_types.insert(ct.to_string(), schema);
        }
        Arg {
            name: "body".to_string(),
            source: ArgSource::Body,
            description: String::new(),
            required: true,
            deprecated: false,
            schema: None,
            content_types,
        }
    }

    fn query_arg(name: &str, schema: Schema) -> Arg {
        Arg {
            name: name.to_string(),
            source: ArgSource::Query,
            description: String::new(),
            required: false,
            deprecated: false,
            schema: Some(schema),
            content_types: IndexMap::new(),
        }
    }

    #[test]
    fn test_single_content_type_body_is_used_directly() {
        let todo = ir(r#"{
            "type": "object",
            "required": ["title"],
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "priority": { "type": "string", "enum": ["low", "medium", "high"] }
            }
        }"#);
        let rendered = input_schema(&[body_arg(vec![("application/json", todo)])]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed["type"], "object");
        assert_eq!(parsed["required"], json!(["body"]));
        let body = &parsed["properties"]["body"];
        assert!(body.get("oneOf").is_none());
        assert_eq!(body["type"], "object");
        assert_eq!(body["properties"]["title"]["minLength"], json!(1));
        assert_eq!(
            body["properties"]["priority"]["enum"],
            json!(["low", "medium", "high"])
        );
    }

    #[test]
    fn test_multi_content_type_body_composes_one_of() {
        let json_schema = ir(r#"{ "type": "object", "description": "json payload" }"#);
        let xml_schema = ir(r#"{ "type": "object", "title": "XmlPayload" }"#);
        let plain = ir(r#"{ "type": "object" }"#);
        let rendered = input_schema(&[body_arg(vec![
            ("application/json", json_schema),
            ("application/xml", xml_schema),
            ("text/plain", plain),
        ])])
        .unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();

        let branches = parsed["properties"]["body"]["oneOf"].as_array().unwrap();
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0]["description"], "[application/json] json payload");
        assert_eq!(branches[1]["title"], "[application/xml] XmlPayload");
        assert_eq!(branches[2]["title"], "Schema for text/plain");
    }

    #[test]
    fn test_deprecated_args_are_excluded() {
        let mut deprecated = query_arg("legacy", ir(r#"{ "type": "string" }"#));
        deprecated.deprecated = true;
        let kept = query_arg("status", ir(r#"{ "type": "string" }"#));

        let rendered = input_schema(&[deprecated, kept]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let properties = parsed["properties"].as_object().unwrap();
        assert!(!properties.contains_key("legacy"));
        assert!(properties.contains_key("status"));
    }

    #[test]
    fn test_required_closure_holds() {
        let mut required_arg = query_arg("status", ir(r#"{ "type": "string" }"#));
        required_arg.required = true;
        let optional = query_arg("limit", ir(r#"{ "type": "integer" }"#));

        let rendered = input_schema(&[required_arg, optional]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let properties = parsed["properties"].as_object().unwrap();
        for name in parsed["required"].as_array().unwrap() {
            assert!(properties.contains_key(name.as_str().unwrap()));
        }
    }

    #[test]
    fn test_empty_body_produces_no_property() {
        let rendered = input_schema(&[body_arg(vec![])]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed.get("properties").is_none());
        assert!(parsed.get("required").is_none());
    }

    #[test]
    fn test_arg_description_fills_missing_schema_description() {
        let mut arg = query_arg("status", ir(r#"{ "type": "string" }"#));
        arg.description = "Filter by status".to_string();
        let rendered = input_schema(&[arg]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["properties"]["status"]["description"], "Filter by status");

        // An existing schema description wins.
        let mut arg = query_arg("status", ir(r#"{ "type": "string", "description": "own" }"#));
        arg.description = "Filter by status".to_string();
        let rendered = input_schema(&[arg]).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["properties"]["status"]["description"], "own");
    }

    #[test]
    fn test_exclusive_bounds_use_draft7_numeric_form() {
        let schema = ir(r#"{
            "type": "integer",
            "minimum": 0,
            "maximum": 10,
            "exclusiveMaximum": true
        }"#);
        let lowered = lower(&schema).unwrap();
        assert_eq!(lowered.get("minimum"), Some(&json!(0.0)));
        assert_eq!(lowered.get("exclusiveMaximum"), Some(&json!(10.0)));
        assert!(!lowered.contains_key("maximum"));
    }

    #[test]
    fn test_example_becomes_single_element_examples_array() {
        let schema = ir(r#"{ "type": "string", "example": "buy milk" }"#);
        let lowered = lower(&schema).unwrap();
        assert_eq!(lowered.get("examples"), Some(&json!(["buy milk"])));
    }

    #[test]
    fn test_nullable_lowering_emits_type_array() {
        let schema = ir(r#"{ "type": "string", "nullable": true }"#);
        let lowered = lower(&schema).unwrap();
        assert_eq!(lowered.get("type"), Some(&json!(["string", "null"])));
    }

    #[test]
    fn test_disallowed_additional_properties_lower_to_false() {
        let schema = ir(r#"{ "type": "object", "additionalProperties": false }"#);
        let lowered = lower(&schema).unwrap();
        assert_eq!(lowered.get("additionalProperties"), Some(&json!(false)));
    }

    #[test]
    fn test_composition_keywords_keep_arity() {
        let schema = ir(r#"{
            "allOf": [{ "type": "object" }, { "type": "object" }],
            "not": { "type": "string" }
        }"#);
        let lowered = lower(&schema).unwrap();
        assert_eq!(lowered["allOf"].as_array().unwrap().len(), 2);
        assert!(lowered["not"].is_object());
    }

    #[test]
    fn test_empty_schema_lowers_to_empty_map() {
        let lowered = lower(&Schema::default()).unwrap();
        assert!(lowered.is_empty());
    }
}
