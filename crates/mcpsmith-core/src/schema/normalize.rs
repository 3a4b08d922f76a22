//! Normalization of resolved OpenAPI schemas into the IR.
//!
//! The input is reference-free (the parser adapter inlined everything), so
//! normalization is a straight recursive lowering: copy the leaf metadata,
//! fold `nullable` into the type list, attach the type-specific validation
//! records, and recurse through composition.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::openapi::document::{self, AdditionalProperties};
use crate::schema::ir::{
    ArrayValidation, BaseType, NumberValidation, ObjectValidation, Schema, StringValidation,
};

/// Lower a resolved document schema into an IR [`Schema`].
pub fn normalize(source: &document::Schema) -> Result<Schema> {
    let mut result = Schema {
        title: non_empty(&source.title),
        description: non_empty(&source.description),
        format: non_empty(&source.format),
        default: source.default.clone(),
        example: source.example.clone(),
        enum_values: source.enum_values.clone().unwrap_or_default(),
        read_only: source.read_only,
        write_only: source.write_only,
        ..Default::default()
    };

    result.types = base_types(source)?;
    if source.nullable {
        // A nullable marker needs a base type to attach to.
        if result.types.is_empty() {
            result.types.push(BaseType::String);
        }
        if !result.types.contains(&BaseType::Null) {
            result.types.push(BaseType::Null);
        }
    }

    if result.has_type(BaseType::String) {
        result.string = Some(string_validation(source));
    }
    if result.has_type(BaseType::Number) || result.has_type(BaseType::Integer) {
        result.number = Some(number_validation(source));
    }
    if result.has_type(BaseType::Array) {
        result.array = Some(array_validation(source)?);
    }
    if result.has_type(BaseType::Object) {
        result.object = Some(object_validation(source)?);
    }

    if let Some(branches) = &source.one_of {
        result.one_of = normalize_branches(branches, "oneOf")?;
    }
    if let Some(branches) = &source.any_of {
        result.any_of = normalize_branches(branches, "anyOf")?;
    }
    if let Some(branches) = &source.all_of {
        result.all_of = normalize_branches(branches, "allOf")?;
    }
    if let Some(not) = &source.not {
        let not = normalize(not).map_err(|e| Error::spec(format!("not sub-schema: {e}")))?;
        result.not = Some(Box::new(not));
    }

    Ok(result)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

fn base_types(source: &document::Schema) -> Result<Vec<BaseType>> {
    let Some(field) = &source.schema_type else {
        return Ok(Vec::new());
    };
    field
        .names()
        .into_iter()
        .map(|name| {
            BaseType::from_name(name)
                .ok_or_else(|| Error::spec(format!("unknown schema type '{name}'")))
        })
        .collect()
}

fn string_validation(source: &document::Schema) -> StringValidation {
    StringValidation {
        min_length: source.min_length.unwrap_or(0),
        max_length: source.max_length,
        pattern: non_empty(&source.pattern),
    }
}

fn number_validation(source: &document::Schema) -> NumberValidation {
    NumberValidation {
        minimum: source.minimum,
        maximum: source.maximum,
        multiple_of: source.multiple_of,
        exclusive_minimum: source.exclusive_minimum,
        exclusive_maximum: source.exclusive_maximum,
    }
}

fn array_validation(source: &document::Schema) -> Result<ArrayValidation> {
    let items = match &source.items {
        Some(items) => {
            let items = normalize(items).map_err(|e| Error::spec(format!("array items: {e}")))?;
            Some(Box::new(items))
        }
        None => None,
    };
    Ok(ArrayValidation {
        items,
        min_items: source.min_items.unwrap_or(0),
        max_items: source.max_items,
        unique_items: source.unique_items,
    })
}

fn object_validation(source: &document::Schema) -> Result<ObjectValidation> {
    let mut result = ObjectValidation {
        required: source.required.clone().unwrap_or_default(),
        min_properties: source.min_properties.unwrap_or(0),
        max_properties: source.max_properties,
        ..Default::default()
    };

    if let Some(properties) = &source.properties {
        let mut out = IndexMap::new();
        for (name, prop) in properties {
            // An empty `{}` property value lowers to the empty schema, never
            // to absence.
            let prop =
                normalize(prop).map_err(|e| Error::spec(format!("property '{name}': {e}")))?;
            out.insert(name.clone(), prop);
        }
        result.properties = out;
    }

    match &source.additional_properties {
        Some(AdditionalProperties::Bool(false)) => {
            result.disallow_additional_properties = true;
        }
        Some(AdditionalProperties::Bool(true)) => {
            result.additional_properties = Some(Box::new(Schema::default()));
        }
        Some(AdditionalProperties::Schema(extra)) => {
            let extra = normalize(extra)
                .map_err(|e| Error::spec(format!("additionalProperties: {e}")))?;
            result.additional_properties = Some(Box::new(extra));
        }
        None => {}
    }

    Ok(result)
}

fn normalize_branches(branches: &[document::Schema], keyword: &str) -> Result<Vec<Schema>> {
    branches
        .iter()
        .enumerate()
        .map(|(i, branch)| {
            normalize(branch)
                .map_err(|e| Error::spec(format!("{keyword} sub-schema at index {i}: {e}")))
        })
        .collect()
}
