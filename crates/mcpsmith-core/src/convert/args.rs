//! Lifting of operation parameters and request bodies into [`Arg`]s.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Arg, ArgSource};
use crate::openapi::document::{Parameter, RequestBody};
use crate::schema::normalize;

/// Convert operation parameters into args, grouped by source in the order
/// path, query, header, cookie (input order within each group).
pub fn convert_parameters(parameters: &[Parameter]) -> Result<Vec<Arg>> {
    let mut path = Vec::new();
    let mut query = Vec::new();
    let mut header = Vec::new();
    let mut cookie = Vec::new();

    for parameter in parameters {
        let Some(location) = parameter.location else {
            debug!(name = %parameter.name, "skipping parameter without a location");
            continue;
        };
        // Parameters without a schema carry nothing a tool input could hold.
        let Some(schema) = &parameter.schema else {
            debug!(name = %parameter.name, "skipping parameter without a schema");
            continue;
        };

        let schema = normalize(schema)
            .map_err(|e| Error::spec(format!("parameter '{}': {e}", parameter.name)))?;

        let source = ArgSource::from(location);
        let arg = Arg {
            name: parameter.name.clone(),
            source,
            description: parameter.description.clone().unwrap_or_default(),
            required: parameter.required,
            deprecated: parameter.deprecated,
            schema: Some(schema),
            content_types: IndexMap::new(),
        };

        match source {
            ArgSource::Path => path.push(arg),
            ArgSource::Query => query.push(arg),
            ArgSource::Header => header.push(arg),
            ArgSource::Cookie => cookie.push(arg),
            ArgSource::Body => unreachable!("parameters never carry the body source"),
        }
    }

    let mut args = path;
    args.append(&mut query);
    args.append(&mut header);
    args.append(&mut cookie);
    Ok(args)
}

/// Convert a request body into the single `body` arg, or `None` when no
/// content type carries a usable schema.
pub fn convert_request_body(body: Option<&RequestBody>) -> Result<Option<Arg>> {
    let Some(body) = body else {
        return Ok(None);
    };

    let mut entries = Vec::new();
    for (content_type, media) in &body.content {
        let Some(schema) = &media.schema else {
            continue;
        };
        let schema = normalize(schema)
            .map_err(|e| Error::spec(format!("content type '{content_type}': {e}")))?;
        entries.push((content_type.clone(), schema));
    }
    if entries.is_empty() {
        return Ok(None);
    }

    // Sorted media types keep downstream `oneOf` composition deterministic.
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    let content_types: IndexMap<_, _> = entries.into_iter().collect();

    Ok(Some(Arg {
        name: "body".to_string(),
        source: ArgSource::Body,
        description: body.description.clone().unwrap_or_default(),
        required: body.required,
        deprecated: false,
        schema: None,
        content_types,
    }))
}
