//! Handler-body preservation across regenerations.
//!
//! The previous output is parsed structurally; the body of the handler
//! function (matched by name and signature) and any user-added `use` items
//! are lifted out and spliced into the freshly rendered file. Everything
//! runs through `prettyplease`, the canonical formatter for emitted source.

use std::collections::BTreeMap;

use quote::ToTokens;

use crate::error::{Error, Result};

/// The handler signature the splice looks for, as token text with whitespace
/// removed.
const REQUEST_TYPE: &str = "CallToolRequestParam";
const RETURN_TYPE: &str = "Result<CallToolResult,ErrorData>";

/// Pieces of a previously generated file that survive regeneration.
#[derive(Debug, Default)]
pub struct PreservedParts {
    pub handler_body: Option<Box<syn::Block>>,
    pub imports: Vec<syn::ItemUse>,
}

/// Extract the preserved parts from a previous output file.
///
/// A file that no longer parses yields nothing; regeneration then falls back
/// to the default handler body.
pub fn extract(source: &str, handler_name: &str) -> PreservedParts {
    let Ok(file) = syn::parse_file(source) else {
        return PreservedParts::default();
    };

    let imports = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Use(import) => Some(import.clone()),
            _ => None,
        })
        .collect();

    let handler_body = file.items.iter().find_map(|item| match item {
        syn::Item::Fn(function) if is_expected_handler(function, handler_name) => {
            Some(function.block.clone())
        }
        _ => None,
    });

    PreservedParts {
        handler_body,
        imports,
    }
}

/// Merge a freshly rendered tool file with the preserved parts and format
/// the result.
pub fn render_tool_file(
    rendered: &str,
    handler_name: &str,
    required_imports: &[&str],
    preserved: &PreservedParts,
) -> Result<String> {
    let mut file = syn::parse_file(rendered)?;

    // Merge the minimum required imports with whatever the user added,
    // deduplicated by token text and sorted.
    let mut merged: BTreeMap<String, syn::ItemUse> = BTreeMap::new();
    for path in required_imports {
        let item: syn::ItemUse = syn::parse_str(&format!("use {path};"))?;
        merged.entry(import_key(&item)).or_insert(item);
    }
    for item in &preserved.imports {
        merged.entry(import_key(item)).or_insert_with(|| item.clone());
    }

    file.items.retain(|item| !matches!(item, syn::Item::Use(_)));
    let mut items: Vec<syn::Item> = merged.into_values().map(syn::Item::Use).collect();
    items.append(&mut file.items);
    file.items = items;

    if let Some(block) = &preserved.handler_body {
        let handler = file
            .items
            .iter_mut()
            .find_map(|item| match item {
                syn::Item::Fn(function) if is_expected_handler(function, handler_name) => {
                    Some(function)
                }
                _ => None,
            })
            .ok_or_else(|| {
                Error::emit(format!(
                    "rendered output lacks a handler function '{handler_name}'"
                ))
            })?;
        handler.block = block.clone();
    }

    Ok(prettyplease::unparse(&file))
}

/// Parse and canonically format a rendered file without preservation.
pub fn format_source(source: &str) -> Result<String> {
    let file = syn::parse_file(source)?;
    Ok(prettyplease::unparse(&file))
}

/// Match the handler by name, arity, request parameter type, and return
/// type. Everything else about the signature is the user's business.
fn is_expected_handler(function: &syn::ItemFn, handler_name: &str) -> bool {
    if function.sig.ident != handler_name {
        return false;
    }
    if function.sig.inputs.len() != 2 {
        return false;
    }
    let Some(syn::FnArg::Typed(request)) = function.sig.inputs.iter().nth(1) else {
        return false;
    };
    if type_text(&request.ty) != REQUEST_TYPE {
        return false;
    }
    match &function.sig.output {
        syn::ReturnType::Type(_, ty) => type_text(ty) == RETURN_TYPE,
        syn::ReturnType::Default => false,
    }
}

fn type_text(ty: &syn::Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

fn import_key(item: &syn::ItemUse) -> String {
    item.to_token_stream().to_string().replace(' ', "")
}
