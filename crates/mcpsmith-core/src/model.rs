//! The tool model the emitters consume.
//!
//! A [`McpConfig`] is built once per input specification and is read-only
//! afterwards: it owns its [`Tool`]s, each tool owns its [`Arg`]s, schemas,
//! and response templates, and the emitters only borrow.

use std::fmt;

use indexmap::IndexMap;

use crate::openapi::document::ParamLocation;
use crate::schema::ir::Schema;

/// Where a tool input slot comes from in the upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSource {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl ArgSource {
    /// Returns the OpenAPI-style location name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ArgSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ParamLocation> for ArgSource {
    fn from(location: ParamLocation) -> Self {
        match location {
            ParamLocation::Path => Self::Path,
            ParamLocation::Query => Self::Query,
            ParamLocation::Header => Self::Header,
            ParamLocation::Cookie => Self::Cookie,
        }
    }
}

/// One input slot of a tool.
///
/// Non-body args carry a single `schema`; the body arg instead carries one
/// schema per usable media type in `content_types` (sorted by media type so
/// every consumer iterates deterministically).
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: String,
    pub source: ArgSource,
    pub description: String,
    pub required: bool,
    pub deprecated: bool,
    pub schema: Option<Schema>,
    pub content_types: IndexMap<String, Schema>,
}

/// A statically-known request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Static facts about how an operation is invoked upstream.
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    pub url: String,
    pub method: String,
    pub headers: Vec<Header>,
}

/// Markdown documentation of one (status code, content type) response pair.
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    /// Numeric status code; 0 for non-numeric codes such as `default`
    pub status_code: u16,
    pub content_type: String,
    /// Markdown describing the response structure
    pub prepend_body: String,
    /// Single uppercase letter disambiguating templates within a tool
    pub suffix: char,
}

/// One MCP tool, corresponding to one API operation.
#[derive(Debug, Clone)]
pub struct Tool {
    /// The operation identifier, used verbatim as the tool name
    pub name: String,
    pub description: String,
    pub args: Vec<Arg>,
    pub request_template: RequestTemplate,
    pub response_templates: Vec<ResponseTemplate>,
    /// The emitted JSON Schema input document, pretty-printed
    pub raw_input_schema: String,
}

/// The ordered set of tools generated from one specification.
#[derive(Debug, Clone)]
pub struct McpConfig {
    pub server_name: String,
    pub server_version: String,
    pub tools: Vec<Tool>,
}
