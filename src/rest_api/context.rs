//! # Request Context
//!
//! Transport-independent description of one inbound request.

use super::errors::{RestError, RestResult};
use super::format::OutputFormat;

/// Name of the path parameter carrying the key
pub const ID_PARAM: &str = "id";

/// Path parameter, raw query parameters and negotiated output format
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    id: Option<String>,
    query: Vec<(String, String)>,
    format: OutputFormat,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace all query parameters
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Append one query parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The `id` path parameter, or [`RestError::MissingParam`]
    pub fn require_id(&self) -> RestResult<&str> {
        self.id()
            .ok_or_else(|| RestError::MissingParam(ID_PARAM.to_string()))
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}
