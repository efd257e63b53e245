//! # Response Descriptors
//!
//! Status, body and headers produced for one request, independent of the
//! transport until converted into an axum response.

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use super::format::OutputFormat;

/// Header carrying the total match count of a list query
pub const TOTAL_HEADER: HeaderName = HeaderName::from_static("x-total");

const TEXT_MEDIA_TYPE: &str = "text/plain; charset=utf-8";

/// One response: status code, raw body and headers
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    status: StatusCode,
    body: Vec<u8>,
    headers: HeaderMap,
}

impl ResponseDescriptor {
    /// Status with an empty body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: Vec::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Plain text body
    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::empty(status)
            .with_body(text.into().into_bytes())
            .with_header(CONTENT_TYPE, HeaderValue::from_static(TEXT_MEDIA_TYPE))
    }

    /// Body already serialized in `format`
    pub fn encoded(status: StatusCode, format: OutputFormat, body: Vec<u8>) -> Self {
        Self::empty(status)
            .with_body(body)
            .with_header(CONTENT_TYPE, HeaderValue::from_static(format.media_type()))
    }

    fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, if it is
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for ResponseDescriptor {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
