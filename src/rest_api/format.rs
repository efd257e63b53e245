//! # Output Format Negotiation
//!
//! Picks the serialization format for entity and collection bodies from the
//! request's `Accept` header.

use serde::Serialize;

use super::errors::{RestError, RestResult};

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const NDJSON_MEDIA_TYPE: &str = "application/x-ndjson";

/// Serialization format for response bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Entities as JSON objects, collections as JSON arrays
    #[default]
    Json,

    /// One JSON document per line
    Ndjson,
}

impl OutputFormat {
    /// Media type written to `Content-Type`
    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => JSON_MEDIA_TYPE,
            OutputFormat::Ndjson => NDJSON_MEDIA_TYPE,
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            JSON_MEDIA_TYPE | "application/*" | "*/*" => Some(OutputFormat::Json),
            NDJSON_MEDIA_TYPE => Some(OutputFormat::Ndjson),
            _ => None,
        }
    }

    /// Negotiate from an `Accept` header value
    ///
    /// A missing or empty header means JSON. Quality values are honoured;
    /// ties keep header order, and `q=0` excludes a type.
    pub fn negotiate(accept: Option<&str>) -> RestResult<Self> {
        let accept = match accept.map(str::trim) {
            None | Some("") => return Ok(OutputFormat::default()),
            Some(accept) => accept,
        };

        let mut best: Option<(f32, OutputFormat)> = None;
        for range in accept.split(',') {
            let mut parts = range.split(';').map(str::trim);
            let media_type = parts.next().unwrap_or_default().to_ascii_lowercase();
            let quality = parts
                .filter_map(|p| p.strip_prefix("q="))
                .filter_map(|q| q.parse::<f32>().ok())
                .next()
                .unwrap_or(1.0);

            if quality <= 0.0 {
                continue;
            }
            if let Some(format) = Self::from_media_type(&media_type) {
                if best.map_or(true, |(q, _)| quality > q) {
                    best = Some((quality, format));
                }
            }
        }

        best.map(|(_, format)| format)
            .ok_or_else(|| RestError::NotAcceptable(accept.to_string()))
    }

    /// Serialize a single entity
    pub fn encode_one<T: Serialize>(&self, entity: &T) -> RestResult<Vec<u8>> {
        let mut body = serde_json::to_vec(entity)?;
        if *self == OutputFormat::Ndjson {
            body.push(b'\n');
        }
        Ok(body)
    }

    /// Serialize a collection of entities
    pub fn encode_many<T: Serialize>(&self, entities: &[T]) -> RestResult<Vec<u8>> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_vec(entities)?),
            OutputFormat::Ndjson => {
                let mut body = Vec::new();
                for entity in entities {
                    serde_json::to_writer(&mut body, entity)?;
                    body.push(b'\n');
                }
                Ok(body)
            }
        }
    }
}
