//! # REST API HTTP Routes
//!
//! Axum router exposing one store through its request translator.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/` | find by pattern |
//! | POST | `/` | insert |
//! | PUT | `/` | replace |
//! | PATCH | `/` | update by pattern |
//! | DELETE | `/` | delete by pattern |
//! | GET | `/_count` | count |
//! | DELETE | `/_drop` | drop |
//! | GET | `/:id` | find one |
//! | PATCH | `/:id` | update one |
//! | DELETE | `/:id` | delete one |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::ACCEPT;
use axum::http::HeaderMap;
use axum::routing::{delete, get};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::store::Store;

use super::context::RequestContext;
use super::errors::{RestError, RestResult};
use super::format::OutputFormat;
use super::handler::RequestTranslator;
use super::response::ResponseDescriptor;

/// Shared state type
type TranslatorState<S> = State<Arc<RequestTranslator<S>>>;

type QueryPairs = Query<Vec<(String, String)>>;

type RouteResult = Result<ResponseDescriptor, RestError>;

/// Build the router for one store
pub fn store_routes<S: Store>(translator: RequestTranslator<S>) -> Router {
    Router::new()
        .route(
            "/",
            get(find_by_pattern_handler::<S>)
                .post(insert_handler::<S>)
                .put(replace_handler::<S>)
                .patch(update_by_pattern_handler::<S>)
                .delete(delete_by_pattern_handler::<S>),
        )
        .route("/_count", get(count_handler::<S>))
        .route("/_drop", delete(drop_handler::<S>))
        .route(
            "/:id",
            get(find_one_handler::<S>)
                .patch(update_one_handler::<S>)
                .delete(delete_one_handler::<S>),
        )
        .with_state(Arc::new(translator))
}

/// Request body holding one entity or an array of them
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Decode a request body into entities; a blank body holds none
pub fn decode_entities<T: DeserializeOwned>(body: &[u8]) -> RestResult<Vec<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    match serde_json::from_slice::<OneOrMany<T>>(body) {
        Ok(OneOrMany::Many(entities)) => Ok(entities),
        Ok(OneOrMany::One(entity)) => Ok(vec![entity]),
        Err(e) => Err(RestError::InvalidBody(e.to_string())),
    }
}

/// Negotiate the output format from the `Accept` header
fn negotiate(headers: &HeaderMap) -> RestResult<OutputFormat> {
    let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
    OutputFormat::negotiate(accept)
}

async fn insert_handler<S: Store>(State(translator): TranslatorState<S>, body: Bytes) -> RouteResult {
    let entities = decode_entities::<S::Entity>(&body)?;
    translator.insert(entities).await
}

async fn replace_handler<S: Store>(State(translator): TranslatorState<S>, body: Bytes) -> RouteResult {
    let entities = decode_entities::<S::Entity>(&body)?;
    translator.replace(entities).await
}

async fn update_by_pattern_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Query(query): QueryPairs,
) -> RouteResult {
    let ctx = RequestContext::new().with_query(query);
    translator.update_by_pattern(&ctx).await
}

async fn update_one_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Path(id): Path<String>,
    Query(query): QueryPairs,
) -> RouteResult {
    let ctx = RequestContext::new().with_id(id).with_query(query);
    translator.update_one(&ctx).await
}

async fn delete_one_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Path(id): Path<String>,
) -> RouteResult {
    let ctx = RequestContext::new().with_id(id);
    translator.delete_one(&ctx).await
}

async fn delete_by_pattern_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Query(query): QueryPairs,
) -> RouteResult {
    let ctx = RequestContext::new().with_query(query);
    translator.delete_by_pattern(&ctx).await
}

async fn drop_handler<S: Store>(State(translator): TranslatorState<S>) -> RouteResult {
    translator.drop_all(&RequestContext::new()).await
}

async fn find_one_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Path(id): Path<String>,
    Query(query): QueryPairs,
    headers: HeaderMap,
) -> RouteResult {
    let ctx = RequestContext::new()
        .with_id(id)
        .with_query(query)
        .with_format(negotiate(&headers)?);
    translator.find_one(&ctx).await
}

async fn find_by_pattern_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Query(query): QueryPairs,
    headers: HeaderMap,
) -> RouteResult {
    let ctx = RequestContext::new()
        .with_query(query)
        .with_format(negotiate(&headers)?);
    translator.find_by_pattern(&ctx).await
}

async fn count_handler<S: Store>(
    State(translator): TranslatorState<S>,
    Query(query): QueryPairs,
) -> RouteResult {
    let ctx = RequestContext::new().with_query(query);
    translator.count(&ctx).await
}
