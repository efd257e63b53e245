//! # Request Translator
//!
//! Translates REST requests into calls against a [`Store`] and maps the
//! outcomes back to response descriptors.

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use tracing::{debug, info, warn};

use crate::store::{Store, StoreError};

use super::context::RequestContext;
use super::errors::{RestError, RestResult};
use super::key::resolve_key;
use super::parser::ClassifiedParams;
use super::response::{ResponseDescriptor, TOTAL_HEADER};

/// Message for a body that decoded to no entities
pub const ENTITY_EXPECTED: &str = "Entity expected";

/// Confirmation body for a drop
pub const DROP_MESSAGE: &str = "All entities dropped";

/// How body entities are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Replace,
}

/// Translator bound to one store
pub struct RequestTranslator<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for RequestTranslator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> RequestTranslator<S> {
    /// Bind a translator to a store
    ///
    /// Fails with [`RestError::UnsupportedKeyType`] when the store's key kind
    /// has no coercion rule, so no request ever reaches such a store.
    pub fn new(store: Arc<S>) -> RestResult<Self> {
        let kind = store.key_kind();
        if !kind.is_coercible() {
            return Err(RestError::UnsupportedKeyType(kind));
        }

        info!(
            entity = store.entity_name(),
            key_kind = %kind,
            fields = store.fields().len(),
            "store registered"
        );
        Ok(Self { store })
    }

    fn classify<'a>(&self, ctx: &'a RequestContext) -> ClassifiedParams<'a> {
        let classified = ClassifiedParams::classify(ctx.query(), self.store.fields());
        if !classified.ignored().is_empty() {
            debug!(
                entity = self.store.entity_name(),
                ignored = ?classified.ignored(),
                "dropping unrecognized query parameters"
            );
        }
        classified
    }

    fn key(&self, ctx: &RequestContext) -> RestResult<S::Key> {
        resolve_key::<S::Key>(ctx.require_id()?)
    }

    fn downstream(&self, operation: &'static str, err: StoreError) -> RestError {
        warn!(
            entity = self.store.entity_name(),
            operation,
            error = %err,
            "store operation failed"
        );
        RestError::Store(err)
    }

    /// Insert decoded body entities
    pub async fn insert(&self, entities: Vec<S::Entity>) -> RestResult<ResponseDescriptor> {
        self.insert_or_replace(entities, WriteMode::Insert).await
    }

    /// Replace decoded body entities
    pub async fn replace(&self, entities: Vec<S::Entity>) -> RestResult<ResponseDescriptor> {
        self.insert_or_replace(entities, WriteMode::Replace).await
    }

    /// Write body entities: none is a validation error, one takes the
    /// single-entity path, more take the bulk path
    pub async fn insert_or_replace(
        &self,
        mut entities: Vec<S::Entity>,
        mode: WriteMode,
    ) -> RestResult<ResponseDescriptor> {
        let written = match entities.pop() {
            None => return Err(RestError::Validation(ENTITY_EXPECTED.to_string())),
            Some(entity) if entities.is_empty() => {
                debug!(entity = self.store.entity_name(), ?mode, "single write");
                let written = match mode {
                    WriteMode::Insert => self.store.insert_one(entity).await,
                    WriteMode::Replace => self.store.replace_one(entity).await,
                };
                written.map_err(|e| self.downstream("write_one", e))?
            }
            Some(entity) => {
                entities.push(entity);
                debug!(
                    entity = self.store.entity_name(),
                    ?mode,
                    count = entities.len(),
                    "bulk write"
                );
                let written = match mode {
                    WriteMode::Insert => self.store.insert_many(entities).await,
                    WriteMode::Replace => self.store.replace_many(entities).await,
                };
                written.map_err(|e| self.downstream("write_many", e))?
            }
        };

        let status = match mode {
            WriteMode::Insert => StatusCode::CREATED,
            WriteMode::Replace => StatusCode::OK,
        };
        Ok(ResponseDescriptor::text(status, written.to_string()))
    }

    /// Set update fields on every entity matching the pattern
    pub async fn update_by_pattern(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let params = self.classify(ctx);
        let filter = params.pattern_filter();
        let update = params.update_map();

        let matched = self
            .store
            .update_many(&filter, &update)
            .await
            .map_err(|e| self.downstream("update_many", e))?;
        debug!(entity = self.store.entity_name(), matched, "updated by pattern");

        Ok(ResponseDescriptor::empty(StatusCode::OK))
    }

    /// Set update fields on the entity named by `id`
    pub async fn update_one(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let key = self.key(ctx)?;
        let update = self.classify(ctx).update_map();

        let matched = self
            .store
            .update_one(&key, &update)
            .await
            .map_err(|e| self.downstream("update_one", e))?;

        Ok(ResponseDescriptor::empty(found_status(matched)))
    }

    /// Delete the entity named by `id`
    pub async fn delete_one(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let key = self.key(ctx)?;

        let deleted = self
            .store
            .delete_one(&key)
            .await
            .map_err(|e| self.downstream("delete_one", e))?;

        Ok(ResponseDescriptor::empty(found_status(deleted)))
    }

    /// Delete every entity matching the pattern; the body is the count
    pub async fn delete_by_pattern(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let filter = self.classify(ctx).pattern_filter();

        let deleted = self
            .store
            .delete_many(&filter)
            .await
            .map_err(|e| self.downstream("delete_many", e))?;

        Ok(ResponseDescriptor::text(StatusCode::OK, deleted.to_string()))
    }

    /// Remove every entity
    pub async fn drop_all(&self, _ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        self.store
            .drop_all()
            .await
            .map_err(|e| self.downstream("drop_all", e))?;
        info!(entity = self.store.entity_name(), "store dropped");

        Ok(ResponseDescriptor::text(StatusCode::OK, DROP_MESSAGE))
    }

    /// Fetch the entity named by `id`, projected if `include` is given
    pub async fn find_one(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let projection = self.classify(ctx).projection();
        let key = self.key(ctx)?;
        let format = ctx.format();

        let body = if projection.is_empty() {
            self.store
                .find_one(&key)
                .await
                .map_err(|e| self.downstream("find_one", e))?
                .map(|entity| format.encode_one(&entity))
                .transpose()?
        } else {
            self.store
                .find_one_projected(&key, &projection)
                .await
                .map_err(|e| self.downstream("find_one_projected", e))?
                .map(|doc| format.encode_one(&doc))
                .transpose()?
        };

        Ok(match body {
            Some(body) => ResponseDescriptor::encoded(StatusCode::OK, format, body),
            None => ResponseDescriptor::empty(StatusCode::NOT_FOUND),
        })
    }

    /// List entities matching the pattern
    ///
    /// The unpaginated match count is fetched first and reported in the
    /// `X-total` header; the list query only starts once it has completed.
    pub async fn find_by_pattern(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let params = self.classify(ctx);
        let projection = params.projection();
        let filter = params.pattern_filter();
        let page = params.page()?;
        let sort = params.sort_spec();
        let format = ctx.format();

        let total = self
            .store
            .count(&filter)
            .await
            .map_err(|e| self.downstream("count", e))?;

        let body = if projection.is_empty() {
            let entities = self
                .store
                .find_many(&filter, page, &sort)
                .await
                .map_err(|e| self.downstream("find_many", e))?;
            format.encode_many(&entities)?
        } else {
            let docs = self
                .store
                .find_many_projected(&filter, &projection, page, &sort)
                .await
                .map_err(|e| self.downstream("find_many_projected", e))?;
            format.encode_many(&docs)?
        };
        debug!(entity = self.store.entity_name(), total, ?page, "listed by pattern");

        Ok(ResponseDescriptor::encoded(StatusCode::OK, format, body)
            .with_header(TOTAL_HEADER, HeaderValue::from(total)))
    }

    /// Count entities matching the pattern
    pub async fn count(&self, ctx: &RequestContext) -> RestResult<ResponseDescriptor> {
        let filter = self.classify(ctx).pattern_filter();

        let total = self
            .store
            .count(&filter)
            .await
            .map_err(|e| self.downstream("count", e))?;

        Ok(ResponseDescriptor::text(StatusCode::OK, total.to_string()))
    }
}

fn found_status(found: bool) -> StatusCode {
    if found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FieldSet, MemoryStore};
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn create_translator() -> RequestTranslator<MemoryStore<Value, i64>> {
        let store = MemoryStore::new("person", "id", FieldSet::new(["id", "name", "age"]));
        RequestTranslator::new(Arc::new(store)).unwrap()
    }

    #[test]
    fn test_unsupported_key_rejected_at_registration() {
        let store: MemoryStore<Value, Uuid> = MemoryStore::new("doc", "id", FieldSet::new(["id"]));
        let result = RequestTranslator::new(Arc::new(store));
        assert!(matches!(result, Err(RestError::UnsupportedKeyType(_))));
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let translator = create_translator();
        let created = translator
            .insert(vec![json!({"id": 1, "name": "Ann", "age": 30})])
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(created.body_text(), Some("1"));

        let ctx = RequestContext::new().with_id("1");
        let found = translator.find_one(&ctx).await.unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(found.body()).unwrap();
        assert_eq!(body["name"], "Ann");
    }

    #[tokio::test]
    async fn test_missing_id() {
        let translator = create_translator();
        let result = translator.delete_one(&RequestContext::new()).await;
        assert!(matches!(result, Err(RestError::MissingParam(_))));
    }

    #[tokio::test]
    async fn test_invalid_integer_id() {
        let translator = create_translator();
        let ctx = RequestContext::new().with_id("abc");
        let result = translator.find_one(&ctx).await;
        assert!(matches!(result, Err(RestError::InvalidKey { .. })));
    }

    #[tokio::test]
    async fn test_drop() {
        let translator = create_translator();
        translator
            .insert(vec![json!({"id": 1}), json!({"id": 2})])
            .await
            .unwrap();

        let dropped = translator.drop_all(&RequestContext::new()).await.unwrap();
        assert_eq!(dropped.body_text(), Some(DROP_MESSAGE));

        let count = translator.count(&RequestContext::new()).await.unwrap();
        assert_eq!(count.body_text(), Some("0"));
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let translator = create_translator();
        translator.insert(vec![json!({"id": 1})]).await.unwrap();

        let err = translator.insert(vec![json!({"id": 1})]).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
