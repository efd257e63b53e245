//! Request Translator Property Tests
//!
//! End-to-end checks of the translation rules through a store that records
//! every call it receives:
//! - pattern filters, sort specs and update maps built from query strings
//! - single vs bulk write paths
//! - count strictly before list, with the total in `X-total`
//! - key coercion per declared key kind

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};

use storegate::rest_api::{RequestContext, RequestTranslator, RestError, WriteMode};
use storegate::store::{
    FieldSet, MemoryStore, Page, PatternFilter, Projection, SortSpec, Store, StoreKey,
    StoreResult, UpdateMap,
};

// =============================================================================
// Recording Store
// =============================================================================

/// A call as seen by the store
#[derive(Debug, Clone, PartialEq)]
enum Call {
    InsertOne,
    InsertMany(usize),
    ReplaceOne,
    ReplaceMany(usize),
    UpdateMany(PatternFilter, UpdateMap),
    UpdateOne(String, UpdateMap),
    DeleteOne(String),
    DeleteMany(PatternFilter),
    Drop,
    FindOne(String),
    FindOneProjected(String, Projection),
    FindMany(PatternFilter, Page, SortSpec),
    FindManyProjected(PatternFilter, Projection, Page, SortSpec),
    Count(PatternFilter),
}

/// Memory store that logs every call before delegating
struct RecordingStore<K: StoreKey> {
    inner: MemoryStore<Value, K>,
    calls: Mutex<Vec<Call>>,
}

impl<K: StoreKey> RecordingStore<K> {
    fn new(fields: &[&str]) -> Self {
        Self {
            inner: MemoryStore::new("person", "id", FieldSet::new(fields.iter().copied())),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl<K: StoreKey> Store for RecordingStore<K> {
    type Entity = Value;
    type Key = K;

    fn fields(&self) -> &FieldSet {
        self.inner.fields()
    }

    fn entity_name(&self) -> &str {
        self.inner.entity_name()
    }

    async fn insert_one(&self, entity: Value) -> StoreResult<u64> {
        self.record(Call::InsertOne);
        self.inner.insert_one(entity).await
    }

    async fn insert_many(&self, entities: Vec<Value>) -> StoreResult<u64> {
        self.record(Call::InsertMany(entities.len()));
        self.inner.insert_many(entities).await
    }

    async fn replace_one(&self, entity: Value) -> StoreResult<u64> {
        self.record(Call::ReplaceOne);
        self.inner.replace_one(entity).await
    }

    async fn replace_many(&self, entities: Vec<Value>) -> StoreResult<u64> {
        self.record(Call::ReplaceMany(entities.len()));
        self.inner.replace_many(entities).await
    }

    async fn update_many(&self, filter: &PatternFilter, update: &UpdateMap) -> StoreResult<u64> {
        self.record(Call::UpdateMany(filter.clone(), update.clone()));
        self.inner.update_many(filter, update).await
    }

    async fn update_one(&self, key: &K, update: &UpdateMap) -> StoreResult<bool> {
        self.record(Call::UpdateOne(key.to_string(), update.clone()));
        self.inner.update_one(key, update).await
    }

    async fn delete_one(&self, key: &K) -> StoreResult<bool> {
        self.record(Call::DeleteOne(key.to_string()));
        self.inner.delete_one(key).await
    }

    async fn delete_many(&self, filter: &PatternFilter) -> StoreResult<u64> {
        self.record(Call::DeleteMany(filter.clone()));
        self.inner.delete_many(filter).await
    }

    async fn drop_all(&self) -> StoreResult<()> {
        self.record(Call::Drop);
        self.inner.drop_all().await
    }

    async fn find_one(&self, key: &K) -> StoreResult<Option<Value>> {
        self.record(Call::FindOne(key.to_string()));
        self.inner.find_one(key).await
    }

    async fn find_one_projected(
        &self,
        key: &K,
        projection: &Projection,
    ) -> StoreResult<Option<Value>> {
        self.record(Call::FindOneProjected(key.to_string(), projection.clone()));
        self.inner.find_one_projected(key, projection).await
    }

    async fn find_many(
        &self,
        filter: &PatternFilter,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Value>> {
        self.record(Call::FindMany(filter.clone(), page, sort.clone()));
        self.inner.find_many(filter, page, sort).await
    }

    async fn find_many_projected(
        &self,
        filter: &PatternFilter,
        projection: &Projection,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Value>> {
        self.record(Call::FindManyProjected(
            filter.clone(),
            projection.clone(),
            page,
            sort.clone(),
        ));
        self.inner
            .find_many_projected(filter, projection, page, sort)
            .await
    }

    async fn count(&self, filter: &PatternFilter) -> StoreResult<u64> {
        self.record(Call::Count(filter.clone()));
        self.inner.count(filter).await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn setup<K: StoreKey>() -> (Arc<RecordingStore<K>>, RequestTranslator<RecordingStore<K>>) {
    let store = Arc::new(RecordingStore::new(&["id", "name", "age", "a"]));
    let translator = RequestTranslator::new(Arc::clone(&store)).unwrap();
    (store, translator)
}

async fn seed(translator: &RequestTranslator<RecordingStore<i64>>, count: i64) {
    let people: Vec<Value> = (1..=count)
        .map(|i| json!({"id": i, "name": format!("p{:02}", i), "age": 30, "a": "1"}))
        .collect();
    translator.insert(people).await.unwrap();
}

fn ctx(params: &[(&str, &str)]) -> RequestContext {
    params
        .iter()
        .fold(RequestContext::new(), |ctx, (k, v)| ctx.with_param(*k, *v))
}

// =============================================================================
// Query String Parsing
// =============================================================================

/// `a=1,2,3` filters on exactly ["1","2","3"]; a trailing comma adds nothing.
#[tokio::test]
async fn test_pattern_values_split_on_commas() {
    let (store, translator) = setup::<i64>();

    translator.count(&ctx(&[("a", "1,2,3")])).await.unwrap();
    translator.count(&ctx(&[("a", "1,2,")])).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![
            Call::Count(PatternFilter::new().with("a", ["1", "2", "3"])),
            Call::Count(PatternFilter::new().with("a", ["1", "2"])),
        ]
    );
}

/// Unknown fields never reach the pattern filter.
#[tokio::test]
async fn test_pattern_filter_drops_unknown_fields() {
    let (store, translator) = setup::<i64>();

    translator
        .delete_by_pattern(&ctx(&[("name", "Bob"), ("color", "red")]))
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![Call::DeleteMany(PatternFilter::new().with("name", ["Bob"]))]
    );
}

/// `name:=Bob` updates only when `name` is a known field.
#[tokio::test]
async fn test_update_map_whitelist() {
    let (store, translator) = setup::<i64>();

    translator
        .update_by_pattern(&ctx(&[("age", "30"), ("name:", "Bob"), ("color:", "red")]))
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![Call::UpdateMany(
            PatternFilter::new().with("age", ["30"]),
            UpdateMap::new().with("name", "Bob"),
        )]
    );
}

/// `sort=-name,age` sorts name descending, then age ascending.
#[tokio::test]
async fn test_sort_spec_from_query() {
    let (store, translator) = setup::<i64>();

    translator
        .find_by_pattern(&ctx(&[("sort", "-name,age")]))
        .await
        .unwrap();

    let expected_sort = SortSpec::new().with("name", true).with("age", false);
    assert_eq!(
        store.calls()[1],
        Call::FindMany(PatternFilter::new(), Page::default(), expected_sort)
    );
}

// =============================================================================
// Insert / Replace
// =============================================================================

/// Zero entities is a 400 with "Entity expected" and no store call.
#[tokio::test]
async fn test_insert_without_entities() {
    let (store, translator) = setup::<i64>();

    let err = translator.insert(Vec::new()).await.unwrap_err();
    assert!(matches!(err, RestError::Validation(ref msg) if msg == "Entity expected"));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

/// One entity takes the single path, two or more the bulk path.
#[tokio::test]
async fn test_single_vs_bulk_paths() {
    let (store, translator) = setup::<i64>();

    translator.insert(vec![json!({"id": 1})]).await.unwrap();
    translator
        .insert(vec![json!({"id": 2}), json!({"id": 3})])
        .await
        .unwrap();
    translator
        .insert_or_replace(vec![json!({"id": 1})], WriteMode::Replace)
        .await
        .unwrap();
    let replaced = translator
        .replace(vec![json!({"id": 2}), json!({"id": 3}), json!({"id": 4})])
        .await
        .unwrap();

    assert_eq!(
        store.calls(),
        vec![
            Call::InsertOne,
            Call::InsertMany(2),
            Call::ReplaceOne,
            Call::ReplaceMany(3),
        ]
    );
    assert_eq!(replaced.status(), StatusCode::OK);
    assert_eq!(replaced.body_text(), Some("3"));
}

// =============================================================================
// Key Operations
// =============================================================================

/// deleteOne: 200 when the key existed, 404 with empty body when not.
#[tokio::test]
async fn test_delete_one_found_and_missing() {
    let (_store, translator) = setup::<i64>();
    seed(&translator, 1).await;

    let deleted = translator
        .delete_one(&RequestContext::new().with_id("1"))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(deleted.body().is_empty());

    let missing = translator
        .delete_one(&RequestContext::new().with_id("1"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.body().is_empty());
}

/// updateOne reports 404 for an absent key, 200 otherwise.
#[tokio::test]
async fn test_update_one_found_and_missing() {
    let (store, translator) = setup::<i64>();
    seed(&translator, 1).await;
    store.clear();

    let updated = translator
        .update_one(&RequestContext::new().with_id("1").with_param("name:", "Ann"))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert!(updated.body().is_empty());

    let missing = translator
        .update_one(&RequestContext::new().with_id("9").with_param("name:", "Ann"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    assert_eq!(
        store.calls()[0],
        Call::UpdateOne("1".to_string(), UpdateMap::new().with("name", "Ann"))
    );
}

/// findOne uses the projected lookup only when `include` is given.
#[tokio::test]
async fn test_find_one_projection() {
    let (store, translator) = setup::<i64>();
    seed(&translator, 1).await;
    store.clear();

    let full = translator
        .find_one(&RequestContext::new().with_id("1"))
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(full.body()).unwrap();
    assert_eq!(body["age"], 30);

    let projected = translator
        .find_one(&RequestContext::new().with_id("1").with_param("include", "name"))
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(projected.body()).unwrap();
    assert_eq!(body, json!({"name": "p01"}));

    let missing = translator
        .find_one(&RequestContext::new().with_id("2"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.body().is_empty());

    assert_eq!(
        store.calls()[..2],
        [
            Call::FindOne("1".to_string()),
            Call::FindOneProjected("1".to_string(), Projection::new(["name"])),
        ]
    );
}

/// Text keys pass through untouched, integer keys are parsed.
#[tokio::test]
async fn test_key_coercion_by_kind() {
    let (text_store, text) = setup::<String>();
    text.delete_one(&RequestContext::new().with_id("42"))
        .await
        .unwrap();
    assert_eq!(text_store.calls(), vec![Call::DeleteOne("42".to_string())]);

    let (int_store, int) = setup::<i64>();
    int.delete_one(&RequestContext::new().with_id("42"))
        .await
        .unwrap();
    assert_eq!(int_store.calls(), vec![Call::DeleteOne("42".to_string())]);

    let err = int
        .delete_one(&RequestContext::new().with_id("forty-two"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

/// A store with an uncoercible key type is refused up front.
#[test]
fn test_unsupported_key_type() {
    let store = Arc::new(RecordingStore::<uuid::Uuid>::new(&["id"]));
    let result = RequestTranslator::new(store);
    assert!(matches!(result, Err(RestError::UnsupportedKeyType(_))));
}

/// Key operations without an `id` never touch the store.
#[tokio::test]
async fn test_missing_id_is_rejected() {
    let (store, translator) = setup::<i64>();

    for result in [
        translator.find_one(&RequestContext::new()).await,
        translator.update_one(&RequestContext::new()).await,
        translator.delete_one(&RequestContext::new()).await,
    ] {
        assert!(matches!(result, Err(RestError::MissingParam(_))));
    }
    assert!(store.calls().is_empty());
}

// =============================================================================
// List / Count
// =============================================================================

/// 50 matches with max=10&offset=20: header says 50, body holds 10.
#[tokio::test]
async fn test_find_by_pattern_total_header() {
    let (store, translator) = setup::<i64>();
    seed(&translator, 50).await;
    store.clear();

    let response = translator
        .find_by_pattern(&ctx(&[("age", "30"), ("max", "10"), ("offset", "20")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.header("X-total"), Some("50"));

    let body: Vec<Value> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body.len(), 10);
    assert_eq!(body[0]["id"], 21);

    let filter = PatternFilter::new().with("age", ["30"]);
    assert_eq!(
        store.calls(),
        vec![
            Call::Count(filter.clone()),
            Call::FindMany(filter, Page::new(Some(10), Some(20)), SortSpec::new()),
        ]
    );
}

/// Projected listing still counts first.
#[tokio::test]
async fn test_find_by_pattern_projected() {
    let (store, translator) = setup::<i64>();
    seed(&translator, 3).await;
    store.clear();

    let response = translator
        .find_by_pattern(&ctx(&[("include", "name"), ("sort", "-name")]))
        .await
        .unwrap();

    let body: Vec<Value> = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body[0], json!({"name": "p03"}));
    assert_eq!(response.header("x-total"), Some("3"));
    assert!(matches!(store.calls()[0], Call::Count(_)));
    assert!(matches!(store.calls()[1], Call::FindManyProjected(..)));
}

/// Malformed pagination fails before any store call.
#[tokio::test]
async fn test_bad_pagination() {
    let (store, translator) = setup::<i64>();

    let err = translator
        .find_by_pattern(&ctx(&[("max", "ten")]))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}

/// count answers with the number as plain text.
#[tokio::test]
async fn test_count_plain_text() {
    let (_store, translator) = setup::<i64>();
    seed(&translator, 4).await;

    let response = translator.count(&ctx(&[("id", "1,2,9")])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), Some("2"));
}

/// deleteByPattern reports how many entities went away.
#[tokio::test]
async fn test_delete_by_pattern_count() {
    let (_store, translator) = setup::<i64>();
    seed(&translator, 4).await;

    let response = translator
        .delete_by_pattern(&ctx(&[("id", "1,3")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), Some("2"));
}
