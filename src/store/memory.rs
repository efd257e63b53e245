//! # In-Memory Store
//!
//! Reference [`Store`] over JSON documents held in a sorted map. Used by the
//! demo server and the test suites.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};

use super::errors::{StoreError, StoreResult};
use super::key::StoreKey;
use super::query::{FieldSet, Page, PatternFilter, Projection, SortSpec, UpdateMap};
use super::Store;

/// In-memory store keyed by one field of each entity
pub struct MemoryStore<T, K> {
    /// Entity name reported to the translator
    name: String,

    /// Field holding each entity's key
    key_field: String,

    fields: FieldSet,

    /// Documents by key
    documents: RwLock<BTreeMap<K, Value>>,

    _entity: PhantomData<fn() -> T>,
}

impl<T, K> MemoryStore<T, K>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    K: StoreKey,
{
    /// Create an empty store
    pub fn new(name: impl Into<String>, key_field: impl Into<String>, fields: FieldSet) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into(),
            fields,
            documents: RwLock::new(BTreeMap::new()),
            _entity: PhantomData,
        }
    }

    /// Number of stored entities
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<K, Value>>> {
        self.documents
            .read()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<K, Value>>> {
        self.documents
            .write()
            .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))
    }

    /// Encode an entity and extract its key
    fn encode(&self, entity: &T) -> StoreResult<(K, Value)> {
        let doc = serde_json::to_value(entity)?;
        let key = doc
            .get(&self.key_field)
            .cloned()
            .and_then(|v| serde_json::from_value::<K>(v).ok())
            .ok_or_else(|| StoreError::MissingKey(self.key_field.clone()))?;
        Ok((key, doc))
    }

    fn decode(doc: &Value) -> StoreResult<T> {
        Ok(serde_json::from_value(doc.clone())?)
    }

    /// Compute the updated form of a document without committing it
    fn apply_update(&self, doc: &Value, update: &UpdateMap) -> StoreResult<Value> {
        let mut updated = doc.clone();
        let obj = updated
            .as_object_mut()
            .ok_or_else(|| StoreError::Rejected("Entity is not an object".to_string()))?;

        for (field, literal) in update.iter() {
            if field == self.key_field {
                return Err(StoreError::Rejected(format!(
                    "Key field '{}' is immutable",
                    field
                )));
            }
            let coerced = coerce_literal(field, obj.get(field), literal)?;
            obj.insert(field.to_string(), coerced);
        }

        // The result must still be a valid entity
        Self::decode(&updated).map_err(|e| StoreError::Rejected(e.to_string()))?;
        Ok(updated)
    }

    /// Matching documents, sorted and paginated
    fn select(
        &self,
        filter: &PatternFilter,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Value>> {
        let documents = self.read()?;
        let mut matched: Vec<Value> = documents
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        drop(documents);

        if !sort.is_empty() {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(page.apply(matched))
    }
}

/// Convert a raw literal to the JSON type of the value it replaces
fn coerce_literal(field: &str, existing: Option<&Value>, literal: &str) -> StoreResult<Value> {
    let mismatch = |expected: &str| {
        StoreError::Rejected(format!(
            "Value '{}' for field '{}' is not a {}",
            literal, field, expected
        ))
    };

    match existing {
        Some(Value::Number(_)) => {
            if let Ok(n) = literal.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            literal
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| mismatch("number"))
        }
        Some(Value::Bool(_)) => literal
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| mismatch("boolean")),
        _ => Ok(Value::String(literal.to_string())),
    }
}

#[async_trait]
impl<T, K> Store for MemoryStore<T, K>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
    K: StoreKey,
{
    type Entity = T;
    type Key = K;

    fn fields(&self) -> &FieldSet {
        &self.fields
    }

    fn entity_name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, entity: T) -> StoreResult<u64> {
        self.insert_many(vec![entity]).await
    }

    async fn insert_many(&self, entities: Vec<T>) -> StoreResult<u64> {
        let encoded = entities
            .iter()
            .map(|e| self.encode(e))
            .collect::<StoreResult<Vec<_>>>()?;

        let mut documents = self.write()?;
        let mut batch = BTreeMap::new();
        for (key, doc) in encoded {
            if documents.contains_key(&key) || batch.contains_key(&key) {
                return Err(StoreError::DuplicateKey(key.to_string()));
            }
            batch.insert(key, doc);
        }

        let written = batch.len() as u64;
        documents.extend(batch);
        Ok(written)
    }

    async fn replace_one(&self, entity: T) -> StoreResult<u64> {
        self.replace_many(vec![entity]).await
    }

    async fn replace_many(&self, entities: Vec<T>) -> StoreResult<u64> {
        let encoded = entities
            .iter()
            .map(|e| self.encode(e))
            .collect::<StoreResult<Vec<_>>>()?;

        let written = encoded.len() as u64;
        self.write()?.extend(encoded);
        Ok(written)
    }

    async fn update_many(&self, filter: &PatternFilter, update: &UpdateMap) -> StoreResult<u64> {
        let mut documents = self.write()?;

        let mut updated = Vec::new();
        for (key, doc) in documents.iter().filter(|(_, doc)| filter.matches(doc)) {
            updated.push((key.clone(), self.apply_update(doc, update)?));
        }

        let matched = updated.len() as u64;
        documents.extend(updated);
        Ok(matched)
    }

    async fn update_one(&self, key: &K, update: &UpdateMap) -> StoreResult<bool> {
        let mut documents = self.write()?;

        let updated = match documents.get(key) {
            Some(doc) => self.apply_update(doc, update)?,
            None => return Ok(false),
        };
        documents.insert(key.clone(), updated);
        Ok(true)
    }

    async fn delete_one(&self, key: &K) -> StoreResult<bool> {
        Ok(self.write()?.remove(key).is_some())
    }

    async fn delete_many(&self, filter: &PatternFilter) -> StoreResult<u64> {
        let mut documents = self.write()?;
        let before = documents.len();
        documents.retain(|_, doc| !filter.matches(doc));
        Ok((before - documents.len()) as u64)
    }

    async fn drop_all(&self) -> StoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    async fn find_one(&self, key: &K) -> StoreResult<Option<T>> {
        self.read()?.get(key).map(Self::decode).transpose()
    }

    async fn find_one_projected(
        &self,
        key: &K,
        projection: &Projection,
    ) -> StoreResult<Option<Value>> {
        Ok(self
            .read()?
            .get(key)
            .map(|doc| projection.apply(doc.clone())))
    }

    async fn find_many(
        &self,
        filter: &PatternFilter,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<T>> {
        self.select(filter, page, sort)?
            .iter()
            .map(Self::decode)
            .collect()
    }

    async fn find_many_projected(
        &self,
        filter: &PatternFilter,
        projection: &Projection,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Value>> {
        Ok(self
            .select(filter, page, sort)?
            .into_iter()
            .map(|doc| projection.apply(doc))
            .collect())
    }

    async fn count(&self, filter: &PatternFilter) -> StoreResult<u64> {
        Ok(self
            .read()?
            .values()
            .filter(|doc| filter.matches(doc))
            .count() as u64)
    }
}
