//! # Store Contract
//!
//! The abstract asynchronous keyed collection the request translator
//! drives, plus an in-memory reference implementation.
//!
//! A store owns its metadata (field set, declared key kind, entity name);
//! the translator only reads it.

pub mod errors;
pub mod key;
pub mod memory;
pub mod query;

pub use errors::{StoreError, StoreResult};
pub use key::{Key, KeyKind, StoreKey};
pub use memory::MemoryStore;
pub use query::{FieldSet, Page, PatternFilter, Projection, SortField, SortSpec, UpdateMap};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Asynchronous keyed collection of entities
///
/// | Method | Result |
/// |--------|--------|
/// | [`insert_one`](Store::insert_one) / [`insert_many`](Store::insert_many) | entities written |
/// | [`replace_one`](Store::replace_one) / [`replace_many`](Store::replace_many) | entities written |
/// | [`update_many`](Store::update_many) | entities matched |
/// | [`update_one`](Store::update_one) | whether the key matched |
/// | [`delete_one`](Store::delete_one) | whether the key existed |
/// | [`delete_many`](Store::delete_many) | entities deleted |
/// | [`drop_all`](Store::drop_all) | - |
/// | [`find_one`](Store::find_one) / [`find_many`](Store::find_many) | entities |
/// | [`count`](Store::count) | entities matched |
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Entity type held by the store
    type Entity: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Native key type
    type Key: StoreKey;

    /// Field names honored in patterns and updates
    fn fields(&self) -> &FieldSet;

    /// Name of the entity type, for logs and diagnostics
    fn entity_name(&self) -> &str;

    /// Declared key kind
    fn key_kind(&self) -> KeyKind {
        <Self::Key as StoreKey>::KIND
    }

    async fn insert_one(&self, entity: Self::Entity) -> StoreResult<u64>;

    async fn insert_many(&self, entities: Vec<Self::Entity>) -> StoreResult<u64>;

    async fn replace_one(&self, entity: Self::Entity) -> StoreResult<u64>;

    async fn replace_many(&self, entities: Vec<Self::Entity>) -> StoreResult<u64>;

    /// Apply `update` to every entity matching `filter`
    async fn update_many(&self, filter: &PatternFilter, update: &UpdateMap) -> StoreResult<u64>;

    /// Apply `update` to one entity; absent keys are a no-op returning `false`
    async fn update_one(&self, key: &Self::Key, update: &UpdateMap) -> StoreResult<bool>;

    async fn delete_one(&self, key: &Self::Key) -> StoreResult<bool>;

    async fn delete_many(&self, filter: &PatternFilter) -> StoreResult<u64>;

    /// Remove every entity
    async fn drop_all(&self) -> StoreResult<()>;

    async fn find_one(&self, key: &Self::Key) -> StoreResult<Option<Self::Entity>>;

    /// Find one entity, returning only the projected fields
    async fn find_one_projected(
        &self,
        key: &Self::Key,
        projection: &Projection,
    ) -> StoreResult<Option<Value>>;

    async fn find_many(
        &self,
        filter: &PatternFilter,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Self::Entity>>;

    async fn find_many_projected(
        &self,
        filter: &PatternFilter,
        projection: &Projection,
        page: Page,
        sort: &SortSpec,
    ) -> StoreResult<Vec<Value>>;

    /// Count entities matching `filter`, ignoring pagination
    async fn count(&self, filter: &PatternFilter) -> StoreResult<u64>;
}
