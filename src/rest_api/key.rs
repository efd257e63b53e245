//! # Key Coercion
//!
//! Turns the textual `id` path parameter into a store's native key.

use crate::store::{Key, KeyKind, StoreKey};

use super::errors::{RestError, RestResult};

/// Coerce a raw path identifier into a key of the declared kind
///
/// Text keys pass through unchanged, integer keys are parsed strictly, and
/// every other kind fails with [`RestError::UnsupportedKeyType`].
pub fn coerce_key(kind: KeyKind, raw: &str) -> RestResult<Key> {
    match kind {
        KeyKind::Text => Ok(Key::Text(raw.to_string())),
        KeyKind::Integer => raw
            .parse::<i64>()
            .map(Key::Integer)
            .map_err(|_| RestError::InvalidKey {
                raw: raw.to_string(),
                kind,
            }),
        KeyKind::Other(_) => Err(RestError::UnsupportedKeyType(kind)),
    }
}

/// Coerce a raw path identifier straight into the native key type `K`
pub fn resolve_key<K: StoreKey>(raw: &str) -> RestResult<K> {
    let key = coerce_key(K::KIND, raw)?;
    K::from_key(key).ok_or(RestError::UnsupportedKeyType(K::KIND))
}
