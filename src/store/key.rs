//! # Store Keys
//!
//! Declared key kinds, coerced key values, and the native key types a
//! store may use.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Declared native key type of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Textual keys, passed through unchanged
    Text,

    /// Signed integer keys
    Integer,

    /// Any other key type; no coercion rule exists for it
    Other(&'static str),
}

impl KeyKind {
    /// Get the key kind name
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Text => "text",
            KeyKind::Integer => "integer",
            KeyKind::Other(name) => name,
        }
    }

    /// Whether a textual path identifier can be coerced into this kind
    pub fn is_coercible(&self) -> bool {
        !matches!(self, KeyKind::Other(_))
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key value coerced from a path identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Text(String),
    Integer(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(s) => f.write_str(s),
            Key::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// Native key type of a store
pub trait StoreKey:
    Clone + Ord + fmt::Debug + fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Declared kind for this key type
    const KIND: KeyKind;

    /// Convert a coerced key into the native type, if the kinds agree
    fn from_key(key: Key) -> Option<Self>;
}

impl StoreKey for String {
    const KIND: KeyKind = KeyKind::Text;

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Text(s) => Some(s),
            Key::Integer(_) => None,
        }
    }
}

impl StoreKey for i64 {
    const KIND: KeyKind = KeyKind::Integer;

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Integer(n) => Some(n),
            Key::Text(_) => None,
        }
    }
}

impl StoreKey for Uuid {
    const KIND: KeyKind = KeyKind::Other("uuid");

    fn from_key(_key: Key) -> Option<Self> {
        None
    }
}
