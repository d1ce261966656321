//! Request attribute storage.
//!
//! Attributes are the string-keyed values a handshake request carries for the
//! whole life of its connection. Every synthesized [`FrameRequest`](crate::protocol::FrameRequest)
//! receives its own [`Attributes`] map, filled from an [`AttributeSource`].
//!
//! The live source may be mutated by other tasks while frames are being
//! translated. [`SharedAttributes`] never blocks readers: writers swap in a new
//! map and bump a generation counter, and readers use the counter to notice
//! that a merge overlapped with a write.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use bytes::Bytes;

use crate::protocol::ConcurrentModification;

/// A single attribute value.
///
/// Values are immutable once stored, so cloning one into another map never
/// creates shared mutable state.
#[derive(Clone)]
pub enum AttributeValue {
    Text(Arc<str>),
    Int(i64),
    Bool(bool),
    Bytes(Bytes),
    /// Any other value, compared by identity.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl AttributeValue {
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text.as_ref()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            AttributeValue::Opaque(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            AttributeValue::Int(value) => f.debug_tuple("Int").field(value).finish(),
            AttributeValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            AttributeValue::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            AttributeValue::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Bytes(a), AttributeValue::Bytes(b)) => a == b,
            (AttributeValue::Opaque(a), AttributeValue::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Bytes> for AttributeValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// An owned attribute map, private to the request holding it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    inner: HashMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: HashMap::with_capacity(capacity) }
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.inner.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.inner.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.inner.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, AttributeValue> {
        self.inner.iter()
    }
}

impl Extend<(String, AttributeValue)> for Attributes {
    fn extend<T: IntoIterator<Item = (String, AttributeValue)>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

impl FromIterator<(String, AttributeValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, AttributeValue)>>(iter: T) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}

impl From<HashMap<String, AttributeValue>> for Attributes {
    fn from(inner: HashMap<String, AttributeValue>) -> Self {
        Self { inner }
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttributeValue);
    type IntoIter = hash_map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = hash_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

/// The live attribute map of a handshake request.
///
/// Implementations may be written to concurrently. Reads must never block, so
/// instead of locking, [`merge_into`](AttributeSource::merge_into) reports a
/// [`ConcurrentModification`] when it detects an overlapping write and leaves
/// it to the caller to fall back to [`snapshot`](AttributeSource::snapshot).
#[cfg_attr(test, mockall::automock)]
pub trait AttributeSource: Send + Sync {
    /// Returns a clone of the named value.
    fn get(&self, name: &str) -> Option<AttributeValue>;

    /// Returns the number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every live entry into `target`, overwriting existing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConcurrentModification`] if the source was written to while
    /// the entries were being copied. `target` may then hold a partial merge.
    fn merge_into(&self, target: &mut Attributes) -> Result<(), ConcurrentModification>;

    /// Returns a private point-in-time copy of the live entries.
    fn snapshot(&self) -> Attributes;
}

/// Copy-on-write attribute map with lock-free reads.
pub struct SharedAttributes {
    current: ArcSwap<HashMap<String, AttributeValue>>,
    generation: AtomicU64,
}

impl SharedAttributes {
    pub fn new() -> Self {
        Self::from(Attributes::new())
    }

    pub fn insert(&self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        self.current.rcu(|map| {
            let mut map = HashMap::clone(map);
            map.insert(name.clone(), value.clone());
            map
        });
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn remove(&self, name: &str) -> Option<AttributeValue> {
        let previous = self.current.rcu(|map| {
            let mut map = HashMap::clone(map);
            map.remove(name);
            map
        });
        self.generation.fetch_add(1, Ordering::AcqRel);
        previous.get(name).cloned()
    }

    /// Records the current entry count under [`ATTRIBUTE_COUNT_HINT`].
    ///
    /// The hint counts itself, so right after this call it equals [`len`](AttributeSource::len).
    pub fn record_len_hint(&self) {
        self.current.rcu(|map| {
            let mut map = HashMap::clone(map);
            let len = if map.contains_key(ATTRIBUTE_COUNT_HINT) { map.len() } else { map.len() + 1 };
            map.insert(ATTRIBUTE_COUNT_HINT.to_owned(), AttributeValue::Int(i64::try_from(len).unwrap_or(i64::MAX)));
            map
        });
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of writes applied so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for SharedAttributes {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Attributes> for SharedAttributes {
    fn from(attributes: Attributes) -> Self {
        Self { current: ArcSwap::from_pointee(attributes.inner), generation: AtomicU64::new(0) }
    }
}

impl fmt::Debug for SharedAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAttributes")
            .field("len", &self.current.load().len())
            .field("generation", &self.generation())
            .finish()
    }
}

impl AttributeSource for SharedAttributes {
    fn get(&self, name: &str) -> Option<AttributeValue> {
        self.current.load().get(name).cloned()
    }

    fn len(&self) -> usize {
        self.current.load().len()
    }

    fn merge_into(&self, target: &mut Attributes) -> Result<(), ConcurrentModification> {
        let expected = self.generation();
        {
            let live = self.current.load();
            target.extend(live.iter().map(|(name, value)| (name.clone(), value.clone())));
        }
        let observed = self.generation();
        if observed != expected {
            return Err(ConcurrentModification::new(expected, observed));
        }
        Ok(())
    }

    fn snapshot(&self) -> Attributes {
        let map = self.current.load_full();
        Attributes { inner: HashMap::clone(&map) }
    }
}

/// Attribute holding the entry count last recorded on a handshake request.
pub const ATTRIBUTE_COUNT_HINT: &str = "websocket.attributes.sizeHint";

/// Attribute stamped on every synthesized request.
pub const SUBPROTOCOL_ATTRIBUTE: &str = "websocket.subprotocol";

/// Value of [`SUBPROTOCOL_ATTRIBUTE`] for frame-originated requests.
pub const SIMPLE_HTTP_OVER_WEBSOCKET: &str = "simple-http-over-websocket";
