//! Lazy allocation and growth of container fields while setters run.
//!
//! Every helper only creates or inserts a container slot after the nested write
//! succeeded, so a failing setter leaves the target as it found it.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::{EnvBind, EnvBindError};

/// Smallest `base * 2^k` covering `required`, or `None` when it overflows.
pub fn capacity_for(required: usize, base: usize) -> Option<usize> {
    let mut capacity = base.max(1);
    while capacity < required {
        capacity = capacity.checked_mul(2)?;
    }
    Some(capacity)
}

/// Writes the element at `position`, growing `items` when it is too short.
///
/// Storage grows to [`capacity_for`] the required length, and gaps are filled with
/// `T::default()`. Existing elements are kept, whatever order indices arrive in.
/// A position that cannot be allocated is a sequence index parse error.
pub fn write_element<T, F>(
    items: &mut Vec<T>,
    position: usize,
    base_capacity: usize,
    write: F,
) -> Result<(), EnvBindError>
where
    T: Default,
    F: FnOnce(&mut T) -> Result<(), EnvBindError>,
{
    if let Some(item) = items.get_mut(position) {
        return write(item);
    }

    let required = position.checked_add(1).ok_or_else(|| {
        EnvBindError::parse("sequence index", position.to_string(), "out of range")
    })?;

    let mut element = T::default();
    write(&mut element)?;

    if required > items.capacity() {
        let capacity = capacity_for(required, base_capacity).unwrap_or(required);
        items
            .try_reserve_exact(capacity - items.len())
            .map_err(|e| EnvBindError::parse("sequence index", position.to_string(), e))?;
    }
    items.resize_with(position, T::default);
    items.push(element);
    Ok(())
}

/// Writes through an optional slot, allocating `T::default()` when it is empty.
pub fn write_optional<T, F>(slot: &mut Option<T>, write: F) -> Result<(), EnvBindError>
where
    T: Default,
    F: FnOnce(&mut T) -> Result<(), EnvBindError>,
{
    if let Some(inner) = slot.as_mut() {
        return write(inner);
    }

    let mut inner = T::default();
    write(&mut inner)?;
    *slot = Some(inner);
    Ok(())
}

/// Keyed collections the walker can populate.
pub trait Keyed: Default + 'static {
    type Key: EnvBind;
    type Value: EnvBind;

    fn get_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;

    fn insert(&mut self, key: Self::Key, value: Self::Value);
}

impl<K, V, S> Keyed for HashMap<K, V, S>
where
    K: EnvBind + Eq + Hash,
    V: EnvBind,
    S: BuildHasher + Default + 'static,
{
    type Key = K;
    type Value = V;

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        HashMap::get_mut(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }
}

impl<K, V> Keyed for BTreeMap<K, V>
where
    K: EnvBind + Ord,
    V: EnvBind,
{
    type Key = K;
    type Value = V;

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        BTreeMap::get_mut(self, key)
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }
}

/// Writes the entry for `key`, updating it in place when present.
pub fn write_entry<M, F>(map: &mut M, key: M::Key, write: F) -> Result<(), EnvBindError>
where
    M: Keyed,
    F: FnOnce(&mut M::Value) -> Result<(), EnvBindError>,
{
    if let Some(value) = map.get_mut(&key) {
        return write(value);
    }

    let mut value = M::Value::default();
    write(&mut value)?;
    map.insert(key, value);
    Ok(())
}
