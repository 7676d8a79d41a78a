//! Mapping capability
//!
//! The small set of operations every associative container in this crate
//! provides. Lets code move values between a plain in-memory map and a
//! [`CompressedDictionary`](crate::CompressedDictionary) without caring which
//! one it holds.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{DictError, Result};

/// Associative container from `i64` keys to JSON values
pub trait Mapping {
    /// Value stored under `key`; `KeyNotFound` if absent
    fn get(&self, key: i64) -> Result<Value>;

    /// Store `value` under `key`, replacing any previous value
    fn insert(&mut self, key: i64, value: Value) -> Result<()>;

    /// Drop `key`; `KeyNotFound` if absent
    fn remove(&mut self, key: i64) -> Result<()>;

    fn contains_key(&self, key: i64) -> bool;

    /// Keys in the container's iteration order
    fn keys(&self) -> Vec<i64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Mapping for BTreeMap<i64, Value> {
    fn get(&self, key: i64) -> Result<Value> {
        BTreeMap::get(self, &key)
            .cloned()
            .ok_or(DictError::KeyNotFound { key })
    }

    fn insert(&mut self, key: i64, value: Value) -> Result<()> {
        BTreeMap::insert(self, key, value);
        Ok(())
    }

    fn remove(&mut self, key: i64) -> Result<()> {
        BTreeMap::remove(self, &key)
            .map(|_| ())
            .ok_or(DictError::KeyNotFound { key })
    }

    fn contains_key(&self, key: i64) -> bool {
        BTreeMap::contains_key(self, &key)
    }

    fn keys(&self) -> Vec<i64> {
        BTreeMap::keys(self).copied().collect()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

/// Copy every entry of `source` into `target`, in `source` order
pub fn copy_entries<S, T>(source: &S, target: &mut T) -> Result<()>
where
    S: Mapping + ?Sized,
    T: Mapping + ?Sized,
{
    for key in source.keys() {
        target.insert(key, source.get(key)?)?;
    }
    Ok(())
}
