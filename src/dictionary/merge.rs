//! Merge and combine
//!
//! Copies raw payloads between dictionaries of the same compression. Key
//! collisions are detected before anything is copied, so a failed merge never
//! leaves a half-merged result behind.

use tracing::debug;

use crate::error::{DictError, Result};

use super::CompressedDictionary;

impl CompressedDictionary {
    /// Merge `self` and `other` into a new dictionary
    ///
    /// With `reset_keys`, every entry is renumbered from 0: `self`'s entries
    /// first, then `other`'s, each in insertion order. Without it, both keep
    /// their keys and a key present in both fails with `DuplicateKey`.
    pub fn merge(&self, other: &Self, reset_keys: bool) -> Result<Self> {
        self.ensure_compatible(other)?;
        if !reset_keys {
            self.ensure_disjoint(other)?;
        }

        let mut merged = Self::new(self.compression);
        let entries = self.raw_entries().chain(other.raw_entries());

        if reset_keys {
            for (new_key, (_, payload)) in (0..).zip(entries) {
                merged.insert_raw(new_key, payload.clone());
            }
        } else {
            for (key, payload) in entries {
                merged.insert_raw(key, payload.clone());
            }
        }

        debug!(left = self.len(), right = other.len(), reset_keys, "merged dictionaries");
        Ok(merged)
    }

    /// Absorb `other` into `self`
    ///
    /// With `reset_keys`, `other`'s entries first fill the unused keys between
    /// 0 and `self`'s largest key (ascending), then continue above it. Without
    /// it, keys are kept and a collision fails with `DuplicateKey`, leaving
    /// `self` unchanged.
    pub fn merge_in_place(&mut self, other: &Self, reset_keys: bool) -> Result<()> {
        self.ensure_compatible(other)?;

        if !reset_keys {
            self.ensure_disjoint(other)?;
            for (key, payload) in other.raw_entries() {
                self.insert_raw(key, payload.clone());
            }
            return Ok(());
        }

        let new_keys = self.free_keys(other.len())?;
        for (key, (_, payload)) in new_keys.into_iter().zip(other.raw_entries()) {
            self.insert_raw(key, payload.clone());
        }

        debug!(entries = self.len(), absorbed = other.len(), "merged dictionary in place");
        Ok(())
    }

    /// Fold several dictionaries into one
    ///
    /// Starts from a copy of the first and merges the rest into it in order.
    /// Every pair must be compatible; that is checked before any merging.
    pub fn combine<'a, I>(dicts: I, reset_keys: bool) -> Result<Self>
    where
        I: IntoIterator<Item = &'a CompressedDictionary>,
    {
        let dicts: Vec<&CompressedDictionary> = dicts.into_iter().collect();
        let (first, rest) = dicts.split_first().ok_or_else(|| {
            DictError::Configuration("combine requires at least one dictionary".to_string())
        })?;

        for dict in rest {
            first.ensure_compatible(dict)?;
        }

        let mut combined = (*first).clone();
        for dict in rest {
            combined.merge_in_place(dict, reset_keys)?;
        }

        debug!(inputs = dicts.len(), entries = combined.len(), "combined dictionaries");
        Ok(combined)
    }

    fn ensure_disjoint(&self, other: &Self) -> Result<()> {
        match other.keys().find(|key| self.contains_key(*key)) {
            Some(key) => Err(DictError::DuplicateKey {
                key,
                source_path: None,
            }),
            None => Ok(()),
        }
    }

    /// The next `count` keys to hand out when compacting: holes below the
    /// current maximum first, then fresh keys above it
    fn free_keys(&self, count: usize) -> Result<Vec<i64>> {
        let Some(max) = self.max_key() else {
            return Ok((0..count as i64).collect());
        };

        let mut keys: Vec<i64> = (0..max)
            .filter(|key| !self.contains_key(*key))
            .take(count)
            .collect();

        let mut next = max.max(-1);
        while keys.len() < count {
            next = next.checked_add(1).ok_or_else(|| {
                DictError::Configuration("key space exhausted while renumbering".to_string())
            })?;
            keys.push(next);
        }

        Ok(keys)
    }
}
