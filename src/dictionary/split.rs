//! Split
//!
//! Partitions a dictionary into near-equal parts by working on its key list
//! only; payloads are shared with the source, never recompressed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::config::SplitOptions;
use crate::error::Result;

use super::CompressedDictionary;

impl CompressedDictionary {
    /// Partition the dictionary according to `options`
    ///
    /// Part sizes differ by at most one: the first `len % parts` parts get the
    /// extra entry. Shuffling permutes the key list used for partitioning; the
    /// source dictionary is never modified.
    pub fn split(&self, options: &SplitOptions) -> Result<Splits<'_>> {
        let parts = options.resolve_parts(self.len())?;

        let mut keys: Vec<i64> = self.keys().collect();
        if options.shuffle {
            match options.seed {
                Some(seed) => keys.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => keys.shuffle(&mut rand::thread_rng()),
            }
        }

        let (base, extra) = if parts == 0 {
            (0, 0)
        } else {
            (keys.len() / parts, keys.len() % parts)
        };

        let mut remaining = parts;
        if options.drop_last && parts > 1 {
            let first = base + usize::from(extra > 0);
            let last = base + usize::from(parts - 1 < extra);
            if first > last {
                remaining -= 1;
            }
        }

        debug!(
            entries = keys.len(),
            parts,
            yielded = remaining,
            shuffle = options.shuffle,
            "splitting dictionary"
        );

        Ok(Splits {
            source: self,
            keys,
            base,
            extra,
            index: 0,
            remaining,
            offset: 0,
            reset_keys: options.reset_keys,
        })
    }
}

/// Lazy sequence of split parts
///
/// Each part is fully materialized when yielded. The sequence is a single
/// forward pass and cannot be restarted; call
/// [`CompressedDictionary::split`] again for a new one.
pub struct Splits<'a> {
    source: &'a CompressedDictionary,
    /// Keys in partition order
    keys: Vec<i64>,
    /// Minimum part size
    base: usize,
    /// Number of leading parts holding one extra key
    extra: usize,
    /// Index of the next part
    index: usize,
    /// Parts still to yield
    remaining: usize,
    /// Start of the next part in `keys`
    offset: usize,
    reset_keys: bool,
}

impl Iterator for Splits<'_> {
    type Item = CompressedDictionary;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let size = self.base + usize::from(self.index < self.extra);
        let group = &self.keys[self.offset..self.offset + size];

        let mut part = CompressedDictionary::new(self.source.compression);
        for (position, &key) in (0..).zip(group) {
            let Some(payload) = self.source.get_raw(key) else {
                continue;
            };
            let target = if self.reset_keys { position } else { key };
            part.insert_raw(target, payload.clone());
        }

        self.offset += size;
        self.index += 1;
        self.remaining -= 1;
        Some(part)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Splits<'_> {}
