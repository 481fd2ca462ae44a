//! Working set of a single translation request

use std::collections::HashMap;

use crate::domain::DomainError;
use crate::domain::cache::CacheKey;

/// A segment that missed the cache, with the position it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncachedSegment {
    pub index: usize,
    pub key: CacheKey,
    pub text: String,
}

/// Group of uncached positions sharing one upstream slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSlot {
    pub key: CacheKey,
    pub text: String,
    pub positions: Vec<usize>,
}

/// Ordered segments, parallel result slots and the misses recorded so far
#[derive(Debug)]
pub struct TranslationBatch {
    segments: Vec<String>,
    slots: Vec<Option<String>>,
    uncached: Vec<UncachedSegment>,
    passed_through: usize,
}

impl TranslationBatch {
    pub fn new(segments: Vec<String>) -> Self {
        let slots = vec![None; segments.len()];
        Self {
            segments,
            slots,
            uncached: Vec::new(),
            passed_through: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Fills slot `index` with a cached translation
    pub fn fill(&mut self, index: usize, translation: String) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(translation);
        }
    }

    /// Fills slot `index` with its own segment, untranslated
    pub fn pass_through(&mut self, index: usize) {
        if let Some(text) = self.segments.get(index) {
            self.slots[index] = Some(text.clone());
            self.passed_through += 1;
        }
    }

    pub fn passed_through(&self) -> usize {
        self.passed_through
    }

    /// Records a miss for position `index`
    pub fn mark_uncached(&mut self, index: usize, key: CacheKey) {
        if let Some(text) = self.segments.get(index) {
            self.uncached.push(UncachedSegment {
                index,
                key,
                text: text.clone(),
            });
        }
    }

    pub fn uncached(&self) -> &[UncachedSegment] {
        &self.uncached
    }

    pub fn hit_count(&self) -> usize {
        self.segments.len() - self.uncached.len() - self.passed_through
    }

    /// Groups the misses into upstream slots, in first-occurrence order.
    ///
    /// Without deduplication every miss gets its own slot, so repeated
    /// segments are sent upstream once per position.
    pub fn upstream_slots(&self, deduplicate: bool) -> Vec<UpstreamSlot> {
        if !deduplicate {
            return self
                .uncached
                .iter()
                .map(|miss| UpstreamSlot {
                    key: miss.key.clone(),
                    text: miss.text.clone(),
                    positions: vec![miss.index],
                })
                .collect();
        }

        let mut slots: Vec<UpstreamSlot> = Vec::new();
        let mut by_key: HashMap<&CacheKey, usize> = HashMap::new();

        for miss in &self.uncached {
            match by_key.get(&miss.key) {
                Some(&slot) => slots[slot].positions.push(miss.index),
                None => {
                    by_key.insert(&miss.key, slots.len());
                    slots.push(UpstreamSlot {
                        key: miss.key.clone(),
                        text: miss.text.clone(),
                        positions: vec![miss.index],
                    });
                }
            }
        }

        slots
    }

    /// Consumes the batch, returning translations in request order.
    ///
    /// Fails if any slot is still empty.
    pub fn into_translations(self) -> Result<Vec<String>, DomainError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    DomainError::internal(format!("No translation for segment at position {}", index))
                })
            })
            .collect()
    }
}
