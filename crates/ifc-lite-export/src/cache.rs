// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subtype relationship cache
//!
//! Memoizes `is_subtype_of` answers per (type, candidate) pair. The cache
//! belongs to one session; its contents never change the answer, only how
//! fast it is produced.

use ifc_lite_schema::{EntityTypeId, SchemaRegistry};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Cache counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoized subtype checks
#[derive(Debug, Default)]
pub struct TypeCache {
    answers: RwLock<FxHashMap<(EntityTypeId, EntityTypeId), bool>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ty` is `candidate` or one of its subtypes
    pub fn is_subtype_of(
        &self,
        registry: &SchemaRegistry,
        ty: EntityTypeId,
        candidate: EntityTypeId,
    ) -> bool {
        if let Ok(answers) = self.answers.read() {
            if let Some(&answer) = answers.get(&(ty, candidate)) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return answer;
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let answer = registry.is_subtype_of(ty, candidate);

        // A poisoned lock only loses the memo
        if let Ok(mut answers) = self.answers.write() {
            answers.insert((ty, candidate), answer);
        }
        answer
    }

    /// Whether `ty` conforms to any of `candidates`
    pub fn is_subtype_of_any(
        &self,
        registry: &SchemaRegistry,
        ty: EntityTypeId,
        candidates: &[EntityTypeId],
    ) -> bool {
        candidates
            .iter()
            .any(|&candidate| self.is_subtype_of(registry, ty, candidate))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.answers.read().map(|a| a.len()).unwrap_or(0),
        }
    }

    /// Drop all memoized answers and reset the counters
    pub fn clear(&self) {
        if let Ok(mut answers) = self.answers.write() {
            answers.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_schema::{EntityDescription, SchemaDescription};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_description(
            &SchemaDescription::new("T")
                .entity(EntityDescription::new("Root"))
                .entity(EntityDescription::new("Element").subtype_of("Root"))
                .entity(EntityDescription::new("Wall").subtype_of("Element"))
                .entity(EntityDescription::new("Other")),
        )
        .unwrap()
    }

    #[test]
    fn test_cached_answers_match_registry() {
        let registry = registry();
        let cache = TypeCache::new();
        let ids: Vec<_> = registry.iter().map(|e| e.id).collect();

        // Twice: the second pass is served from the cache
        for _ in 0..2 {
            for &a in &ids {
                for &b in &ids {
                    assert_eq!(
                        cache.is_subtype_of(&registry, a, b),
                        registry.is_subtype_of(a, b)
                    );
                }
            }
        }

        let stats = cache.stats();
        assert_eq!(stats.misses, 16);
        assert_eq!(stats.hits, 16);
        assert_eq!(stats.entries, 16);
    }

    #[test]
    fn test_any_and_clear() {
        let registry = registry();
        let cache = TypeCache::new();
        let wall = registry.lookup("Wall").unwrap();
        let root = registry.lookup("Root").unwrap();
        let other = registry.lookup("Other").unwrap();

        assert!(cache.is_subtype_of_any(&registry, wall, &[other, root]));
        assert!(!cache.is_subtype_of_any(&registry, other, &[wall, root]));

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
