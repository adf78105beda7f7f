//! Candidate resolution.
//!
//! `Resolver` turns a pending code buffer into a ranked candidate list by
//! merging three lookups in order: exact code matches, prefix code matches,
//! then phonetic matches for whatever capacity remains. Code-derived
//! results are deduplicated by commit text (first occurrence wins);
//! phonetic results are intentionally not deduplicated against them, so a
//! phrase reachable both ways shows up twice with different display hints.
//!
//! Resolution is deterministic for a fixed dictionary, which makes the
//! result safe to keep in an LRU cache keyed by the buffer.

use crate::candidate::Candidate;
use crate::dict::Dictionary;
use ahash::AHashSet;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

/// One resolution result.
///
/// `code_match_count` is how many leading candidates came from the code
/// table (exact + prefix); the session uses it to gate auto-commit. The
/// remainder, if any, came from the phonetic table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub candidates: Vec<Candidate>,
    pub code_match_count: usize,
}

/// Candidate resolver over an injected dictionary.
///
/// Holds no session state; the LRU cache only memoizes successful lookups
/// and never changes what a given buffer resolves to.
pub struct Resolver<D> {
    dict: Arc<D>,
    max_results: usize,
    cache: RefCell<LruCache<String, Resolution>>,
    cache_hits: RefCell<usize>,
    cache_misses: RefCell<usize>,
}

impl<D: Dictionary> Resolver<D> {
    /// Create a resolver producing at most `max_results` candidates per
    /// buffer (one lookup-table page).
    pub fn new(dict: Arc<D>, max_results: usize, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity)
            .unwrap_or_else(|| NonZeroUsize::new(1000).expect("non-zero literal"));
        Self {
            dict,
            max_results: max_results.max(1),
            cache: RefCell::new(LruCache::new(capacity)),
            cache_hits: RefCell::new(0),
            cache_misses: RefCell::new(0),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Resolve a non-empty code buffer into a ranked candidate list.
    ///
    /// Dictionary failures are not fatal: they are logged and an empty
    /// resolution comes back, so the user can still commit the raw buffer.
    /// Failed lookups are not cached.
    pub fn resolve(&self, code: &str) -> Resolution {
        debug_assert!(!code.is_empty(), "resolution requires a non-empty buffer");
        if let Some(hit) = self.cache.borrow_mut().get(code) {
            *self.cache_hits.borrow_mut() += 1;
            return hit.clone();
        }
        *self.cache_misses.borrow_mut() += 1;

        match self.lookup(code) {
            Ok(resolution) => {
                debug!(
                    code,
                    total = resolution.candidates.len(),
                    code_matches = resolution.code_match_count,
                    "resolved buffer"
                );
                self.cache
                    .borrow_mut()
                    .put(code.to_string(), resolution.clone());
                resolution
            }
            Err(error) => {
                warn!(code, %error, "dictionary lookup failed, showing no candidates");
                Resolution::default()
            }
        }
    }

    fn lookup(&self, code: &str) -> anyhow::Result<Resolution> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();

        for row in self.dict.query_code_exact(code)? {
            if candidates.len() >= self.max_results {
                break;
            }
            if seen.insert(row.phrase.clone()) {
                candidates.push(Candidate::new(row.phrase));
            }
        }

        let remaining = self.max_results - candidates.len();
        if remaining > 0 {
            for row in self.dict.query_code_prefix(code, remaining)? {
                if candidates.len() >= self.max_results {
                    break;
                }
                if seen.insert(row.phrase.clone()) {
                    let display = format!("{}{}", row.phrase, &row.code[code.len()..]);
                    candidates.push(Candidate::with_display(row.phrase, display));
                }
            }
        }

        let code_match_count = candidates.len();

        let remaining = self.max_results - code_match_count;
        if remaining > 0 {
            for row in self.dict.query_phonetic_prefix(code, remaining)? {
                if candidates.len() >= self.max_results {
                    break;
                }
                let display = match self.dict.query_code_for_phrase(&row.phrase)? {
                    Some(hint) => format!("{}{}", row.phrase, hint),
                    None => row.phrase.clone(),
                };
                candidates.push(Candidate::with_display(row.phrase, display));
            }
        }

        Ok(Resolution {
            candidates,
            code_match_count,
        })
    }

    /// (hits, misses) counters for the result cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.cache_hits.borrow(), *self.cache_misses.borrow())
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        *self.cache_hits.borrow_mut() = 0;
        *self.cache_misses.borrow_mut() = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{CodeRecord, MemoryDictionary, PhraseRecord};
    use anyhow::bail;

    fn resolver(dict: MemoryDictionary) -> Resolver<MemoryDictionary> {
        Resolver::new(Arc::new(dict), 10, 16)
    }

    #[test]
    fn exact_match_single_candidate() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("a", "工", 100);
        let res = resolver(dict).resolve("a");
        assert_eq!(res.candidates.len(), 1);
        assert_eq!(res.candidates[0].text, "工");
        assert_eq!(res.candidates[0].display, "工");
        assert_eq!(res.code_match_count, 1);
    }

    #[test]
    fn prefix_match_appends_code_tail() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("abc", "好", 50);
        let res = resolver(dict).resolve("ab");
        assert_eq!(res.candidates.len(), 1);
        assert_eq!(res.candidates[0].text, "好");
        assert_eq!(res.candidates[0].display, "好c");
        assert_eq!(res.code_match_count, 1);
    }

    #[test]
    fn exact_before_prefix_and_dedup_keeps_first() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("ab", "甲", 10);
        dict.insert_code("abc", "甲", 90);
        dict.insert_code("abd", "乙", 80);
        let res = resolver(dict).resolve("ab");
        // the exact match wins the slot for 甲 and keeps its bare display
        assert_eq!(res.candidates.len(), 2);
        assert_eq!(res.candidates[0].text, "甲");
        assert_eq!(res.candidates[0].display, "甲");
        assert_eq!(res.candidates[1].text, "乙");
        assert_eq!(res.candidates[1].display, "乙d");
        assert_eq!(res.code_match_count, 2);
    }

    #[test]
    fn phonetic_fills_remaining_capacity() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("ni", "倪", 40);
        dict.insert_phonetic("ni", "你", 90);
        dict.insert_phonetic("nihao", "你好", 70);
        let res = resolver(dict).resolve("ni");
        assert_eq!(res.code_match_count, 1);
        assert_eq!(res.candidates.len(), 3);
        assert_eq!(res.candidates[0].text, "倪");
        assert_eq!(res.candidates[1].text, "你");
        assert_eq!(res.candidates[2].text, "你好");
    }

    #[test]
    fn phonetic_display_appends_code_hint() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("a", "工", 500);
        dict.insert_phonetic("gong", "工", 300);
        dict.insert_phonetic("gongren", "工人", 100);
        let res = resolver(dict).resolve("gong");
        assert_eq!(res.code_match_count, 0);
        assert_eq!(res.candidates[0].text, "工");
        assert_eq!(res.candidates[0].display, "工a");
        // no code entry for 工人, display stays bare
        assert_eq!(res.candidates[1].text, "工人");
        assert_eq!(res.candidates[1].display, "工人");
    }

    #[test]
    fn phonetic_not_deduplicated_against_code_matches() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("gong", "工", 500);
        dict.insert_phonetic("gong", "工", 300);
        let res = resolver(dict).resolve("gong");
        // the same phrase appears once per source
        assert_eq!(res.candidates.len(), 2);
        assert_eq!(res.candidates[0].text, "工");
        assert_eq!(res.candidates[1].text, "工");
        assert_eq!(res.candidates[1].display, "工gong");
        assert_eq!(res.code_match_count, 1);
    }

    #[test]
    fn capacity_bounds_every_stage() {
        let mut dict = MemoryDictionary::new();
        for i in 0..6 {
            dict.insert_code("ab", format!("甲{}", i), 100 - i as i64);
        }
        for i in 0..6u8 {
            dict.insert_code(format!("ab{}", (b'a' + i) as char), format!("乙{}", i), 50);
        }
        for i in 0..6 {
            dict.insert_phonetic("ab", format!("丙{}", i), 10);
        }
        let res = Resolver::new(Arc::new(dict), 10, 16).resolve("ab");
        assert_eq!(res.candidates.len(), 10);
        assert_eq!(res.code_match_count, 10);
    }

    #[test]
    fn code_prefix_distinct_commit_texts() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("ab", "甲", 90);
        dict.insert_code("aba", "甲", 80);
        dict.insert_code("abb", "甲", 70);
        dict.insert_code("abc", "乙", 60);
        let res = resolver(dict).resolve("ab");
        let code_texts: Vec<_> = res.candidates[..res.code_match_count]
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        let mut unique = code_texts.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), code_texts.len());
    }

    #[test]
    fn no_matches_yields_empty_resolution() {
        let res = resolver(MemoryDictionary::new()).resolve("zzz");
        assert!(res.candidates.is_empty());
        assert_eq!(res.code_match_count, 0);
    }

    #[test]
    fn repeated_resolution_hits_cache_and_agrees() {
        let mut dict = MemoryDictionary::new();
        dict.insert_code("a", "工", 100);
        let resolver = resolver(dict);
        let first = resolver.resolve("a");
        let second = resolver.resolve("a");
        assert_eq!(first, second);
        let (hits, misses) = resolver.cache_stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
    }

    struct FailingDict;

    impl Dictionary for FailingDict {
        fn query_code_exact(&self, _code: &str) -> anyhow::Result<Vec<PhraseRecord>> {
            bail!("storage unavailable")
        }
        fn query_code_prefix(&self, _code: &str, _limit: usize) -> anyhow::Result<Vec<CodeRecord>> {
            bail!("storage unavailable")
        }
        fn query_phonetic_prefix(
            &self,
            _code: &str,
            _limit: usize,
        ) -> anyhow::Result<Vec<PhraseRecord>> {
            bail!("storage unavailable")
        }
        fn query_code_for_phrase(&self, _phrase: &str) -> anyhow::Result<Option<String>> {
            bail!("storage unavailable")
        }
    }

    #[test]
    fn dictionary_failure_degrades_to_empty() {
        let resolver = Resolver::new(Arc::new(FailingDict), 10, 16);
        let res = resolver.resolve("ab");
        assert!(res.candidates.is_empty());
        assert_eq!(res.code_match_count, 0);
        // failures are not cached, so a retry misses again
        resolver.resolve("ab");
        let (hits, misses) = resolver.cache_stats();
        assert_eq!(hits, 0);
        assert_eq!(misses, 2);
    }
}
