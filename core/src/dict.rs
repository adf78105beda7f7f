//! Read-only dictionary access.
//!
//! The engine sees the dictionary as four queries over two tables: a code
//! table (key-sequence -> phrase) and a phonetic table (spelling -> phrase),
//! both carrying frequencies. The trait is the seam that lets sessions run
//! against an in-memory fixture in tests and the on-disk table artifacts in
//! production.
//!
//! Query contract shared by all implementations:
//! - rows with non-positive frequency are reserved entries and never
//!   returned;
//! - results are stable-sorted by frequency descending, so equal
//!   frequencies keep the backing store's order;
//! - `query_code_prefix` excludes rows whose code equals the prefix (those
//!   belong to `query_code_exact`), while `query_phonetic_prefix` includes
//!   the exact spelling.

use ahash::AHashMap;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored phrase row: the phrase text and its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub phrase: String,
    pub freq: i64,
}

impl PhraseRecord {
    pub fn new<T: Into<String>>(phrase: T, freq: i64) -> Self {
        Self {
            phrase: phrase.into(),
            freq,
        }
    }
}

/// A code-table row including its full code, as returned by prefix queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub code: String,
    pub phrase: String,
    pub freq: i64,
}

/// Read-only queryable code/phonetic tables.
pub trait Dictionary {
    /// Phrases whose code equals `code` exactly.
    fn query_code_exact(&self, code: &str) -> Result<Vec<PhraseRecord>>;

    /// Rows whose code strictly extends `code`, at most `limit` of them.
    fn query_code_prefix(&self, code: &str, limit: usize) -> Result<Vec<CodeRecord>>;

    /// Phrases whose phonetic spelling starts with `code` (the exact
    /// spelling included), at most `limit` of them.
    fn query_phonetic_prefix(&self, code: &str, limit: usize) -> Result<Vec<PhraseRecord>>;

    /// The code of the first stored code-table row for `phrase`, if any.
    fn query_code_for_phrase(&self, phrase: &str) -> Result<Option<String>>;
}

/// Stable frequency-descending sort for query results. Shared by
/// `Dictionary` implementations so ties keep the backing store's order.
pub fn sort_by_freq_desc<T, F: Fn(&T) -> i64>(rows: &mut [T], freq: F) {
    rows.sort_by(|a, b| freq(b).cmp(&freq(a)));
}

/// In-memory dictionary.
///
/// Keys live in `BTreeMap`s so prefix queries are plain range scans. This
/// is the fixture backend for tests and the demo fallback of the CLI; the
/// production backend loads prebuilt table artifacts instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    codes: BTreeMap<String, Vec<PhraseRecord>>,
    phonetics: BTreeMap<String, Vec<PhraseRecord>>,
    phrase_codes: AHashMap<String, String>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code-table row. The first code stored for a phrase becomes
    /// its display hint for phonetic matches.
    pub fn insert_code<K: Into<String>, T: Into<String>>(&mut self, code: K, phrase: T, freq: i64) {
        let code = code.into();
        let phrase = phrase.into();
        self.codes
            .entry(code.clone())
            .or_default()
            .push(PhraseRecord::new(phrase.clone(), freq));
        self.phrase_codes.entry(phrase).or_insert(code);
    }

    /// Insert a phonetic-table row.
    pub fn insert_phonetic<K: Into<String>, T: Into<String>>(
        &mut self,
        key: K,
        phrase: T,
        freq: i64,
    ) {
        self.phonetics
            .entry(key.into())
            .or_default()
            .push(PhraseRecord::new(phrase, freq));
    }

    /// A handful of rows for smoke tests and the CLI demo mode.
    pub fn demo() -> Self {
        let mut dict = Self::new();
        dict.insert_code("a", "工", 500);
        dict.insert_code("aa", "式", 150);
        dict.insert_code("aaaa", "工", 80);
        dict.insert_code("ab", "节", 120);
        dict.insert_code("aq", "区", 90);
        dict.insert_phonetic("gong", "工", 300);
        dict.insert_phonetic("ni", "你", 800);
        dict.insert_phonetic("nihao", "你好", 600);
        dict.insert_phonetic("hao", "好", 700);
        dict
    }

    fn prefix_scan<'a>(
        table: &'a BTreeMap<String, Vec<PhraseRecord>>,
        prefix: &str,
    ) -> impl Iterator<Item = (&'a String, &'a Vec<PhraseRecord>)> + 'a {
        let prefix = prefix.to_string();
        table
            .range(prefix.clone()..)
            .take_while(move |(key, _)| key.starts_with(&prefix))
    }
}

impl Dictionary for MemoryDictionary {
    fn query_code_exact(&self, code: &str) -> Result<Vec<PhraseRecord>> {
        let mut rows: Vec<PhraseRecord> = self
            .codes
            .get(code)
            .map(|bucket| bucket.iter().filter(|r| r.freq > 0).cloned().collect())
            .unwrap_or_default();
        sort_by_freq_desc(&mut rows, |r| r.freq);
        Ok(rows)
    }

    fn query_code_prefix(&self, code: &str, limit: usize) -> Result<Vec<CodeRecord>> {
        let mut rows = Vec::new();
        for (key, bucket) in Self::prefix_scan(&self.codes, code) {
            if key == code {
                continue;
            }
            for record in bucket.iter().filter(|r| r.freq > 0) {
                rows.push(CodeRecord {
                    code: key.clone(),
                    phrase: record.phrase.clone(),
                    freq: record.freq,
                });
            }
        }
        sort_by_freq_desc(&mut rows, |r| r.freq);
        rows.truncate(limit);
        Ok(rows)
    }

    fn query_phonetic_prefix(&self, code: &str, limit: usize) -> Result<Vec<PhraseRecord>> {
        let mut rows = Vec::new();
        for (_, bucket) in Self::prefix_scan(&self.phonetics, code) {
            rows.extend(bucket.iter().filter(|r| r.freq > 0).cloned());
        }
        sort_by_freq_desc(&mut rows, |r| r.freq);
        rows.truncate(limit);
        Ok(rows)
    }

    fn query_code_for_phrase(&self, phrase: &str) -> Result<Option<String>> {
        Ok(self.phrase_codes.get(phrase).cloned())
    }
}
