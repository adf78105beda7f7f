//! On-disk dictionary tables.
//!
//! A data directory holds five artifacts:
//! - `code.fst` / `code.bincode` - the code table: an FST mapping each code
//!   to an index into a bincode-serialized `Vec<Vec<PhraseRecord>>`;
//! - `phonetic.fst` / `phonetic.bincode` - the phonetic table, same scheme;
//! - `phrase_code.bincode` - phrase -> code pairs for display hints.
//!
//! The FST gives exact lookups and ordered prefix streams over sorted keys;
//! the payload vectors keep full rows (including reserved non-positive
//! frequencies, which are filtered at query time). Everything is opened
//! once, read-only, and shared across sessions behind an `Arc`.

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};
use libwubi_core::dict::{sort_by_freq_desc, CodeRecord, Dictionary, PhraseRecord};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CODE_FST: &str = "code.fst";
pub const CODE_PAYLOAD: &str = "code.bincode";
pub const PHONETIC_FST: &str = "phonetic.fst";
pub const PHONETIC_PAYLOAD: &str = "phonetic.bincode";
pub const PHRASE_CODE_PAYLOAD: &str = "phrase_code.bincode";

/// Read-only dictionary over prebuilt table artifacts.
#[derive(Debug)]
pub struct TableDictionary {
    code_index: Map<Vec<u8>>,
    code_rows: Vec<Vec<PhraseRecord>>,
    phonetic_index: Map<Vec<u8>>,
    phonetic_rows: Vec<Vec<PhraseRecord>>,
    phrase_codes: AHashMap<String, String>,
}

impl TableDictionary {
    /// Load all five artifacts from `dir`.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let code_index = load_fst(&dir.join(CODE_FST))?;
        let code_rows = load_payloads(&dir.join(CODE_PAYLOAD))?;
        let phonetic_index = load_fst(&dir.join(PHONETIC_FST))?;
        let phonetic_rows = load_payloads(&dir.join(PHONETIC_PAYLOAD))?;

        let pairs_path = dir.join(PHRASE_CODE_PAYLOAD);
        let bytes = fs::read(&pairs_path)
            .with_context(|| format!("read phrase-code map {}", pairs_path.display()))?;
        let pairs: Vec<(String, String)> = bincode::deserialize(&bytes)
            .with_context(|| format!("deserialize phrase-code map {}", pairs_path.display()))?;
        let mut phrase_codes = AHashMap::with_capacity(pairs.len());
        for (phrase, code) in pairs {
            phrase_codes.entry(phrase).or_insert(code);
        }

        Ok(Self {
            code_index,
            code_rows,
            phonetic_index,
            phonetic_rows,
            phrase_codes,
        })
    }

    /// Number of distinct code keys.
    pub fn code_key_count(&self) -> usize {
        self.code_rows.len()
    }

    /// Number of distinct phonetic keys.
    pub fn phonetic_key_count(&self) -> usize {
        self.phonetic_rows.len()
    }

    /// All keys extending `prefix`, with their payload indices, in key order.
    fn prefix_hits(index: &Map<Vec<u8>>, prefix: &str) -> Vec<(String, u64)> {
        let automaton = Str::new(prefix).starts_with();
        let mut stream = index.search(automaton).into_stream();
        let mut hits = Vec::new();
        while let Some((key, idx)) = stream.next() {
            hits.push((String::from_utf8_lossy(key).into_owned(), idx));
        }
        hits
    }
}

impl Dictionary for TableDictionary {
    fn query_code_exact(&self, code: &str) -> Result<Vec<PhraseRecord>> {
        let mut rows: Vec<PhraseRecord> = self
            .code_index
            .get(code)
            .and_then(|idx| self.code_rows.get(idx as usize))
            .map(|bucket| bucket.iter().filter(|r| r.freq > 0).cloned().collect())
            .unwrap_or_default();
        sort_by_freq_desc(&mut rows, |r| r.freq);
        Ok(rows)
    }

    fn query_code_prefix(&self, code: &str, limit: usize) -> Result<Vec<CodeRecord>> {
        let mut rows = Vec::new();
        for (key, idx) in Self::prefix_hits(&self.code_index, code) {
            if key == code {
                continue;
            }
            if let Some(bucket) = self.code_rows.get(idx as usize) {
                for record in bucket.iter().filter(|r| r.freq > 0) {
                    rows.push(CodeRecord {
                        code: key.clone(),
                        phrase: record.phrase.clone(),
                        freq: record.freq,
                    });
                }
            }
        }
        sort_by_freq_desc(&mut rows, |r| r.freq);
        rows.truncate(limit);
        Ok(rows)
    }

    fn query_phonetic_prefix(&self, code: &str, limit: usize) -> Result<Vec<PhraseRecord>> {
        let mut rows = Vec::new();
        for (_, idx) in Self::prefix_hits(&self.phonetic_index, code) {
            if let Some(bucket) = self.phonetic_rows.get(idx as usize) {
                rows.extend(bucket.iter().filter(|r| r.freq > 0).cloned());
            }
        }
        sort_by_freq_desc(&mut rows, |r| r.freq);
        rows.truncate(limit);
        Ok(rows)
    }

    fn query_code_for_phrase(&self, phrase: &str) -> Result<Option<String>> {
        Ok(self.phrase_codes.get(phrase).cloned())
    }
}

fn load_fst(path: &Path) -> Result<Map<Vec<u8>>> {
    let bytes = fs::read(path).with_context(|| format!("read fst {}", path.display()))?;
    Map::new(bytes).with_context(|| format!("parse fst {}", path.display()))
}

fn load_payloads(path: &Path) -> Result<Vec<Vec<PhraseRecord>>> {
    let bytes = fs::read(path).with_context(|| format!("read payloads {}", path.display()))?;
    bincode::deserialize(&bytes).with_context(|| format!("deserialize payloads {}", path.display()))
}

/// Build all five artifacts in `dir` from `(key, phrase, freq)` rows.
///
/// Rows keep their input order within one key; reserved rows (freq <= 0)
/// are stored as-is and excluded only at query time. The phrase->code map
/// records the first code seen for each phrase.
pub fn write_tables<P: AsRef<Path>>(
    dir: P,
    code_rows: &[(String, String, i64)],
    phonetic_rows: &[(String, String, i64)],
) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    write_table(&dir.join(CODE_FST), &dir.join(CODE_PAYLOAD), code_rows)?;
    write_table(
        &dir.join(PHONETIC_FST),
        &dir.join(PHONETIC_PAYLOAD),
        phonetic_rows,
    )?;

    let mut seen = AHashSet::new();
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (code, phrase, _freq) in code_rows {
        if seen.insert(phrase.clone()) {
            pairs.push((phrase.clone(), code.clone()));
        }
    }
    let bytes = bincode::serialize(&pairs).context("serialize phrase-code map")?;
    fs::write(dir.join(PHRASE_CODE_PAYLOAD), bytes)
        .with_context(|| format!("write phrase-code map in {}", dir.display()))?;
    Ok(())
}

fn write_table(fst_path: &Path, payload_path: &Path, rows: &[(String, String, i64)]) -> Result<()> {
    let mut grouped: BTreeMap<String, Vec<PhraseRecord>> = BTreeMap::new();
    for (key, phrase, freq) in rows {
        grouped
            .entry(key.clone())
            .or_default()
            .push(PhraseRecord::new(phrase.clone(), *freq));
    }

    let mut builder = MapBuilder::new(Vec::new()).context("create fst builder")?;
    let mut payloads = Vec::with_capacity(grouped.len());
    for (i, (key, bucket)) in grouped.into_iter().enumerate() {
        builder
            .insert(&key, i as u64)
            .with_context(|| format!("insert key {:?} into fst", key))?;
        payloads.push(bucket);
    }

    let fst_bytes = builder.into_inner().context("finish fst")?;
    fs::write(fst_path, fst_bytes).with_context(|| format!("write {}", fst_path.display()))?;

    let payload_bytes = bincode::serialize(&payloads).context("serialize payloads")?;
    fs::write(payload_path, payload_bytes)
        .with_context(|| format!("write {}", payload_path.display()))?;
    Ok(())
}
