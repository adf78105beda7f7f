//! Engine integration: build table artifacts, load them, drive a session.

use libwubi::table::write_tables;
use libwubi::Engine;
use libwubi_core::key_event::{keysym, KeyEvent};
use libwubi_core::{Candidate, Config, DisplaySink, KeyEventSink, MemoryDictionary};
use libwubi_core::{Dictionary, Resolver};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
struct RecordingSink {
    commits: Vec<String>,
    last_view: Vec<String>,
}

impl DisplaySink for RecordingSink {
    fn update_preedit(&mut self, _text: &str, _cursor: usize, _visible: bool) {}

    fn update_candidate_view(&mut self, items: &[Candidate], _cursor: usize, _visible: bool) {
        self.last_view = items.iter().map(|c| c.display.clone()).collect();
    }

    fn commit_text(&mut self, text: &str) {
        self.commits.push(text.to_string());
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("libwubi_engine_{}_{}", tag, nanos))
}

fn row(key: &str, phrase: &str, freq: i64) -> (String, String, i64) {
    (key.to_string(), phrase.to_string(), freq)
}

fn build_engine(tag: &str) -> (Engine, PathBuf) {
    let dir = temp_dir(tag);
    let code_rows = vec![
        row("a", "工", 500),
        row("aa", "式", 150),
        row("ab", "节", 120),
        row("abc", "好", 50),
    ];
    let phonetic_rows = vec![row("hao", "好", 700), row("gong", "工", 300)];
    write_tables(&dir, &code_rows, &phonetic_rows).unwrap();
    let engine = Engine::from_data_dir(&dir, Config::default()).unwrap();
    (engine, dir)
}

#[test]
fn missing_directory_is_an_error() {
    let err = Engine::from_data_dir(temp_dir("absent"), Config::default()).unwrap_err();
    assert!(err.to_string().contains("load dictionary tables"));
}

#[test]
fn session_commits_from_table_artifacts() {
    let (engine, dir) = build_engine("commit");
    let mut session = engine.new_session(RecordingSink::default());

    // tap the mode key, type "ab", commit with space
    session.handle_key(&KeyEvent::press(keysym::SHIFT_L));
    session.handle_key(&KeyEvent::release(keysym::SHIFT_L));
    session.handle_key(&KeyEvent::press('a' as u32));
    session.flush_refresh();
    session.handle_key(&KeyEvent::press('b' as u32));
    session.flush_refresh();
    assert_eq!(session.sink().last_view, vec!["节", "好c"]);

    session.handle_key(&KeyEvent::press(keysym::SPACE));
    assert_eq!(session.sink().commits, vec!["节"]);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn phonetic_matches_carry_code_hints() {
    let (engine, dir) = build_engine("phonetic");
    let resolver = Resolver::new(engine.dictionary(), 10, 16);
    let res = resolver.resolve("hao");
    assert_eq!(res.code_match_count, 0);
    assert_eq!(res.candidates.len(), 1);
    assert_eq!(res.candidates[0].text, "好");
    // 好 is also reachable as code "abc", so the display appends it
    assert_eq!(res.candidates[0].display, "好abc");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn table_and_memory_dictionaries_agree() {
    let (engine, dir) = build_engine("parity");
    let table = engine.dictionary();

    let mut memory = MemoryDictionary::new();
    memory.insert_code("a", "工", 500);
    memory.insert_code("aa", "式", 150);
    memory.insert_code("ab", "节", 120);
    memory.insert_code("abc", "好", 50);
    memory.insert_phonetic("hao", "好", 700);
    memory.insert_phonetic("gong", "工", 300);

    for code in ["a", "aa", "ab", "abc", "zz"] {
        assert_eq!(
            table.query_code_exact(code).unwrap(),
            memory.query_code_exact(code).unwrap(),
            "exact({})",
            code
        );
        let t: Vec<_> = table.query_code_prefix(code, 10).unwrap();
        let m: Vec<_> = memory.query_code_prefix(code, 10).unwrap();
        assert_eq!(t, m, "prefix({})", code);
    }
    for spelling in ["hao", "gong", "ha", "x"] {
        assert_eq!(
            table.query_phonetic_prefix(spelling, 10).unwrap(),
            memory.query_phonetic_prefix(spelling, 10).unwrap(),
            "phonetic({})",
            spelling
        );
    }
    for phrase in ["工", "好", "无"] {
        assert_eq!(
            table.query_code_for_phrase(phrase).unwrap(),
            memory.query_code_for_phrase(phrase).unwrap(),
            "code_for({})",
            phrase
        );
    }
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn resolver_over_arc_dictionary_is_shareable() {
    let (engine, dir) = build_engine("share");
    let dict = engine.dictionary();
    let a = Resolver::new(Arc::clone(&dict), 10, 16);
    let b = Resolver::new(dict, 10, 16);
    assert_eq!(a.resolve("a"), b.resolve("a"));
    let _ = std::fs::remove_dir_all(dir);
}
