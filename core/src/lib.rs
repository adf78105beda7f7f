//! libwubi-core
//!
//! Dictionary access, candidate resolution and the key-event state machine
//! shared by the deployable engine crate (libwubi) and its tooling.
//!
//! The crate is split along the two halves of the input method:
//! - `Resolver` - a pure lookup pipeline turning a pending code buffer into
//!   a ranked, deduplicated candidate list backed by a `Dictionary`.
//! - `InputSession` - the stateful side: pending buffer, paginated candidate
//!   view, input mode and the per-keystroke dispatch logic, talking to the
//!   host through small capability traits.
//!
//! Public API:
//! - `Dictionary` / `MemoryDictionary` - read-only code and phonetic tables
//! - `Resolver` / `Resolution` - candidate lookup with an LRU result cache
//! - `Candidate` / `CandidateView` - paginated candidate presentation
//! - `KeyEvent` + `keysym` / `modifier` tables - host key events
//! - `InputSession` with `KeyEventSink` / `FocusSink` / `DisplaySink`
//! - `Config` - TOML-backed session configuration

use serde::{Deserialize, Serialize};

pub mod candidate;
pub use candidate::{Candidate, CandidateView};

pub mod dict;
pub use dict::{CodeRecord, Dictionary, MemoryDictionary, PhraseRecord};

pub mod key_event;
pub use key_event::KeyEvent;

pub mod punctuation;

pub mod resolver;
pub use resolver::{Resolution, Resolver};

pub mod session;
pub use session::{DisplaySink, FocusSink, InputMode, InputSession, KeyEventSink, RefreshSlot};

/// Session configuration.
///
/// All fields have sensible defaults, so a partial TOML file (or none at
/// all) is fine. The defaults reproduce the classic table layout: ten
/// candidates per page, four-key codes, wrap-around candidate navigation
/// and a left-Shift tap to switch modes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Candidates per lookup-table page. Also bounds how many candidates a
    /// single resolution returns.
    pub page_size: usize,

    /// Full code length; once the buffer holds this many keys the next
    /// letter auto-commits the selected candidate and starts a new code.
    pub max_code_len: usize,

    /// Whether candidate navigation wraps from the last page/entry back to
    /// the first.
    pub round_lookup: bool,

    /// Keysym name of the mode-toggle key. A press immediately followed by
    /// a release of this key switches between direct and composing mode.
    /// Recognized names: "shift_l", "shift_r", "control_l", "control_r",
    /// "alt_l".
    pub toggle_key: String,

    /// Translate ASCII punctuation to full-width glyphs while composing.
    pub translate_punctuation: bool,

    /// Capacity of the resolver's buffer -> resolution cache.
    pub max_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_code_len: 4,
            round_lookup: true,
            toggle_key: "shift_l".to_string(),
            translate_punctuation: true,
            max_cache_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the configured toggle key name to a keysym.
    ///
    /// Unknown names fall back to left Shift rather than failing: a broken
    /// config file should not leave the session without a mode switch.
    pub fn toggle_keysym(&self) -> u32 {
        use key_event::keysym;
        match self.toggle_key.as_str() {
            "shift_l" => keysym::SHIFT_L,
            "shift_r" => keysym::SHIFT_R,
            "control_l" => keysym::CONTROL_L,
            "control_r" => keysym::CONTROL_R,
            "alt_l" => keysym::ALT_L,
            other => {
                tracing::warn!(key = other, "unknown toggle key name, using shift_l");
                keysym::SHIFT_L
            }
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize phrase text (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
