//! libwubi
//!
//! The deployable Wubi engine: a read-only dictionary backed by prebuilt
//! FST + bincode table artifacts, and an `Engine` wrapper that loads a data
//! directory and spawns input sessions against it.
//!
//! The session state machine, candidate resolution and key handling live in
//! `libwubi-core`; this crate supplies the production `Dictionary`
//! implementation and the process-level glue.

pub mod engine;
pub mod table;

pub use engine::Engine;
pub use table::TableDictionary;

// Convenience re-exports so hosts only need one crate in scope.
pub use libwubi_core::{
    Candidate, CandidateView, Config, Dictionary, DisplaySink, FocusSink, InputMode, InputSession,
    KeyEvent, KeyEventSink, MemoryDictionary, Resolution, Resolver,
};
