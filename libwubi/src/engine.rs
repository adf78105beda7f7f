//! Engine wrapper: loads a data directory and spawns sessions.

use crate::table::TableDictionary;
use anyhow::{Context, Result};
use libwubi_core::{Config, DisplaySink, InputSession};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The deployable Wubi engine.
///
/// Owns the shared read-only dictionary and the session configuration.
/// Sessions are cheap to create: they share the dictionary behind an `Arc`
/// and carry only their own composition state.
#[derive(Debug)]
pub struct Engine {
    dict: Arc<TableDictionary>,
    config: Config,
}

impl Engine {
    /// Load the dictionary artifacts from `data_dir`.
    pub fn from_data_dir<P: AsRef<Path>>(data_dir: P, config: Config) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let dict = TableDictionary::load_from_dir(data_dir)
            .with_context(|| format!("load dictionary tables from {}", data_dir.display()))?;
        info!(
            dir = %data_dir.display(),
            code_keys = dict.code_key_count(),
            phonetic_keys = dict.phonetic_key_count(),
            "wubi engine ready"
        );
        Ok(Self {
            dict: Arc::new(dict),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dictionary(&self) -> Arc<TableDictionary> {
        Arc::clone(&self.dict)
    }

    /// Create an input session talking to `sink`.
    pub fn new_session<S: DisplaySink>(&self, sink: S) -> InputSession<TableDictionary, S> {
        InputSession::new(Arc::clone(&self.dict), sink, &self.config)
    }
}
