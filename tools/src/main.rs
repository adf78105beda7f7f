//! Table converter.
//!
//! Reads textual dictionary tables, one row per line:
//!
//! ```text
//! code<TAB>phrase<TAB>freq
//! ```
//!
//! Tab-separated with whitespace fallback; `#` lines and malformed rows are
//! skipped; a missing frequency defaults to 1. Keys are lowercased and
//! phrase text is NFC-normalized. Rows with non-positive frequency are kept
//! in the artifacts as reserved entries (queries exclude them).

use anyhow::{Context, Result};
use clap::Parser;
use libwubi::table;
use libwubi_core::utils;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(about = "Convert textual Wubi/phonetic tables into libwubi artifacts")]
struct Args {
    /// Code table file (code -> phrase, freq)
    #[arg(long)]
    code_table: PathBuf,

    /// Phonetic table file (spelling -> phrase, freq)
    #[arg(long)]
    phonetic_table: Option<PathBuf>,

    /// Output directory for the artifacts
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
}

fn read_rows(path: &Path) -> Result<Vec<(String, String, i64)>> {
    let file = File::open(path).with_context(|| format!("open table {}", path.display()))?;
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = if trimmed.contains('\t') {
            trimmed.split('\t').collect()
        } else {
            trimmed.split_whitespace().collect()
        };
        if parts.len() < 2 {
            skipped += 1;
            continue;
        }
        let key = parts[0].trim().to_ascii_lowercase();
        let phrase = utils::normalize(parts[1]);
        if key.is_empty() || phrase.is_empty() {
            skipped += 1;
            continue;
        }
        let freq = parts
            .get(2)
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        rows.push((key, phrase, freq));
    }
    if skipped > 0 {
        eprintln!("{}: skipped {} malformed rows", path.display(), skipped);
    }
    Ok(rows)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let code_rows = read_rows(&args.code_table)?;
    let phonetic_rows = match &args.phonetic_table {
        Some(path) => read_rows(path)?,
        None => Vec::new(),
    };

    table::write_tables(&args.out_dir, &code_rows, &phonetic_rows)?;
    println!(
        "Wrote {} code rows and {} phonetic rows to {}",
        code_rows.len(),
        phonetic_rows.len(),
        args.out_dir.display()
    );
    Ok(())
}
