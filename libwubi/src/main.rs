//! Interactive terminal session for trying the engine without a host
//! input-method framework. Each character of a stdin line is fed through
//! the session as a key press, with the deferred display refresh flushed
//! between events the way a live host's idle loop would.

use anyhow::{anyhow, Result};
use clap::Parser;
use libwubi::Engine;
use libwubi_core::key_event::{keysym, KeyEvent};
use libwubi_core::{
    Candidate, Config, Dictionary, DisplaySink, FocusSink, InputSession, KeyEventSink,
    MemoryDictionary,
};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "libwubi", about = "Interactive Wubi input session")]
struct Args {
    /// Directory holding the dictionary table artifacts
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML session configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured candidates-per-page
    #[arg(long)]
    page_size: Option<usize>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Renders session pushes straight to stdout.
struct TerminalSink;

impl DisplaySink for TerminalSink {
    fn update_preedit(&mut self, text: &str, _cursor: usize, visible: bool) {
        if visible {
            println!("  ∙ {}", text);
        }
    }

    fn update_candidate_view(&mut self, items: &[Candidate], cursor: usize, visible: bool) {
        if !visible {
            return;
        }
        let line = items
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let slot = (i + 1) % 10;
                if i == cursor {
                    format!("[{}.{}]", slot, c.display)
                } else {
                    format!("{}.{}", slot, c.display)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line);
    }

    fn commit_text(&mut self, text: &str) {
        println!("  => {}", text);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn tap_toggle<D: Dictionary>(session: &mut InputSession<D, TerminalSink>) {
    session.handle_key(&KeyEvent::press(keysym::SHIFT_L));
    session.handle_key(&KeyEvent::release(keysym::SHIFT_L));
}

fn run<D: Dictionary>(mut session: InputSession<D, TerminalSink>) -> Result<()> {
    println!("libwubi interactive session");
    println!("each character you type is fed to the session as a key press:");
    println!("letters build a code, digits pick candidates, space commits");
    println!("commands: :toggle (mode key tap)  :reset  :quit");
    println!();

    // drop straight into composing mode for the demo
    tap_toggle(&mut session);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim_end() {
            ":quit" => break,
            ":reset" => {
                session.reset();
                session.flush_refresh();
                continue;
            }
            ":toggle" => {
                tap_toggle(&mut session);
                println!("  (mode: {:?})", session.mode());
                continue;
            }
            _ => {}
        }
        for ch in line.chars() {
            if !ch.is_ascii() {
                continue;
            }
            let consumed = session.handle_key(&KeyEvent::press(ch as u32));
            session.flush_refresh();
            if !consumed {
                println!("  (host types {:?})", ch);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load_toml(path)
            .map_err(|e| anyhow!("failed to load config {}: {}", path.display(), e))?,
        None => Config::default(),
    };
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    match &args.data_dir {
        Some(dir) => {
            let engine = Engine::from_data_dir(dir, config)?;
            run(engine.new_session(TerminalSink))
        }
        None => {
            eprintln!("no --data-dir given, using the built-in demo dictionary");
            let session =
                InputSession::new(Arc::new(MemoryDictionary::demo()), TerminalSink, &config);
            run(session)
        }
    }
}
