//! The input session: per-keystroke state machine.
//!
//! `InputSession` owns all mutable composition state (pending code buffer,
//! candidate view, input mode, last-seen key) and decides for every
//! delivered key whether it edits the buffer, navigates candidates,
//! commits, toggles the mode, or passes through to the host unconsumed.
//!
//! The host talks to the session through three small capability traits:
//! `KeyEventSink` and `FocusSink` are implemented by the session and called
//! by the host adapter; `DisplaySink` is implemented by the host and driven
//! by the session.
//!
//! Display refreshes triggered by buffer edits are deferred: the session
//! arms a single-slot `RefreshSlot` and the host runs `flush_refresh` when
//! its event loop is idle, so a burst of edits coalesces into one lookup
//! and one redraw. Commits and cancels refresh synchronously.

use crate::candidate::CandidateView;
use crate::dict::Dictionary;
use crate::key_event::{self, keysym, KeyEvent};
use crate::punctuation;
use crate::resolver::Resolver;
use crate::Config;
use std::sync::Arc;
use tracing::debug;

/// Whether letter keys pass through to the host or build up a code buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Letters go straight to the application.
    Direct,
    /// Letters accumulate into the pending code buffer.
    Composing,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Direct => InputMode::Composing,
            InputMode::Composing => InputMode::Direct,
        }
    }
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Direct
    }
}

/// Host-implemented display surface.
pub trait DisplaySink {
    /// Update the preedit text shown inline at the application cursor.
    /// The whole text is composition-decorated (underlined) by the host;
    /// `cursor` is the caret offset within it.
    fn update_preedit(&mut self, text: &str, cursor: usize, visible: bool);

    /// Update the visible lookup-table page. `cursor` is the highlighted
    /// slot within `items`.
    fn update_candidate_view(&mut self, items: &[crate::Candidate], cursor: usize, visible: bool);

    /// Insert finalized text into the application.
    fn commit_text(&mut self, text: &str);
}

/// Session-implemented key delivery.
pub trait KeyEventSink {
    /// Process one key event. Returns whether the event was consumed; an
    /// unconsumed event must be applied to the application by the host.
    fn handle_key(&mut self, event: &KeyEvent) -> bool;
}

/// Session-implemented focus and reset notifications.
pub trait FocusSink {
    fn focus_in(&mut self);
    fn focus_out(&mut self);
    fn reset(&mut self);
}

/// Single-slot deferred-refresh primitive.
///
/// Replaces an ambient event-loop idle callback: arming an already-armed
/// slot is a no-op, so any number of refresh requests between two host
/// idle points collapse into one refresh of the latest state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshSlot {
    armed: bool,
}

impl RefreshSlot {
    /// Arm the slot. Returns true when this call armed it.
    pub fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    /// Drain the slot, returning whether it was armed.
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Stateful input session over an injected dictionary and display sink.
pub struct InputSession<D, S> {
    resolver: Resolver<D>,
    sink: S,
    mode: InputMode,
    preedit: String,
    view: CandidateView,
    prev_key: Option<KeyEvent>,
    last_code_match_count: usize,
    refresh: RefreshSlot,
    max_code_len: usize,
    toggle_key: u32,
    translate_punctuation: bool,
}

impl<D: Dictionary, S: DisplaySink> InputSession<D, S> {
    pub fn new(dict: Arc<D>, sink: S, config: &Config) -> Self {
        Self {
            resolver: Resolver::new(dict, config.page_size, config.max_cache_size),
            sink,
            mode: InputMode::Direct,
            preedit: String::new(),
            view: CandidateView::new(config.page_size, config.round_lookup),
            prev_key: None,
            last_code_match_count: 0,
            refresh: RefreshSlot::default(),
            max_code_len: config.max_code_len.max(1),
            toggle_key: config.toggle_keysym(),
            translate_punctuation: config.translate_punctuation,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// The pending code buffer; empty means no active composition.
    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    pub fn view(&self) -> &CandidateView {
        &self.view
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Whether a deferred refresh is waiting for the host's idle point.
    pub fn refresh_pending(&self) -> bool {
        self.refresh.is_armed()
    }

    /// Run the deferred refresh if one is pending. The host calls this when
    /// its event loop goes idle. Returns whether a refresh ran.
    pub fn flush_refresh(&mut self) -> bool {
        if self.refresh.take() {
            self.refresh_display();
            true
        } else {
            false
        }
    }

    /// Host-originated candidate click, routed through the same page-slot
    /// selection as the digit keys. Returns whether a candidate was
    /// committed.
    pub fn candidate_picked(&mut self, index: usize) -> bool {
        if self.view.select_in_page(index) {
            self.commit_selected()
        } else {
            false
        }
    }

    fn is_toggle_gesture(&self, key: &KeyEvent) -> bool {
        key.keyval == self.toggle_key
            && key.is_release()
            && self
                .prev_key
                .map_or(false, |prev| prev.keyval == self.toggle_key && !prev.is_release())
    }

    fn dispatch(&mut self, key: &KeyEvent) -> bool {
        // A press of the toggle key followed directly by its release flips
        // the mode; pending composition is flushed as plain text first.
        if self.is_toggle_gesture(key) {
            if !self.preedit.is_empty() {
                self.commit_raw();
            }
            self.mode = self.mode.toggled();
            debug!(mode = ?self.mode, "input mode toggled");
            return true;
        }

        // All other releases are bookkeeping only.
        if key.is_release() {
            return false;
        }

        if !self.preedit.is_empty() {
            match key.keyval {
                keysym::SPACE => {
                    if !self.view.is_empty() {
                        self.commit_selected();
                    } else {
                        self.commit_raw();
                    }
                    return true;
                }
                keysym::RETURN | keysym::KP_ENTER => {
                    // Enter always commits the raw code, ignoring candidates.
                    self.commit_raw();
                    return true;
                }
                keysym::ESCAPE => {
                    self.preedit.clear();
                    self.refresh_display();
                    return true;
                }
                keysym::BACKSPACE => {
                    self.preedit.pop();
                    self.invalidate();
                    return true;
                }
                keysym::PAGE_UP | keysym::KP_PAGE_UP | keysym::LEFT | keysym::KP_LEFT => {
                    if self.view.page_up() {
                        self.push_view();
                    }
                    return true;
                }
                keysym::PAGE_DOWN | keysym::KP_PAGE_DOWN | keysym::RIGHT | keysym::KP_RIGHT => {
                    if self.view.page_down() {
                        self.push_view();
                    }
                    return true;
                }
                keysym::UP | keysym::KP_UP => {
                    if self.view.cursor_up() {
                        self.push_view();
                    }
                    return true;
                }
                keysym::DOWN | keysym::KP_DOWN => {
                    if self.view.cursor_down() {
                        self.push_view();
                    }
                    return true;
                }
                _ => {}
            }

            if let Some(index) = key_event::digit_index(key.keyval) {
                if self.view.select_in_page(index) {
                    self.commit_selected();
                    return true;
                }
                // Empty page slot: leave the digit for the host.
                return false;
            }
        }

        if key.is_letter() {
            if !key.control() && !key.alt() {
                if self.mode == InputMode::Composing {
                    if let Some(ch) = key.lowercase_letter() {
                        if self.preedit.len() >= self.max_code_len && self.last_code_match_count > 0
                        {
                            // Full code: auto-commit the selection, then
                            // this letter starts the next one.
                            self.commit_selected();
                        }
                        self.preedit.push(ch);
                        self.invalidate();
                        return true;
                    }
                }
            }
            // Direct mode, or a letter chord: the host types it.
            return false;
        }

        if key.keyval < 0x80 && self.mode == InputMode::Composing {
            if self.translate_punctuation {
                if let Some(glyph) = key.to_char().and_then(punctuation::localized) {
                    if !self.view.is_empty() {
                        self.commit_selected();
                    }
                    self.commit_str(glyph);
                    return true;
                }
            }
            if !self.preedit.is_empty() {
                // No translation for this key: flush the raw code and let
                // the host apply the key itself afterwards.
                self.commit_raw();
            }
        }

        false
    }

    fn invalidate(&mut self) {
        if self.refresh.arm() {
            debug!("display refresh scheduled");
        }
    }

    /// Rebuild the candidate view from the current buffer and push preedit
    /// and lookup table to the host. Also disarms any pending deferred
    /// refresh, so a synchronous refresh coalesces with it.
    fn refresh_display(&mut self) {
        self.view.clear();
        if !self.preedit.is_empty() {
            let resolution = self.resolver.resolve(&self.preedit);
            self.last_code_match_count = resolution.code_match_count;
            self.view.set_items(resolution.candidates);
        }
        let len = self.preedit.len();
        self.sink.update_preedit(&self.preedit, len, len > 0);
        self.push_view();
        self.refresh.disarm();
    }

    fn push_view(&mut self) {
        let visible = !self.view.is_empty();
        self.sink
            .update_candidate_view(self.view.page_items(), self.view.cursor_in_page(), visible);
    }

    /// Commit `text`, clearing the composition state.
    fn commit_str(&mut self, text: &str) {
        self.sink.commit_text(text);
        self.preedit.clear();
        self.refresh_display();
    }

    /// Commit the pending buffer verbatim as plain text.
    fn commit_raw(&mut self) {
        let raw = std::mem::take(&mut self.preedit);
        self.sink.commit_text(&raw);
        self.refresh_display();
    }

    /// Commit the candidate under the view cursor, if any.
    fn commit_selected(&mut self) -> bool {
        match self.view.selected().map(|c| c.text.clone()) {
            Some(text) => {
                self.commit_str(&text);
                true
            }
            None => false,
        }
    }
}

impl<D: Dictionary, S: DisplaySink> KeyEventSink for InputSession<D, S> {
    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        debug!(
            keyval = event.keyval,
            state = event.state,
            release = event.is_release(),
            "key event"
        );
        let consumed = self.dispatch(event);
        // The last-seen key is written after dispatch has read it for the
        // toggle gesture. The host delivers events serially, but if a slow
        // dispatch ever overlaps delivery, this write can land out of order
        // with the real press/release pairing and fake or swallow a toggle;
        // hosts must not re-enter handle_key.
        self.prev_key = Some(*event);
        consumed
    }
}

impl<D: Dictionary, S: DisplaySink> FocusSink for InputSession<D, S> {
    fn focus_in(&mut self) {
        debug!("focus in");
    }

    fn focus_out(&mut self) {
        debug!("focus out");
        self.reset();
    }

    /// Discard pending composition without committing it. Candidates clear
    /// on the next refresh; a later focus-in does not resurrect the buffer.
    fn reset(&mut self) {
        debug!("session reset");
        self.preedit.clear();
    }
}
