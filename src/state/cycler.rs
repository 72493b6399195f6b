//! Text Cycler - Typewriter animation over a fixed phrase list
//!
//! Types each phrase character by character, holds it, deletes it character
//! by character, then moves on to the next phrase, looping forever.
//!
//! # Pattern
//!
//! - [`CyclerState`] is the pure state machine: one [`CyclerState::tick`]
//!   performs one transition and needs no clock
//! - [`TextCycler`] drives that state machine from a [`Scheduler`], exposes
//!   the result through signals and owns a [`CursorBlink`]
//! - Dropping the cycler cancels its pending tick, so nothing fires after
//!   teardown
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use spark_typewriter::{CyclerConfig, PhraseSequence, Scheduler, TextCycler};
//!
//! let scheduler = Scheduler::new();
//! let phrases = PhraseSequence::new(["Hi"]).unwrap();
//! let cycler = TextCycler::start(&scheduler, phrases, CyclerConfig::hero()).unwrap();
//!
//! scheduler.advance(Duration::from_millis(80));
//! assert_eq!(cycler.display_text(), "H");
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::Deserialize;
use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::state::blink::CursorBlink;
use crate::timer::{Scheduler, TimerId};

// =============================================================================
// PHRASE SEQUENCE
// =============================================================================

/// Ordered, non-empty list of phrases. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct PhraseSequence {
    phrases: Vec<String>,
}

impl PhraseSequence {
    /// Build a sequence, rejecting an empty list.
    ///
    /// Empty strings are valid phrases: they skip straight to the hold.
    pub fn new<I, S>(phrases: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return Err(ConfigError::EmptyPhraseSequence);
        }
        Ok(Self { phrases })
    }

    /// Build from a built-in list known to be non-empty.
    pub(crate) fn from_static(phrases: &[&str]) -> Self {
        debug_assert!(!phrases.is_empty());
        Self {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Phrase at `index`, wrapping around the sequence length.
    pub fn get(&self, index: usize) -> &str {
        &self.phrases[index % self.phrases.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for PhraseSequence {
    type Error = ConfigError;

    fn try_from(phrases: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(phrases)
    }
}

/// Number of chars in `text`.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Prefix of `text` holding its first `chars` characters.
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Logical phase of a cycler, derived from `(is_deleting, display_text)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not deleting, text shorter than the phrase. Next tick appends a char.
    Typing,
    /// Not deleting, full phrase shown. Next tick starts deleting.
    Holding,
    /// Deleting with text left. Next tick removes the last char.
    Deleting,
    /// Deleting with nothing left. Next tick moves to the next phrase.
    Advancing,
}

/// Position of a cycler within its phrase sequence.
///
/// The display text is stored as a char count, so it is a prefix of the
/// current phrase by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CyclerState {
    phrase_index: usize,
    shown: usize,
    deleting: bool,
}

impl CyclerState {
    /// Initial state: first phrase, nothing shown, typing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Number of characters currently shown.
    pub fn shown_chars(&self) -> usize {
        self.shown
    }

    /// Text currently shown, always a prefix of the current phrase.
    pub fn display_text<'a>(&self, phrases: &'a PhraseSequence) -> &'a str {
        char_prefix(phrases.get(self.phrase_index), self.shown)
    }

    pub fn phase(&self, phrases: &PhraseSequence) -> Phase {
        match (self.deleting, self.shown) {
            (true, 0) => Phase::Advancing,
            (true, _) => Phase::Deleting,
            (false, shown) if shown >= char_len(phrases.get(self.phrase_index)) => Phase::Holding,
            (false, _) => Phase::Typing,
        }
    }

    /// Perform one tick and return the phase that was executed.
    pub fn tick(&mut self, phrases: &PhraseSequence) -> Phase {
        let phase = self.phase(phrases);
        match phase {
            Phase::Typing => self.shown += 1,
            Phase::Holding => self.deleting = true,
            Phase::Deleting => self.shown -= 1,
            Phase::Advancing => {
                self.deleting = false;
                self.shown = 0;
                self.phrase_index = (self.phrase_index + 1) % phrases.len();
            }
        }
        phase
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Timing for a [`TextCycler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclerConfig {
    /// Delay before each typed character.
    pub type_interval: Duration,
    /// Delay before each deleted character.
    pub delete_interval: Duration,
    /// Pause with the full phrase shown before deletion starts.
    pub hold: Duration,
    /// Extra pause after a phrase is fully deleted. May be zero.
    pub post_delete_delay: Duration,
    /// Cursor blink toggle interval. Zero disables blinking.
    pub blink_interval: Duration,
}

impl CyclerConfig {
    /// Hero headline timing: 80ms typing, 30ms deleting, 3s hold, 530ms blink.
    pub const fn hero() -> Self {
        Self {
            type_interval: Duration::from_millis(80),
            delete_interval: Duration::from_millis(30),
            hold: Duration::from_millis(3000),
            post_delete_delay: Duration::ZERO,
            blink_interval: Duration::from_millis(530),
        }
    }

    /// Terminal word timing: 150ms typing, 50ms deleting, 3s hold, 500ms blink.
    pub const fn terminal() -> Self {
        Self {
            type_interval: Duration::from_millis(150),
            delete_interval: Duration::from_millis(50),
            hold: Duration::from_millis(3000),
            post_delete_delay: Duration::ZERO,
            blink_interval: Duration::from_millis(500),
        }
    }

    /// Reject zero intervals that would let the cycle spin without time
    /// passing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("type_interval", self.type_interval),
            ("delete_interval", self.delete_interval),
            ("hold", self.hold),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        Ok(())
    }

    /// Delay to wait before executing a tick in `phase`.
    pub fn delay_for(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Typing => self.type_interval,
            Phase::Holding => self.hold,
            Phase::Deleting => self.delete_interval,
            Phase::Advancing => Duration::ZERO,
        }
    }
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self::hero()
    }
}

// =============================================================================
// TIMER-DRIVEN CYCLER
// =============================================================================

struct CyclerCore {
    phrases: PhraseSequence,
    config: CyclerConfig,
    scheduler: Scheduler,
    state: RefCell<CyclerState>,
    pending: Cell<Option<TimerId>>,
    disposed: Cell<bool>,
    display: Signal<String>,
    phrase_index: Signal<usize>,
    deleting: Signal<bool>,
}

/// Typewriter animation driven by a [`Scheduler`].
///
/// Configuration is fixed at construction. Outputs are read with the plain
/// getters or tracked reactively through the signal accessors.
pub struct TextCycler {
    core: Rc<CyclerCore>,
    blink: CursorBlink,
}

impl TextCycler {
    /// Validate the configuration and schedule the first tick.
    pub fn start(
        scheduler: &Scheduler,
        phrases: PhraseSequence,
        config: CyclerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = CyclerState::new();
        let core = Rc::new(CyclerCore {
            display: signal(state.display_text(&phrases).to_string()),
            phrase_index: signal(0),
            deleting: signal(false),
            phrases,
            config,
            scheduler: scheduler.clone(),
            state: RefCell::new(state),
            pending: Cell::new(None),
            disposed: Cell::new(false),
        });

        let first = config.delay_for(state.phase(&core.phrases));
        schedule_tick(&core, first);
        debug!(phrases = core.phrases.len(), "text cycler started");

        let blink = CursorBlink::start(scheduler, config.blink_interval);
        Ok(Self { core, blink })
    }

    /// Text currently shown.
    pub fn display_text(&self) -> String {
        let state = self.core.state.borrow();
        state.display_text(&self.core.phrases).to_string()
    }

    pub fn cursor_visible(&self) -> bool {
        self.blink.visible()
    }

    pub fn phrase_index(&self) -> usize {
        self.core.state.borrow().phrase_index()
    }

    /// Phrase currently being typed or deleted.
    pub fn current_phrase(&self) -> &str {
        self.core.phrases.get(self.phrase_index())
    }

    pub fn is_deleting(&self) -> bool {
        self.core.state.borrow().is_deleting()
    }

    pub fn phase(&self) -> Phase {
        self.core.state.borrow().phase(&self.core.phrases)
    }

    /// Snapshot of the state machine.
    pub fn state(&self) -> CyclerState {
        *self.core.state.borrow()
    }

    pub fn phrases(&self) -> &PhraseSequence {
        &self.core.phrases
    }

    pub fn config(&self) -> &CyclerConfig {
        &self.core.config
    }

    /// Whether a tick is scheduled. False only after disposal.
    pub fn is_running(&self) -> bool {
        self.core
            .pending
            .get()
            .is_some_and(|id| self.core.scheduler.is_pending(id))
    }

    /// Reactive display text.
    pub fn display_signal(&self) -> Signal<String> {
        self.core.display.clone()
    }

    /// Reactive phrase index.
    pub fn phrase_index_signal(&self) -> Signal<usize> {
        self.core.phrase_index.clone()
    }

    /// Reactive deleting flag.
    pub fn deleting_signal(&self) -> Signal<bool> {
        self.core.deleting.clone()
    }

    /// Reactive cursor visibility.
    pub fn cursor_signal(&self) -> Signal<bool> {
        self.blink.visible_signal()
    }

    /// Stop the animation. Equivalent to dropping the cycler.
    pub fn dispose(self) {}
}

impl Drop for TextCycler {
    fn drop(&mut self) {
        self.core.disposed.set(true);
        if let Some(id) = self.core.pending.take() {
            self.core.scheduler.cancel(id);
        }
        debug!("text cycler disposed");
    }
}

fn schedule_tick(core: &Rc<CyclerCore>, delay: Duration) {
    let weak: Weak<CyclerCore> = Rc::downgrade(core);
    let id = core.scheduler.schedule(delay, move || {
        if let Some(core) = weak.upgrade() {
            on_tick(&core);
        }
    });
    core.pending.set(Some(id));
}

fn on_tick(core: &Rc<CyclerCore>) {
    if core.disposed.get() {
        return;
    }
    core.pending.set(None);

    // Release the state borrow before touching signals: effects may read
    // the cycler synchronously.
    let (executed, state) = {
        let mut state = core.state.borrow_mut();
        let executed = state.tick(&core.phrases);
        (executed, *state)
    };

    let text = state.display_text(&core.phrases);
    trace!(?executed, text, "cycler tick");
    core.display.set(text.to_string());
    if executed == Phase::Advancing {
        core.phrase_index.set(state.phrase_index());
    }
    if matches!(executed, Phase::Holding | Phase::Advancing) {
        core.deleting.set(state.is_deleting());
    }

    // An effect may have dropped the cycler while signals were updating.
    if core.disposed.get() {
        return;
    }

    let mut delay = core.config.delay_for(state.phase(&core.phrases));
    if executed == Phase::Advancing {
        delay = delay.saturating_add(core.config.post_delete_delay);
    }
    schedule_tick(core, delay);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::{effect, flush_sync};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn seq(phrases: &[&str]) -> PhraseSequence {
        PhraseSequence::new(phrases.iter().copied()).unwrap()
    }

    fn fast() -> CyclerConfig {
        CyclerConfig {
            type_interval: ms(10),
            delete_interval: ms(5),
            hold: ms(100),
            post_delete_delay: Duration::ZERO,
            blink_interval: ms(500),
        }
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = PhraseSequence::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPhraseSequence));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let scheduler = Scheduler::new();
        let config = CyclerConfig {
            hold: Duration::ZERO,
            ..fast()
        };
        let err = TextCycler::start(&scheduler, seq(&["a"]), config).err().unwrap();
        assert!(matches!(err, ConfigError::ZeroInterval { field: "hold" }));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_typing_ticks() {
        let phrases = seq(&["Hi"]);
        let mut state = CyclerState::new();

        assert_eq!(state.tick(&phrases), Phase::Typing);
        assert_eq!(state.display_text(&phrases), "H");
        assert_eq!(state.tick(&phrases), Phase::Typing);
        assert_eq!(state.display_text(&phrases), "Hi");
        assert_eq!(state.phase(&phrases), Phase::Holding);
        assert!(!state.is_deleting());
    }

    #[test]
    fn test_deleting_then_advancing() {
        let phrases = seq(&["Hi", "Bye"]);
        let mut state = CyclerState::new();
        state.tick(&phrases);
        state.tick(&phrases);
        assert_eq!(state.tick(&phrases), Phase::Holding);
        assert!(state.is_deleting());
        assert_eq!(state.display_text(&phrases), "Hi");

        state.tick(&phrases);
        assert_eq!(state.display_text(&phrases), "H");
        state.tick(&phrases);
        assert_eq!(state.display_text(&phrases), "");
        assert!(state.is_deleting());

        assert_eq!(state.tick(&phrases), Phase::Advancing);
        assert!(!state.is_deleting());
        assert_eq!(state.phrase_index(), 1);
        assert_eq!(state.display_text(&phrases), "");
        assert_eq!(state.phase(&phrases), Phase::Typing);
    }

    #[test]
    fn test_single_phrase_loops() {
        let phrases = seq(&["X"]);
        let mut state = CyclerState::new();
        let executed: Vec<Phase> = (0..4).map(|_| state.tick(&phrases)).collect();

        assert_eq!(
            executed,
            vec![Phase::Typing, Phase::Holding, Phase::Deleting, Phase::Advancing]
        );
        assert_eq!(state, CyclerState::new());
    }

    #[test]
    fn test_empty_phrase_skips_to_hold() {
        let phrases = seq(&["", "ab"]);
        let mut state = CyclerState::new();

        assert_eq!(state.phase(&phrases), Phase::Holding);
        assert_eq!(state.tick(&phrases), Phase::Holding);
        assert_eq!(state.phase(&phrases), Phase::Advancing);
        assert_eq!(state.tick(&phrases), Phase::Advancing);
        assert_eq!(state.phrase_index(), 1);
        assert_eq!(state.phase(&phrases), Phase::Typing);
    }

    #[test]
    fn test_multibyte_prefix() {
        let phrases = seq(&["çağ"]);
        let mut state = CyclerState::new();
        state.tick(&phrases);
        state.tick(&phrases);
        assert_eq!(state.display_text(&phrases), "ça");
        state.tick(&phrases);
        assert_eq!(state.display_text(&phrases), "çağ");
        assert_eq!(state.phase(&phrases), Phase::Holding);
    }

    #[test]
    fn test_timed_typing_and_hold() {
        let scheduler = Scheduler::new();
        let cycler = TextCycler::start(&scheduler, seq(&["Hi"]), fast()).unwrap();
        assert_eq!(cycler.display_text(), "");

        scheduler.advance(ms(10));
        assert_eq!(cycler.display_text(), "H");
        scheduler.advance(ms(10));
        assert_eq!(cycler.display_text(), "Hi");
        assert_eq!(cycler.phase(), Phase::Holding);

        scheduler.advance(ms(99));
        assert!(!cycler.is_deleting());
        scheduler.advance(ms(1));
        assert!(cycler.is_deleting());
        assert_eq!(cycler.display_text(), "Hi");
    }

    #[test]
    fn test_timed_full_cycle_advances() {
        let scheduler = Scheduler::new();
        let cycler = TextCycler::start(&scheduler, seq(&["Hi", "Bye"]), fast()).unwrap();

        // type 2x10, hold 100, delete 2x5, advance at zero delay
        scheduler.advance(ms(20 + 100 + 10));
        assert_eq!(cycler.phrase_index(), 1);
        assert_eq!(cycler.current_phrase(), "Bye");
        assert!(!cycler.is_deleting());
        assert_eq!(cycler.display_text(), "");

        scheduler.advance(ms(10));
        assert_eq!(cycler.display_text(), "B");
    }

    #[test]
    fn test_post_delete_delay() {
        let scheduler = Scheduler::new();
        let config = CyclerConfig {
            post_delete_delay: ms(50),
            ..fast()
        };
        let cycler = TextCycler::start(&scheduler, seq(&["a", "b"]), config).unwrap();

        // type 10, hold 100, delete 5, advance 0
        scheduler.advance(ms(115));
        assert_eq!(cycler.phrase_index(), 1);

        scheduler.advance(ms(59));
        assert_eq!(cycler.display_text(), "");
        scheduler.advance(ms(1));
        assert_eq!(cycler.display_text(), "b");
    }

    #[test]
    fn test_dispose_cancels_ticks() {
        let scheduler = Scheduler::new();
        let cycler = TextCycler::start(&scheduler, seq(&["Hello"]), fast()).unwrap();
        let display = cycler.display_signal();
        assert!(cycler.is_running());

        scheduler.advance(ms(10));
        assert_eq!(display.get(), "H");

        cycler.dispose();
        assert_eq!(scheduler.pending(), 0);

        scheduler.advance(ms(10_000));
        assert_eq!(display.get(), "H");
    }

    #[test]
    fn test_signals_follow_state() {
        let scheduler = Scheduler::new();
        let cycler = TextCycler::start(&scheduler, seq(&["a", "b"]), fast()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        let display = cycler.display_signal();
        let _stop = effect(move || {
            seen_in.borrow_mut().push(display.get());
        });
        flush_sync();

        scheduler.advance(ms(10));
        flush_sync();
        assert_eq!(seen.borrow().last().map(String::as_str), Some("a"));

        scheduler.advance(ms(100));
        assert!(cycler.deleting_signal().get());
        assert_eq!(cycler.phrase_index_signal().get(), 0);

        // Deleting the last char and advancing happen at the same instant.
        scheduler.advance(ms(5));
        flush_sync();
        assert_eq!(seen.borrow().last().map(String::as_str), Some(""));
        assert_eq!(cycler.phrase_index_signal().get(), 1);
        assert!(!cycler.deleting_signal().get());
    }

    #[test]
    fn test_cursor_blinks_independently() {
        let scheduler = Scheduler::new();
        let cycler = TextCycler::start(&scheduler, seq(&["a"]), fast()).unwrap();

        assert!(cycler.cursor_visible());
        scheduler.advance(ms(500));
        assert!(!cycler.cursor_visible());
        scheduler.advance(ms(500));
        assert!(cycler.cursor_visible());
        assert!(cycler.cursor_signal().get());
    }
}
