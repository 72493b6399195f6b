//! # spark-typewriter
//!
//! Typewriter text cycling, cursor blink and viewport reveal state for
//! reactive UIs.
//!
//! Built on [spark-signals](https://crates.io/crates/spark-signals): every
//! component publishes its output as a `Signal`, so render effects update
//! only when the text, cursor or reveal flag actually changes.
//!
//! ## Architecture
//!
//! All components are single-threaded and cooperative. Time comes from a
//! [`Scheduler`] (cancellable one-shot timers on a clock the caller
//! advances), and external notifications come from [`EventSource`]s
//! (scroll, pointer, click, intersection). Each component owns its state
//! exclusively and cancels its timers and subscriptions on drop.
//!
//! ```text
//! Scheduler ──tick──▶ TextCycler ──▶ display / cursor signals ──▶ render effect
//! EventSource<IntersectionEntry> ──▶ RevealTracker ──▶ seen signal
//! EventSource<ScrollMetrics> ──▶ SectionTracker ──▶ active / scrolled / progress
//! ```
//!
//! ## Modules
//!
//! - [`timer`] - Cancellable one-shot timers on a cooperative clock
//! - [`events`] - Event sources with subscribe/unsubscribe pairs
//! - [`state`] - Cycler, blink, reveal, section, pointer and disclosure state
//! - [`config`] - TOML page configuration

pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod timer;

pub use config::{CyclerSpec, SiteConfig};
pub use error::ConfigError;
pub use events::{EventSource, Subscription};
pub use timer::{Scheduler, TimerId};

pub use state::{
    // Cycler
    CyclerConfig, CyclerState, Phase, PhraseSequence, TextCycler,
    // Blink
    CursorBlink, DEFAULT_BLINK_INTERVAL,
    // Reveal
    DEFAULT_REVEAL_THRESHOLD, ElementId, IntersectionEntry, RevealTracker,
    // Sections
    DEFAULT_ACTIVATION_OFFSET, DEFAULT_SCROLLED_THRESHOLD, ScrollMetrics, Section,
    SectionTracker, SectionTrackerConfig, active_section,
    // Pointer
    FOLLOWER_HALF_SIZE, HOVER_SCALE, PointerEvent, PointerFollower,
    // Disclosure
    Accordion, ClickEvent, MenuToggle,
};
