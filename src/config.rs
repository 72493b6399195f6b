//! Page configuration loaded from TOML.
//!
//! Every table and field is optional. Missing values fall back to the
//! portfolio defaults, so an empty file is a valid config.
//!
//! ```toml
//! [hero]
//! phrases = ["Building intelligent systems.", "From research to production."]
//! type_interval_ms = 80
//! hold_ms = 3000
//!
//! [terminal]
//! phrases = ["RISE", "LEARN", "CODE", "BUILD"]
//!
//! [reveal]
//! threshold = 0.1
//!
//! [navigation]
//! sections = ["hero", "venture", "blog", "experience", "work", "contact"]
//! activation_offset = 200.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::state::{
    CyclerConfig, DEFAULT_REVEAL_THRESHOLD, PhraseSequence, SectionTrackerConfig, TextCycler,
};
use crate::timer::Scheduler;

const HERO_PHRASES: [&str; 4] = [
    "Building intelligent systems.",
    "From research to production.",
    "Computer vision meets LLM.",
    "Transforming data into decisions.",
];

const TERMINAL_WORDS: [&str; 4] = ["RISE", "LEARN", "CODE", "BUILD"];

const SECTIONS: [&str; 6] = ["hero", "venture", "blog", "experience", "work", "contact"];

// =============================================================================
// RESOLVED CONFIG
// =============================================================================

/// Phrases plus timing for one cycler on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclerSpec {
    pub phrases: PhraseSequence,
    pub timing: CyclerConfig,
}

impl CyclerSpec {
    /// Start a cycler with these phrases and this timing.
    pub fn start(&self, scheduler: &Scheduler) -> Result<TextCycler, ConfigError> {
        TextCycler::start(scheduler, self.phrases.clone(), self.timing)
    }
}

/// Fully resolved page configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// Rotating headline in the hero section.
    pub hero: CyclerSpec,
    /// Word cycler in the terminal panel.
    pub terminal: CyclerSpec,
    pub reveal_threshold: f32,
    /// Navigable section ids, in page order.
    pub sections: Vec<String>,
    pub section_tracking: SectionTrackerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            hero: CyclerSpec {
                phrases: PhraseSequence::from_static(&HERO_PHRASES),
                timing: CyclerConfig::hero(),
            },
            terminal: CyclerSpec {
                phrases: PhraseSequence::from_static(&TERMINAL_WORDS),
                timing: CyclerConfig::terminal(),
            },
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            sections: SECTIONS.iter().map(|s| s.to_string()).collect(),
            section_tracking: SectionTrackerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSiteConfig = toml::from_str(text)?;
        let config = raw.resolve();
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded site config");
        Ok(config)
    }

    /// Check every constraint the components enforce at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hero.timing.validate()?;
        self.terminal.timing.validate()?;
        let threshold = self.reveal_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        if self.sections.is_empty() {
            return Err(ConfigError::EmptySectionList);
        }
        self.section_tracking.validate()
    }
}

// =============================================================================
// TOML SHAPE
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSiteConfig {
    hero: RawCycler,
    terminal: RawCycler,
    reveal: RawReveal,
    navigation: RawNavigation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCycler {
    phrases: Option<PhraseSequence>,
    type_interval_ms: Option<u64>,
    delete_interval_ms: Option<u64>,
    hold_ms: Option<u64>,
    post_delete_delay_ms: Option<u64>,
    blink_interval_ms: Option<u64>,
}

impl RawCycler {
    fn resolve(self, fallback: CyclerSpec) -> CyclerSpec {
        let base = fallback.timing;
        let ms = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_millis);
        CyclerSpec {
            phrases: self.phrases.unwrap_or(fallback.phrases),
            timing: CyclerConfig {
                type_interval: ms(self.type_interval_ms, base.type_interval),
                delete_interval: ms(self.delete_interval_ms, base.delete_interval),
                hold: ms(self.hold_ms, base.hold),
                post_delete_delay: ms(self.post_delete_delay_ms, base.post_delete_delay),
                blink_interval: ms(self.blink_interval_ms, base.blink_interval),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawReveal {
    threshold: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawNavigation {
    sections: Option<Vec<String>>,
    activation_offset: Option<f32>,
    scrolled_threshold: Option<f32>,
}

impl RawSiteConfig {
    fn resolve(self) -> SiteConfig {
        let defaults = SiteConfig::default();
        let tracking = defaults.section_tracking;
        SiteConfig {
            hero: self.hero.resolve(defaults.hero),
            terminal: self.terminal.resolve(defaults.terminal),
            reveal_threshold: self.reveal.threshold.unwrap_or(defaults.reveal_threshold),
            sections: self.navigation.sections.unwrap_or(defaults.sections),
            section_tracking: SectionTrackerConfig {
                activation_offset: self
                    .navigation
                    .activation_offset
                    .unwrap_or(tracking.activation_offset),
                scrolled_threshold: self
                    .navigation
                    .scrolled_threshold
                    .unwrap_or(tracking.scrolled_threshold),
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
