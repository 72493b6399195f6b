//! Configuration errors.
//!
//! Every failure in this crate happens at construction time. Once a cycler,
//! tracker or follower exists it has no failure modes left.

use std::path::PathBuf;

/// Error raised when a component or page configuration is malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("phrase sequence must contain at least one phrase")]
    EmptyPhraseSequence,

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("reveal threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f32),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("section list must contain at least one section")]
    EmptySectionList,

    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}
