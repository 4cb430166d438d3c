//! Error types shared by every pipeline stage.
//!
//! Each variant carries enough context (stage, file, lane) for an operator
//! to locate the failing input without rerunning under a debugger. Nothing
//! here is retried: the computation is deterministic, so a failure at one
//! stage terminates the run.

use std::fmt;
use std::path::PathBuf;

/// Pipeline stage that produced an error or log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    Merge,
    Training,
    Expansion,
    Projection,
    Write,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Merge => "merge",
            Stage::Training => "training",
            Stage::Expansion => "expansion",
            Stage::Projection => "projection",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source row could not be parsed or coerced.
    #[error("{stage}: malformed input in {path} (line {line}): {reason}")]
    MalformedInput {
        stage: Stage,
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// Too few usable rows to split and cross-validate.
    #[error("{stage}: insufficient data, {rows} usable rows but at least {required} are required")]
    InsufficientData {
        stage: Stage,
        rows: usize,
        required: usize,
    },

    /// A lane needed for prediction has no known distance.
    #[error("{stage}: no distance known for lane {origin} -> {destination}")]
    MissingDistance {
        stage: Stage,
        origin: i64,
        destination: i64,
    },

    /// Hyperparameter combination outside its valid range.
    #[error("invalid hyperparameters: {0}")]
    InvalidHyperParams(String),

    /// Trainer or pipeline settings that cannot be honoured.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file present but unreadable or not valid TOML.
    #[error("failed to load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("{stage}: i/o error on {path}: {source}")]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
