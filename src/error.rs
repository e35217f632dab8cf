use std::path::PathBuf;

use crate::matcher::StreamState;

/// Every error sift can produce. Displayed as user-facing messages.
#[derive(Debug)]
pub enum SiftError {
    /// The supplied pattern does not compile to a valid rule.
    /// Fatal at construction — rebuild the matcher with a valid pattern.
    Pattern {
        pattern: String,
        reason: String,
    },
    /// An operation was invoked on a matcher that is no longer open.
    /// Caller programming error, always fatal to that call.
    State {
        op: &'static str,
        state: StreamState,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for SiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern { pattern, reason } => {
                write!(f, "invalid pattern \"{pattern}\": {reason}")
            }
            Self::State { op, state } => {
                write!(f, "cannot {op}: matcher is {state}")
            }
            Self::Io { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SiftError {}

impl SiftError {
    /// Exit code for the CLI.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } => 2,
            Self::Pattern { .. } => 3,
            Self::State { .. } => 4,
        }
    }
}
