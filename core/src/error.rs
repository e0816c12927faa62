//! Error taxonomy for parse failures.
//!
//! Only whole-parse failures are represented here. Individual malformed
//! lines are recovered silently during scanning and never surface as errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters of input echoed back in a failure preview.
const PREVIEW_CHARS: usize = 200;

/// Errors that abort a parse run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is empty or whitespace-only.
    #[error("empty log content")]
    EmptyInput,

    /// No `PLAY RECAP` marker anywhere in the input.
    #[error("no recap section found")]
    NoRecapFound,

    /// Recap marker present but no host lines followed it.
    #[error("recap section contains no host lines")]
    EmptyRecap,

    /// Any other fault during scanning, caught at the parse boundary.
    #[error("internal parser fault: {0}")]
    Internal(String),
}

impl ParseError {
    /// The machine-readable tag for this error.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::EmptyInput => ParseErrorKind::EmptyInput,
            Self::NoRecapFound => ParseErrorKind::NoRecapFound,
            Self::EmptyRecap => ParseErrorKind::EmptyRecap,
            Self::Internal(_) => ParseErrorKind::Internal,
        }
    }
}

/// Machine-readable error classification carried in a [`ParseFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    EmptyInput,
    NoRecapFound,
    EmptyRecap,
    Internal,
}

/// Structured failure attached to an unsuccessful parse result.
///
/// Carries the error kind, a human-readable message, and a bounded preview
/// of the offending input for operator diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub kind: ParseErrorKind,
    pub message: String,
    pub preview: String,
}

impl ParseFailure {
    /// Builds a failure from an error and the raw input it was raised on.
    pub fn new(error: ParseError, raw_content: &str) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            preview: preview_of(raw_content),
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of the input, char-boundary safe.
fn preview_of(raw_content: &str) -> String {
    raw_content.chars().take(PREVIEW_CHARS).collect()
}

/// Convenience alias for internal parser results.
pub type Result<T> = std::result::Result<T, ParseError>;
