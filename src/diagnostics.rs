//! Diagnostics attached to a parse.
//!
//! Malformed template text never aborts a parse; the parser recovers and
//! records what it saw. Diagnostics are plain values on the [`Parse`], not
//! `Err` returns.
//!
//! [`Parse`]: crate::Parse

use std::fmt;

use text_size::TextRange;
use thiserror::Error;

use crate::kind::TemplateKind;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// A block was still open when the input ended.
    #[error("unterminated {block:?}")]
    UnterminatedBlock { block: TemplateKind },
    /// An end delimiter of a different block kind appeared inside a block.
    #[error("{found:?} cannot close a block expecting {expected:?}")]
    MismatchedDelimiter {
        found:    TemplateKind,
        expected: TemplateKind,
    },
    /// An end delimiter appeared with no block open; it is kept as literal
    /// text.
    #[error("{found:?} has no block to close")]
    StrayEndDelimiter { found: TemplateKind },
}

/// A diagnostic with the source range it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind:  DiagnosticKind,
    pub range: TextRange,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, range: TextRange) -> Self {
        Self { kind, range }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:?}", self.kind, self.range)
    }
}
