//! Diagnostics carried by steps and the errors the reducer raises.

use thiserror::Error;

use crate::location::Cursor;

/// A diagnostic carried by an `Error` or `Warn` step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code}) at {cursor}")]
pub struct Wrong {
    pub code: u32,
    pub message: String,
    pub cursor: Cursor,
    /// Raw source fragment the diagnostic points at.
    pub fragment: Option<String>,
    pub detail: Option<String>,
    /// Opaque marker a tokenizer sets when a user error checker chose to
    /// tolerate this diagnostic.
    pub custom_ignore: Option<String>,
}

impl Wrong {
    pub fn new(code: u32, message: impl Into<String>, cursor: Cursor) -> Self {
        Self {
            code,
            message: message.into(),
            cursor,
            fragment: None,
            detail: None,
            custom_ignore: None,
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Failure of a reduction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// An `Error` step was reduced.
    #[error(transparent)]
    Step(#[from] Wrong),

    #[error("error step at {cursor} carried no diagnostic")]
    MissingErrorPayload { cursor: Cursor },
}

impl ReduceError {
    /// The diagnostic behind this error, if any.
    pub fn wrong(&self) -> Option<&Wrong> {
        match self {
            Self::Step(wrong) => Some(wrong),
            Self::MissingErrorPayload { .. } => None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Step(wrong) => wrong.cursor,
            Self::MissingErrorPayload { cursor } => *cursor,
        }
    }
}
