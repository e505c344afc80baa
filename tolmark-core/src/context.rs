//! Per-parse mutable state threaded through reduction.

use crate::error::{ReduceError, Wrong};
use crate::location::Cursor;
use crate::option::ParseOptions;
use crate::step::Step;
use crate::tree::{Document, Node, NodeId};

/// State of one parse.
///
/// Create one per parse and pass it to [`crate::reduce::reduce`]. After a
/// failed reduction the context still holds the partial tree, the warnings and
/// the furthest position reached.
#[derive(Debug, Default)]
pub struct ParseContext {
    source: String,
    cursor: Cursor,
    pub(crate) document: Document,
    pub(crate) current: Option<NodeId>,
    max_line: u32,
    max_column: u32,
    pub(crate) warnings: Vec<Wrong>,
    options: ParseOptions,
}

impl ParseContext {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Context for a parse of `source`. The source is only read by option
    /// predicates.
    pub fn with_source(source: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            source: source.into(),
            options,
            ..Self::default()
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Position of the last reduced step.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Root-level nodes reduced so far.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.document.roots()
    }

    /// Innermost node still open.
    pub fn current_node(&self) -> Option<Node<'_>> {
        self.current.and_then(|id| self.document.get(id))
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.current
    }

    /// Every step reduced so far.
    pub fn steps(&self) -> &[Step] {
        self.document.log().as_slice()
    }

    pub fn warnings(&self) -> &[Wrong] {
        &self.warnings
    }

    /// Highest line number any step reached.
    pub fn max_line(&self) -> u32 {
        self.max_line
    }

    /// Highest column any step reached, on any line.
    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    pub(crate) fn track_max(&mut self, cursor: Cursor) {
        self.max_line = self.max_line.max(cursor.line);
        self.max_column = self.max_column.max(cursor.column);
    }

    /// Finish the parse, folding in the error that stopped it, if any.
    pub fn into_result(self, error: Option<ReduceError>) -> ParseResult {
        ParseResult {
            max_line: self.max_line,
            max_column: self.max_column,
            source: self.source,
            document: self.document,
            error,
            warnings: self.warnings,
        }
    }
}

/// Outcome of a complete parse.
#[derive(Debug)]
pub struct ParseResult {
    pub max_line: u32,
    pub max_column: u32,
    pub source: String,
    pub document: Document,
    pub error: Option<ReduceError>,
    pub warnings: Vec<Wrong>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
