//! Source positions and the nested location records attached to nodes.
//!
//! Every block starts out open (only `start` known) and is closed when the
//! construct it describes ends. A closed block never ends before it starts.

use std::fmt;

/// Position in the source at the moment a step fired.
///
/// Field order gives the derived ordering document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    /// Absolute character offset.
    pub offset: usize,
}

impl Cursor {
    #[inline]
    pub const fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A located fragment: opened at `start`, closed once `end` is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Cursor,
    pub end: Option<Cursor>,
}

impl Span {
    #[inline]
    pub fn open(start: Cursor) -> Self {
        Self { start, end: None }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Record the end position. An end before `start` is clamped to `start`.
    pub fn close(&mut self, cursor: Cursor) {
        if cursor < self.start {
            log::debug!(
                target: "tolmark.location",
                "end {cursor} precedes start {}, clamping",
                self.start
            );
            self.end = Some(self.start);
        } else {
            self.end = Some(cursor);
        }
    }
}

/// Location of a start or end tag with its name nested inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLocation {
    pub span: Span,
    pub name: Option<Span>,
}

impl TagLocation {
    #[inline]
    pub fn open(start: Cursor) -> Self {
        Self { span: Span::open(start), name: None }
    }
}

/// Full location record of a node.
///
/// Attribute locations are not duplicated here; they are the `LocationInfo`
/// of each attribute node, see [`crate::tree::Node::attr_locations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    pub span: Span,
    pub start_tag: Option<TagLocation>,
    pub end_tag: Option<TagLocation>,
    pub name: Option<Span>,
    pub content: Option<Span>,
    pub left_boundary: Option<Cursor>,
    pub right_boundary: Option<Cursor>,
}

impl LocationInfo {
    pub fn new(start: Cursor) -> Self {
        Self {
            span: Span::open(start),
            start_tag: None,
            end_tag: None,
            name: None,
            content: None,
            left_boundary: None,
            right_boundary: None,
        }
    }

    #[inline]
    pub fn start(&self) -> Cursor {
        self.span.start
    }

    #[inline]
    pub fn end(&self) -> Option<Cursor> {
        self.span.end
    }

    /// Open a name block: the start tag's name if it has none yet, else the
    /// end tag's name, else the bare name if it has none yet.
    pub(crate) fn open_name(&mut self, cursor: Cursor) {
        if let Some(tag) = self.start_tag.as_mut().filter(|tag| tag.name.is_none()) {
            tag.name = Some(Span::open(cursor));
        } else if let Some(tag) = self.end_tag.as_mut() {
            tag.name = Some(Span::open(cursor));
        } else if self.name.is_none() {
            self.name = Some(Span::open(cursor));
        }
    }

    /// Close the name block chosen with the same priority as [`Self::open_name`],
    /// skipping a start tag name that is already closed.
    pub(crate) fn close_name(&mut self, cursor: Cursor) {
        let start_tag_name = self
            .start_tag
            .as_mut()
            .and_then(|tag| tag.name.as_mut())
            .filter(|name| !name.is_closed());
        if let Some(name) = start_tag_name {
            name.close(cursor);
            return;
        }
        if let Some(name) = self.end_tag.as_mut().and_then(|tag| tag.name.as_mut()) {
            name.close(cursor);
            return;
        }
        if let Some(name) = self.name.as_mut() {
            name.close(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_order() {
        assert!(Cursor::new(1, 9, 8) < Cursor::new(2, 1, 10));
        assert!(Cursor::new(2, 1, 10) < Cursor::new(2, 3, 12));
        assert_eq!(Cursor::new(3, 4, 20).to_string(), "3:4");
    }

    #[test]
    fn test_span_close_clamps() {
        let mut span = Span::open(Cursor::new(2, 5, 14));
        span.close(Cursor::new(1, 1, 0));
        assert_eq!(span.end, Some(Cursor::new(2, 5, 14)));

        span.close(Cursor::new(2, 9, 18));
        assert_eq!(span.end, Some(Cursor::new(2, 9, 18)));
    }

    #[test]
    fn test_name_priority() {
        let mut loc = LocationInfo::new(Cursor::new(1, 1, 0));
        loc.start_tag = Some(TagLocation::open(Cursor::new(1, 1, 0)));

        loc.open_name(Cursor::new(1, 2, 1));
        loc.close_name(Cursor::new(1, 5, 4));
        let name = loc.start_tag.and_then(|t| t.name).unwrap();
        assert_eq!(name.end, Some(Cursor::new(1, 5, 4)));

        loc.end_tag = Some(TagLocation::open(Cursor::new(1, 10, 9)));
        loc.open_name(Cursor::new(1, 12, 11));
        loc.close_name(Cursor::new(1, 15, 14));
        let end_name = loc.end_tag.and_then(|t| t.name).unwrap();
        assert_eq!(end_name.start, Cursor::new(1, 12, 11));
        assert_eq!(end_name.end, Some(Cursor::new(1, 15, 14)));
        assert!(loc.name.is_none());
    }

    #[test]
    fn test_bare_name() {
        let mut loc = LocationInfo::new(Cursor::new(1, 1, 0));
        loc.open_name(Cursor::new(1, 1, 0));
        loc.close_name(Cursor::new(1, 4, 3));
        assert_eq!(loc.name.unwrap().end, Some(Cursor::new(1, 4, 3)));
    }
}
