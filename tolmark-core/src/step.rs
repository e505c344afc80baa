//! Parse steps - the input of the reducer.
//!
//! A tokenizer scans the source once and emits a flat sequence of steps.
//! Structure is represented by start/end step pairs:
//!
//! ```text
//! <div a="1">hi</div>
//!
//! NodeStart(element)
//!   StartTagStart
//!     NodeNameStart  NodeNameEnd("div")
//!     NodeStart(attr)
//!       NodeNameStart  NodeNameEnd("a")
//!       AttrEqual
//!       AttrLeftBoundary("\"")
//!       NodeContentStart  NodeContentEnd("1")
//!       AttrRightBoundary("\"")
//!     NodeEnd
//!   StartTagEnd(element, fullClosed)
//!   NodeStart(text)  NodeContentStart  NodeContentEnd("hi")  NodeEnd
//!   EndTagStart  NodeNameStart  NodeNameEnd("div")  EndTagEnd
//! NodeEnd(element, fullClosed)
//! ```
//!
//! Steps carry their wire names (`nodeStart`, `attrEqual`, ...) so tokenizers
//! and fixtures written against the string form can be read back.

use std::fmt;

use phf::phf_map;

use crate::error::Wrong;
use crate::location::Cursor;

/// Kind of lexical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    NodeStart,
    NodeEnd,
    NodeNameStart,
    NodeNameEnd,
    StartTagStart,
    StartTagEnd,
    EndTagStart,
    EndTagEnd,
    AttrsStart,
    AttrsEnd,
    AttrEqual,
    AttrLeftBoundary,
    AttrRightBoundary,
    NodeContentStart,
    NodeContentEnd,
    Error,
    Warn,
}

static STEP_KINDS: phf::Map<&'static str, StepKind> = phf_map! {
    "nodeStart" => StepKind::NodeStart,
    "nodeEnd" => StepKind::NodeEnd,
    "nodeNameStart" => StepKind::NodeNameStart,
    "nodeNameEnd" => StepKind::NodeNameEnd,
    "startTagStart" => StepKind::StartTagStart,
    "startTagEnd" => StepKind::StartTagEnd,
    "endTagStart" => StepKind::EndTagStart,
    "endTagEnd" => StepKind::EndTagEnd,
    "attrsStart" => StepKind::AttrsStart,
    "attrsEnd" => StepKind::AttrsEnd,
    "attrEqual" => StepKind::AttrEqual,
    "attrLeftBoundary" => StepKind::AttrLeftBoundary,
    "attrRightBoundary" => StepKind::AttrRightBoundary,
    "nodeContentStart" => StepKind::NodeContentStart,
    "nodeContentEnd" => StepKind::NodeContentEnd,
    "error" => StepKind::Error,
    "warn" => StepKind::Warn,
};

impl StepKind {
    /// Wire name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::NodeStart => "nodeStart",
            Self::NodeEnd => "nodeEnd",
            Self::NodeNameStart => "nodeNameStart",
            Self::NodeNameEnd => "nodeNameEnd",
            Self::StartTagStart => "startTagStart",
            Self::StartTagEnd => "startTagEnd",
            Self::EndTagStart => "endTagStart",
            Self::EndTagEnd => "endTagEnd",
            Self::AttrsStart => "attrsStart",
            Self::AttrsEnd => "attrsEnd",
            Self::AttrEqual => "attrEqual",
            Self::AttrLeftBoundary => "attrLeftBoundary",
            Self::AttrRightBoundary => "attrRightBoundary",
            Self::NodeContentStart => "nodeContentStart",
            Self::NodeContentEnd => "nodeContentEnd",
            Self::Error => "error",
            Self::Warn => "warn",
        }
    }

    /// Look up a kind by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        STEP_KINDS.get(name).copied()
    }

    /// Check if this kind mutates the tree when a node is open.
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::AttrsStart | Self::AttrsEnd | Self::Error | Self::Warn)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of node a `NodeStart` step opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// `<span>`
    Element,
    Text,
    Attr,
    /// `<!-- -->`
    Comment,
    /// `<![CDATA[ ]]>`
    Cdata,
    /// `<? ?>`
    ProcessingInstruction,
    /// `<!DOCTYPE >`
    Dtd,
    /// Produced by a user-supplied node parser.
    Custom,
}

static NODE_TYPES: phf::Map<&'static str, NodeType> = phf_map! {
    "element" => NodeType::Element,
    "text" => NodeType::Text,
    "attr" => NodeType::Attr,
    "comment" => NodeType::Comment,
    "cdata" => NodeType::Cdata,
    "processingInstruction" => NodeType::ProcessingInstruction,
    "dtd" => NodeType::Dtd,
    "custom" => NodeType::Custom,
};

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Text => "text",
            Self::Attr => "attr",
            Self::Comment => "comment",
            Self::Cdata => "cdata",
            Self::ProcessingInstruction => "processingInstruction",
            Self::Dtd => "dtd",
            Self::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        NODE_TYPES.get(name).copied()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a node was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseType {
    /// Closed by its own end tag: `<a></a>`.
    FullClosed,
    /// `<br/>`
    SelfClosing,
    /// Start tag closed, no end tag: `<br>`.
    StartTagClosed,
    NotClosed,
}

static CLOSE_TYPES: phf::Map<&'static str, CloseType> = phf_map! {
    "fullClosed" => CloseType::FullClosed,
    "selfCloseing" => CloseType::SelfClosing,
    "selfClosing" => CloseType::SelfClosing,
    "startTagClosed" => CloseType::StartTagClosed,
    "notClosed" => CloseType::NotClosed,
};

impl CloseType {
    pub fn name(self) -> &'static str {
        match self {
            Self::FullClosed => "fullClosed",
            Self::SelfClosing => "selfClosing",
            Self::StartTagClosed => "startTagClosed",
            Self::NotClosed => "notClosed",
        }
    }

    /// Look up a close type by wire name. Accepts the legacy `selfCloseing`
    /// spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        CLOSE_TYPES.get(name).copied()
    }
}

/// Whether a custom node stands alone or can hold children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeNature {
    Alone,
    Children,
}

impl NodeNature {
    pub fn name(self) -> &'static str {
        match self {
            Self::Alone => "alone",
            Self::Children => "children",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "alone" => Some(Self::Alone),
            "children" => Some(Self::Children),
            _ => None,
        }
    }
}

/// Data carried by a step.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StepPayload {
    #[default]
    None,
    /// Node type of a `NodeStart`.
    NodeType(NodeType),
    /// Name, content or boundary text.
    Text(String),
    /// Diagnostic of an `Error` or `Warn` step.
    Wrong(Wrong),
    /// Node type plus close type, carried by `StartTagEnd` and `NodeEnd`.
    Close {
        node_type: NodeType,
        close_type: Option<CloseType>,
    },
    /// Node type plus nature, carried by a custom node's `NodeStart`.
    Nature { node_type: NodeType, nature: NodeNature },
}

impl StepPayload {
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Self::NodeType(node_type)
            | Self::Close { node_type, .. }
            | Self::Nature { node_type, .. } => Some(*node_type),
            _ => None,
        }
    }

    pub fn close_type(&self) -> Option<CloseType> {
        match self {
            Self::Close { close_type, .. } => *close_type,
            _ => None,
        }
    }

    pub fn nature(&self) -> Option<NodeNature> {
        match self {
            Self::Nature { nature, .. } => Some(*nature),
            _ => None,
        }
    }

    /// Text, if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn wrong(&self) -> Option<&Wrong> {
        match self {
            Self::Wrong(wrong) => Some(wrong),
            _ => None,
        }
    }
}

/// One lexical event.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub cursor: Cursor,
    pub payload: StepPayload,
}

impl Step {
    #[inline]
    pub fn new(kind: StepKind, cursor: Cursor) -> Self {
        Self { kind, cursor, payload: StepPayload::None }
    }

    #[inline]
    pub fn with_payload(mut self, payload: StepPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn node_start(node_type: NodeType, cursor: Cursor) -> Self {
        Self::new(StepKind::NodeStart, cursor).with_payload(StepPayload::NodeType(node_type))
    }

    pub fn text(kind: StepKind, text: impl Into<String>, cursor: Cursor) -> Self {
        Self::new(kind, cursor).with_payload(StepPayload::Text(text.into()))
    }

    pub fn close(
        kind: StepKind,
        node_type: NodeType,
        close_type: Option<CloseType>,
        cursor: Cursor,
    ) -> Self {
        Self::new(kind, cursor).with_payload(StepPayload::Close { node_type, close_type })
    }

    pub fn error(wrong: Wrong) -> Self {
        Self::new(StepKind::Error, wrong.cursor).with_payload(StepPayload::Wrong(wrong))
    }

    pub fn warn(wrong: Wrong) -> Self {
        Self::new(StepKind::Warn, wrong.cursor).with_payload(StepPayload::Wrong(wrong))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        for kind in [
            StepKind::NodeStart,
            StepKind::AttrLeftBoundary,
            StepKind::NodeContentEnd,
            StepKind::Warn,
        ] {
            assert_eq!(StepKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StepKind::from_name("nodestart"), None);
        assert_eq!(
            NodeType::from_name("processingInstruction"),
            Some(NodeType::ProcessingInstruction)
        );
        assert_eq!(CloseType::from_name("selfCloseing"), Some(CloseType::SelfClosing));
        assert_eq!(NodeNature::from_name("children"), Some(NodeNature::Children));
    }

    #[test]
    fn test_payload_accessors() {
        let close = StepPayload::Close {
            node_type: NodeType::Element,
            close_type: Some(CloseType::StartTagClosed),
        };
        assert_eq!(close.node_type(), Some(NodeType::Element));
        assert_eq!(close.close_type(), Some(CloseType::StartTagClosed));
        assert_eq!(close.text(), None);

        assert_eq!(StepPayload::Text(String::new()).text(), None);
        assert_eq!(StepPayload::Text("a".into()).text(), Some("a"));
    }

    #[test]
    fn test_structural() {
        assert!(StepKind::AttrEqual.is_structural());
        assert!(!StepKind::AttrsStart.is_structural());
        assert!(!StepKind::Warn.is_structural());
    }
}
