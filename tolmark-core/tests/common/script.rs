//! Step scripting with automatic cursors.
//!
//! Every step advances the cursor by one column; `newline` moves to the next
//! line. Tests only care that cursors are distinct and ordered.

use tolmark_core::{CloseType, Cursor, NodeNature, NodeType, Step, StepKind, StepPayload, Wrong};

#[derive(Debug, Clone)]
pub struct Script {
    line: u32,
    column: u32,
    offset: usize,
    steps: Vec<Step>,
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl Script {
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
            steps: Vec::new(),
        }
    }

    /// Cursor the next step will get.
    pub fn peek(&self) -> Cursor {
        Cursor::new(self.line, self.column, self.offset)
    }

    fn advance(&mut self) -> Cursor {
        let cursor = self.peek();
        self.column += 1;
        self.offset += 1;
        cursor
    }

    pub fn newline(mut self) -> Self {
        self.line += 1;
        self.column = 1;
        self.offset += 1;
        self
    }

    pub fn push(mut self, kind: StepKind, payload: StepPayload) -> Self {
        let cursor = self.advance();
        self.steps.push(Step::new(kind, cursor).with_payload(payload));
        self
    }

    pub fn step(self, kind: StepKind) -> Self {
        self.push(kind, StepPayload::None)
    }

    pub fn start(self, node_type: NodeType) -> Self {
        self.push(StepKind::NodeStart, StepPayload::NodeType(node_type))
    }

    pub fn start_custom(self, nature: NodeNature) -> Self {
        self.push(
            StepKind::NodeStart,
            StepPayload::Nature {
                node_type: NodeType::Custom,
                nature,
            },
        )
    }

    pub fn text(self, kind: StepKind, text: &str) -> Self {
        self.push(kind, StepPayload::Text(text.to_string()))
    }

    pub fn close(self, kind: StepKind, close_type: CloseType) -> Self {
        self.push(
            kind,
            StepPayload::Close {
                node_type: NodeType::Element,
                close_type: Some(close_type),
            },
        )
    }

    pub fn error(mut self, code: u32, message: &str) -> Self {
        let cursor = self.advance();
        self.steps.push(Step::error(Wrong::new(code, message, cursor)));
        self
    }

    pub fn warn(mut self, code: u32, message: &str) -> Self {
        let cursor = self.advance();
        self.steps.push(Step::warn(Wrong::new(code, message, cursor)));
        self
    }

    /// `name` as a bare NodeNameStart/NodeNameEnd pair.
    pub fn name(self, name: &str) -> Self {
        self.step(StepKind::NodeNameStart).text(StepKind::NodeNameEnd, name)
    }

    /// `content` as a NodeContentStart/NodeContentEnd pair.
    pub fn content(self, content: &str) -> Self {
        self.step(StepKind::NodeContentStart).text(StepKind::NodeContentEnd, content)
    }

    /// A complete `name="value"` attribute.
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.start(NodeType::Attr)
            .name(name)
            .step(StepKind::AttrEqual)
            .text(StepKind::AttrLeftBoundary, "\"")
            .content(value)
            .text(StepKind::AttrRightBoundary, "\"")
            .step(StepKind::NodeEnd)
    }

    /// A complete text node.
    pub fn text_node(self, content: &str) -> Self {
        self.start(NodeType::Text).content(content).step(StepKind::NodeEnd)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn build(self) -> Vec<Step> {
        self.steps
    }
}
