//! One-line-per-node rendering of a document for comparisons.

use tolmark_core::{Document, Node};

/// Render every node as `type name [closeType] "content"`, indented by depth.
/// Attributes come before children and are prefixed with `@`. An empty name
/// renders as `''`.
pub fn describe(doc: &Document) -> Vec<String> {
    let mut lines = Vec::new();
    for root in doc.roots() {
        describe_node(root, 0, &mut lines);
    }
    lines
}

fn describe_node(node: Node<'_>, depth: usize, lines: &mut Vec<String>) {
    let mut line = "  ".repeat(depth);
    if node.parent().is_some() && node.node_type() == tolmark_core::NodeType::Attr {
        line.push('@');
    }
    line.push_str(node.node_type().name());
    match node.name() {
        Some("") => line.push_str(" ''"),
        Some(name) => {
            line.push(' ');
            line.push_str(name);
        }
        None => {}
    }
    if let Some(close_type) = node.close_type() {
        line.push_str(&format!(" [{}]", close_type.name()));
    }
    if let Some(content) = node.content() {
        line.push_str(&format!(" {content:?}"));
    }
    lines.push(line);

    for attr in node.attrs() {
        describe_node(attr, depth + 1, lines);
    }
    for child in node.children() {
        describe_node(child, depth + 1, lines);
    }
}
