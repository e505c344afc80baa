//! Step reducer: folds a step sequence into a node tree.
//!
//! [`reduce`] works against a [`ParseContext`]: it fires the options' event
//! hook for every step and raises `Error` steps. [`build`] is the side-effect
//! free variant used for sub-parses: no events, and `Error` steps are only
//! recorded.
//!
//! Both share one dispatch. Per step:
//!
//! 1. log the step and attribute it to the node it concerns
//! 2. raise the max line/column high-water mark (context only)
//! 3. mutate the tree according to the step kind
//! 4. fire the event hook, then raise if the step is an error (context only)
//! 5. stop if the loop callback says so

use crate::context::{ParseContext, ParseResult};
use crate::error::{ReduceError, Wrong};
use crate::location::{Span, TagLocation};
use crate::option::ParseOptions;
use crate::step::{CloseType, NodeType, Step, StepKind, StepPayload};
use crate::tree::{Document, NodeId};

/// Early-stop hook: called after each step with the step and its index in the
/// sequence being reduced. Returning `true` stops the reduction.
pub type LoopCallback<'a> = &'a mut dyn FnMut(&Step, usize) -> bool;

/// What the event hook receives alongside each step.
#[derive(Debug, Clone, Copy)]
pub enum EventData<'a> {
    /// The node the step concerns. For `NodeEnd` this is the node just closed.
    Node(Option<NodeId>),
    /// The diagnostic of an `Error` step.
    Wrong(&'a Wrong),
}

/// Result of applying one step.
struct Applied {
    index: u32,
    created: Option<NodeId>,
}

/// Reduce `steps` into `context`, returning the root nodes they created.
///
/// An `Error` step is reported to the event hook and then returned as the
/// error; the context keeps everything reduced up to and including it.
pub fn reduce<I>(
    steps: I,
    context: &mut ParseContext,
    mut loop_callback: Option<LoopCallback<'_>>,
) -> Result<Vec<NodeId>, ReduceError>
where
    I: IntoIterator<Item = Step>,
{
    let mut roots = Vec::new();
    let mut event_node = context.current;

    for (position, step) in steps.into_iter().enumerate() {
        let kind = step.kind;
        let cursor = step.cursor;
        context.track_max(cursor);

        let applied = apply_step(&mut context.document, &mut context.current, step);
        if let Some(created) = applied.created {
            event_node = Some(created);
            if context.document.get(created).is_some_and(|n| n.parent().is_none()) {
                roots.push(created);
            }
        }
        context.document.log_mut().set_target(applied.index, event_node);
        context.set_cursor(cursor);

        match kind {
            StepKind::Error => {
                let wrong = context
                    .document
                    .log()
                    .get(applied.index)
                    .and_then(|s| s.payload.wrong())
                    .cloned();
                return Err(match wrong {
                    Some(wrong) => {
                        fire_event(context, kind, EventData::Wrong(&wrong));
                        ReduceError::Step(wrong)
                    }
                    None => {
                        fire_event(context, kind, EventData::Node(event_node));
                        ReduceError::MissingErrorPayload { cursor }
                    }
                });
            }
            StepKind::Warn => {
                let warning = context
                    .document
                    .log()
                    .get(applied.index)
                    .and_then(|s| s.payload.wrong())
                    .cloned();
                if let Some(warning) = warning {
                    log::debug!(target: "tolmark.reduce", "warning: {warning}");
                    context.warnings.push(warning);
                }
                fire_event(context, kind, EventData::Node(event_node));
            }
            StepKind::NodeEnd => {
                fire_event(context, kind, EventData::Node(event_node));
                event_node = context.current;
            }
            _ => fire_event(context, kind, EventData::Node(event_node)),
        }

        if stop_requested(&mut loop_callback, &context.document, applied.index, position) {
            break;
        }
    }

    Ok(roots)
}

/// Build a standalone document from `steps` without a context.
///
/// No events fire and `Error` steps do not stop the build.
pub fn build<I>(steps: I, mut loop_callback: Option<LoopCallback<'_>>) -> Document
where
    I: IntoIterator<Item = Step>,
{
    let mut document = Document::new();
    let mut current = None;
    let mut event_node = None;

    for (position, step) in steps.into_iter().enumerate() {
        let kind = step.kind;
        let applied = apply_step(&mut document, &mut current, step);
        if applied.created.is_some() {
            event_node = applied.created;
        }
        document.log_mut().set_target(applied.index, event_node);
        if kind == StepKind::NodeEnd {
            event_node = current;
        }

        if stop_requested(&mut loop_callback, &document, applied.index, position) {
            break;
        }
    }

    document
}

/// Reduce a complete step sequence for `source`, folding a raised error into
/// the result.
pub fn parse_steps<I>(source: impl Into<String>, steps: I, options: ParseOptions) -> ParseResult
where
    I: IntoIterator<Item = Step>,
{
    let mut context = ParseContext::with_source(source, options);
    let error = reduce(steps, &mut context, None).err();
    context.into_result(error)
}

fn stop_requested(
    loop_callback: &mut Option<LoopCallback<'_>>,
    document: &Document,
    index: u32,
    position: usize,
) -> bool {
    match (loop_callback.as_deref_mut(), document.log().get(index)) {
        (Some(callback), Some(step)) => callback(step, position),
        _ => false,
    }
}

fn fire_event(context: &ParseContext, kind: StepKind, data: EventData<'_>) {
    if let Some(handler) = context.options().event_handler() {
        handler(kind, context, data);
    }
}

/// Apply one step to the tree and append it to the log.
fn apply_step(document: &mut Document, current: &mut Option<NodeId>, step: Step) -> Applied {
    let index = document.log().next_index();
    let cursor = step.cursor;
    log::trace!(target: "tolmark.reduce", "step {index} {} at {cursor}", step.kind);

    if step.kind == StepKind::NodeStart {
        let node_type = step.payload.node_type().unwrap_or_else(|| {
            log::debug!(target: "tolmark.reduce", "nodeStart at {cursor} without node type");
            NodeType::Element
        });
        let id = document.attach(node_type, cursor, *current);
        if let Some(node) = document.data_mut(id) {
            node.nature = step.payload.nature();
            node.steps.push(index);
        }
        *current = Some(id);
        document.log_mut().push(step);
        return Applied { index, created: Some(id) };
    }

    let Some(node_id) = *current else {
        if step.kind.is_structural() {
            log::debug!(
                target: "tolmark.reduce",
                "{} at {cursor} with no open node",
                step.kind
            );
        }
        document.log_mut().push(step);
        return Applied { index, created: None };
    };
    let Some(node) = document.data_mut(node_id) else {
        document.log_mut().push(step);
        return Applied { index, created: None };
    };
    let location = &mut node.location;

    match step.kind {
        StepKind::StartTagStart => {
            node.steps.push(index);
            location.start_tag = Some(TagLocation::open(cursor));
        }
        StepKind::NodeNameStart => {
            node.steps.push(index);
            location.open_name(cursor);
        }
        StepKind::NodeNameEnd => {
            node.steps.push(index);
            // An empty name is still a name: `allowAttrNameEmpty` attributes
            // and empty end tag names assign it.
            if let StepPayload::Text(name) = &step.payload {
                node.name = Some(name.clone());
            }
            location.close_name(cursor);
        }
        StepKind::AttrEqual => {
            node.steps.push(index);
            node.equal_count += 1;
        }
        StepKind::AttrLeftBoundary => {
            if let Some(boundary) = step.payload.text() {
                node.steps.push(index);
                node.boundary_char = boundary.to_string();
                location.left_boundary = Some(cursor);
            }
        }
        StepKind::AttrRightBoundary => {
            if let Some(boundary) = step.payload.text() {
                node.content.get_or_insert_with(String::new);
                node.steps.push(index);
                node.boundary_char.push_str(boundary);
                location.right_boundary = Some(cursor);
            }
        }
        StepKind::StartTagEnd => {
            if let Some(close_type) = step.payload.close_type() {
                node.close_type = Some(close_type);
            }
            node.steps.push(index);
            if let Some(tag) = location.start_tag.as_mut() {
                tag.span.close(cursor);
            }
        }
        StepKind::NodeContentStart => {
            node.steps.push(index);
            location.content = Some(Span::open(cursor));
        }
        StepKind::NodeContentEnd => {
            node.steps.push(index);
            if let Some(content) = step.payload.text() {
                node.content = Some(content.to_string());
            }
            if let Some(span) = location.content.as_mut() {
                span.close(cursor);
            }
        }
        StepKind::EndTagStart => {
            node.steps.push(index);
            location.end_tag = Some(TagLocation::open(cursor));
        }
        StepKind::EndTagEnd => {
            node.steps.push(index);
            if let Some(tag) = location.end_tag.as_mut() {
                tag.span.close(cursor);
            }
        }
        StepKind::NodeEnd => {
            location.span.close(cursor);
            if let Some(close_type) = step.payload.close_type() {
                node.close_type = Some(resolve_close_type(node.close_type, close_type));
            }
            node.steps.push(index);
            *current = node.parent;
        }
        StepKind::NodeStart
        | StepKind::AttrsStart
        | StepKind::AttrsEnd
        | StepKind::Error
        | StepKind::Warn => {
            node.steps.push(index);
        }
    }

    document.log_mut().push(step);
    Applied { index, created: None }
}

/// Close type after a `NodeEnd` carrying `incoming`.
///
/// A start-tag-closed node is never downgraded to not-closed by its end.
fn resolve_close_type(existing: Option<CloseType>, incoming: CloseType) -> CloseType {
    match (existing, incoming) {
        (Some(CloseType::StartTagClosed), CloseType::NotClosed) => CloseType::StartTagClosed,
        (_, incoming) => incoming,
    }
}
