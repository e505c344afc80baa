//! Leniency options and their resolution.
//!
//! Each option is a policy: a boolean literal, a regular expression matched
//! against a candidate name, an enum literal, or a predicate evaluated against
//! live parse state. The resolvers below turn a configured policy into a
//! decision. They are used by tokenizers at every ambiguous point and by
//! tree-level policies such as [`check_allow_node_not_close`].
//!
//! All resolvers follow the same order:
//!
//! 1. unset: fall back to the caller's default (itself resolved the same way)
//! 2. predicate: call it, then interpret the returned [`Decision`]
//! 3. regex: test the candidate name
//! 4. boundary position literal: compare with the candidate position
//! 5. anything else: coerce to a boolean
//!
//! Resolution never fails. A value of an unexpected shape is coerced.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use phf::phf_map;
use regex::Regex;

use crate::context::ParseContext;
use crate::location::Cursor;
use crate::reduce::EventData;
use crate::step::{NodeType, Step, StepKind};
use crate::tree::NodeId;

// ============================================================================
// Option vocabulary
// ============================================================================

/// Side of a tag boundary whitespace was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryPosition {
    Left,
    Right,
}

impl BoundaryPosition {
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// What to do with a second `=` inside one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrMoreEqualDisposal {
    ThrowError,
    /// Keep the `=` as part of the value.
    Merge,
    /// Start a new attribute at the `=`.
    NewAttr,
}

/// What to do with a second `<` inside a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartTagMoreLeftBoundaryCharDisposal {
    ThrowError,
    Ignore,
    /// Append the character to the tag name.
    AccumulationToName,
    /// Treat it as the start of a sibling node.
    NewNode,
    /// Treat it as the start of a child node.
    ChildNode,
}

/// Name of a configurable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    /// Whitespace next to `<` or `>` of a start tag.
    AllowStartTagBoundaryNearSpace,
    /// Whitespace next to `</` or `>` of an end tag.
    AllowEndTagBoundaryNearSpace,
    /// Interior whitespace in a tag name.
    AllowTagNameHasSpace,
    /// A node left without an end tag.
    AllowNodeNotClose,
    AllowAttrNameEmpty,
    /// Line breaks inside a quoted attribute value.
    AllowAttrContentHasBr,
    /// Whitespace around an attribute's `=`.
    AllowNearAttrEqualSpace,
    /// Case-insensitive start/end tag name comparison.
    IgnoreTagNameCaseEqual,
    EncounterAttrMoreEqual,
    EncounterStartTagMoreLeftBoundaryChar,
}

static OPTION_NAMES: phf::Map<&'static str, OptionName> = phf_map! {
    "allowStartTagBoundaryNearSpace" => OptionName::AllowStartTagBoundaryNearSpace,
    "allowEndTagBoundaryNearSpace" => OptionName::AllowEndTagBoundaryNearSpace,
    "allowTagNameHasSpace" => OptionName::AllowTagNameHasSpace,
    "allowNodeNotClose" => OptionName::AllowNodeNotClose,
    "allowAttrNameEmpty" => OptionName::AllowAttrNameEmpty,
    "allowAttrContentHasBr" => OptionName::AllowAttrContentHasBr,
    "allowNearAttrEqualSpace" => OptionName::AllowNearAttrEqualSpace,
    "ignoreTagNameCaseEqual" => OptionName::IgnoreTagNameCaseEqual,
    "encounterAttrMoreEqual" => OptionName::EncounterAttrMoreEqual,
    "encounterStartTagMoreLeftBoundaryChar" => OptionName::EncounterStartTagMoreLeftBoundaryChar,
};

impl OptionName {
    pub fn name(self) -> &'static str {
        match self {
            Self::AllowStartTagBoundaryNearSpace => "allowStartTagBoundaryNearSpace",
            Self::AllowEndTagBoundaryNearSpace => "allowEndTagBoundaryNearSpace",
            Self::AllowTagNameHasSpace => "allowTagNameHasSpace",
            Self::AllowNodeNotClose => "allowNodeNotClose",
            Self::AllowAttrNameEmpty => "allowAttrNameEmpty",
            Self::AllowAttrContentHasBr => "allowAttrContentHasBr",
            Self::AllowNearAttrEqualSpace => "allowNearAttrEqualSpace",
            Self::IgnoreTagNameCaseEqual => "ignoreTagNameCaseEqual",
            Self::EncounterAttrMoreEqual => "encounterAttrMoreEqual",
            Self::EncounterStartTagMoreLeftBoundaryChar => "encounterStartTagMoreLeftBoundaryChar",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        OPTION_NAMES.get(name).copied()
    }

    /// Strict default: every leniency off, every disposal raises an error.
    pub fn default_value(self) -> OptionValue {
        match self {
            Self::EncounterAttrMoreEqual => {
                OptionValue::AttrMoreEqual(AttrMoreEqualDisposal::ThrowError)
            }
            Self::EncounterStartTagMoreLeftBoundaryChar => {
                OptionValue::StartTagMoreLeftBoundaryChar(
                    StartTagMoreLeftBoundaryCharDisposal::ThrowError,
                )
            }
            _ => OptionValue::Flag(false),
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Values and predicates
// ============================================================================

/// What a predicate returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(bool),
    Position(BoundaryPosition),
    AttrMoreEqual(AttrMoreEqualDisposal),
    StartTagMoreLeftBoundaryChar(StartTagMoreLeftBoundaryCharDisposal),
}

impl Decision {
    /// Only `Allow(false)` is false.
    pub fn truthy(self) -> bool {
        !matches!(self, Self::Allow(false))
    }
}

impl From<bool> for Decision {
    fn from(allow: bool) -> Self {
        Self::Allow(allow)
    }
}

/// Predicate evaluated against live parse state.
pub type Predicate = Arc<dyn Fn(&OptionQuery<'_>) -> Decision + Send + Sync>;

/// Callback fired once per reduced step.
pub type EventHandler = Arc<dyn Fn(StepKind, &ParseContext, EventData<'_>) + Send + Sync>;

/// A configured option value.
#[derive(Clone)]
pub enum OptionValue {
    Flag(bool),
    Pattern(Regex),
    Position(BoundaryPosition),
    AttrMoreEqual(AttrMoreEqualDisposal),
    StartTagMoreLeftBoundaryChar(StartTagMoreLeftBoundaryCharDisposal),
    Predicate(Predicate),
}

impl OptionValue {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&OptionQuery<'_>) -> Decision + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Only `Flag(false)` is false.
    pub fn truthy(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flag(a), Self::Flag(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Position(a), Self::Position(b)) => a == b,
            (Self::AttrMoreEqual(a), Self::AttrMoreEqual(b)) => a == b,
            (Self::StartTagMoreLeftBoundaryChar(a), Self::StartTagMoreLeftBoundaryChar(b)) => {
                a == b
            }
            (Self::Predicate(a), Self::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Position(position) => f.debug_tuple("Position").field(position).finish(),
            Self::AttrMoreEqual(d) => f.debug_tuple("AttrMoreEqual").field(d).finish(),
            Self::StartTagMoreLeftBoundaryChar(d) => {
                f.debug_tuple("StartTagMoreLeftBoundaryChar").field(d).finish()
            }
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<Regex> for OptionValue {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<BoundaryPosition> for OptionValue {
    fn from(position: BoundaryPosition) -> Self {
        Self::Position(position)
    }
}

impl From<AttrMoreEqualDisposal> for OptionValue {
    fn from(disposal: AttrMoreEqualDisposal) -> Self {
        Self::AttrMoreEqual(disposal)
    }
}

impl From<StartTagMoreLeftBoundaryCharDisposal> for OptionValue {
    fn from(disposal: StartTagMoreLeftBoundaryCharDisposal) -> Self {
        Self::StartTagMoreLeftBoundaryChar(disposal)
    }
}

/// Live parse state handed to predicates.
///
/// Every field is optional context; resolvers pass through whatever the
/// caller filled in.
#[derive(Clone, Copy, Default)]
pub struct OptionQuery<'q> {
    pub source: &'q str,
    pub cursor: Cursor,
    pub adapter: Option<&'q NodeAdapter>,
    pub steps: &'q [Step],
    /// Candidate name (tag name, attribute name, ...).
    pub name: Option<&'q str>,
    /// Candidate boundary position.
    pub position: Option<BoundaryPosition>,
    /// Node the decision is about, resolvable through `context`.
    pub node: Option<NodeId>,
    pub context: Option<&'q ParseContext>,
}

impl<'q> OptionQuery<'q> {
    pub fn new(source: &'q str, cursor: Cursor) -> Self {
        Self {
            source,
            cursor,
            ..Self::default()
        }
    }

    pub fn with_adapter(mut self, adapter: &'q NodeAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_steps(mut self, steps: &'q [Step]) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_name(mut self, name: &'q str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_position(mut self, position: BoundaryPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Query about `node` of `context`, seeded from the context's state.
    pub fn for_node(context: &'q ParseContext, node: NodeId) -> Self {
        Self {
            source: context.source(),
            cursor: context.cursor(),
            steps: context.steps(),
            name: context.document().get(node).and_then(|n| n.name()),
            node: Some(node),
            context: Some(context),
            ..Self::default()
        }
    }
}

// ============================================================================
// ParseOptions
// ============================================================================

/// Configuration of one parse.
#[derive(Clone, Default)]
pub struct ParseOptions {
    values: HashMap<OptionName, OptionValue>,
    on_event: Option<EventHandler>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: OptionName, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: OptionName, value: impl Into<OptionValue>) {
        self.values.insert(name, value.into());
    }

    pub fn unset(&mut self, name: OptionName) -> Option<OptionValue> {
        self.values.remove(&name)
    }

    pub fn get(&self, name: OptionName) -> Option<&OptionValue> {
        self.values.get(&name)
    }

    pub fn contains(&self, name: OptionName) -> bool {
        self.values.contains_key(&name)
    }

    /// Register the per-step event hook.
    pub fn on_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(StepKind, &ParseContext, EventData<'_>) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(handler));
        self
    }

    pub fn event_handler(&self) -> Option<&EventHandler> {
        self.on_event.as_ref()
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("values", &self.values)
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Node adapter's own say on whether its node may stay unclosed.
#[derive(Clone, Default)]
pub enum AllowNodeNotClose {
    /// Defer to the parse options.
    #[default]
    Unset,
    Allow,
    NotAllow,
    Predicate(Predicate),
}

impl fmt::Debug for AllowNodeNotClose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Allow => f.write_str("Allow"),
            Self::NotAllow => f.write_str("NotAllow"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Capability descriptor of the node parser handling the current node.
#[derive(Debug, Clone)]
pub struct NodeAdapter {
    pub node_type: NodeType,
    pub allow_node_not_close: AllowNodeNotClose,
}

impl NodeAdapter {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            allow_node_not_close: AllowNodeNotClose::Unset,
        }
    }

    pub fn with_allow_node_not_close(mut self, allow: AllowNodeNotClose) -> Self {
        self.allow_node_not_close = allow;
        self
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// How a resolver interprets regex and position values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rule {
    /// Test regex values against the candidate name.
    match_name: bool,
    /// Compare position literals with the candidate position.
    compare_position: bool,
    /// Compare a predicate's returned position with the candidate position.
    predicate_position: bool,
}

impl Rule {
    const COMMON: Rule = Rule {
        match_name: false,
        compare_position: false,
        predicate_position: false,
    };
    const TAG_NAME: Rule = Rule {
        match_name: true,
        ..Rule::COMMON
    };
    const BOUNDARY: Rule = Rule {
        match_name: true,
        compare_position: true,
        predicate_position: true,
    };
}

fn resolve(
    value: &OptionValue,
    query: &OptionQuery<'_>,
    candidate: Option<&str>,
    rule: Rule,
) -> bool {
    match value {
        OptionValue::Predicate(predicate) => match predicate(query) {
            Decision::Position(position) if rule.predicate_position => {
                query.position == Some(position)
            }
            decision => decision.truthy(),
        },
        OptionValue::Pattern(re) if rule.match_name => {
            candidate.is_some_and(|name| re.is_match(name))
        }
        OptionValue::Position(position) if rule.compare_position => {
            query.position == Some(*position)
        }
        other => other.truthy(),
    }
}

/// Option value, or `default` when unset.
fn configured<'v>(
    options: &'v ParseOptions,
    name: OptionName,
    default: &'v OptionValue,
) -> &'v OptionValue {
    options.get(name).unwrap_or(default)
}

/// Flag-or-predicate check. Regex and enum values count as set.
pub fn check_common_option(
    options: &ParseOptions,
    name: OptionName,
    default: &OptionValue,
    query: &OptionQuery<'_>,
) -> bool {
    resolve(configured(options, name, default), query, query.name, Rule::COMMON)
}

/// Whitespace-near-tag-boundary check.
///
/// Regex values match `query.name`; position values, and positions returned by
/// a predicate, must equal `query.position`.
pub fn check_tag_boundary_near_space(
    options: &ParseOptions,
    name: OptionName,
    default: &OptionValue,
    query: &OptionQuery<'_>,
) -> bool {
    resolve(configured(options, name, default), query, query.name, Rule::BOUNDARY)
}

/// Interior-whitespace-in-tag-name check. Regex values match `query.name`.
pub fn check_allow_tag_name_has_space(
    options: &ParseOptions,
    default: &OptionValue,
    query: &OptionQuery<'_>,
) -> bool {
    let value = configured(options, OptionName::AllowTagNameHasSpace, default);
    resolve(value, query, query.name, Rule::TAG_NAME)
}

/// Generic allow check.
///
/// Regex values, configured or default, are tested against `test_value`.
/// Predicates get `query` untouched. For a configured
/// `allowStartTagBoundaryNearSpace` a position literal is compared with
/// `query.position` when one is given; a default is only coerced.
pub fn check_option_allow(
    options: &ParseOptions,
    name: OptionName,
    default: &OptionValue,
    test_value: &str,
    query: &OptionQuery<'_>,
) -> bool {
    let (value, compare_position) = match options.get(name) {
        Some(value) => (
            value,
            name == OptionName::AllowStartTagBoundaryNearSpace && query.position.is_some(),
        ),
        None => (default, false),
    };
    let rule = Rule {
        match_name: true,
        compare_position,
        predicate_position: false,
    };
    resolve(value, query, Some(test_value), rule)
}

/// A type an option can be computed into.
pub trait OptionSetting: Sized {
    fn from_value(value: &OptionValue) -> Option<Self>;
    fn from_decision(decision: Decision) -> Option<Self>;
}

impl OptionSetting for bool {
    fn from_value(value: &OptionValue) -> Option<Self> {
        Some(value.truthy())
    }

    fn from_decision(decision: Decision) -> Option<Self> {
        Some(decision.truthy())
    }
}

impl OptionSetting for BoundaryPosition {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Position(position) => Some(*position),
            _ => None,
        }
    }

    fn from_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::Position(position) => Some(position),
            _ => None,
        }
    }
}

impl OptionSetting for AttrMoreEqualDisposal {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::AttrMoreEqual(disposal) => Some(*disposal),
            _ => None,
        }
    }

    fn from_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::AttrMoreEqual(disposal) => Some(disposal),
            _ => None,
        }
    }
}

impl OptionSetting for StartTagMoreLeftBoundaryCharDisposal {
    fn from_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::StartTagMoreLeftBoundaryChar(disposal) => Some(*disposal),
            _ => None,
        }
    }

    fn from_decision(decision: Decision) -> Option<Self> {
        match decision {
            Decision::StartTagMoreLeftBoundaryChar(disposal) => Some(disposal),
            _ => None,
        }
    }
}

/// Resolve an option to the value it configures rather than a gate.
///
/// A value or predicate result of the wrong shape yields `default`.
pub fn compute_option<T: OptionSetting>(
    options: &ParseOptions,
    name: OptionName,
    default: T,
    query: &OptionQuery<'_>,
) -> T {
    let Some(value) = options.get(name) else {
        return default;
    };
    let computed = match value {
        OptionValue::Predicate(predicate) => T::from_decision(predicate(query)),
        other => T::from_value(other),
    };
    computed.unwrap_or_else(|| {
        log::debug!(target: "tolmark.option", "{name} has an unexpected shape: {value:?}");
        default
    })
}

/// What an allow-node-not-close decision is about.
#[derive(Clone, Copy)]
pub enum NotCloseSubject<'q> {
    /// The single open ancestor the unclosed content belongs to.
    Node(NodeId),
    /// Only a bare candidate name is known.
    Pending {
        name: Option<&'q str>,
        cursor: Cursor,
        steps: &'q [Step],
    },
}

/// May a node remain unclosed?
///
/// The adapter decides first. When it is silent the options decide, from
/// `options` or else the context's own; an unset option means no. A regex is
/// tested against the subject node's name, or the pending name.
pub fn check_allow_node_not_close(
    context: &ParseContext,
    adapter: &NodeAdapter,
    subject: NotCloseSubject<'_>,
    options: Option<&ParseOptions>,
) -> bool {
    let query = match subject {
        NotCloseSubject::Node(node) => OptionQuery::for_node(context, node).with_adapter(adapter),
        NotCloseSubject::Pending { name, cursor, steps } => OptionQuery {
            source: context.source(),
            cursor,
            adapter: Some(adapter),
            steps,
            name,
            context: Some(context),
            ..OptionQuery::default()
        },
    };

    match &adapter.allow_node_not_close {
        AllowNodeNotClose::Allow => return true,
        AllowNodeNotClose::NotAllow => return false,
        AllowNodeNotClose::Predicate(predicate) => return predicate(&query).truthy(),
        AllowNodeNotClose::Unset => {}
    }

    let options = options.unwrap_or_else(|| context.options());
    let Some(value) = options.get(OptionName::AllowNodeNotClose) else {
        return false;
    };
    let candidate = match subject {
        NotCloseSubject::Node(_) => Some(query.name.unwrap_or_default()),
        NotCloseSubject::Pending { name, .. } => name,
    };
    let rule = Rule {
        match_name: candidate.is_some(),
        ..Rule::COMMON
    };
    resolve(value, &query, candidate, rule)
}

/// Is the option set to anything but `false`?
pub fn is_true_option(name: OptionName, options: Option<&ParseOptions>) -> bool {
    options.and_then(|o| o.get(name)).is_some_and(OptionValue::truthy)
}

/// Does the option equal `value`? A missing or `false` option compares
/// `value` with `default` instead.
pub fn equal_option(
    name: OptionName,
    value: &OptionValue,
    options: Option<&ParseOptions>,
    default: Option<&OptionValue>,
) -> bool {
    match options.and_then(|o| o.get(name)).filter(|v| v.truthy()) {
        Some(configured) => configured == value,
        None => default == Some(value),
    }
}

// ============================================================================
// Tests
// ============================================================================
