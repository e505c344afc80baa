//! tolmark core
//!
//! Tolerant markup tree construction. A tokenizer turns XML/HTML-like text
//! into a flat sequence of steps; this crate replays those steps into a node
//! tree with source locations, and resolves the leniency options tokenizers
//! consult at every ambiguous point.
//!
//! # Architecture
//!
//! - **step.rs** - Step kinds, payloads and node vocabulary
//! - **history.rs** - Append-only step log and per-node index ranges
//! - **location.rs** - Cursor and nested location records
//! - **tree.rs** - Node arena and navigation handles
//! - **context.rs** - Per-parse mutable state
//! - **reduce.rs** - The step reducer
//! - **option.rs** - Option values and resolvers
//! - **error.rs** - Diagnostics and reducer errors

pub mod context;
pub mod error;
pub mod history;
pub mod location;
pub mod option;
pub mod reduce;
pub mod step;
pub mod tree;

pub use context::{ParseContext, ParseResult};
pub use error::{ReduceError, Wrong};
pub use location::{Cursor, LocationInfo, Span, TagLocation};
pub use option::{
    check_allow_node_not_close, check_allow_tag_name_has_space, check_common_option,
    check_option_allow, check_tag_boundary_near_space, compute_option, AllowNodeNotClose,
    Decision, NodeAdapter, NotCloseSubject, OptionName, OptionQuery, OptionValue, ParseOptions,
};
pub use reduce::{build, parse_steps, reduce, EventData};
pub use step::{CloseType, NodeNature, NodeType, Step, StepKind, StepPayload};
pub use tree::{Document, Node, NodeId};
