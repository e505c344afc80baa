//! Fixture loading from YAML files

use serde::Deserialize;
use std::path::Path;

use tolmark_core::{CloseType, NodeNature, NodeType, Step, StepKind, StepPayload};

use super::Script;

/// A single test case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub steps: Vec<FixtureStep>,
    pub tree: Vec<String>,
    #[serde(default)]
    pub error: Option<u32>,
    #[serde(default)]
    pub warnings: Vec<u32>,
}

/// A step - either a bare kind name or [kind, payload]
///
/// The payload is read according to the kind: a node type or `custom:nature`
/// for `nodeStart`, a close type for `startTagEnd`/`nodeEnd`, `code:message`
/// for `error`/`warn`, text otherwise. The pseudo-step `newline` moves the
/// cursor to the next line.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixtureStep {
    Bare(String),
    WithPayload(String, String),
}

impl FixtureStep {
    fn kind(&self) -> &str {
        match self {
            FixtureStep::Bare(kind) | FixtureStep::WithPayload(kind, _) => kind,
        }
    }

    fn payload(&self) -> Option<&str> {
        match self {
            FixtureStep::Bare(_) => None,
            FixtureStep::WithPayload(_, payload) => Some(payload),
        }
    }
}

impl TestCase {
    /// Turn the fixture's steps into real steps.
    pub fn script(&self) -> Vec<Step> {
        let mut script = Script::new();
        for fixture in &self.steps {
            if fixture.kind() == "newline" {
                script = script.newline();
                continue;
            }
            let kind = StepKind::from_name(fixture.kind())
                .unwrap_or_else(|| panic!("{}: unknown step kind {:?}", self.id, fixture.kind()));
            script = match (kind, fixture.payload()) {
                (_, None) => script.step(kind),
                (StepKind::NodeStart, Some(payload)) => match payload.split_once(':') {
                    Some((_, nature)) => script.start_custom(
                        NodeNature::from_name(nature)
                            .unwrap_or_else(|| panic!("{}: unknown nature {nature:?}", self.id)),
                    ),
                    None => script.start(NodeType::from_name(payload).unwrap_or_else(|| {
                        panic!("{}: unknown node type {payload:?}", self.id)
                    })),
                },
                (StepKind::StartTagEnd | StepKind::NodeEnd, Some(payload)) => script.push(
                    kind,
                    StepPayload::Close {
                        node_type: NodeType::Element,
                        close_type: CloseType::from_name(payload),
                    },
                ),
                (StepKind::Error | StepKind::Warn, Some(payload)) => {
                    let (code, message) = payload.split_once(':').unwrap_or(("0", payload));
                    let code = code.trim().parse().unwrap_or(0);
                    if kind == StepKind::Error {
                        script.error(code, message.trim())
                    } else {
                        script.warn(code, message.trim())
                    }
                }
                (_, Some(payload)) => script.text(kind, payload),
            };
        }
        script.build()
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
