//! Unit records stored in the graph: id, kind-specific payload, editor position.
//!
//! A node's behavior is chosen by its [`Unit`] variant; each variant carries only the
//! text its processor needs (a literal value, a prompt, or code).

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable, unique node identifier (e.g. `input-1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Closed set of unit kinds. `openai` is accepted as an alias of `ai` for documents
/// saved by older editors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Input,
    Output,
    #[serde(alias = "openai")]
    Ai,
    Custom,
}

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Input,
        UnitKind::Output,
        UnitKind::Ai,
        UnitKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Input => "input",
            UnitKind::Output => "output",
            UnitKind::Ai => "ai",
            UnitKind::Custom => "custom",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            "ai" | "openai" => Ok(Self::Ai),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "unknown unit type: {} (use input, output, ai, or custom)",
                s
            )),
        }
    }
}

/// Kind-specific payload of a node.
///
/// - `Input`: the user-supplied value, used when the node has no incoming edges.
/// - `Output`: text shown until upstream values arrive.
/// - `Ai`: prompt template, substituted and sent to the completion client.
/// - `Custom`: code template, substituted and handed to the code evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Unit {
    Input {
        #[serde(default)]
        value: String,
    },
    Output {
        #[serde(default)]
        text: String,
    },
    #[serde(alias = "openai")]
    Ai {
        #[serde(default)]
        prompt: String,
    },
    Custom {
        #[serde(default)]
        code: String,
    },
}

impl Unit {
    /// Builds the variant for `kind` holding `template` as its text.
    pub fn new(kind: UnitKind, template: impl Into<String>) -> Self {
        let template = template.into();
        match kind {
            UnitKind::Input => Unit::Input { value: template },
            UnitKind::Output => Unit::Output { text: template },
            UnitKind::Ai => Unit::Ai { prompt: template },
            UnitKind::Custom => Unit::Custom { code: template },
        }
    }

    pub fn input(value: impl Into<String>) -> Self {
        Self::new(UnitKind::Input, value)
    }

    pub fn output() -> Self {
        Self::new(UnitKind::Output, "")
    }

    pub fn ai(prompt: impl Into<String>) -> Self {
        Self::new(UnitKind::Ai, prompt)
    }

    pub fn custom(code: impl Into<String>) -> Self {
        Self::new(UnitKind::Custom, code)
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Input { .. } => UnitKind::Input,
            Unit::Output { .. } => UnitKind::Output,
            Unit::Ai { .. } => UnitKind::Ai,
            Unit::Custom { .. } => UnitKind::Custom,
        }
    }

    /// The user-edited text of this unit, whatever its kind.
    pub fn template(&self) -> &str {
        match self {
            Unit::Input { value } => value,
            Unit::Output { text } => text,
            Unit::Ai { prompt } => prompt,
            Unit::Custom { code } => code,
        }
    }

    pub(crate) fn set_template(&mut self, template: String) {
        match self {
            Unit::Input { value } => *value = template,
            Unit::Output { text } => *text = template,
            Unit::Ai { prompt } => *prompt = template,
            Unit::Custom { code } => *code = template,
        }
    }
}

/// Editor canvas position. Carried through serialization only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One graph vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub unit: Unit,
    pub position: Option<Position>,
    /// Inputs not yet arrived; kept equal to the in-degree by the graph store.
    pub(crate) ready_count: usize,
}

impl Node {
    pub(crate) fn new(id: NodeId, unit: Unit) -> Self {
        Self {
            id,
            unit,
            position: None,
            ready_count: 0,
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.unit.kind()
    }

    pub fn template(&self) -> &str {
        self.unit.template()
    }

    pub fn ready_count(&self) -> usize {
        self.ready_count
    }
}
