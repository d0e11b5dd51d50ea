//! Pipeline program: one statement per unit, in topological order.
//!
//! Text form:
//!
//! ```text
//! # unitflow pipeline
//! pipeline {
//!   input "input-1" default "hello"
//!   complete "ai-1" <- "Say " ref("input-1", "$input_1") " loudly"
//!   evaluate "custom-1" <- "upper(" quote("ai-1", "$ai_1") ")" with "ai_1" = "ai-1"
//!   join "output-1" <- "custom-1"
//!   text "output-2" = "idle"
//!   return "output-1", "output-2"
//! }
//! ```
//!
//! Every string is a JSON string literal, so a statement always fits on one line.

use std::fmt;

use crate::graph::NodeId;
use crate::template::quote;

/// Piece of a prompt or code template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    Text(String),
    /// Upstream value inserted as-is; `token` is kept when the source has no value.
    Ref { source: NodeId, token: String },
    /// Upstream value inserted as a quoted string literal.
    Quote { source: NodeId, token: String },
}

/// One unit's computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// Input unit without incoming edges: the caller's value for `id`, else `default`.
    Input { id: NodeId, default: String },
    /// Output unit without incoming edges: fixed text.
    Text { id: NodeId, value: String },
    /// Input or output unit with incoming edges: defined source values joined by newline.
    Join { id: NodeId, sources: Vec<NodeId> },
    /// Ai unit: render the prompt, call the completion client.
    Complete { id: NodeId, parts: Vec<Part> },
    /// Custom unit: render the code, evaluate it with `inputs` (name, source) bound.
    Evaluate {
        id: NodeId,
        parts: Vec<Part>,
        inputs: Vec<(String, NodeId)>,
    },
}

impl Statement {
    /// Unit defined by this statement.
    pub fn id(&self) -> &NodeId {
        match self {
            Statement::Input { id, .. }
            | Statement::Text { id, .. }
            | Statement::Join { id, .. }
            | Statement::Complete { id, .. }
            | Statement::Evaluate { id, .. } => id,
        }
    }
}

/// Compiled pipeline: statements plus the output units it returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub outputs: Vec<NodeId>,
}

impl Program {
    /// True when some statement calls the completion client.
    pub fn calls_completion(&self) -> bool {
        self.statements
            .iter()
            .any(|s| matches!(s, Statement::Complete { .. }))
    }
}

fn q(id: &NodeId) -> String {
    quote(id.as_str())
}

fn write_parts(f: &mut fmt::Formatter<'_>, parts: &[Part]) -> fmt::Result {
    if parts.is_empty() {
        return f.write_str(" \"\"");
    }
    for part in parts {
        match part {
            Part::Text(text) => write!(f, " {}", quote(text))?,
            Part::Ref { source, token } => write!(f, " ref({}, {})", q(source), quote(token))?,
            Part::Quote { source, token } => {
                write!(f, " quote({}, {})", q(source), quote(token))?
            }
        }
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, ids: &[NodeId]) -> fmt::Result {
    let list = ids.iter().map(q).collect::<Vec<_>>().join(", ");
    if !list.is_empty() {
        write!(f, " {}", list)?;
    }
    Ok(())
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Input { id, default } => {
                write!(f, "input {} default {}", q(id), quote(default))
            }
            Statement::Text { id, value } => write!(f, "text {} = {}", q(id), quote(value)),
            Statement::Join { id, sources } => {
                write!(f, "join {} <-", q(id))?;
                write_list(f, sources)
            }
            Statement::Complete { id, parts } => {
                write!(f, "complete {} <-", q(id))?;
                write_parts(f, parts)
            }
            Statement::Evaluate { id, parts, inputs } => {
                write!(f, "evaluate {} <-", q(id))?;
                write_parts(f, parts)?;
                if !inputs.is_empty() {
                    let bound = inputs
                        .iter()
                        .map(|(name, source)| format!("{} = {}", quote(name), q(source)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, " with {}", bound)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# unitflow pipeline")?;
        writeln!(f, "pipeline {{")?;
        for statement in &self.statements {
            writeln!(f, "  {}", statement)?;
        }
        write!(f, "  return")?;
        write_list(f, &self.outputs)?;
        writeln!(f)?;
        writeln!(f, "}}")
    }
}
