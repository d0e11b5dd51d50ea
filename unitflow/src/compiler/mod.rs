//! Pipeline compiler and runtime.
//!
//! [`PipelineCompiler::compile`] turns a graph into a [`Program`]: one statement per unit
//! in topological order, with upstream tokens rewritten into references to the defining
//! statement, and the output units as the final return. Nothing is executed at compile
//! time. [`Program::run`] interprets the program later with the engine's collaborators;
//! for an acyclic graph its outputs equal those of a sequential engine run.
//!
//! Partial graphs compile: unconnected units get their own statements, and tokens that
//! name no upstream unit stay as text.

mod parse;
mod program;
mod runtime;

use crate::graph::{topological_order, Graph, GraphError, NodeId, Token, UnitKind};
use crate::template::{Segment, Template};

pub use parse::ProgramParseError;
pub use program::{Part, Program, Statement};
pub use runtime::{ProgramOutput, ProgramRunError};

/// Compiles graphs into pipeline programs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineCompiler;

impl PipelineCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles `graph`. Fails only when the graph's own bookkeeping is inconsistent.
    pub fn compile(&self, graph: &Graph) -> Result<Program, GraphError> {
        graph.verify()?;
        let mut program = Program::default();

        for id in topological_order(graph) {
            let Some(node) = graph.node(&id) else {
                continue;
            };
            let sources: Vec<NodeId> = graph
                .incoming(&id)
                .map(|(_, edge)| edge.from.clone())
                .collect();
            let kind = node.kind();
            if kind == UnitKind::Output {
                program.outputs.push(id.clone());
            }

            let statement = match kind {
                UnitKind::Input if sources.is_empty() => Statement::Input {
                    id,
                    default: node.template().to_string(),
                },
                UnitKind::Output if sources.is_empty() => Statement::Text {
                    id,
                    value: node.template().to_string(),
                },
                UnitKind::Input | UnitKind::Output => Statement::Join { id, sources },
                UnitKind::Ai => Statement::Complete {
                    parts: parts(graph, node.template(), &sources, false),
                    id,
                },
                UnitKind::Custom => {
                    let mut inputs: Vec<(String, NodeId)> = Vec::new();
                    for source in &sources {
                        let Some(token) = graph.token(source) else {
                            continue;
                        };
                        if !inputs.iter().any(|(_, s)| s == source) {
                            inputs.push((token.name().to_string(), source.clone()));
                        }
                    }
                    Statement::Evaluate {
                        parts: parts(graph, node.template(), &sources, true),
                        inputs,
                        id,
                    }
                }
            };
            program.statements.push(statement);
        }
        Ok(program)
    }

    /// Compiles `graph` straight to program text.
    pub fn export(&self, graph: &Graph) -> Result<String, GraphError> {
        self.compile(graph).map(|p| p.to_string())
    }
}

/// Splits a template into text and references to the upstream units it names.
fn parts(graph: &Graph, template: &str, sources: &[NodeId], quoted: bool) -> Vec<Part> {
    let tokens: Vec<(Token, &NodeId)> = sources
        .iter()
        .filter_map(|s| graph.token(s).map(|t| (t, s)))
        .collect();

    let mut parts: Vec<Part> = Vec::new();
    for segment in Template::parse(template).segments() {
        match segment {
            Segment::Text(text) => push_text(&mut parts, text),
            Segment::Token(tok) => match tokens.iter().find(|(t, _)| t.as_str() == *tok) {
                Some((t, source)) => {
                    let source = (*source).clone();
                    let token = t.as_str().to_string();
                    parts.push(if quoted {
                        Part::Quote { source, token }
                    } else {
                        Part::Ref { source, token }
                    });
                }
                None => push_text(&mut parts, tok),
            },
        }
    }
    parts
}

/// Appends text, merging with a preceding text part.
fn push_text(parts: &mut Vec<Part>, text: &str) {
    if let Some(Part::Text(last)) = parts.last_mut() {
        last.push_str(text);
    } else if !text.is_empty() {
        parts.push(Part::Text(text.to_string()));
    }
}
