//! Interpreter for pipeline programs.
//!
//! Statements run top to bottom against a store keyed by unit id, using the same
//! collaborators as the engine. A reference to a unit with no value yet renders its
//! token unchanged, and a join skips it.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::engine::{error_marker, join_values, RunContext};
use crate::error::NodeFailure;
use crate::evaluator::USER_CODE_ERROR;
use crate::graph::NodeId;
use crate::template::quote;

use super::program::{Part, Program, Statement};

/// Program execution refused or incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramRunError {
    #[error("missing credential: program calls the completion service but no api key is set")]
    MissingCredential,

    #[error("returned unit {0} is never defined")]
    UndefinedOutput(NodeId),
}

/// Values computed by one program run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramOutput {
    /// Value of every statement that ran.
    pub values: BTreeMap<NodeId, String>,
    /// Values of the returned units.
    pub outputs: BTreeMap<NodeId, String>,
    /// Completion calls that failed; their error marker is the unit's value.
    pub failures: Vec<NodeFailure>,
}

fn render(parts: &[Part], store: &HashMap<NodeId, String>) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            Part::Text(text) => out.push_str(text),
            Part::Ref { source, token } => match store.get(source) {
                Some(value) => out.push_str(value),
                None => out.push_str(token),
            },
            Part::Quote { source, token } => match store.get(source) {
                Some(value) => out.push_str(&quote(value)),
                None => out.push_str(token),
            },
        }
    }
    out
}

impl Program {
    /// Runs the program. `inputs` overrides the defaults of input statements.
    ///
    /// Cancellation and event sending in `ctx` are not used.
    pub async fn run(
        &self,
        inputs: &BTreeMap<NodeId, String>,
        ctx: &RunContext,
    ) -> Result<ProgramOutput, ProgramRunError> {
        let credentials = ctx.credentials.as_ref().filter(|c| !c.is_blank());
        if self.calls_completion() && credentials.is_none() {
            return Err(ProgramRunError::MissingCredential);
        }
        if let Some(missing) = self
            .outputs
            .iter()
            .find(|id| !self.statements.iter().any(|s| s.id() == *id))
        {
            return Err(ProgramRunError::UndefinedOutput(missing.clone()));
        }

        let mut store: HashMap<NodeId, String> = HashMap::new();
        let mut output = ProgramOutput::default();

        for statement in &self.statements {
            let value = match statement {
                Statement::Input { id, default } => {
                    inputs.get(id).cloned().unwrap_or_else(|| default.clone())
                }
                Statement::Text { value, .. } => value.clone(),
                Statement::Join { sources, .. } => {
                    join_values(sources.iter().filter_map(|s| store.get(s).map(String::as_str)))
                }
                Statement::Complete { id, parts } => {
                    let prompt = render(parts, &store);
                    let reply = match credentials {
                        Some(credentials) => {
                            ctx.completion.complete(&prompt, credentials, ctx.model).await
                        }
                        None => return Err(ProgramRunError::MissingCredential),
                    };
                    match reply {
                        Ok(reply) => reply,
                        Err(error) => {
                            output.failures.push(NodeFailure::new(id.clone(), &error));
                            error_marker(&error)
                        }
                    }
                }
                Statement::Evaluate {
                    parts,
                    inputs: bound,
                    ..
                } => {
                    let code = render(parts, &store);
                    let named: BTreeMap<String, String> = bound
                        .iter()
                        .filter_map(|(name, source)| {
                            store.get(source).map(|v| (name.clone(), v.clone()))
                        })
                        .collect();
                    ctx.evaluator
                        .evaluate(&code, &named)
                        .unwrap_or_else(|_| USER_CODE_ERROR.to_string())
                }
            };
            store.insert(statement.id().clone(), value);
        }

        output.outputs = self
            .outputs
            .iter()
            .filter_map(|id| store.get(id).map(|v| (id.clone(), v.clone())))
            .collect();
        output.values = store.into_iter().collect();
        Ok(output)
    }
}
