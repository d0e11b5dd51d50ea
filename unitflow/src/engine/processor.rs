//! Node processor: computes one node's output from its received values.
//!
//! | kind   | incoming edges              | no incoming edges |
//! |--------|-----------------------------|-------------------|
//! | input  | arrivals joined with `\n`   | the node's value  |
//! | output | arrivals joined with `\n`   | the node's text   |
//! | ai     | literal substitution, then `complete`              |
//! | custom | quoted substitution, then `evaluate`               |

use std::collections::{BTreeMap, HashMap};

use crate::evaluator::USER_CODE_ERROR;
use crate::graph::{Graph, Node, UnitKind};
use crate::llm::RemoteCallError;
use crate::template::{substitute, Quoting};

use super::logging::log_user_code_error;
use super::run_context::{Arrival, RunContext, RunState};

/// Result of processing one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    Value(String),
    /// The remote call failed; `marker` is what sequential runs forward downstream.
    Failed {
        marker: String,
        error: RemoteCallError,
    },
}

/// Separator between joined upstream values.
pub const JOIN_SEPARATOR: &str = "\n";

/// Joins upstream values in edge order.
pub fn join_values<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values.into_iter().collect::<Vec<_>>().join(JOIN_SEPARATOR)
}

/// Output forwarded in place of a failed remote call's reply.
pub fn error_marker(error: &RemoteCallError) -> String {
    format!("Error: {}", error)
}

/// Processes `node` against the values it has received so far.
pub async fn process(graph: &Graph, node: &Node, state: &RunState, ctx: &RunContext) -> NodeOutcome {
    let arrivals = state.arrivals(&node.id);
    match node.kind() {
        UnitKind::Input | UnitKind::Output => {
            if graph.in_degree(&node.id) > 0 {
                NodeOutcome::Value(join_values(arrivals.iter().map(|a| a.value.as_str())))
            } else {
                NodeOutcome::Value(node.template().to_string())
            }
        }
        UnitKind::Ai => {
            let prompt = render(node.template(), &arrivals, state, Quoting::Literal);
            let Some(credentials) = ctx.credentials.as_ref().filter(|c| !c.is_blank()) else {
                let error = RemoteCallError::new("no api key configured");
                return NodeOutcome::Failed {
                    marker: error_marker(&error),
                    error,
                };
            };
            match ctx.completion.complete(&prompt, credentials, ctx.model).await {
                Ok(reply) => NodeOutcome::Value(reply),
                Err(error) => NodeOutcome::Failed {
                    marker: error_marker(&error),
                    error,
                },
            }
        }
        UnitKind::Custom => {
            let code = render(node.template(), &arrivals, state, Quoting::StringLiteral);
            let inputs: BTreeMap<String, String> = arrivals
                .iter()
                .filter_map(|a| {
                    let token = state.symbols().token(&a.source)?;
                    Some((token.name().to_string(), a.value.clone()))
                })
                .collect();
            match ctx.evaluator.evaluate(&code, &inputs) {
                Ok(value) => NodeOutcome::Value(value),
                Err(e) => {
                    log_user_code_error(&node.id, &e);
                    NodeOutcome::Value(USER_CODE_ERROR.to_string())
                }
            }
        }
    }
}

/// Substitutes the tokens of the sources that delivered to this node.
fn render(template: &str, arrivals: &[Arrival], state: &RunState, quoting: Quoting) -> String {
    let bindings: HashMap<&str, &str> = arrivals
        .iter()
        .filter_map(|a| {
            let token = state.symbols().token(&a.source)?;
            Some((token.as_str(), a.value.as_str()))
        })
        .collect();
    substitute(template, &bindings, quoting)
}
