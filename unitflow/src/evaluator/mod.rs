//! User-code evaluation for custom units.
//!
//! The processor substitutes upstream values into the unit's code, then calls
//! [`CodeEvaluator::evaluate`] with the code and a name → value mapping of the arrived
//! inputs. Errors never fail the run: the processor turns them into the sentinel
//! output [`USER_CODE_ERROR`].

mod expr;

use std::collections::BTreeMap;

use thiserror::Error;

pub use expr::ExprEvaluator;

/// Output of a custom unit whose code failed.
pub const USER_CODE_ERROR: &str = "Error";

/// Failure raised while evaluating custom code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserCodeError {
    #[error("syntax error at {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("unknown input: {0}")]
    UnknownInput(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{0}")]
    Runtime(String),
}

/// Evaluates substituted code against the named upstream values.
///
/// `inputs` is keyed by token name without `$` (e.g. `input_1`).
pub trait CodeEvaluator: Send + Sync {
    fn evaluate(
        &self,
        code: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<String, UserCodeError>;
}

impl<F> CodeEvaluator for F
where
    F: Fn(&str, &BTreeMap<String, String>) -> Result<String, UserCodeError> + Send + Sync,
{
    fn evaluate(
        &self,
        code: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<String, UserCodeError> {
        self(code, inputs)
    }
}
