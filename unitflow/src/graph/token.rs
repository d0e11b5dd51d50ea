//! Substitution tokens derived from node ids.
//!
//! A node `input-1` is referenced from downstream templates as `$input_1`; a node `X`
//! of kind input as `$input_X`. The leading `<kind>-` prefix is dropped and every
//! character outside `[A-Za-z0-9_]` becomes `_`, so tokens are always one identifier run.

use std::fmt;

use super::node::{NodeId, UnitKind};

/// `$`-prefixed placeholder referring to one upstream node's value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    /// Derives the canonical token for a node.
    pub fn for_node(id: &NodeId, kind: UnitKind) -> Self {
        let raw = id.as_str();
        let prefix = format!("{}-", kind.as_str());
        let suffix = raw.strip_prefix(prefix.as_str()).unwrap_or(raw);
        let suffix: String = suffix
            .chars()
            .map(|c| if is_token_char(c) { c } else { '_' })
            .collect();
        Self(format!("${}_{}", kind.as_str(), suffix))
    }

    /// Full token text including `$`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token without `$`; the key under which custom code sees the value.
    pub fn name(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
