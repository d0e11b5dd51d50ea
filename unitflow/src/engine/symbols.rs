//! Per-run symbol table: node id to substitution token.

use std::collections::HashMap;

use crate::graph::{Graph, NodeId, Token};

/// Tokens of every node in a graph, computed once per run.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    tokens: HashMap<NodeId, Token>,
}

impl SymbolTable {
    pub fn build(graph: &Graph) -> Self {
        let tokens = graph
            .nodes()
            .map(|n| (n.id.clone(), Token::for_node(&n.id, n.kind())))
            .collect();
        Self { tokens }
    }

    pub fn token(&self, id: &NodeId) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
