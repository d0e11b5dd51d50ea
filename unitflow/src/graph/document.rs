//! Saved graph document: `{ nodes, edges, counters }` as JSON.
//!
//! Round-trips the data model faithfully. readyCount is not stored; it is rebuilt from
//! the edges on load, so a hand-edited document cannot break the in-degree invariant.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph_error::GraphError;
use super::node::{NodeId, Position, Unit};
use super::store::{Edge, Graph, UnitCounters};

/// Error loading or saving a graph document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid graph document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graph document io: {0}")]
    Io(#[from] std::io::Error),

    #[error("graph document is structurally invalid: {0}")]
    Graph(#[from] GraphError),
}

/// One node as stored in a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(flatten)]
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Serializable form of a [`Graph`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub counters: UnitCounters,
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Builds the live graph. Edges must reference declared nodes; counters are raised
    /// past any numeric `<kind>-<n>` id so newly created units never reuse an id.
    pub fn into_graph(self) -> Result<Graph, DocumentError> {
        let mut graph = Graph::new();
        *graph.counters_mut() = self.counters;
        for record in self.nodes {
            let kind = record.unit.kind();
            let suffix = record
                .id
                .as_str()
                .strip_prefix(kind.as_str())
                .and_then(|s| s.strip_prefix('-'))
                .and_then(|s| s.parse::<u32>().ok());
            graph.add_node(record.id.clone(), record.unit)?;
            if let Some(position) = record.position {
                graph.set_position(&record.id, position)?;
            }
            if let Some(n) = suffix {
                graph.counters_mut().observe(kind, n);
            }
        }
        for edge in self.edges {
            graph.add_edge(edge.from, edge.to)?;
        }
        Ok(graph)
    }
}

impl From<&Graph> for GraphDocument {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|n| NodeRecord {
                    id: n.id.clone(),
                    unit: n.unit.clone(),
                    position: n.position,
                })
                .collect(),
            edges: graph.edges().to_vec(),
            counters: graph.counters(),
        }
    }
}

impl Graph {
    /// Snapshot of this graph as a document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from(self)
    }
}
