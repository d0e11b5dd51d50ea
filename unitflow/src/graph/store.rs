//! Graph store: nodes by id plus an ordered edge list.
//!
//! Build with `add_node` / `create_node` and `add_edge(from, to)`; remove with
//! `delete_node` / `delete_edge`. Every mutation keeps each node's readyCount equal to
//! its in-degree. The store is mutated only between runs; schedulers borrow it
//! immutably and keep per-run state in their own run context.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::graph_error::GraphError;
use super::node::{Node, NodeId, Position, Unit, UnitKind};
use super::token::Token;

/// Directed data-flow link `from → to`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Per-kind counters used to allocate `<kind>-<n>` ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounters {
    #[serde(default)]
    pub input: u32,
    #[serde(default)]
    pub output: u32,
    #[serde(default, alias = "openai")]
    pub ai: u32,
    #[serde(default)]
    pub custom: u32,
}

impl UnitCounters {
    pub fn get(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Input => self.input,
            UnitKind::Output => self.output,
            UnitKind::Ai => self.ai,
            UnitKind::Custom => self.custom,
        }
    }

    fn slot(&mut self, kind: UnitKind) -> &mut u32 {
        match kind {
            UnitKind::Input => &mut self.input,
            UnitKind::Output => &mut self.output,
            UnitKind::Ai => &mut self.ai,
            UnitKind::Custom => &mut self.custom,
        }
    }

    fn bump(&mut self, kind: UnitKind) -> u32 {
        let slot = self.slot(kind);
        *slot += 1;
        *slot
    }

    /// Raises the counter for `kind` to at least `n`.
    pub(crate) fn observe(&mut self, kind: UnitKind, n: u32) {
        let slot = self.slot(kind);
        if *slot < n {
            *slot = n;
        }
    }
}

/// The single mutable structure all components operate on.
///
/// Nodes iterate in insertion order; edges keep insertion order too, which fixes the
/// join order of multi-input units.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    edges: Vec<Edge>,
    counters: UnitCounters,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node under an explicit id.
    ///
    /// Fails when the id is taken or its substitution token would collide with an
    /// existing node's token. Returns `&mut Self` for chaining.
    pub fn add_node(
        &mut self,
        id: impl Into<NodeId>,
        unit: Unit,
    ) -> Result<&mut Self, GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let token = Token::for_node(&id, unit.kind());
        if let Some(existing) = self
            .nodes()
            .find(|n| Token::for_node(&n.id, n.kind()) == token)
        {
            return Err(GraphError::TokenCollision {
                token: token.as_str().to_string(),
                node: id,
                existing: existing.id.clone(),
            });
        }
        self.order.push(id.clone());
        self.nodes.insert(id.clone(), Node::new(id, unit));
        Ok(self)
    }

    /// Adds a node with a generated `<kind>-<n>` id and returns that id.
    pub fn create_node(
        &mut self,
        kind: UnitKind,
        template: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        let unit = Unit::new(kind, template);
        loop {
            let n = self.counters.bump(kind);
            let id = NodeId::new(format!("{}-{}", kind.as_str(), n));
            match self.add_node(id.clone(), unit.clone()) {
                Ok(_) => return Ok(id),
                Err(GraphError::DuplicateNode(_)) | Err(GraphError::TokenCollision { .. }) => {
                    continue
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Removes a node and every incident edge. Targets of removed outgoing edges get
    /// their readyCount decremented. Returns the removed node, or `None` if absent.
    pub fn delete_node(&mut self, id: &NodeId) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|n| n != id);
        let mut kept = Vec::with_capacity(self.edges.len());
        for edge in self.edges.drain(..) {
            if &edge.from == id || &edge.to == id {
                if &edge.from == id && &edge.to != id {
                    if let Some(target) = self.nodes.get_mut(&edge.to) {
                        target.ready_count = target.ready_count.saturating_sub(1);
                    }
                }
            } else {
                kept.push(edge);
            }
        }
        self.edges = kept;
        Some(node)
    }

    /// Appends an edge `from → to` and increments the target's readyCount.
    ///
    /// Duplicate edges and self-loops are allowed; both endpoints must exist.
    pub fn add_edge(
        &mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
    ) -> Result<&mut Self, GraphError> {
        let (from, to) = (from.into(), to.into());
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::NodeNotFound(from));
        }
        let target = self
            .nodes
            .get_mut(&to)
            .ok_or_else(|| GraphError::NodeNotFound(to.clone()))?;
        target.ready_count += 1;
        self.edges.push(Edge { from, to });
        Ok(self)
    }

    /// Removes the first edge `from → to` and decrements the target's readyCount.
    /// Returns false (and changes nothing) when no such edge exists.
    pub fn delete_edge(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let Some(pos) = self
            .edges
            .iter()
            .position(|e| &e.from == from && &e.to == to)
        else {
            return false;
        };
        self.edges.remove(pos);
        if let Some(target) = self.nodes.get_mut(to) {
            target.ready_count = target.ready_count.saturating_sub(1);
        }
        true
    }

    /// Replaces the user-edited text of a node.
    pub fn set_template(
        &mut self,
        id: &NodeId,
        template: impl Into<String>,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        node.unit.set_template(template.into());
        Ok(())
    }

    pub fn set_position(&mut self, id: &NodeId, position: Position) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        node.position = Some(position);
        Ok(())
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn counters(&self) -> UnitCounters {
        self.counters
    }

    /// Number of edges ending at `id`, counted from the edge list.
    pub fn in_degree(&self, id: &NodeId) -> usize {
        self.edges.iter().filter(|e| &e.to == id).count()
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.from == id)
    }

    /// Edges entering `id` with their position in the edge list, in insertion order.
    pub fn incoming<'a>(
        &'a self,
        id: &'a NodeId,
    ) -> impl Iterator<Item = (usize, &'a Edge)> + 'a {
        self.edges.iter().enumerate().filter(move |(_, e)| &e.to == id)
    }

    /// True when some node of kind `kind` exists.
    pub fn has_kind(&self, kind: UnitKind) -> bool {
        self.nodes().any(|n| n.kind() == kind)
    }

    /// Token of a live node.
    pub fn token(&self, id: &NodeId) -> Option<Token> {
        self.nodes.get(id).map(|n| Token::for_node(&n.id, n.kind()))
    }

    /// Checks that every edge endpoint is live and every readyCount equals the in-degree.
    pub fn verify(&self) -> Result<(), GraphError> {
        for edge in &self.edges {
            for end in [&edge.from, &edge.to] {
                if !self.nodes.contains_key(end) {
                    return Err(GraphError::Inconsistent(format!(
                        "edge {} -> {} references missing node {}",
                        edge.from, edge.to, end
                    )));
                }
            }
        }
        for node in self.nodes() {
            let degree = self.in_degree(&node.id);
            if node.ready_count != degree {
                return Err(GraphError::Inconsistent(format!(
                    "node {} has readyCount {} but in-degree {}",
                    node.id, node.ready_count, degree
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn counters_mut(&mut self) -> &mut UnitCounters {
        &mut self.counters
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }
}
