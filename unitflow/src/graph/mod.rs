//! Graph store, cycle detection and topological ordering.
//!
//! [`Graph`] owns nodes and edges and keeps readyCount equal to in-degree;
//! [`has_cycle`] classifies a graph; [`topological_order`] linearizes an acyclic one.
//! [`GraphDocument`] is the saved form.

mod adjacency;
mod cycle;
mod document;
mod graph_error;
mod node;
mod store;
mod token;
mod topo;

pub use cycle::has_cycle;
pub use document::{DocumentError, GraphDocument, NodeRecord};
pub use graph_error::GraphError;
pub use node::{Node, NodeId, Position, Unit, UnitKind};
pub use store::{Edge, Graph, UnitCounters};
pub use token::Token;
pub(crate) use token::is_token_char;
pub use topo::topological_order;
