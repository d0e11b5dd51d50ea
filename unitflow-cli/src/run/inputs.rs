//! `--input id=value` overrides for input units.

use unitflow::{Graph, NodeId, UnitKind};

use super::Error;

/// Parses `id=value`. The value may be empty or contain further `=`.
pub fn parse_input(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected id=value, got {:?}", s)),
    }
}

/// Replaces the value of each named input unit. Unknown ids and non-input units are errors.
pub fn apply_inputs(graph: &mut Graph, inputs: &[(String, String)]) -> Result<(), Error> {
    for (id, value) in inputs {
        let id = NodeId::new(id.as_str());
        let kind = graph
            .node(&id)
            .map(|n| n.kind())
            .ok_or_else(|| format!("no unit named {}", id))?;
        if kind != UnitKind::Input {
            return Err(format!("{} is a {} unit, not an input", id, kind).into());
        }
        graph.set_template(&id, value.as_str())?;
    }
    Ok(())
}
