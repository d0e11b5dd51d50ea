//! Text description of a graph: classification, schedule and token table.

use unitflow::{has_cycle, topological_order, wave_plan, Graph};

pub fn inspect(graph: &Graph) -> String {
    let cyclic = has_cycle(graph);
    let mut lines = vec![format!(
        "{} units, {} edges, {}",
        graph.len(),
        graph.edges().len(),
        if cyclic { "cyclic" } else { "acyclic" }
    )];

    if cyclic {
        lines.push("waves:".to_string());
        for (level, wave) in wave_plan(graph).iter().enumerate() {
            let ids: Vec<&str> = wave.iter().map(|id| id.as_str()).collect();
            lines.push(format!("  {}: {}", level, ids.join(", ")));
        }
    } else {
        let order: Vec<String> = topological_order(graph)
            .iter()
            .map(ToString::to_string)
            .collect();
        lines.push(format!("order: {}", order.join(" -> ")));
    }

    lines.push("tokens:".to_string());
    let width = graph.nodes().map(|n| n.id.as_str().len()).max().unwrap_or(0);
    for node in graph.nodes() {
        let token = graph
            .token(&node.id)
            .map(|t| t.to_string())
            .unwrap_or_default();
        lines.push(format!(
            "  {:<width$}  {:<6}  {}",
            node.id.as_str(),
            node.kind().as_str(),
            token,
            width = width
        ));
    }
    lines.join("\n")
}
