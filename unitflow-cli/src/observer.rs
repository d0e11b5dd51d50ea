//! Run observer that prints node enter/exit and wave progress while a graph runs.

use std::io::Write;

use unitflow::RunEvent;

/// Writes one line per run event.
///
/// Writes to stderr by default so that output values on stdout can be redirected
/// separately.
pub struct RunObserver<W: Write> {
    out: W,
}

impl RunObserver<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> RunObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn observe(&mut self, event: &RunEvent) {
        let _ = writeln!(self.out, "{}", describe(event));
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Log line for `event`.
pub fn describe(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted {
            nodes,
            cyclic,
            mode,
        } => format!("[run] start units={} cyclic={} mode={}", nodes, cyclic, mode),
        RunEvent::Wave { level, nodes } => {
            let ids: Vec<&str> = nodes.iter().map(|n| n.as_str()).collect();
            format!("[wave] level={} units={}", level, ids.join(","))
        }
        RunEvent::NodeStarted { node, kind } => {
            format!("[node] enter node={} kind={}", node, kind)
        }
        RunEvent::NodeFinished { node, output } => {
            format!("[node] exit node={} chars={}", node, output.chars().count())
        }
        RunEvent::NodeFailed { node, error } => {
            format!("[node] exit node={} error={}", node, error)
        }
        RunEvent::RunFinished { report } => format!(
            "[run] finished executed={} failed={} cancelled={}",
            report.order.len(),
            report.failures.len(),
            report.cancelled
        ),
        RunEvent::RunFailed { error } => format!("[run] refused error={}", error),
    }
}
