use crate::config::Config;
use crate::ring_buffer::Snapshot;
use crate::script::Step;
use serde_json::{json, Value};

pub fn has_failure(steps: &[Step]) -> bool {
    steps.iter().any(Step::failed)
}

/// Human-readable replay log: one line per step, then a summary.
pub fn render_text(steps: &[Step], snapshot: &Snapshot) -> String {
    let mut out: String = steps.iter()
        .map(|step| format!("L{:<4} {:<12} -> {}\n", step.op.line, step.op.op.to_string(), step.outcome))
        .collect();
    let failures = steps.iter().filter(|s| s.failed()).count();
    let state = if snapshot.is_empty { "empty" }
        else if snapshot.is_full { "full" }
        else { "partial" };
    out.push_str(&format!(
        "{} step(s), {} failed; {}/{} slots used ({}), contents {:?}\n",
        steps.len(), failures, snapshot.len, snapshot.capacity, state, snapshot.contents
    ));
    out
}

pub fn render_json(steps: &[Step], snapshot: &Snapshot, cfg: &Config) -> Value {
    json!({
        "rbuf_version": env!("CARGO_PKG_VERSION"),
        "timestamp":    chrono::Local::now().to_rfc3339(),
        "config":       cfg,
        "steps":        steps,
        "failed":       has_failure(steps),
        "final":        snapshot,
    })
}
