//! Plain-text rendering of snapshots, transitions and the end-of-run ranking.

use std::fmt::Write as _;

use linkwatch_core::pipeline::{InterfaceSnapshot, TransitionEvent};
use linkwatch_core::registry::RankedInterface;

/// Per-tick table, one row per interface sorted by name.
pub fn render_tick(t: i64, snapshots: &[InterfaceSnapshot]) -> String {
    let mut rows: Vec<&InterfaceSnapshot> = snapshots.iter().collect();
    rows.sort_by(|a, b| a.interface_id.cmp(&b.interface_id));

    let mut out = String::new();
    let _ = writeln!(out, "\n[t={t}s] Interface states");
    let _ = writeln!(
        out,
        "{:<7}{:<9}{:<8}{:<8}{:<10}{:<10}{:<10}{:<10}",
        "iface", "status", "score", "conf", "tp(Mb)", "rtt(ms)", "loss(%)", "jit(ms)"
    );
    let _ = writeln!(out, "{}", "-".repeat(72));
    for s in rows {
        let a = &s.averages;
        let _ = writeln!(
            out,
            "{:<7}{:<9}{:<8.3}{:<8.2}{:<10.1}{:<10.1}{:<10.2}{:<10.1}",
            s.interface_id,
            s.status.to_string(),
            s.score_used,
            s.confidence,
            a.throughput_mbps,
            a.rtt_ms,
            a.loss_pct,
            a.jitter_ms,
        );
    }
    out
}

/// `  TRANSITION [12s] wifi0 healthy -> degraded | score <= healthy_exit for N ticks`
pub fn render_transition(ev: &TransitionEvent) -> String {
    format!(
        "  TRANSITION [{}s] {} {} -> {} | {}",
        ev.timestamp, ev.interface_id, ev.from, ev.to, ev.reason
    )
}

pub fn render_summary(ranked: &[RankedInterface]) -> String {
    let mut out = String::from("\n=== End-of-run summary (rank by avg score_used) ===\n");
    for r in ranked {
        let _ = writeln!(
            out,
            "  {} avg_score={:.3} last_status={}",
            r.interface_id, r.avg_score, r.last_status
        );
    }
    out
}
