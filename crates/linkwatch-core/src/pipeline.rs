//! # Per-Interface Health Pipeline
//!
//! Wires window → score model → state machine for one interface. Every
//! accepted sample and every time tick triggers a recompute that refreshes
//! the [`InterfaceSnapshot`] and, when the status changed, stages a
//! [`TransitionEvent`].
//!
//! At most one transition is pending between drains; a newer one replaces
//! an undrained older one. [`HealthPipeline::drain_transition`] hands it out
//! exactly once.

use serde::Serialize;

use crate::config::HealthConfig;
use crate::hysteresis::{HysteresisFsm, TransitionReason};
use crate::score::{ScoreModel, ScoreState};
use crate::types::{Sample, Status};
use crate::window::{TimeWindow, WindowSummary};

/// Edge-triggered status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionEvent {
    pub interface_id: String,
    pub timestamp: i64,
    pub from: Status,
    pub to: Status,
    pub reason: TransitionReason,
}

/// Read-only view of an interface after its latest recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceSnapshot {
    pub interface_id: String,
    pub timestamp: i64,
    pub score_raw: f64,
    pub score_smoothed: f64,
    pub score_used: f64,
    pub confidence: f64,
    pub missing_rate: f64,
    /// Window means per metric.
    pub averages: Sample,
    pub status: Status,
}

impl InterfaceSnapshot {
    /// Build a snapshot with every field taken from its source.
    pub fn new(
        interface_id: &str,
        timestamp: i64,
        scores: &ScoreState,
        summary: &WindowSummary,
        status: Status,
    ) -> Self {
        InterfaceSnapshot {
            interface_id: interface_id.to_string(),
            timestamp,
            score_raw: scores.score_raw,
            score_smoothed: scores.score_smoothed,
            score_used: scores.score_used,
            confidence: scores.confidence,
            missing_rate: summary.missing_rate,
            averages: summary.averages,
            status,
        }
    }

    /// Snapshot of an interface that has seen neither samples nor ticks.
    fn initial(interface_id: &str, status: Status) -> Self {
        Self::new(
            interface_id,
            0,
            &ScoreState::default(),
            &TimeWindow::new().summary(),
            status,
        )
    }
}

#[derive(Debug, Clone)]
pub struct HealthPipeline {
    interface_id: String,
    window: TimeWindow,
    scorer: ScoreModel,
    fsm: HysteresisFsm,
    snapshot: InterfaceSnapshot,
    pending: Option<TransitionEvent>,
}

impl HealthPipeline {
    pub fn new(interface_id: impl Into<String>, config: &HealthConfig) -> Self {
        let interface_id = interface_id.into();
        let fsm = HysteresisFsm::new(config.fsm.clone());
        let snapshot = InterfaceSnapshot::initial(&interface_id, fsm.status());
        HealthPipeline {
            interface_id,
            window: TimeWindow::new(),
            scorer: ScoreModel::new(config.score.clone()),
            fsm,
            snapshot,
            pending: None,
        }
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    pub fn status(&self) -> Status {
        self.fsm.status()
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Feed one sample. Returns `false` if it was older than the window, in
    /// which case nothing else happens.
    pub fn ingest(&mut self, ts: i64, sample: Sample) -> bool {
        if !self.window.ingest(ts, sample) {
            tracing::debug!(
                iface = %self.interface_id,
                ts,
                newest_ts = ?self.window.newest_ts(),
                "sample older than window, rejected"
            );
            return false;
        }
        let now = self.window.newest_ts().unwrap_or(ts);
        if ts < now {
            tracing::debug!(
                iface = %self.interface_id,
                ts,
                newest_ts = now,
                "late sample accepted"
            );
        }
        self.recompute(now);
        true
    }

    /// Advance time without a sample so stale data can age out.
    pub fn note_time(&mut self, now: i64) {
        self.window.note_time(now);
        let now = self.window.newest_ts().unwrap_or(now);
        self.recompute(now);
    }

    pub fn snapshot(&self) -> &InterfaceSnapshot {
        &self.snapshot
    }

    /// Take the pending transition, if any. A second call returns `None`.
    pub fn drain_transition(&mut self) -> Option<TransitionEvent> {
        self.pending.take()
    }

    fn recompute(&mut self, now: i64) {
        let summary = self.window.summary();
        let scores = self.scorer.evaluate(&summary);

        let before = self.fsm.status();
        let update = self.fsm.update(now, scores.score_used, scores.confidence);

        self.snapshot =
            InterfaceSnapshot::new(&self.interface_id, now, &scores, &summary, update.status);

        if let (true, Some(reason)) = (update.transitioned, update.reason) {
            tracing::info!(
                iface = %self.interface_id,
                ts = now,
                from = %before,
                to = %update.status,
                score = scores.score_used,
                confidence = scores.confidence,
                %reason,
                "status transition"
            );
            self.pending = Some(TransitionEvent {
                interface_id: self.interface_id.clone(),
                timestamp: now,
                from: before,
                to: update.status,
                reason,
            });
        }
    }
}
