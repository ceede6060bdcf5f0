//! # Interface Registry
//!
//! Caller-owned map from interface name to an independent
//! [`HealthPipeline`]. Interfaces share nothing but the configuration they
//! were created with.
//!
//! Besides fan-out of time ticks and collection of transitions, the registry
//! keeps per-interface run accounting so an end-of-run ranking by
//! time-averaged active score can be produced.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::HealthConfig;
use crate::pipeline::{HealthPipeline, InterfaceSnapshot, TransitionEvent};
use crate::types::{Sample, Status};

/// One row of the end-of-run ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedInterface {
    pub interface_id: String,
    /// Mean `score_used` over all recorded ticks; 0 if none were recorded.
    pub avg_score: f64,
    pub last_status: Status,
    pub ticks: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    pipeline: HealthPipeline,
    score_sum: f64,
    ticks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    config: HealthConfig,
    entries: BTreeMap<String, Entry>,
    pending: Vec<TransitionEvent>,
}

impl HealthRegistry {
    pub fn new(config: HealthConfig) -> Self {
        HealthRegistry {
            config,
            entries: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Register an interface if it is not tracked yet.
    pub fn ensure_interface(&mut self, iface: &str) {
        self.entry_mut(iface);
    }

    fn entry_mut(&mut self, iface: &str) -> &mut Entry {
        let config = &self.config;
        self.entries.entry(iface.to_string()).or_insert_with(|| {
            tracing::debug!(iface, "interface registered");
            Entry {
                pipeline: HealthPipeline::new(iface, config),
                score_sum: 0.0,
                ticks: 0,
            }
        })
    }

    /// Drop an interface, its accounting and any of its undrained
    /// transitions. Returns whether it existed.
    pub fn remove_interface(&mut self, iface: &str) -> bool {
        let removed = self.entries.remove(iface).is_some();
        if removed {
            self.pending.retain(|e| e.interface_id != iface);
            tracing::debug!(iface, "interface removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interface names in sorted order.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn pipeline(&self, iface: &str) -> Option<&HealthPipeline> {
        self.entries.get(iface).map(|e| &e.pipeline)
    }

    /// Feed a sample, registering the interface on first sight.
    pub fn ingest(&mut self, iface: &str, ts: i64, sample: Sample) -> bool {
        let entry = self.entry_mut(iface);
        let accepted = entry.pipeline.ingest(ts, sample);
        let event = entry.pipeline.drain_transition();
        self.pending.extend(event);
        accepted
    }

    /// Advance every interface's clock.
    pub fn note_time(&mut self, now: i64) {
        for entry in self.entries.values_mut() {
            entry.pipeline.note_time(now);
            self.pending.extend(entry.pipeline.drain_transition());
        }
    }

    pub fn snapshot(&self, iface: &str) -> Option<&InterfaceSnapshot> {
        self.pipeline(iface).map(HealthPipeline::snapshot)
    }

    /// Current snapshot of every interface, sorted by name.
    pub fn snapshots(&self) -> Vec<InterfaceSnapshot> {
        self.entries
            .values()
            .map(|e| e.pipeline.snapshot().clone())
            .collect()
    }

    /// Transitions collected since the previous drain, in arrival order.
    ///
    /// The queue keeps every transition until it is drained, so a host that
    /// never drains grows it by one entry per transition. Pipelines stay
    /// constant-size; only this queue depends on how often the host drains.
    pub fn drain_transitions(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Accumulate each interface's current active score into its run average.
    pub fn record_tick(&mut self) {
        for entry in self.entries.values_mut() {
            entry.score_sum += entry.pipeline.snapshot().score_used;
            entry.ticks += 1;
        }
    }

    /// Interfaces ranked by average active score, best first. Ties keep
    /// name order.
    pub fn ranked_summary(&self) -> Vec<RankedInterface> {
        let mut out: Vec<RankedInterface> = self
            .entries
            .iter()
            .map(|(iface, e)| RankedInterface {
                interface_id: iface.clone(),
                avg_score: if e.ticks > 0 {
                    e.score_sum / e.ticks as f64
                } else {
                    0.0
                },
                last_status: e.pipeline.status(),
                ticks: e.ticks,
            })
            .collect();
        out.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
        out
    }
}
