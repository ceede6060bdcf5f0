//! # Hysteresis State Machine
//!
//! Turns a noisy `(score, confidence)` stream into a flap-resistant
//! [`Status`]. Each direction has its own threshold and its own
//! consecutive-tick requirement:
//!
//! | From     | Sustained condition                               | To       | Dwell |
//! |----------|---------------------------------------------------|----------|-------|
//! | Healthy  | score ≤ `healthy_exit`                            | Degraded | yes   |
//! | Degraded | score ≤ `down_enter`                              | Down     | no*   |
//! | Degraded | confidence ≥ promotion floor, score ≥ `healthy_enter` | Healthy | yes |
//! | Down     | score ≥ `down_exit`                               | Degraded | yes   |
//!
//! \* unless [`FsmConfig::dwell_gates_fast_drop`] is set.
//!
//! A tick that breaks a condition resets that counter. Any transition resets
//! all counters. When dwell blocks a transition the counter keeps growing and
//! the transition fires on the first tick dwell allows.
//!
//! An optional confidence floor forces Down immediately, skipping both dwell
//! and evidence.

use serde::Serialize;

use crate::config::FsmConfig;
use crate::score::clamp01;
use crate::types::Status;

/// Why a transition fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    ConfidenceForcedDown,
    BelowHealthyExit,
    BelowDownEnter,
    AboveHealthyEnter,
    AboveDownExit,
}

impl std::fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransitionReason::ConfidenceForcedDown => "confidence below force-down threshold",
            TransitionReason::BelowHealthyExit => "score <= healthy_exit for N ticks",
            TransitionReason::BelowDownEnter => "score <= down_enter for N ticks",
            TransitionReason::AboveHealthyEnter => "score >= healthy_enter for N ticks",
            TransitionReason::AboveDownExit => "score >= down_exit for N ticks",
        };
        f.write_str(s)
    }
}

/// Consecutive-tick evidence, one counter per transition direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvidenceCounters {
    pub below_healthy_exit: u32,
    pub above_healthy_enter: u32,
    pub below_down_enter: u32,
    pub above_down_exit: u32,
}

impl EvidenceCounters {
    fn step(counter: &mut u32, holds: bool) {
        *counter = if holds { counter.saturating_add(1) } else { 0 };
    }
}

/// Result of one [`HysteresisFsm::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmUpdate {
    pub status: Status,
    pub transitioned: bool,
    pub reason: Option<TransitionReason>,
}

#[derive(Debug, Clone)]
pub struct HysteresisFsm {
    config: FsmConfig,
    status: Status,
    counters: EvidenceCounters,
    last_transition_ts: Option<i64>,
}

impl HysteresisFsm {
    /// State machine starting in [`Status::Degraded`].
    pub fn new(config: FsmConfig) -> Self {
        Self::with_initial(config, Status::Degraded)
    }

    pub fn with_initial(config: FsmConfig, initial: Status) -> Self {
        HysteresisFsm {
            config,
            status: initial,
            counters: EvidenceCounters::default(),
            last_transition_ts: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn counters(&self) -> EvidenceCounters {
        self.counters
    }

    pub fn last_transition_ts(&self) -> Option<i64> {
        self.last_transition_ts
    }

    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    fn dwell_ok(&self, now: i64) -> bool {
        if self.config.min_dwell_secs == 0 {
            return true;
        }
        match self.last_transition_ts {
            None => true,
            Some(last) => now.saturating_sub(last) >= i64::from(self.config.min_dwell_secs),
        }
    }

    fn transition(&mut self, now: i64, next: Status, reason: TransitionReason) -> FsmUpdate {
        self.status = next;
        self.last_transition_ts = Some(now);
        self.counters = EvidenceCounters::default();
        FsmUpdate {
            status: next,
            transitioned: true,
            reason: Some(reason),
        }
    }

    fn hold(&self) -> FsmUpdate {
        FsmUpdate {
            status: self.status,
            transitioned: false,
            reason: None,
        }
    }

    /// Advance one tick. Score and confidence are clamped to `[0, 1]` first.
    pub fn update(&mut self, now: i64, score: f64, confidence: f64) -> FsmUpdate {
        let score = clamp01(score);
        let confidence = clamp01(confidence);
        let cfg = &self.config;

        let forced = cfg
            .force_down_below_confidence
            .is_some_and(|floor| confidence < floor);
        if forced && self.status != Status::Down {
            return self.transition(now, Status::Down, TransitionReason::ConfidenceForcedDown);
        }

        match self.status {
            Status::Healthy => {
                let exit_n = cfg.healthy_exit_n;
                EvidenceCounters::step(
                    &mut self.counters.below_healthy_exit,
                    score <= cfg.healthy_exit,
                );
                if self.counters.below_healthy_exit >= exit_n && self.dwell_ok(now) {
                    return self.transition(
                        now,
                        Status::Degraded,
                        TransitionReason::BelowHealthyExit,
                    );
                }
            }
            Status::Degraded => {
                let down_n = cfg.down_enter_n;
                let enter_n = cfg.healthy_enter_n;
                let gate_drop = cfg.dwell_gates_fast_drop;
                let promotable = confidence >= cfg.min_confidence_for_promotion
                    && score >= cfg.healthy_enter;
                EvidenceCounters::step(
                    &mut self.counters.below_down_enter,
                    score <= cfg.down_enter,
                );
                EvidenceCounters::step(&mut self.counters.above_healthy_enter, promotable);

                // Down wins ties; promotion is not considered on such a tick.
                if self.counters.below_down_enter >= down_n {
                    if !gate_drop || self.dwell_ok(now) {
                        return self.transition(
                            now,
                            Status::Down,
                            TransitionReason::BelowDownEnter,
                        );
                    }
                    return self.hold();
                }
                if self.counters.above_healthy_enter >= enter_n && self.dwell_ok(now) {
                    return self.transition(
                        now,
                        Status::Healthy,
                        TransitionReason::AboveHealthyEnter,
                    );
                }
            }
            Status::Down => {
                let exit_n = cfg.down_exit_n;
                EvidenceCounters::step(&mut self.counters.above_down_exit, score >= cfg.down_exit);
                if self.counters.above_down_exit >= exit_n && self.dwell_ok(now) {
                    return self.transition(now, Status::Degraded, TransitionReason::AboveDownExit);
                }
            }
        }

        self.hold()
    }
}
