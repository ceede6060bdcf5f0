//! Integration tests for the per-interface pipeline and registry.
//!
//! These drive the public API the way a collector would: a time tick per
//! second followed by whatever samples arrived, then a drain.

use linkwatch_core::config::{FsmConfig, HealthConfig, ScoreConfig, ScoreStrategy};
use linkwatch_core::hysteresis::{HysteresisFsm, TransitionReason};
use linkwatch_core::pipeline::HealthPipeline;
use linkwatch_core::registry::HealthRegistry;
use linkwatch_core::types::{Sample, Status};

const GOOD: Sample = Sample {
    rtt_ms: 35.0,
    throughput_mbps: 110.0,
    loss_pct: 0.5,
    jitter_ms: 6.0,
};

const SPIKE: Sample = Sample {
    rtt_ms: 350.0,
    throughput_mbps: 90.0,
    loss_pct: 10.0,
    jitter_ms: 70.0,
};

fn flap_cfg(strategy: ScoreStrategy) -> HealthConfig {
    HealthConfig {
        score: ScoreConfig {
            ewma_alpha: 0.25,
            enable_downtrend_penalty: false,
            strategy,
            ..Default::default()
        },
        fsm: FsmConfig {
            healthy_enter: 0.72,
            healthy_exit: 0.66,
            down_enter: 0.35,
            down_exit: 0.45,
            healthy_enter_n: 6,
            healthy_exit_n: 6,
            down_enter_n: 3,
            down_exit_n: 5,
            min_dwell_secs: 5,
            ..Default::default()
        },
    }
}

// ─── Flap Resistance ────────────────────────────────────────────────────

#[test]
fn short_spikes_do_not_flap_the_state_machine() {
    let cfg = FsmConfig {
        healthy_enter: 0.72,
        healthy_enter_n: 6,
        healthy_exit: 0.66,
        healthy_exit_n: 5,
        min_dwell_secs: 5,
        ..Default::default()
    };
    let mut fsm = HysteresisFsm::new(cfg);
    let mut transitions = 0;
    for t in 0..900i64 {
        let score = if t % 15 < 4 { 0.55 } else { 0.85 };
        if fsm.update(t, score, 1.0).transitioned {
            transitions += 1;
        }
    }
    assert_eq!(transitions, 1);
    assert_eq!(fsm.status(), Status::Healthy);
}

#[test]
fn periodic_spikes_through_pipeline_stay_bounded() {
    for strategy in [ScoreStrategy::Raw, ScoreStrategy::Smoothed] {
        let mut p = HealthPipeline::new("wifi0", &flap_cfg(strategy));
        let mut transitions = Vec::new();
        for t in 0..600i64 {
            p.note_time(t);
            let s = if t % 15 < 4 { SPIKE } else { GOOD };
            p.ingest(t, s);
            transitions.extend(p.drain_transition());
        }
        assert!(
            transitions.len() <= 3,
            "{strategy}: too many transitions: {transitions:?}"
        );
        assert_eq!(p.status(), Status::Healthy, "{strategy}");
    }
}

// ─── Window Semantics Through the Pipeline ──────────────────────────────

#[test]
fn colliding_timestamp_replaces_slot() {
    let mut p = HealthPipeline::new("eth0", &HealthConfig::default());
    assert!(p.ingest(1000, GOOD));
    assert!(p.ingest(1045, SPIKE));
    assert!(!p.window().has_sample(1000));
    assert!(p.window().has_sample(1045));
    assert_eq!(p.window().summary().count, 1);
    assert_eq!(p.snapshot().averages, SPIKE);
}

#[test]
fn correction_replaces_value_in_snapshot() {
    let mut p = HealthPipeline::new("eth0", &HealthConfig::default());
    p.ingest(10, SPIKE);
    p.ingest(10, GOOD);
    assert_eq!(p.snapshot().averages, GOOD);
    assert!((p.snapshot().confidence - 1.0 / 45.0).abs() < 1e-12);
}

#[test]
fn too_old_sample_reports_rejection() {
    let mut p = HealthPipeline::new("eth0", &HealthConfig::default());
    p.note_time(500);
    assert!(!p.ingest(400, GOOD));
    assert_eq!(p.window().summary().count, 0);
}

// ─── Degradation Paths ──────────────────────────────────────────────────

#[test]
fn sustained_bad_link_drops_to_down_and_recovers() {
    let bad = Sample::new(790.0, 2.0, 28.0, 190.0);
    let mut p = HealthPipeline::new("lte0", &flap_cfg(ScoreStrategy::Raw));
    let mut events = Vec::new();

    for t in 0..60i64 {
        p.note_time(t);
        p.ingest(t, bad);
        events.extend(p.drain_transition());
    }
    assert_eq!(p.status(), Status::Down);
    assert!(events.iter().any(|e| e.reason == TransitionReason::BelowDownEnter));

    for t in 60..200i64 {
        p.note_time(t);
        p.ingest(t, GOOD);
        events.extend(p.drain_transition());
    }
    assert_eq!(p.status(), Status::Healthy);
    let path: Vec<_> = events.iter().map(|e| (e.from, e.to)).collect();
    assert!(path.contains(&(Status::Down, Status::Degraded)));
    assert!(path.contains(&(Status::Degraded, Status::Healthy)));
}

#[test]
fn force_down_floor_catches_dead_interface() {
    let mut cfg = flap_cfg(ScoreStrategy::Smoothed);
    cfg.fsm.force_down_below_confidence = Some(0.1);
    let mut reg = HealthRegistry::new(cfg);

    for t in 0..60i64 {
        reg.note_time(t);
        reg.ingest("eth0", t, GOOD);
    }
    assert_eq!(reg.snapshot("eth0").map(|s| s.status), Some(Status::Healthy));
    reg.drain_transitions();

    // Samples stop; time keeps moving.
    for t in 60..110i64 {
        reg.note_time(t);
    }
    let evs = reg.drain_transitions();
    assert_eq!(reg.snapshot("eth0").map(|s| s.status), Some(Status::Down));
    assert!(
        evs.iter()
            .any(|e| e.reason == TransitionReason::ConfidenceForcedDown),
        "{evs:?}"
    );
}
