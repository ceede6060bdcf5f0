//! End-to-end scenario runs with the default health configuration.

use std::collections::BTreeMap;

use linkwatch_core::config::{HealthConfig, ScoreStrategy};
use linkwatch_core::types::Status;
use linkwatch_sim::runner::{RunOptions, RunReport, run_scenario};
use linkwatch_sim::scenario::{NoiseConfig, ScenarioId};

fn config(strategy: ScoreStrategy) -> HealthConfig {
    let mut cfg = HealthConfig::default();
    cfg.score.strategy = strategy;
    cfg
}

fn run(scenario: ScenarioId, strategy: ScoreStrategy, seconds: i64) -> RunReport {
    let opts = RunOptions {
        seconds,
        ..RunOptions::for_scenario(scenario)
    };
    run_scenario(&config(strategy), &opts, |_| {})
}

fn final_status(report: &RunReport, iface: &str) -> Option<Status> {
    report
        .ranked
        .iter()
        .find(|r| r.interface_id == iface)
        .map(|r| r.last_status)
}

// ─── Scenario A: gradual degradation and recovery ───────────────────────────

#[test]
fn scenario_a_wifi_recovers_to_healthy() {
    for strategy in [ScoreStrategy::Raw, ScoreStrategy::Smoothed] {
        let opts = RunOptions {
            seconds: 150,
            ..RunOptions::for_scenario(ScenarioId::A)
        };
        let mut mid_run = BTreeMap::new();
        let report = run_scenario(&config(strategy), &opts, |tick| {
            if tick.t == 60 {
                for s in &tick.snapshots {
                    mid_run.insert(s.interface_id.clone(), s.status);
                }
            }
        });

        assert_ne!(mid_run.get("wifi0"), Some(&Status::Healthy), "{strategy}");
        assert_eq!(final_status(&report, "wifi0"), Some(Status::Healthy), "{strategy}");

        let wifi: Vec<_> = report.transitions_for("wifi0").collect();
        assert!(!wifi.is_empty() && wifi.len() <= 2, "{strategy}: {wifi:?}");
        assert!(wifi.iter().all(|e| e.to != Status::Down), "{strategy}: {wifi:?}");
        assert_eq!(wifi.last().map(|e| e.to), Some(Status::Healthy));
    }
}

// ─── Scenario B: periodic spikes ────────────────────────────────────────────

#[test]
fn scenario_b_spikes_do_not_flap() {
    let raw = run(ScenarioId::B, ScoreStrategy::Raw, 300);
    let smoothed = run(ScenarioId::B, ScoreStrategy::Smoothed, 300);

    let raw_n = raw.transitions_for("wifi0").count();
    let smooth_n = smoothed.transitions_for("wifi0").count();
    assert!(raw_n <= 2, "raw wifi0 flapped: {:?}", raw.transitions);
    assert!(smooth_n <= raw_n.max(1), "smoothed: {:?}", smoothed.transitions);
}

// ─── Scenario C: misleading throughput ──────────────────────────────────────

#[test]
fn scenario_c_ranks_clean_wifi_above_lossy_lte() {
    for strategy in [ScoreStrategy::Raw, ScoreStrategy::Smoothed] {
        let report = run(ScenarioId::C, strategy, 120);
        let order: Vec<_> = report
            .ranked
            .iter()
            .map(|r| r.interface_id.as_str())
            .collect();
        assert_eq!(order, vec!["eth0", "wifi0", "lte0", "sat0"], "{strategy}");
        assert_eq!(final_status(&report, "wifi0"), Some(Status::Healthy));
        assert_ne!(final_status(&report, "lte0"), Some(Status::Healthy));
    }
}

// ─── Scenario D: missing and late data ──────────────────────────────────────

#[test]
fn scenario_d_imperfect_data_stays_well_formed() {
    let opts = RunOptions {
        seconds: 200,
        ..RunOptions::for_scenario(ScenarioId::D)
    };
    let report = run_scenario(&config(ScoreStrategy::Smoothed), &opts, |tick| {
        for s in &tick.snapshots {
            for v in [s.score_raw, s.score_smoothed, s.score_used, s.confidence] {
                assert!(v.is_finite() && (0.0..=1.0).contains(&v), "{s:?}");
            }
            // Some samples are dropped every ten seconds.
            if tick.t >= 60 {
                assert!(s.confidence < 1.0, "{s:?}");
            }
        }
    });

    assert_eq!(final_status(&report, "eth0"), Some(Status::Healthy));
    assert_ne!(final_status(&report, "sat0"), Some(Status::Healthy));
    assert_eq!(report.ranked[0].interface_id, "eth0");
}

#[test]
fn noisy_runs_are_reproducible() {
    let opts = RunOptions {
        seconds: 120,
        noise: Some(NoiseConfig { pct: 8.0, seed: 17 }),
        ..RunOptions::for_scenario(ScenarioId::D)
    };
    let cfg = config(ScoreStrategy::Smoothed);
    let a = run_scenario(&cfg, &opts, |_| {});
    let b = run_scenario(&cfg, &opts, |_| {});
    assert_eq!(a.transitions, b.transitions);
    assert_eq!(a.ranked, b.ranked);
}

// ─── Reports ────────────────────────────────────────────────────────────────

#[test]
fn report_serialises_to_json() {
    let report = run(ScenarioId::B, ScoreStrategy::Smoothed, 10);
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["scenario"], "B");
    assert_eq!(v["strategy"], "smoothed");
    assert_eq!(v["seconds"], 10);
    assert_eq!(v["ranked"].as_array().map(Vec::len), Some(4));
}
