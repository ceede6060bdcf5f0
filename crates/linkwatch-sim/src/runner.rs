//! Drives a [`HealthRegistry`] through a scenario one second at a time.

use linkwatch_core::config::{HealthConfig, ScoreStrategy};
use linkwatch_core::pipeline::{InterfaceSnapshot, TransitionEvent};
use linkwatch_core::registry::{HealthRegistry, RankedInterface};
use serde::Serialize;

use crate::scenario::{
    INTERFACES, ImperfectDataConfig, NoiseConfig, ScenarioGenerator, ScenarioId,
};

pub const DEFAULT_RUN_SECS: i64 = 90;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scenario: ScenarioId,
    pub seconds: i64,
    pub imperfect: ImperfectDataConfig,
    pub noise: Option<NoiseConfig>,
}

impl RunOptions {
    /// Clean delivery for A-C, imperfect delivery for D.
    pub fn for_scenario(scenario: ScenarioId) -> Self {
        let imperfect = match scenario {
            ScenarioId::D => ImperfectDataConfig::default(),
            _ => ImperfectDataConfig::disabled(),
        };
        Self {
            scenario,
            seconds: DEFAULT_RUN_SECS,
            imperfect,
            noise: None,
        }
    }
}

/// State after one simulated second.
#[derive(Debug, Clone)]
pub struct Tick {
    pub t: i64,
    pub snapshots: Vec<InterfaceSnapshot>,
    pub transitions: Vec<TransitionEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: ScenarioId,
    pub strategy: ScoreStrategy,
    pub seconds: i64,
    pub transitions: Vec<TransitionEvent>,
    pub ranked: Vec<RankedInterface>,
}

impl RunReport {
    pub fn transitions_for<'a>(
        &'a self,
        iface: &'a str,
    ) -> impl Iterator<Item = &'a TransitionEvent> + 'a {
        self.transitions
            .iter()
            .filter(move |e| e.interface_id == iface)
    }
}

/// Run `opts.seconds` ticks. Each tick advances time on every interface,
/// ingests that second's samples, then hands the snapshots and drained
/// transitions to `on_tick` before recording the tick for the ranking.
pub fn run_scenario(
    config: &HealthConfig,
    opts: &RunOptions,
    mut on_tick: impl FnMut(&Tick),
) -> RunReport {
    let mut generator = ScenarioGenerator::new(opts.scenario, opts.imperfect);
    if let Some(noise) = opts.noise {
        generator = generator.with_noise(noise);
    }

    let mut registry = HealthRegistry::new(config.clone());
    for iface in INTERFACES {
        registry.ensure_interface(iface);
    }

    tracing::debug!(
        scenario = %opts.scenario,
        strategy = %config.score.strategy,
        seconds = opts.seconds,
        "scenario run started"
    );

    let mut transitions = Vec::new();
    for t in 0..opts.seconds {
        registry.note_time(t);
        for iface in INTERFACES {
            if let Some(g) = generator.sample(iface, t) {
                registry.ingest(iface, g.ts, g.sample);
            }
        }

        let tick = Tick {
            t,
            snapshots: registry.snapshots(),
            transitions: registry.drain_transitions(),
        };
        on_tick(&tick);
        transitions.extend(tick.transitions);
        registry.record_tick();
    }

    tracing::debug!(
        scenario = %opts.scenario,
        transitions = transitions.len(),
        "scenario run finished"
    );

    RunReport {
        scenario: opts.scenario,
        strategy: config.score.strategy,
        seconds: opts.seconds,
        transitions,
        ranked: registry.ranked_summary(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_sees_every_tick() {
        let opts = RunOptions {
            seconds: 12,
            ..RunOptions::for_scenario(ScenarioId::D)
        };
        let mut seen = Vec::new();
        let report = run_scenario(&HealthConfig::default(), &opts, |tick| {
            assert_eq!(tick.snapshots.len(), INTERFACES.len());
            seen.push(tick.t);
        });
        assert_eq!(seen, (0..12).collect::<Vec<_>>());
        assert_eq!(report.ranked.len(), INTERFACES.len());
        assert!(report.ranked.iter().all(|r| r.ticks == 12));
    }

    #[test]
    fn only_scenario_d_is_imperfect_by_default() {
        assert_eq!(
            RunOptions::for_scenario(ScenarioId::A).imperfect,
            ImperfectDataConfig::disabled()
        );
        assert_eq!(
            RunOptions::for_scenario(ScenarioId::D).imperfect,
            ImperfectDataConfig::default()
        );
    }

    #[test]
    fn report_carries_strategy() {
        let mut cfg = HealthConfig::default();
        cfg.score.strategy = ScoreStrategy::Raw;
        let opts = RunOptions {
            seconds: 3,
            ..RunOptions::for_scenario(ScenarioId::B)
        };
        let report = run_scenario(&cfg, &opts, |_| {});
        assert_eq!(report.strategy, ScoreStrategy::Raw);
        assert_eq!(report.scenario, ScenarioId::B);
    }
}
