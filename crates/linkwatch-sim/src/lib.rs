//! Scenario simulation for linkwatch.
//!
//! Deterministic sample generation for four router-like interfaces, a runner
//! that feeds them through a [`linkwatch_core::HealthRegistry`] tick by tick,
//! and the text rendering used by the `linkwatch` binary.

pub mod runner;
pub mod scenario;
pub mod table;

pub use runner::{RunOptions, RunReport, Tick, run_scenario};
pub use scenario::{ImperfectDataConfig, NoiseConfig, ScenarioGenerator, ScenarioId};
