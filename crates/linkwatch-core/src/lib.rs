//! # linkwatch-core
//!
//! Classifies the live health of independent network interfaces from a noisy,
//! gappy, possibly out-of-order stream of per-second quality samples.
//!
//! Per interface:
//! - **[`window`]** — last 45 s of samples, tolerant of late, duplicate and
//!   missing data, summarised by a fixed-cost scan.
//! - **[`score`]** — normalised weighted score plus an EWMA-smoothed variant.
//! - **[`hysteresis`]** — asymmetric thresholds, consecutive-tick evidence
//!   and minimum dwell turn the score into `Healthy` / `Degraded` / `Down`.
//! - **[`pipeline`]** — wires the three and emits snapshots and drain-once
//!   transition events.
//!
//! [`registry`] holds many pipelines keyed by interface name. Everything is
//! synchronous and single-threaded; interfaces share no state.

pub mod config;
pub mod error;
pub mod hysteresis;
pub mod pipeline;
pub mod registry;
pub mod score;
pub mod types;
pub mod window;

pub use config::{FsmConfig, HealthConfig, ScoreConfig, ScoreStrategy};
pub use error::ConfigError;
pub use pipeline::{HealthPipeline, InterfaceSnapshot, TransitionEvent};
pub use registry::{HealthRegistry, RankedInterface};
pub use types::{Sample, Status};
pub use window::WINDOW_SECS;
