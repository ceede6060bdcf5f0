//! Configuration for scoring and status classification.
//!
//! Resolved types ([`HealthConfig`], [`ScoreConfig`], [`FsmConfig`]) carry
//! concrete values and are what the pipeline consumes. TOML input goes
//! through the `*Input` mirrors, whose leaves are all optional, and
//! [`HealthConfigInput::resolve`] fills the gaps from the defaults.
//!
//! Coherence (weights summing to 1, enter above exit, ...) is the caller's
//! job. [`HealthConfig::lint`] reports suspicious settings but never rejects.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_VERSION: u32 = 1;

// ─── Score ──────────────────────────────────────────────────────────────────

/// Span used to map a physical metric onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        MetricRange { min, max }
    }
}

/// Normalisation spans per metric. Throughput only uses `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationRanges {
    pub throughput_mbps: MetricRange,
    pub rtt_ms: MetricRange,
    pub loss_pct: MetricRange,
    pub jitter_ms: MetricRange,
}

impl Default for NormalizationRanges {
    fn default() -> Self {
        NormalizationRanges {
            throughput_mbps: MetricRange::new(0.0, 200.0),
            rtt_ms: MetricRange::new(10.0, 800.0),
            loss_pct: MetricRange::new(0.0, 30.0),
            jitter_ms: MetricRange::new(0.0, 200.0),
        }
    }
}

/// Combination weights. Not renormalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub throughput: f64,
    pub rtt: f64,
    pub loss: f64,
    pub jitter: f64,
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.throughput + self.rtt + self.loss + self.jitter
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            throughput: 0.3,
            rtt: 0.3,
            loss: 0.2,
            jitter: 0.2,
        }
    }
}

/// Which score drives the state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStrategy {
    /// Weighted sum over the window averages.
    Raw,
    /// EWMA over successive raw scores.
    #[default]
    Smoothed,
}

impl std::fmt::Display for ScoreStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreStrategy::Raw => write!(f, "raw"),
            ScoreStrategy::Smoothed => write!(f, "smoothed"),
        }
    }
}

impl std::str::FromStr for ScoreStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "avg" => Ok(ScoreStrategy::Raw),
            "smoothed" | "ewma" => Ok(ScoreStrategy::Smoothed),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreConfig {
    pub ranges: NormalizationRanges,
    pub weights: ScoreWeights,
    /// EWMA smoothing factor in `[0, 1]`; higher tracks the raw score closer.
    pub ewma_alpha: f64,
    pub enable_downtrend_penalty: bool,
    /// Subtracted from the smoothed score when the raw score falls below it.
    pub downtrend_penalty: f64,
    pub enable_confidence_cap: bool,
    /// Confidence below which the active score is capped.
    pub confidence_cap_threshold: f64,
    /// Ceiling applied to the active score under low confidence.
    pub confidence_cap_value: f64,
    pub strategy: ScoreStrategy,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            ranges: NormalizationRanges::default(),
            weights: ScoreWeights::default(),
            ewma_alpha: 0.25,
            enable_downtrend_penalty: false,
            downtrend_penalty: 0.05,
            enable_confidence_cap: true,
            confidence_cap_threshold: 0.6,
            confidence_cap_value: 0.6,
            strategy: ScoreStrategy::Smoothed,
        }
    }
}

// ─── State Machine ──────────────────────────────────────────────────────────

/// Thresholds and evidence requirements for the hysteresis state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct FsmConfig {
    /// Degraded → Healthy once score ≥ this.
    pub healthy_enter: f64,
    /// Healthy → Degraded once score ≤ this.
    pub healthy_exit: f64,
    /// Degraded → Down once score ≤ this.
    pub down_enter: f64,
    /// Down → Degraded once score ≥ this.
    pub down_exit: f64,
    pub healthy_enter_n: u32,
    pub healthy_exit_n: u32,
    pub down_enter_n: u32,
    pub down_exit_n: u32,
    /// Minimum seconds between transitions (except the fast drop to Down).
    pub min_dwell_secs: u32,
    pub min_confidence_for_promotion: f64,
    /// Jump straight to Down when confidence falls below this. `None` disables.
    pub force_down_below_confidence: Option<f64>,
    /// Apply the dwell gate to Degraded → Down as well.
    pub dwell_gates_fast_drop: bool,
}

impl Default for FsmConfig {
    fn default() -> Self {
        FsmConfig {
            healthy_enter: 0.78,
            healthy_exit: 0.70,
            down_enter: 0.35,
            down_exit: 0.45,
            healthy_enter_n: 8,
            healthy_exit_n: 5,
            down_enter_n: 3,
            down_exit_n: 5,
            min_dwell_secs: 5,
            min_confidence_for_promotion: 0.6,
            force_down_below_confidence: None,
            dwell_gates_fast_drop: false,
        }
    }
}

// ─── Top Level ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthConfig {
    pub score: ScoreConfig,
    pub fsm: FsmConfig,
}

/// A coherence finding reported by [`HealthConfig::lint`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl HealthConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(HealthConfig::default());
        }
        let parsed: HealthConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Report settings that are accepted but probably not what was meant.
    pub fn lint(&self) -> Vec<ConfigWarning> {
        let mut out = Vec::new();
        let mut warn = |field: &'static str, message: String| {
            out.push(ConfigWarning { field, message });
        };

        let total = self.score.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            warn("score.weights", format!("weights sum to {total:.4}, expected 1.0"));
        }
        if !(0.0..=1.0).contains(&self.score.ewma_alpha) {
            warn(
                "score.ewma_alpha",
                format!("{} is outside [0, 1]", self.score.ewma_alpha),
            );
        }

        let f = &self.fsm;
        if f.healthy_enter < f.healthy_exit {
            warn(
                "fsm.healthy_enter",
                format!(
                    "healthy_enter {} is below healthy_exit {}",
                    f.healthy_enter, f.healthy_exit
                ),
            );
        }
        if f.down_exit < f.down_enter {
            warn(
                "fsm.down_exit",
                format!("down_exit {} is below down_enter {}", f.down_exit, f.down_enter),
            );
        }
        if f.down_enter >= f.healthy_exit {
            warn(
                "fsm.down_enter",
                format!(
                    "down_enter {} is not below healthy_exit {}",
                    f.down_enter, f.healthy_exit
                ),
            );
        }
        for (field, n) in [
            ("fsm.healthy_enter_n", f.healthy_enter_n),
            ("fsm.healthy_exit_n", f.healthy_exit_n),
            ("fsm.down_enter_n", f.down_enter_n),
            ("fsm.down_exit_n", f.down_exit_n),
        ] {
            if n == 0 {
                warn(field, "zero ticks of evidence fires on the first tick".into());
            }
        }

        out
    }
}

// ─── TOML Input ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealthConfigInput {
    pub version: u32,
    pub score: ScoreConfigInput,
    pub fsm: FsmConfigInput,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MetricRangeInput {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RangesInput {
    pub throughput_mbps: MetricRangeInput,
    pub rtt_ms: MetricRangeInput,
    pub loss_pct: MetricRangeInput,
    pub jitter_ms: MetricRangeInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeightsInput {
    pub throughput: Option<f64>,
    pub rtt: Option<f64>,
    pub loss: Option<f64>,
    pub jitter: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreConfigInput {
    pub ranges: RangesInput,
    pub weights: WeightsInput,
    pub ewma_alpha: Option<f64>,
    pub enable_downtrend_penalty: Option<bool>,
    pub downtrend_penalty: Option<f64>,
    pub enable_confidence_cap: Option<bool>,
    pub confidence_cap_threshold: Option<f64>,
    pub confidence_cap_value: Option<f64>,
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FsmConfigInput {
    pub healthy_enter: Option<f64>,
    pub healthy_exit: Option<f64>,
    pub down_enter: Option<f64>,
    pub down_exit: Option<f64>,
    pub healthy_enter_n: Option<u32>,
    pub healthy_exit_n: Option<u32>,
    pub down_enter_n: Option<u32>,
    pub down_exit_n: Option<u32>,
    pub min_dwell_secs: Option<u32>,
    pub min_confidence_for_promotion: Option<f64>,
    pub force_down_below_confidence: Option<f64>,
    pub dwell_gates_fast_drop: Option<bool>,
}

impl MetricRangeInput {
    fn resolve(self, default: MetricRange) -> MetricRange {
        MetricRange {
            min: self.min.unwrap_or(default.min),
            max: self.max.unwrap_or(default.max),
        }
    }
}

impl ScoreConfigInput {
    fn resolve(self) -> Result<ScoreConfig, ConfigError> {
        let d = ScoreConfig::default();
        let strategy = match self.strategy.as_deref() {
            Some(s) => s.parse()?,
            None => d.strategy,
        };
        Ok(ScoreConfig {
            ranges: NormalizationRanges {
                throughput_mbps: self
                    .ranges
                    .throughput_mbps
                    .resolve(d.ranges.throughput_mbps),
                rtt_ms: self.ranges.rtt_ms.resolve(d.ranges.rtt_ms),
                loss_pct: self.ranges.loss_pct.resolve(d.ranges.loss_pct),
                jitter_ms: self.ranges.jitter_ms.resolve(d.ranges.jitter_ms),
            },
            weights: ScoreWeights {
                throughput: self.weights.throughput.unwrap_or(d.weights.throughput),
                rtt: self.weights.rtt.unwrap_or(d.weights.rtt),
                loss: self.weights.loss.unwrap_or(d.weights.loss),
                jitter: self.weights.jitter.unwrap_or(d.weights.jitter),
            },
            ewma_alpha: self.ewma_alpha.unwrap_or(d.ewma_alpha),
            enable_downtrend_penalty: self
                .enable_downtrend_penalty
                .unwrap_or(d.enable_downtrend_penalty),
            downtrend_penalty: self.downtrend_penalty.unwrap_or(d.downtrend_penalty),
            enable_confidence_cap: self.enable_confidence_cap.unwrap_or(d.enable_confidence_cap),
            confidence_cap_threshold: self
                .confidence_cap_threshold
                .unwrap_or(d.confidence_cap_threshold),
            confidence_cap_value: self.confidence_cap_value.unwrap_or(d.confidence_cap_value),
            strategy,
        })
    }
}

impl FsmConfigInput {
    fn resolve(self) -> FsmConfig {
        let d = FsmConfig::default();
        FsmConfig {
            healthy_enter: self.healthy_enter.unwrap_or(d.healthy_enter),
            healthy_exit: self.healthy_exit.unwrap_or(d.healthy_exit),
            down_enter: self.down_enter.unwrap_or(d.down_enter),
            down_exit: self.down_exit.unwrap_or(d.down_exit),
            healthy_enter_n: self.healthy_enter_n.unwrap_or(d.healthy_enter_n),
            healthy_exit_n: self.healthy_exit_n.unwrap_or(d.healthy_exit_n),
            down_enter_n: self.down_enter_n.unwrap_or(d.down_enter_n),
            down_exit_n: self.down_exit_n.unwrap_or(d.down_exit_n),
            min_dwell_secs: self.min_dwell_secs.unwrap_or(d.min_dwell_secs),
            min_confidence_for_promotion: self
                .min_confidence_for_promotion
                .unwrap_or(d.min_confidence_for_promotion),
            force_down_below_confidence: self
                .force_down_below_confidence
                .or(d.force_down_below_confidence),
            dwell_gates_fast_drop: self.dwell_gates_fast_drop.unwrap_or(d.dwell_gates_fast_drop),
        }
    }
}

impl HealthConfigInput {
    pub fn resolve(self) -> Result<HealthConfig, ConfigError> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        Ok(HealthConfig {
            score: self.score.resolve()?,
            fsm: self.fsm.resolve(),
        })
    }
}
